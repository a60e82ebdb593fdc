use std::sync::Arc;

use log::{debug, trace};

use crate::config::SessionConfig;
use crate::encoder::{Symbol, SymbolKind, SymbolSequence};
use crate::error::Result;
use crate::modulator::Modulator;
use crate::record::Record;

/// Host-facing seam for a block-based audio generator.
///
/// A host configures one processor per stream and then calls `process` once
/// per render quantum until it returns `false`.
pub trait AudioProcessor: Sized {
    fn configure(config: SessionConfig, records: Arc<[Record]>) -> Result<Self>;

    /// Fill one block in every channel and report whether more blocks follow.
    fn process(&mut self, outputs: &mut [&mut [f32]]) -> bool;
}

/// Where a session is in the tape layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Configured, nothing rendered yet
    Idle,
    Preambling { record: usize },
    /// `slot` 0 is the start bit, 1..=8 the data bits, 9 the stop bit
    Framing { record: usize, byte: usize, slot: u8 },
    Done,
}

/// One synthesis run: a symbol stream driving a continuous-phase modulator.
///
/// The session is owned by the caller and advanced only by [`Session::render`].
pub struct Session {
    config: SessionConfig,
    symbols: SymbolSequence,
    modulator: Modulator,
    state: SessionState,
    samples_rendered: u64,
}

impl Session {
    /// Validate `config` and `records` and set up a session ready to render.
    ///
    /// Fails before any audio is produced; a host should not attach a session
    /// that failed to configure.
    pub fn configure(config: SessionConfig, records: impl Into<Arc<[Record]>>) -> Result<Self> {
        let symbols = SymbolSequence::open(records, &config)?;

        debug!(
            "session: {} Hz, {} baud, {} samples/symbol, {} records, {} samples total",
            config.sample_rate,
            config.symbol_rate,
            symbols.samples_per_symbol(),
            symbols.records().len(),
            config.total_samples(symbols.records())
        );

        Ok(Self {
            modulator: Modulator::new(config.sample_rate, config.amplitude),
            config,
            symbols,
            state: SessionState::Idle,
            samples_rendered: 0,
        })
    }

    /// A session that reports exhaustion on its first render and never
    /// writes a sample. Hosts can attach it in place of one that failed to
    /// configure.
    pub fn exhausted() -> Self {
        let config = SessionConfig::default();
        Self {
            modulator: Modulator::new(config.sample_rate, config.amplitude),
            config,
            symbols: SymbolSequence::empty(),
            state: SessionState::Done,
            samples_rendered: 0,
        }
    }

    /// Render one block into every channel.
    ///
    /// The block length is that of the shortest channel. The same mono sample
    /// goes to index k of every channel. When the symbols run out mid-block
    /// the rest of the block is left as it was and `false` is returned; every
    /// later call returns `false` without touching the buffers.
    ///
    /// With no channels at all, one `block_size` of samples is generated and
    /// discarded so the stream still advances in time.
    pub fn render(&mut self, outputs: &mut [&mut [f32]]) -> bool {
        if self.state == SessionState::Done {
            return false;
        }

        let block_len = match outputs.iter().map(|channel| channel.len()).min() {
            Some(len) => len,
            None => self.config.block_size,
        };

        for k in 0..block_len {
            if self.modulator.is_idle() && !self.advance() {
                return false;
            }

            let value = self.modulator.step();
            for channel in outputs.iter_mut() {
                channel[k] = value;
            }
            self.samples_rendered += 1;
        }

        // Report exhaustion as soon as it is known rather than one block late
        if self.modulator.is_idle() && !self.advance() {
            return false;
        }
        true
    }

    /// Render a single-channel block; see [`Session::render`].
    pub fn render_mono(&mut self, output: &mut [f32]) -> bool {
        self.render(&mut [output])
    }

    /// Pull symbols until one with a nonzero duration is loaded.
    fn advance(&mut self) -> bool {
        while let Some(symbol) = self.symbols.next() {
            if symbol.duration_samples == 0 {
                continue;
            }
            self.enter(&symbol);
            self.modulator.load_symbol(&symbol);
            return true;
        }

        debug!("session exhausted after {} samples", self.samples_rendered);
        self.state = SessionState::Done;
        false
    }

    fn enter(&mut self, symbol: &Symbol) {
        self.state = match symbol.kind {
            SymbolKind::Preamble { record } => {
                trace!("record {}: preamble of {} samples", record, symbol.duration_samples);
                SessionState::Preambling { record }
            }
            SymbolKind::Start { record, byte } => SessionState::Framing {
                record,
                byte,
                slot: 0,
            },
            SymbolKind::Data { record, byte, bit } => SessionState::Framing {
                record,
                byte,
                slot: bit + 1,
            },
            SymbolKind::Stop { record, byte } => SessionState::Framing {
                record,
                byte,
                slot: 9,
            },
        };
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn modulator(&self) -> &Modulator {
        &self.modulator
    }

    pub fn samples_rendered(&self) -> u64 {
        self.samples_rendered
    }

    /// Exact length of the whole stream in samples
    pub fn total_samples(&self) -> u64 {
        self.config.total_samples(self.symbols.records())
    }
}

impl AudioProcessor for Session {
    fn configure(config: SessionConfig, records: Arc<[Record]>) -> Result<Self> {
        Session::configure(config, records)
    }

    fn process(&mut self, outputs: &mut [&mut [f32]]) -> bool {
        self.render(outputs)
    }
}
