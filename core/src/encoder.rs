use std::iter::FusedIterator;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::record::Record;
use crate::BITS_PER_FRAME;

/// Where a symbol sits in the tape layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Preamble { record: usize },
    Start { record: usize, byte: usize },
    /// `bit` counts from the least significant bit, which goes out first
    Data { record: usize, byte: usize, bit: u8 },
    Stop { record: usize, byte: usize },
}

impl SymbolKind {
    pub fn record(&self) -> usize {
        match *self {
            SymbolKind::Preamble { record }
            | SymbolKind::Start { record, .. }
            | SymbolKind::Data { record, .. }
            | SymbolKind::Stop { record, .. } => record,
        }
    }
}

/// A constant-frequency tone segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    pub frequency: f64,
    pub duration_samples: u64,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    Preamble,
    /// slot 0 is the start bit, 1..=8 the data bits, 9 the stop bit
    Frame { byte: usize, slot: u8 },
}

/// Lazy symbol stream for a list of records.
///
/// Each record becomes one preamble symbol at the mark frequency followed by
/// ten symbols per payload byte: a space start bit, the eight data bits
/// least significant first (0 = space, 1 = mark), and a mark stop bit.
///
/// Symbols are produced one at a time from the shared records, so memory use
/// does not grow with the payload. The stream is consumed once; there is no
/// way to rewind it.
#[derive(Debug)]
pub struct SymbolSequence {
    records: Arc<[Record]>,
    record: usize,
    cursor: Cursor,
    sample_rate: f64,
    space_frequency: f64,
    mark_frequency: f64,
    samples_per_symbol: u64,
    remaining: usize,
}

impl SymbolSequence {
    /// Validate the configuration and records, then position the stream at
    /// the first record's preamble.
    pub fn open(records: impl Into<Arc<[Record]>>, config: &SessionConfig) -> Result<Self> {
        let records = records.into();
        config.validate_records(&records)?;

        let remaining = records
            .iter()
            .map(|r| 1 + r.payload().len() * BITS_PER_FRAME)
            .sum();

        Ok(Self {
            records,
            record: 0,
            cursor: Cursor::Preamble,
            sample_rate: config.sample_rate,
            space_frequency: config.space_frequency,
            mark_frequency: config.mark_frequency,
            samples_per_symbol: config.samples_per_symbol(),
            remaining,
        })
    }

    /// An already finished stream, used for sessions that must never sound.
    pub(crate) fn empty() -> Self {
        Self {
            records: Arc::from(Vec::<Record>::new()),
            record: 0,
            cursor: Cursor::Preamble,
            sample_rate: 0.0,
            space_frequency: 0.0,
            mark_frequency: 0.0,
            samples_per_symbol: 0,
            remaining: 0,
        }
    }

    pub fn records(&self) -> &Arc<[Record]> {
        &self.records
    }

    pub fn samples_per_symbol(&self) -> u64 {
        self.samples_per_symbol
    }

    fn tone(&self, level: bool) -> f64 {
        if level {
            self.mark_frequency
        } else {
            self.space_frequency
        }
    }
}

impl Iterator for SymbolSequence {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        loop {
            let record = self.records.get(self.record)?;

            match self.cursor {
                Cursor::Preamble => {
                    let duration_samples =
                        (self.sample_rate * record.preamble_seconds()).round() as u64;
                    self.cursor = Cursor::Frame { byte: 0, slot: 0 };
                    self.remaining -= 1;
                    return Some(Symbol {
                        frequency: self.mark_frequency,
                        duration_samples,
                        kind: SymbolKind::Preamble {
                            record: self.record,
                        },
                    });
                }
                Cursor::Frame { byte, slot } => {
                    let Some(&value) = record.payload().get(byte) else {
                        self.record += 1;
                        self.cursor = Cursor::Preamble;
                        continue;
                    };

                    let record = self.record;
                    let (level, kind) = match slot {
                        0 => (false, SymbolKind::Start { record, byte }),
                        9 => (true, SymbolKind::Stop { record, byte }),
                        n => {
                            let bit = n - 1;
                            ((value >> bit) & 1 == 1, SymbolKind::Data { record, byte, bit })
                        }
                    };

                    self.cursor = if usize::from(slot) + 1 == BITS_PER_FRAME {
                        Cursor::Frame {
                            byte: byte + 1,
                            slot: 0,
                        }
                    } else {
                        Cursor::Frame {
                            byte,
                            slot: slot + 1,
                        }
                    };
                    self.remaining -= 1;

                    return Some(Symbol {
                        frequency: self.tone(level),
                        duration_samples: self.samples_per_symbol,
                        kind,
                    });
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SymbolSequence {}

impl FusedIterator for SymbolSequence {}
