//! Cassette-style FSK tone synthesis
//!
//! Turns byte records into the two-tone *CSAVE* sound: a mark-tone leader per
//! record, then every byte framed as start bit, eight data bits (LSB first)
//! and stop bit. Audio is produced in small blocks by a continuous-phase
//! oscillator, so a real-time host can pull it one render quantum at a time.

pub mod error;
pub mod config;
pub mod record;
pub mod encoder;
pub mod modulator;
pub mod session;
pub mod capture;

pub use capture::{capture, capture_blocks};
pub use config::SessionConfig;
pub use encoder::{Symbol, SymbolKind, SymbolSequence};
pub use error::{CsaveError, Result};
pub use modulator::Modulator;
pub use record::{csave_records, Record};
pub use session::{AudioProcessor, Session, SessionState};

// Host render contract
pub const RENDER_QUANTUM: usize = 128;
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

// Tape format
pub const DEFAULT_SYMBOL_RATE: f64 = 1200.0; // baud
pub const SPACE_FREQUENCY: f64 = 1200.0; // Hz, logical 0
pub const MARK_FREQUENCY: f64 = 2400.0; // Hz, logical 1
pub const AMPLITUDE: f32 = 0.125;
pub const BITS_PER_FRAME: usize = 10; // start + 8 data + stop

// Program layout written by a CSAVE run
pub const HEADER_PREAMBLE_SECONDS: f64 = 4.0;
pub const DATA_PREAMBLE_SECONDS: f64 = 2.0;
pub const FAKE_HEADER: [u8; 16] = [
    0xD3, 0xD3, 0xD3, 0xD3, 0xD3, 0xD3, 0xD3, 0xD3, 0xD3, 0xD3, // file type marker
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, // blank file name
];
