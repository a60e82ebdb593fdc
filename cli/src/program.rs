use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use csave_core::{csave_records, Record, SessionConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid program file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Record {0}: set either \"text\" or \"base64\", not both")]
    AmbiguousPayload(usize),

    #[error("Record {index}: bad base64 payload: {source}")]
    Base64 {
        index: usize,
        source: base64::DecodeError,
    },
}

/// Session settings and records loaded from a JSON program file
///
/// ```json
/// {
///   "symbol_rate": 2400,
///   "records": [
///     { "preamble": 4.0, "base64": "09PT09PT09PT0yAgICAgIA==" },
///     { "preamble": 2.0, "text": "10 PRINT \"HELLO\"" }
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramFile {
    pub sample_rate: Option<f64>,
    pub symbol_rate: Option<f64>,
    pub space_frequency: Option<f64>,
    pub mark_frequency: Option<f64>,
    pub amplitude: Option<f32>,
    pub block_size: Option<usize>,
    pub records: Vec<RecordEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEntry {
    /// Leader length in seconds
    pub preamble: f64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub base64: Option<String>,
}

/// Values given on the command line; they win over the program file
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub sample_rate: Option<f64>,
    pub symbol_rate: Option<f64>,
    pub block_size: Option<usize>,
}

impl ProgramFile {
    pub fn load(path: &Path) -> Result<Self, ProgramError> {
        let text = fs::read_to_string(path).map_err(|source| ProgramError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn config(&self, overrides: Overrides) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            sample_rate: overrides
                .sample_rate
                .or(self.sample_rate)
                .unwrap_or(defaults.sample_rate),
            symbol_rate: overrides
                .symbol_rate
                .or(self.symbol_rate)
                .unwrap_or(defaults.symbol_rate),
            space_frequency: self.space_frequency.unwrap_or(defaults.space_frequency),
            mark_frequency: self.mark_frequency.unwrap_or(defaults.mark_frequency),
            amplitude: self.amplitude.unwrap_or(defaults.amplitude),
            block_size: overrides
                .block_size
                .or(self.block_size)
                .unwrap_or(defaults.block_size),
        }
    }

    pub fn records(&self) -> Result<Arc<[Record]>, ProgramError> {
        let mut records = Vec::with_capacity(self.records.len());
        for (index, entry) in self.records.iter().enumerate() {
            let payload = match (&entry.text, &entry.base64) {
                (Some(_), Some(_)) => return Err(ProgramError::AmbiguousPayload(index)),
                (Some(text), None) => text.as_bytes().to_vec(),
                (None, Some(encoded)) => STANDARD
                    .decode(encoded.trim())
                    .map_err(|source| ProgramError::Base64 { index, source })?,
                (None, None) => Vec::new(),
            };
            records.push(Record::new(entry.preamble, payload));
        }
        Ok(records.into())
    }
}

/// Session settings and records for a plain data file: the CSAVE program
/// layout with command-line rates.
pub fn program_for_data(data: &[u8], overrides: Overrides) -> (SessionConfig, Arc<[Record]>) {
    let defaults = SessionConfig::default();
    let config = SessionConfig {
        sample_rate: overrides.sample_rate.unwrap_or(defaults.sample_rate),
        symbol_rate: overrides.symbol_rate.unwrap_or(defaults.symbol_rate),
        block_size: overrides.block_size.unwrap_or(defaults.block_size),
        ..defaults
    };
    (config, csave_records(data))
}
