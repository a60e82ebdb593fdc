use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CsaveError {
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    #[error("Invalid symbol rate: {0} baud")]
    InvalidSymbolRate(f64),

    #[error("Invalid preamble duration in record {record}: {seconds} s")]
    InvalidPreamble { record: usize, seconds: f64 },

    #[error("Invalid tone frequency: {0} Hz")]
    InvalidFrequency(f64),

    #[error("Invalid amplitude: {0}")]
    InvalidAmplitude(f32),

    #[error("Invalid block size")]
    InvalidBlockSize,

    #[error("Symbol rate {symbol_rate} baud is too fast for {sample_rate} Hz (less than one sample per symbol)")]
    SymbolTooShort { sample_rate: f64, symbol_rate: f64 },
}

impl CsaveError {
    /// Whether the error was raised while validating a session configuration.
    ///
    /// Every variant is a configuration error today; synthesis itself cannot fail.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CsaveError::InvalidSampleRate(_)
                | CsaveError::InvalidSymbolRate(_)
                | CsaveError::InvalidPreamble { .. }
                | CsaveError::InvalidFrequency(_)
                | CsaveError::InvalidAmplitude(_)
                | CsaveError::InvalidBlockSize
                | CsaveError::SymbolTooShort { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CsaveError>;
