use crate::error::{CsaveError, Result};
use crate::record::Record;
use crate::{
    AMPLITUDE, BITS_PER_FRAME, DEFAULT_SAMPLE_RATE, DEFAULT_SYMBOL_RATE, MARK_FREQUENCY,
    RENDER_QUANTUM, SPACE_FREQUENCY,
};

/// Parameters fixed for the lifetime of one synthesis session.
///
/// Changing any of them means configuring a new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Output sample rate in Hz, dictated by the host audio environment
    pub sample_rate: f64,
    /// Bit periods per second (baud)
    pub symbol_rate: f64,
    /// Tone for logical 0 and start bits (f0)
    pub space_frequency: f64,
    /// Tone for logical 1, stop bits and preambles (f1)
    pub mark_frequency: f64,
    /// Peak level applied to every sample
    pub amplitude: f32,
    /// Samples per render block when the caller does not supply buffers
    pub block_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            symbol_rate: DEFAULT_SYMBOL_RATE,
            space_frequency: SPACE_FREQUENCY,
            mark_frequency: MARK_FREQUENCY,
            amplitude: AMPLITUDE,
            block_size: RENDER_QUANTUM,
        }
    }
}

impl SessionConfig {
    pub fn new(sample_rate: f64, symbol_rate: f64) -> Self {
        Self {
            sample_rate,
            symbol_rate,
            ..Self::default()
        }
    }

    pub fn with_frequencies(mut self, space: f64, mark: f64) -> Self {
        self.space_frequency = space;
        self.mark_frequency = mark;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Check the rate, tone, and level parameters.
    ///
    /// Record-level checks (preamble durations) happen in [`SessionConfig::validate_records`].
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(CsaveError::InvalidSampleRate(self.sample_rate));
        }
        if !self.symbol_rate.is_finite() || self.symbol_rate <= 0.0 {
            return Err(CsaveError::InvalidSymbolRate(self.symbol_rate));
        }
        if self.samples_per_symbol() == 0 {
            return Err(CsaveError::SymbolTooShort {
                sample_rate: self.sample_rate,
                symbol_rate: self.symbol_rate,
            });
        }
        for freq in [self.space_frequency, self.mark_frequency] {
            if !freq.is_finite() || freq < 0.0 {
                return Err(CsaveError::InvalidFrequency(freq));
            }
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(CsaveError::InvalidAmplitude(self.amplitude));
        }
        if self.block_size == 0 {
            return Err(CsaveError::InvalidBlockSize);
        }
        Ok(())
    }

    pub fn validate_records(&self, records: &[Record]) -> Result<()> {
        self.validate()?;
        for (index, record) in records.iter().enumerate() {
            let seconds = record.preamble_seconds();
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(CsaveError::InvalidPreamble {
                    record: index,
                    seconds,
                });
            }
        }
        Ok(())
    }

    /// Samples per start, data, or stop bit: round(sample_rate / symbol_rate)
    pub fn samples_per_symbol(&self) -> u64 {
        (self.sample_rate / self.symbol_rate).round() as u64
    }

    /// Samples in a preamble of the given length: round(sample_rate * seconds)
    pub fn preamble_samples(&self, seconds: f64) -> u64 {
        (self.sample_rate * seconds).round() as u64
    }

    /// Samples one byte occupies on tape (start + 8 data + stop)
    pub fn samples_per_byte(&self) -> u64 {
        (BITS_PER_FRAME as u64).saturating_mul(self.samples_per_symbol())
    }

    /// Samples a single record renders to, saturating at `u64::MAX`
    pub fn record_samples(&self, record: &Record) -> u64 {
        let payload = (record.payload().len() as u64).saturating_mul(self.samples_per_byte());
        self.preamble_samples(record.preamble_seconds())
            .saturating_add(payload)
    }

    /// Exact stream length in samples, computed without rendering.
    ///
    /// Saturates at `u64::MAX` for leaders too long to count.
    pub fn total_samples(&self, records: &[Record]) -> u64 {
        records
            .iter()
            .fold(0u64, |total, r| total.saturating_add(self.record_samples(r)))
    }

    /// Stream duration in seconds
    pub fn duration_seconds(&self, records: &[Record]) -> f64 {
        self.total_samples(records) as f64 / self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples_per_symbol(), 40);
        assert_eq!(config.samples_per_byte(), 400);
    }

    #[test]
    fn test_samples_per_symbol_rounds() {
        // 44100 / 1200 = 36.75
        let config = SessionConfig::new(44100.0, 1200.0);
        assert_eq!(config.samples_per_symbol(), 37);

        // 44100 / 2400 = 18.375
        let config = SessionConfig::new(44100.0, 2400.0);
        assert_eq!(config.samples_per_symbol(), 18);
    }

    #[test]
    fn test_preamble_samples() {
        let config = SessionConfig::new(48000.0, 1200.0);
        assert_eq!(config.preamble_samples(4.0), 192_000);
        assert_eq!(config.preamble_samples(0.0), 0);

        let config = SessionConfig::new(44100.0, 1200.0);
        assert_eq!(config.preamble_samples(0.00001), 0);
        assert_eq!(config.preamble_samples(0.5), 22_050);
    }

    #[test]
    fn test_rejects_bad_rates() {
        assert_eq!(
            SessionConfig::new(0.0, 1200.0).validate(),
            Err(CsaveError::InvalidSampleRate(0.0))
        );
        assert!(SessionConfig::new(-48000.0, 1200.0).validate().is_err());
        assert!(SessionConfig::new(f64::NAN, 1200.0).validate().is_err());
        assert_eq!(
            SessionConfig::new(48000.0, 0.0).validate(),
            Err(CsaveError::InvalidSymbolRate(0.0))
        );
        assert!(SessionConfig::new(48000.0, -1200.0).validate().is_err());
        assert!(SessionConfig::new(48000.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_rejects_symbol_shorter_than_a_sample() {
        let result = SessionConfig::new(8000.0, 20000.0).validate();
        assert!(matches!(result, Err(CsaveError::SymbolTooShort { .. })));
    }

    #[test]
    fn test_rejects_bad_tone_and_level() {
        let config = SessionConfig::default().with_frequencies(f64::NAN, 2400.0);
        assert!(matches!(config.validate(), Err(CsaveError::InvalidFrequency(_))));

        let config = SessionConfig::default().with_amplitude(-0.5);
        assert_eq!(config.validate(), Err(CsaveError::InvalidAmplitude(-0.5)));

        let config = SessionConfig::default().with_block_size(0);
        assert_eq!(config.validate(), Err(CsaveError::InvalidBlockSize));
    }

    #[test]
    fn test_rejects_bad_preamble() {
        let config = SessionConfig::default();
        let records = vec![
            Record::new(1.0, vec![1, 2, 3]),
            Record::new(-0.5, vec![]),
        ];
        assert_eq!(
            config.validate_records(&records),
            Err(CsaveError::InvalidPreamble {
                record: 1,
                seconds: -0.5
            })
        );

        let records = vec![Record::new(f64::INFINITY, vec![])];
        assert!(config.validate_records(&records).is_err());
    }

    #[test]
    fn test_total_samples() {
        let config = SessionConfig::new(48000.0, 1200.0);
        let records = vec![
            Record::new(4.0, vec![0xD3; 16]),
            Record::new(2.0, b"10 PRINT".to_vec()),
        ];
        let expected = 192_000 + 16 * 400 + 96_000 + 8 * 400;
        assert_eq!(config.total_samples(&records), expected);
        assert_eq!(config.total_samples(&[]), 0);
    }

    #[test]
    fn test_total_samples_saturates_on_huge_preamble() {
        let config = SessionConfig::default();
        let record = Record::new(1e300, vec![0x41]);
        assert!(config.validate_records(std::slice::from_ref(&record)).is_ok());
        assert_eq!(config.record_samples(&record), u64::MAX);

        let records = vec![record, Record::new(1e300, vec![])];
        assert_eq!(config.total_samples(&records), u64::MAX);
        assert!(config.duration_seconds(&records).is_finite());
    }
}
