use std::sync::Arc;

use crate::{DATA_PREAMBLE_SECONDS, FAKE_HEADER, HEADER_PREAMBLE_SECONDS};

/// One block on tape: a leading mark tone followed by framed payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    preamble_seconds: f64,
    payload: Vec<u8>,
}

impl Record {
    /// Durations are checked when a session is configured, not here.
    pub fn new(preamble_seconds: f64, payload: Vec<u8>) -> Self {
        Self {
            preamble_seconds,
            payload,
        }
    }

    pub fn preamble_seconds(&self) -> f64 {
        self.preamble_seconds
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// The two-record program a CSAVE run writes: a header block, then the data.
///
/// The header is the fixed 16-byte block (ten 0xD3 bytes, six spaces) behind
/// a long leader, and the data block follows a shorter one.
pub fn csave_records(data: &[u8]) -> Arc<[Record]> {
    Arc::from(vec![
        Record::new(HEADER_PREAMBLE_SECONDS, FAKE_HEADER.to_vec()),
        Record::new(DATA_PREAMBLE_SECONDS, data.to_vec()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csave_records_layout() {
        let records = csave_records(b"HELLO");
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].preamble_seconds(), 4.0);
        assert_eq!(&records[0].payload()[..10], &[0xD3; 10]);
        assert_eq!(&records[0].payload()[10..], b"      ");

        assert_eq!(records[1].preamble_seconds(), 2.0);
        assert_eq!(records[1].payload(), b"HELLO");
    }

    #[test]
    fn test_csave_records_empty_data() {
        let records = csave_records(&[]);
        assert_eq!(records.len(), 2);
        assert!(records[1].payload().is_empty());
    }
}
