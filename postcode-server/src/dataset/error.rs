//! Dataset build error types.

use std::path::PathBuf;

use crate::postcode::NormalizedPostcode;

/// Errors that can occur while building the shard blobs.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Source file could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source CSV is malformed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row is missing a column or has a non-numeric coordinate
    #[error("bad row at line {line}: {message}")]
    BadRow { line: u64, message: String },

    /// Rounding to three decimals would move the postcode too far
    #[error("rounding {postcode} moves it {error_m:.1}m")]
    PrecisionLoss {
        postcode: NormalizedPostcode,
        error_m: f64,
    },

    /// Shard blob could not be written
    #[error("failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DatasetError::BadRow {
            line: 7,
            message: "missing latitude".into(),
        };
        assert_eq!(err.to_string(), "bad row at line 7: missing latitude");

        let err = DatasetError::PrecisionLoss {
            postcode: NormalizedPostcode::new("SW8 1HL"),
            error_m: 123.46,
        };
        assert_eq!(err.to_string(), "rounding sw81hl moves it 123.5m");

        let err = DatasetError::Write {
            path: PathBuf::from("data/postcodes_1.json"),
            message: "disk full".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write data/postcodes_1.json: disk full"
        );
    }
}
