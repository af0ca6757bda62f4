//! Shard store error types.

use std::path::PathBuf;

/// Errors that can occur while loading a shard.
///
/// All of these indicate a broken deployment rather than a bad postcode, and
/// are never reported as a per-postcode "no result".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Shard blob missing at startup
    #[error("shard file {} does not exist", path.display())]
    MissingShard { path: PathBuf },

    /// Shard blob could not be read
    #[error("failed to read shard file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Shard blob is not a postcode to coordinate map
    #[error("corrupt shard file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::MissingShard {
            path: PathBuf::from("data/postcodes_1.json"),
        };
        assert_eq!(
            err.to_string(),
            "shard file data/postcodes_1.json does not exist"
        );

        let err = StoreError::Io {
            path: PathBuf::from("data/postcodes_2.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            err.to_string(),
            "failed to read shard file data/postcodes_2.json: gone"
        );

        let source = serde_json::from_str::<u8>("[").unwrap_err();
        let err = StoreError::Corrupt {
            path: PathBuf::from("x.json"),
            source,
        };
        assert!(err.to_string().starts_with("corrupt shard file x.json: "));
    }
}
