//! Partitioning records into shards and writing the blobs.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::codec::{encode, round3};
use crate::store::{Shard, ShardPaths};

use super::PostcodeRecord;
use super::error::DatasetError;

/// Largest distance (metres) rounding to three decimals may move a postcode.
pub const MAX_ROUNDING_ERROR_M: f64 = 100.0;

/// Earth radius used for the rounding check, in metres.
const EARTH_RADIUS_M: f64 = 6_372_800.0;

/// Great-circle distance between two points, in metres.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Encoded postcodes split by shard, ready to write.
#[derive(Debug, Default)]
pub struct ShardedDataset {
    one: BTreeMap<String, String>,
    two: BTreeMap<String, String>,
}

impl ShardedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records in source order; later records win.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a PostcodeRecord>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new();
        for record in records {
            dataset.insert(record)?;
        }
        Ok(dataset)
    }

    /// Encode a record into its shard, replacing any earlier entry.
    pub fn insert(&mut self, record: &PostcodeRecord) -> Result<(), DatasetError> {
        let error_m = haversine_m(record.lat, record.lng, round3(record.lat), round3(record.lng));
        if error_m.is_nan() || error_m >= MAX_ROUNDING_ERROR_M {
            return Err(DatasetError::PrecisionLoss {
                postcode: record.postcode.clone(),
                error_m,
            });
        }

        let map = match Shard::for_postcode(&record.postcode) {
            Shard::One => &mut self.one,
            Shard::Two => &mut self.two,
        };
        map.insert(
            record.postcode.as_str().to_string(),
            encode(record.lat, record.lng),
        );
        Ok(())
    }

    /// Number of postcodes destined for `shard`.
    pub fn len(&self, shard: Shard) -> usize {
        self.entries(shard).len()
    }

    pub fn is_empty(&self) -> bool {
        self.one.is_empty() && self.two.is_empty()
    }

    /// Encoded entries for `shard`, keyed by normalized postcode.
    pub fn entries(&self, shard: Shard) -> &BTreeMap<String, String> {
        match shard {
            Shard::One => &self.one,
            Shard::Two => &self.two,
        }
    }

    /// Write both blobs into `dir`, creating it if needed.
    pub fn write(&self, dir: &Path) -> Result<BuildSummary, DatasetError> {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| DatasetError::Write {
                path: dir.to_path_buf(),
                message: format!("failed to create directory: {}", e),
            })?;
        }

        let paths = ShardPaths::in_dir(dir);
        for shard in Shard::ALL {
            write_blob(paths.path(shard), self.entries(shard))?;
        }

        let summary = BuildSummary {
            counts: [self.len(Shard::One), self.len(Shard::Two)],
            paths,
        };
        info!(%summary, "wrote shard blobs");
        Ok(summary)
    }
}

fn write_blob(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), DatasetError> {
    let write_err = |message: String| DatasetError::Write {
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, entries).map_err(|e| write_err(e.to_string()))?;
    writer.flush().map_err(|e| write_err(e.to_string()))
}

/// What a build wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    counts: [usize; 2],
    paths: ShardPaths,
}

impl BuildSummary {
    /// Postcodes written to `shard`.
    pub fn count(&self, shard: Shard) -> usize {
        match shard {
            Shard::One => self.counts[0],
            Shard::Two => self.counts[1],
        }
    }

    pub fn paths(&self) -> &ShardPaths {
        &self.paths
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "saved {} and {} postcodes to {} and {} respectively",
            self.count(Shard::One),
            self.count(Shard::Two),
            self.paths.path(Shard::One).display(),
            self.paths.path(Shard::Two).display(),
        )
    }
}
