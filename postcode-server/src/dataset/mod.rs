//! Building the shard blobs from raw postcode sources.
//!
//! Two public CSV datasets are merged, normalized, checked for precision loss
//! and split into the two shard blobs read by [`crate::store::ShardStore`].

mod error;
mod sources;
mod writer;

pub use error::DatasetError;
pub use sources::{read_doogal, read_freemaptools};
pub use writer::{BuildSummary, MAX_ROUNDING_ERROR_M, ShardedDataset, haversine_m};

use crate::postcode::NormalizedPostcode;

/// A postcode and its full-precision coordinates, as read from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeRecord {
    pub postcode: NormalizedPostcode,
    pub lat: f64,
    pub lng: f64,
}

impl PostcodeRecord {
    pub fn new(postcode: &str, lat: f64, lng: f64) -> Self {
        Self {
            postcode: NormalizedPostcode::new(postcode),
            lat,
            lng,
        }
    }
}
