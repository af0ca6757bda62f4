//! Two-shard postcode store.
//!
//! The postcode dataset is split into two blobs by the first letter of the
//! normalized postcode. Only one blob is held in memory at a time; a lookup
//! that needs the other shard discards the resident one and loads its own.

mod error;
mod partition;
mod shard_store;

pub use error::StoreError;
pub use partition::{PRIMARY_PREFIXES, Shard, ShardPaths};
pub use shard_store::{ShardSession, ShardStore};
