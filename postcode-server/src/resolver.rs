//! Batch postcode resolution.
//!
//! Takes raw postcodes as the client sent them and splits them into
//! coordinates found and postcodes with no result. The batch is ordered so
//! that every postcode of one shard is looked up before any of the other,
//! which bounds a batch to at most two shard loads whatever the input order.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::codec::{self, CodecError};
use crate::postcode::NormalizedPostcode;
use crate::store::{Shard, ShardStore, StoreError};

/// Errors that abort a whole batch.
///
/// Unknown postcodes are not errors; they end up in [`Lookup::errors`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A shard could not be loaded
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored coordinate is corrupt
    #[error("stored coordinate for {postcode} is corrupt: {source}")]
    MalformedCoordinate {
        postcode: NormalizedPostcode,
        #[source]
        source: CodecError,
    },
}

/// Outcome of resolving a batch, keyed by the raw postcodes.
///
/// Every distinct raw postcode of the batch is a key of exactly one of the two
/// maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lookup {
    /// Raw postcode → `[lat, lng]`
    pub results: BTreeMap<String, [f64; 2]>,

    /// Raw postcode → human-readable reason
    pub errors: BTreeMap<String, String>,
}

impl Lookup {
    fn found(&mut self, raw: &str, coord: [f64; 2]) {
        self.errors.remove(raw);
        self.results.insert(raw.to_string(), coord);
    }

    fn not_found(&mut self, raw: &str) {
        self.results.remove(raw);
        self.errors.insert(raw.to_string(), no_result_message(raw));
    }
}

/// The message recorded for a postcode that has no coordinates.
pub fn no_result_message(raw: &str) -> String {
    format!("No result for '{raw}'")
}

/// Resolve a batch of raw postcodes against the store.
///
/// Holds the store lock for the whole batch.
pub fn resolve<S: AsRef<str>>(store: &ShardStore, postcodes: &[S]) -> Result<Lookup, ResolveError> {
    let mut session = store.session();

    // Start with whichever shard is already resident, so a batch that only
    // touches it needs no load at all.
    let first = session.resident().unwrap_or(Shard::One);

    let mut batch: Vec<(NormalizedPostcode, &str)> = postcodes
        .iter()
        .map(|raw| (NormalizedPostcode::new(raw.as_ref()), raw.as_ref()))
        .collect();
    batch.sort_by(|(a, _), (b, _)| {
        let rank = |pc: &NormalizedPostcode| Shard::for_postcode(pc) != first;
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });

    let mut lookup = Lookup::default();
    for (normalized, raw) in &batch {
        if normalized.is_empty() {
            lookup.not_found(raw);
            continue;
        }

        match session.lookup(normalized)? {
            Some(encoded) => {
                let coord = codec::decode(encoded).map_err(|source| {
                    ResolveError::MalformedCoordinate {
                        postcode: normalized.clone(),
                        source,
                    }
                })?;
                lookup.found(raw, coord.to_pair());
            }
            None => lookup.not_found(raw),
        }
    }

    debug!(
        requested = postcodes.len(),
        found = lookup.results.len(),
        missing = lookup.errors.len(),
        "resolved postcode batch"
    );
    Ok(lookup)
}
