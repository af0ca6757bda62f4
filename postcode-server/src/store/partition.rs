//! Static partition of postcodes into shards.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::postcode::NormalizedPostcode;

/// First characters that place a postcode in [`Shard::One`].
///
/// Shared by the dataset build and lookup; changing it invalidates every
/// blob built with the old set.
pub const PRIMARY_PREFIXES: [char; 12] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l',
];

/// One of the two disjoint partitions of the postcode dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shard {
    /// Postcodes starting with one of [`PRIMARY_PREFIXES`].
    One,
    /// Everything else, including the empty postcode.
    Two,
}

impl Shard {
    /// Both shards, in storage order.
    pub const ALL: [Shard; 2] = [Shard::One, Shard::Two];

    /// The shard a normalized postcode belongs to.
    pub fn for_postcode(postcode: &NormalizedPostcode) -> Shard {
        match postcode.first_char() {
            Some(c) if PRIMARY_PREFIXES.contains(&c) => Shard::One,
            _ => Shard::Two,
        }
    }

    /// 1-based shard number, as used in file names and logs.
    pub fn number(self) -> u8 {
        match self {
            Shard::One => 1,
            Shard::Two => 2,
        }
    }

    /// Inverse of [`Shard::number`].
    pub fn from_number(number: u8) -> Option<Shard> {
        match number {
            1 => Some(Shard::One),
            2 => Some(Shard::Two),
            _ => None,
        }
    }

    /// File name of this shard's blob inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Shard::One => "postcodes_1.json",
            Shard::Two => "postcodes_2.json",
        }
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard {}", self.number())
    }
}

/// Storage locations of the two shard blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPaths {
    one: PathBuf,
    two: PathBuf,
}

impl ShardPaths {
    /// Paths for explicitly placed blobs.
    pub fn new(one: impl Into<PathBuf>, two: impl Into<PathBuf>) -> Self {
        Self {
            one: one.into(),
            two: two.into(),
        }
    }

    /// The standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(Shard::One.file_name()),
            dir.join(Shard::Two.file_name()),
        )
    }

    /// Path of the given shard's blob.
    pub fn path(&self, shard: Shard) -> &Path {
        match shard {
            Shard::One => &self.one,
            Shard::Two => &self.two,
        }
    }
}
