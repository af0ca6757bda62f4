//! Postcode normalization.

use std::fmt;

/// A postcode in its canonical lookup form.
///
/// The normalized form is the raw input lower-cased with every space
/// character removed. It is the key used by the shard blobs, so two raw
/// postcodes that normalize to the same value always resolve identically.
///
/// Normalization never fails: any string (including the empty string) has a
/// normalized form. Whether it names a real postcode is decided by lookup.
///
/// # Examples
///
/// ```
/// use postcode_server::postcode::NormalizedPostcode;
///
/// let pc = NormalizedPostcode::new("SW8 1HL");
/// assert_eq!(pc.as_str(), "sw81hl");
///
/// // Case and spacing don't matter
/// assert_eq!(pc, NormalizedPostcode::new("sw81hl"));
/// assert_eq!(pc, NormalizedPostcode::new(" S W 8 1 H L "));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPostcode(String);

impl NormalizedPostcode {
    /// Normalize a raw, user-supplied postcode.
    pub fn new(raw: &str) -> Self {
        let normalized = raw.to_lowercase().replace(' ', "");
        Self(normalized)
    }

    /// Returns the normalized postcode as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first character of the normalized form, if any.
    pub fn first_char(&self) -> Option<char> {
        self.0.chars().next()
    }

    /// True for the degenerate postcode that normalized to nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for NormalizedPostcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NormalizedPostcode({})", self.0)
    }
}

impl fmt::Display for NormalizedPostcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
