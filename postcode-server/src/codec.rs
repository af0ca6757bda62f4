//! Compact textual encoding of coordinates.
//!
//! Coordinates are stored as `"<lat> <lng>"` with three decimal places, after
//! shifting latitude down by 49.5 and longitude up by 8.5. For UK postcodes the
//! shift brings both values close to zero, which keeps the stored strings short.

/// Offset subtracted from latitude before storage.
pub const LAT_SHIFT: f64 = 49.5;

/// Offset added to longitude before storage.
pub const LNG_SHIFT: f64 = 8.5;

/// Number of decimal places kept for each coordinate.
pub const PRECISION: i32 = 3;

/// A decoded latitude/longitude pair, rounded to three decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The coordinate as `[lat, lng]`, the shape returned to clients.
    pub fn to_pair(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

/// Error returned when a stored coordinate string cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The value is not two space-separated decimal numbers
    #[error("malformed coordinate {value:?}")]
    MalformedCoordinate { value: String },
}

/// Round to the stored precision.
pub fn round3(value: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    (value * scale).round() / scale
}

/// Encode a coordinate for storage.
///
/// # Examples
///
/// ```
/// use postcode_server::codec::encode;
///
/// assert_eq!(encode(51.475, -0.121), "1.975 8.379");
/// ```
pub fn encode(lat: f64, lng: f64) -> String {
    format!("{:.3} {:.3}", lat - LAT_SHIFT, lng + LNG_SHIFT)
}

/// Decode a stored coordinate string.
///
/// Splits on the first space; both halves must parse as floats.
pub fn decode(value: &str) -> Result<Coordinate, CodecError> {
    let malformed = || CodecError::MalformedCoordinate {
        value: value.to_string(),
    };

    let (lat, lng) = value.split_once(' ').ok_or_else(malformed)?;
    let lat: f64 = lat.parse().map_err(|_| malformed())?;
    let lng: f64 = lng.parse().map_err(|_| malformed())?;

    if !lat.is_finite() || !lng.is_finite() {
        return Err(malformed());
    }

    Ok(Coordinate::new(
        round3(lat + LAT_SHIFT),
        round3(lng - LNG_SHIFT),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_shifts_and_truncates() {
        assert_eq!(encode(51.475, -0.121), "1.975 8.379");
        assert_eq!(encode(49.5, -8.5), "0.000 0.000");
        assert_eq!(encode(57.14912, -2.09781), "7.649 6.402");
    }

    #[test]
    fn decode_reverses_shift() {
        let coord = decode("1.975 8.379").unwrap();
        assert_eq!(coord, Coordinate::new(51.475, -0.121));
        assert_eq!(coord.to_pair(), [51.475, -0.121]);
    }

    #[test]
    fn decode_rounds_to_three_places() {
        // 1.9751 + 49.5 is not exactly representable; rounding hides that
        let coord = decode("1.9751 8.3789").unwrap();
        assert_eq!(coord, Coordinate::new(51.475, -0.121));
    }

    #[test]
    fn decode_rejects_missing_separator() {
        let err = decode("1.975").unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedCoordinate {
                value: "1.975".into()
            }
        );
    }

    #[test]
    fn decode_rejects_extra_tokens() {
        assert!(decode("1.975 8.379 0.0").is_err());
    }

    #[test]
    fn decode_rejects_non_numeric() {
        assert!(decode("north west").is_err());
        assert!(decode("1.975 ").is_err());
        assert!(decode(" 8.379").is_err());
        assert!(decode("").is_err());
        assert!(decode("NaN 1.0").is_err());
    }

    #[test]
    fn error_display() {
        let err = decode("garbage").unwrap_err();
        assert_eq!(err.to_string(), "malformed coordinate \"garbage\"");
    }

    #[test]
    fn round3_behaviour() {
        assert_eq!(round3(51.4749999), 51.475);
        assert_eq!(round3(-0.1214), -0.121);
        assert_eq!(round3(0.0), 0.0);
    }
}
