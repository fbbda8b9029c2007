use crate::error::{Result, WireError};

/// Resolution that maps the full `i32` range onto +/-180 degrees.
pub const SEMI_TO_DEGREES: f64 = 180.0 / 2_147_483_648.0;

/// Relative tolerance used to snap a quotient onto its nearest lattice point.
const LATTICE_SNAP_ULPS: f64 = 8.0 * f64::EPSILON;

/// A floating-point quantity carried on the wire as a scaled 32-bit integer.
///
/// The wire value is `raw = trunc(value / resolution)` reinterpreted as a
/// `u32` two's-complement pattern; decoding multiplies the signed raw value
/// back by the resolution. The stored value is always clamped to
/// `[i32::MIN * resolution, i32::MAX * resolution]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointValue {
    resolution: f64,
    value: f64,
}

impl FixedPointValue {
    /// Create a zero value with the given resolution.
    pub fn new(resolution: f64) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(WireError::InvalidResolution(resolution));
        }
        Ok(Self {
            resolution,
            value: 0.0,
        })
    }

    /// Create a value from a raw wire pattern.
    pub fn from_raw(resolution: f64, raw: u32) -> Result<Self> {
        let mut value = Self::new(resolution)?;
        value.decode(raw);
        Ok(value)
    }

    /// Store `input`, saturating at the representable limits.
    ///
    /// NaN is stored as zero.
    pub fn set_value(&mut self, input: f64) {
        self.value = if input.is_nan() {
            0.0
        } else {
            input.clamp(self.min_value(), self.max_value())
        };
    }

    /// The stored engineering value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Largest representable value for this resolution.
    pub fn max_value(&self) -> f64 {
        f64::from(i32::MAX) * self.resolution
    }

    /// Smallest representable value for this resolution.
    pub fn min_value(&self) -> f64 {
        f64::from(i32::MIN) * self.resolution
    }

    /// Quantize to the wire pattern, truncating toward zero.
    ///
    /// Quotients within floating-point noise of a lattice point land on that
    /// point, so `encode(decode(raw)) == raw` holds for every raw value.
    pub fn encode(&self) -> u32 {
        let quotient = self.value / self.resolution;
        let nearest = quotient.round();
        let tolerance = LATTICE_SNAP_ULPS * nearest.abs().max(1.0);
        let lattice = if (quotient - nearest).abs() <= tolerance {
            nearest
        } else {
            quotient.trunc()
        };
        // `as` saturates at the i32 bounds.
        (lattice as i32) as u32
    }

    /// Replace the stored value with the one a raw wire pattern denotes.
    pub fn decode(&mut self, raw: u32) {
        self.value = f64::from(raw as i32) * self.resolution;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLUTIONS: [f64; 6] = [0.01, 0.1, 1.0, 3.0, 1.0e-7, SEMI_TO_DEGREES];

    fn sample_raws() -> Vec<i32> {
        let mut raws = vec![
            i32::MIN,
            i32::MIN + 1,
            -1_000_000_007,
            -12345,
            -29,
            -1,
            0,
            1,
            29,
            12345,
            987_654_321,
            i32::MAX - 1,
            i32::MAX,
        ];
        let mut x: u32 = 0x9E37_79B9;
        for _ in 0..512 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            raws.push(x as i32);
        }
        raws
    }

    #[test]
    fn rejects_non_positive_resolution() {
        assert!(matches!(
            FixedPointValue::new(0.0),
            Err(WireError::InvalidResolution(_))
        ));
        assert!(FixedPointValue::new(-0.5).is_err());
        assert!(FixedPointValue::new(f64::NAN).is_err());
        assert!(FixedPointValue::new(f64::INFINITY).is_err());
    }

    #[test]
    fn lattice_round_trip_is_exact() {
        for resolution in RESOLUTIONS {
            for raw in sample_raws() {
                let value = FixedPointValue::from_raw(resolution, raw as u32).unwrap();
                assert_eq!(
                    value.encode(),
                    raw as u32,
                    "resolution {resolution}, raw {raw}"
                );
            }
        }
    }

    #[test]
    fn quantization_error_below_resolution() {
        let mut value = FixedPointValue::new(0.01).unwrap();
        for input in [123.45, -123.456, 0.004, -0.009, 99_999.999, 1.0e-9] {
            value.set_value(input);
            let decoded = FixedPointValue::from_raw(0.01, value.encode()).unwrap();
            assert!(
                (decoded.value() - input).abs() < 0.01,
                "input {input} decoded {}",
                decoded.value()
            );
        }
    }

    #[test]
    fn encode_truncates_toward_zero() {
        let mut value = FixedPointValue::new(1.0).unwrap();
        value.set_value(2.7);
        assert_eq!(value.encode(), 2);
        value.set_value(-2.7);
        assert_eq!(value.encode() as i32, -2);
    }

    #[test]
    fn altitude_example_encodes_to_expected_raw() {
        let mut value = FixedPointValue::new(0.01).unwrap();
        value.set_value(123.45);
        assert_eq!(value.encode(), 12345);
    }

    #[test]
    fn set_value_saturates_at_limits() {
        let mut value = FixedPointValue::new(0.01).unwrap();

        value.set_value(1.0e12);
        assert_eq!(value.value(), value.max_value());
        assert_eq!(value.encode(), i32::MAX as u32);

        value.set_value(-1.0e12);
        assert_eq!(value.value(), value.min_value());
        assert_eq!(value.encode(), i32::MIN as u32);

        value.set_value(f64::INFINITY);
        assert_eq!(value.value(), value.max_value());
    }

    #[test]
    fn nan_is_stored_as_zero() {
        let mut value = FixedPointValue::new(0.25).unwrap();
        value.set_value(f64::NAN);
        assert_eq!(value.value(), 0.0);
        assert_eq!(value.encode(), 0);
    }

    #[test]
    fn decode_treats_raw_as_signed() {
        let value = FixedPointValue::from_raw(0.5, 0xFFFF_FFFE).unwrap();
        assert_eq!(value.value(), -1.0);
    }

    #[test]
    fn semicircle_resolution_spans_half_turn() {
        let value = FixedPointValue::new(SEMI_TO_DEGREES).unwrap();
        assert_eq!(value.min_value(), -180.0);
        assert!(value.max_value() < 180.0);
    }
}
