use std::fmt;

use crate::error::ValidationError;

/// An 8-bit value in the closed range [0, 255].
///
/// Every candidate register or memory value is computed as a plain integer
/// and then passed through `Byte::new`, which is the single place the 8-bit
/// domain is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Byte(u8);

impl Byte {
    pub const ZERO: Byte = Byte(0);

    /// Saturation ceiling used by `Add`. Narrower than the storable range.
    pub const MAX_VALUE: u8 = 127;

    pub fn new(n: i64) -> Result<Byte, ValidationError> {
        u8::try_from(n)
            .map(Byte)
            .map_err(|_| ValidationError::OutOfRange(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u8> for Byte {
    fn from(value: u8) -> Byte {
        Byte(value)
    }
}

impl From<Byte> for u8 {
    fn from(value: Byte) -> u8 {
        value.0
    }
}

impl TryFrom<i64> for Byte {
    type Error = ValidationError;

    fn try_from(n: i64) -> Result<Byte, ValidationError> {
        Byte::new(n)
    }
}

impl TryFrom<f64> for Byte {
    type Error = ValidationError;

    fn try_from(n: f64) -> Result<Byte, ValidationError> {
        if n.fract() != 0.0 || !n.is_finite() {
            return Err(ValidationError::NotIntegral(n));
        }
        if !(0.0..=255.0).contains(&n) {
            return Err(ValidationError::OutOfRange(n as i64));
        }
        Ok(Byte(n as u8))
    }
}

impl fmt::Display for Byte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(Byte::new(0).unwrap().get(), 0);
        assert_eq!(Byte::new(255).unwrap().get(), 255);
        assert_eq!(Byte::new(256), Err(ValidationError::OutOfRange(256)));
        assert_eq!(Byte::new(-1), Err(ValidationError::OutOfRange(-1)));
    }

    #[test]
    fn test_non_integral_rejected() {
        assert_eq!(Byte::try_from(1.5), Err(ValidationError::NotIntegral(1.5)));
        assert!(Byte::try_from(f64::NAN).is_err());
        assert_eq!(Byte::try_from(42.0).unwrap().get(), 42);
        assert_eq!(Byte::try_from(300.0), Err(ValidationError::OutOfRange(300)));
    }

    #[test]
    fn test_max_value_below_storable_range() {
        assert!(Byte::MAX_VALUE < u8::MAX);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn valid_values_round_trip(n in 0i64..=255) {
            prop_assert_eq!(Byte::new(n).unwrap().get() as i64, n);
        }

        #[test]
        fn out_of_range_values_rejected(n in prop_oneof![i64::MIN..0i64, 256i64..i64::MAX]) {
            prop_assert!(Byte::new(n).is_err());
        }

        #[test]
        fn fractional_values_rejected(n in 0u8..255, frac in 0.01f64..0.99) {
            prop_assert!(Byte::try_from(n as f64 + frac).is_err());
        }
    }
}
