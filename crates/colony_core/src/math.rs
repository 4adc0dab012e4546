//! Fixed-point math utilities for deterministic scheduling.
//!
//! Ratios such as "one mobility module per three labor modules" or the
//! 1.5x melee weighting are fixed-point so that every client computes the
//! exact same body for the same world state.

use fixed::types::I32F32;

/// Fixed-point number type for all scheduler ratios.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers in hand-edited config.
///
/// Writes the value as a decimal (`melee_weight: 1.5`) and converts it
/// back once at load time, so scheduling itself never touches floats.
pub mod fixed_decimal {
    use super::Fixed;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

/// Build a ratio `num / den` without going through floats.
#[must_use]
pub fn ratio(num: i32, den: i32) -> Fixed {
    Fixed::from_num(num) / Fixed::from_num(den)
}

/// Slack added before flooring so repeating fractions like 1/3 land on
/// the whole number they approximate.
const FLOOR_SLACK: Fixed = Fixed::from_bits(1 << 16);

/// `floor(count * factor)`, clamped at zero.
#[must_use]
pub fn floor_mul(count: u32, factor: Fixed) -> u32 {
    let product = Fixed::from_num(count) * factor + FLOOR_SLACK;
    if product <= Fixed::ZERO {
        0
    } else {
        product.floor().to_num::<u32>()
    }
}

/// `ceil(count * factor)`, clamped at zero.
#[must_use]
pub fn ceil_mul(count: u32, factor: Fixed) -> u32 {
    let product = Fixed::from_num(count) * factor;
    if product <= Fixed::ZERO {
        0
    } else {
        product.ceil().to_num::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_mul_third() {
        let third = ratio(1, 3);
        assert_eq!(floor_mul(2, third), 0);
        assert_eq!(floor_mul(3, third), 1, "3 * 1/3 must not truncate to 0");
        assert_eq!(floor_mul(6, third), 2);
        assert_eq!(floor_mul(10, third), 3);
    }

    #[test]
    fn test_ceil_mul_three_and_a_half() {
        let factor = ratio(7, 2);
        assert_eq!(ceil_mul(0, factor), 0);
        assert_eq!(ceil_mul(1, factor), 4);
        assert_eq!(ceil_mul(2, factor), 7);
        assert_eq!(ceil_mul(3, factor), 11);
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Wrapper(#[serde(with = "fixed_decimal")] Fixed);

    #[test]
    fn test_fixed_decimal_round_trip() {
        let value = ratio(3, 2);
        let text = ron::to_string(&Wrapper(value)).unwrap();
        let back: Wrapper = ron::from_str(&text).unwrap();
        assert_eq!(back.0, value);
    }

    #[test]
    fn test_fixed_decimal_rejects_out_of_range() {
        assert!(ron::from_str::<Wrapper>("(1e20)").is_err());
        assert!(ron::from_str::<Wrapper>("(NaN)").is_err());
    }
}
