//! Native value amounts with fixed-point precision.
//!
//! The ledger's native unit carries 6 decimal places. Amounts are stored as
//! micro-units so rent, prices and payments never touch floating point.
//! All arithmetic is overflow-checked.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// Number of decimal places of the native unit.
pub const DECIMALS: u32 = 6;

/// One whole native unit in micro-units.
pub const MICRO_PER_UNIT: u64 = 1_000_000;

/// An amount of the ledger's native value, in micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates an amount from micro-units.
    #[must_use]
    pub const fn from_micro(micro: u64) -> Self {
        Self(micro)
    }

    /// Returns the amount in micro-units.
    #[must_use]
    pub const fn as_micro(self) -> u64 {
        self.0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by a quantity. Returns `None` on overflow.
    ///
    /// The product is computed in 128 bits and narrowed, so any pair of
    /// 64-bit factors is handled without wrapping.
    #[must_use]
    pub const fn checked_mul(self, quantity: u64) -> Option<Self> {
        let wide = self.0 as u128 * quantity as u128;
        if wide > u64::MAX as u128 {
            None
        } else {
            Some(Self(wide as u64))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MICRO_PER_UNIT;
        let frac = self.0 % MICRO_PER_UNIT;
        write!(f, "{whole}.{frac:06} ALGO")
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(CoreError::InvalidAmount("negative values not allowed".into()));
        }

        let (whole_str, frac_str) = match s.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (s, None),
        };

        let whole: u64 = if whole_str.is_empty() && frac_str.is_some() {
            0
        } else {
            whole_str
                .parse()
                .map_err(|_| CoreError::InvalidAmount(format!("invalid whole part: {s}")))?
        };

        let frac: u64 = match frac_str {
            None => 0,
            Some(frac) => {
                if frac.len() > DECIMALS as usize {
                    return Err(CoreError::InvalidAmount("too many decimal places".into()));
                }
                if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CoreError::InvalidAmount(format!(
                        "invalid fractional part: {s}"
                    )));
                }
                format!("{frac:0<6}")
                    .parse()
                    .map_err(|_| CoreError::InvalidAmount(format!("invalid fractional part: {s}")))?
            }
        };

        whole
            .checked_mul(MICRO_PER_UNIT)
            .and_then(|w| w.checked_add(frac))
            .map(Amount)
            .ok_or_else(|| CoreError::InvalidAmount("overflow".into()))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Decimal string without trailing zeros
        let whole = self.0 / MICRO_PER_UNIT;
        let frac = self.0 % MICRO_PER_UNIT;

        let s = if frac == 0 {
            format!("{whole}")
        } else {
            let frac_str = format!("{frac:06}");
            format!("{whole}.{}", frac_str.trim_end_matches('0'))
        };

        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn checked_add_returns_none_on_overflow() {
        assert_eq!(Amount::MAX.checked_add(Amount::from_micro(1)), None);
        assert_eq!(
            Amount::from_micro(2).checked_add(Amount::from_micro(3)),
            Some(Amount::from_micro(5))
        );
    }

    #[test]
    fn checked_sub_returns_none_on_underflow() {
        assert_eq!(Amount::from_micro(1).checked_sub(Amount::from_micro(2)), None);
    }

    #[test]
    fn checked_mul_handles_full_width_factors() {
        assert_eq!(Amount::MAX.checked_mul(1), Some(Amount::MAX));
        assert_eq!(Amount::MAX.checked_mul(2), None);
        assert_eq!(Amount::from_micro(1 << 32).checked_mul(1 << 32), None);
        assert_eq!(
            Amount::from_micro(1 << 31).checked_mul(1 << 32),
            Some(Amount::from_micro(1 << 63))
        );
        assert_eq!(Amount::from_micro(1_500_000).checked_mul(2), Some(Amount::from_micro(3_000_000)));
    }

    #[test]
    fn display_formats_six_decimals() {
        assert_eq!(Amount::from_micro(47_300).to_string(), "0.047300 ALGO");
        assert_eq!(Amount::ZERO.to_string(), "0.000000 ALGO");
    }

    #[test_case("1", 1_000_000 ; "whole")]
    #[test_case("1.5", 1_500_000 ; "fractional")]
    #[test_case(".25", 250_000 ; "leading dot")]
    #[test_case("0.000001", 1 ; "micro precision")]
    #[test_case("18446744073709.551615", u64::MAX ; "maximum")]
    fn from_str_parses(input: &str, micro: u64) {
        let amount: Amount = input.parse().expect("parse");
        assert_eq!(amount.as_micro(), micro);
    }

    #[test_case("abc" ; "not a number")]
    #[test_case("-1" ; "negative")]
    #[test_case("1.0000001" ; "too precise")]
    #[test_case("1." ; "empty fraction")]
    #[test_case("1.2.3" ; "two dots")]
    #[test_case("18446744073709.551616" ; "overflow")]
    fn from_str_rejects(input: &str) {
        assert!(input.parse::<Amount>().is_err());
    }

    #[test]
    fn serde_serializes_trimmed_decimal_string() {
        let json = serde_json::to_string(&Amount::from_micro(1_234_500)).expect("serialize");
        assert_eq!(json, r#""1.2345""#);
        let restored: Amount = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.as_micro(), 1_234_500);
    }

    proptest! {
        #[test]
        fn checked_mul_matches_wide_product(price in any::<u64>(), quantity in any::<u64>()) {
            let wide = u128::from(price) * u128::from(quantity);
            let product = Amount::from_micro(price).checked_mul(quantity);
            if wide > u128::from(u64::MAX) {
                prop_assert!(product.is_none());
            } else {
                prop_assert_eq!(product.map(Amount::as_micro), Some(wide as u64));
            }
        }
    }
}
