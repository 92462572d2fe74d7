// crates/reserve-core/src/decimal.rs
//
// Fixed-point decimal utilities shared by every calculator.
//
// Ledger balances are unsigned 256-bit integers scaled by 10^decimals. All
// conversions to real values go through exact integer division first, so the
// whole and fractional parts are each rounded once when they become `f64`.

use std::fmt;

pub use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::ReserveError;

/// Largest decimal count accepted by `normalize` (10^38 fits in 128 bits).
pub const MAX_DECIMALS: u32 = 38;

/// Decimal convention of the protocol token, bond payouts, and pool valuations.
pub const PROTOCOL_DECIMALS: u32 = 9;

/// Decimal convention of price oracles.
pub const ORACLE_DECIMALS: u32 = 8;

const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// A real-valued amount in the canonical valuation unit. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedValue(f64);

impl NormalizedValue {
    /// Zero in the canonical unit.
    pub const ZERO: NormalizedValue = NormalizedValue(0.0);

    /// The underlying real value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}", p, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Compute 10^decimals as a U256.
///
/// # Errors
/// Returns `ReserveError::InvalidDecimals` if `decimals > MAX_DECIMALS`.
pub fn pow10(decimals: u32) -> Result<U256, ReserveError> {
    if decimals > MAX_DECIMALS {
        return Err(ReserveError::InvalidDecimals {
            decimals,
            max: MAX_DECIMALS,
        });
    }
    Ok(U256::from(10u8).pow(U256::from(decimals)))
}

/// Convert a U256 to the nearest `f64`, limb by limb from the most
/// significant end.
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0_f64, |acc, limb| acc * TWO_POW_64 + *limb as f64)
}

/// Normalize a raw fixed-point ledger balance into the canonical unit:
/// `raw / 10^decimals * unit_price`.
///
/// # Errors
/// - `ReserveError::InvalidDecimals` if `decimals > MAX_DECIMALS`.
/// - `ReserveError::InvalidInput` if `unit_price` is negative, NaN, or infinite.
pub fn normalize(raw: U256, decimals: u32, unit_price: f64) -> Result<NormalizedValue, ReserveError> {
    let scale = pow10(decimals)?;
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(ReserveError::InvalidInput(format!(
            "unit price must be a finite non-negative number, got {}",
            unit_price
        )));
    }

    let (whole, frac) = raw.div_mod(scale);
    let units = u256_to_f64(whole) + u256_to_f64(frac) / u256_to_f64(scale);
    Ok(NormalizedValue(units * unit_price))
}

/// `normalize` with a unit price of 1, for same-unit reserve assets.
pub fn normalize_units(raw: U256, decimals: u32) -> Result<NormalizedValue, ReserveError> {
    normalize(raw, decimals, 1.0)
}

/// Sum normalized values independently of their order.
///
/// Values are sorted before a compensated (Neumaier) summation, so any
/// permutation of the same inputs produces the same bits.
pub fn sum_values<I>(values: I) -> NormalizedValue
where
    I: IntoIterator<Item = NormalizedValue>,
{
    let mut sorted: Vec<f64> = values.into_iter().map(NormalizedValue::value).collect();
    sorted.sort_by(f64::total_cmp);

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for v in sorted {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    NormalizedValue(sum + compensation)
}

/// Render a raw fixed-point integer as an exact decimal string.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit is
/// kept (`1000000000` with 9 decimals renders as `"1.0"`). With zero decimals
/// the integer is rendered as-is.
pub fn format_units(raw: U256, decimals: u32) -> Result<String, ReserveError> {
    let scale = pow10(decimals)?;
    let (whole, frac) = raw.div_mod(scale);
    if decimals == 0 {
        return Ok(whole.to_string());
    }

    let padded = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');
    let frac_str = if trimmed.is_empty() { "0" } else { trimmed };
    Ok(format!("{}.{}", whole, frac_str))
}

/// Serde adapter that reads and writes a `u64` as a `0x` hex quantity, the
/// same encoding `U256` uses.
///
/// Use with `#[serde(with = "reserve_core::decimal::hex_u64")]`.
pub mod hex_u64 {
    use primitive_types::U256;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        U256::from(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let quantity = U256::deserialize(deserializer)?;
        if quantity.bits() > 64 {
            return Err(D::Error::custom(format!(
                "quantity {:#x} does not fit in 64 bits",
                quantity
            )));
        }
        Ok(quantity.low_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_protocol_token_is_exactly_one() {
        let v = normalize(U256::from(1_000_000_000u64), 9, 1.0).unwrap();
        assert_eq!(v.value(), 1.0);
    }

    #[test]
    fn stablecoin_decimals() {
        let v = normalize_units(U256::from(123_456_789u64), 6).unwrap();
        assert!((v.value() - 123.456789).abs() < 1e-12);
    }

    #[test]
    fn unit_price_scales_result() {
        let v = normalize(U256::from(2u64) * pow10(18).unwrap(), 18, 1850.25).unwrap();
        assert!((v.value() - 3700.5).abs() < 1e-9);
    }

    #[test]
    fn max_decimals_accepted() {
        let v = normalize_units(pow10(38).unwrap(), 38).unwrap();
        assert_eq!(v.value(), 1.0);
    }

    #[test]
    fn decimals_above_38_rejected() {
        let err = normalize_units(U256::one(), 39).unwrap_err();
        assert_eq!(err, ReserveError::InvalidDecimals { decimals: 39, max: 38 });
    }

    #[test]
    fn negative_or_nan_price_rejected() {
        assert!(normalize(U256::one(), 0, -1.0).unwrap_err().is_input_error());
        assert!(normalize(U256::one(), 0, f64::NAN).unwrap_err().is_input_error());
        assert!(normalize(U256::one(), 0, f64::INFINITY).unwrap_err().is_input_error());
    }

    #[test]
    fn huge_balances_keep_significant_digits() {
        let raw = U256::from(2u8).pow(U256::from(200u32));
        let v = normalize_units(raw, 38).unwrap();
        let expected = 2f64.powi(200) / 1e38;
        assert!(((v.value() - expected) / expected).abs() < 1e-12);

        let max = normalize_units(U256::MAX, 18).unwrap();
        assert!(max.value().is_finite());
        assert!(max.value() > 1.15e59 && max.value() < 1.16e59);
    }

    #[test]
    fn fractional_part_survives_large_whole_part() {
        // 12345.5 tokens at 18 decimals: whole and fraction converted separately.
        let raw = U256::from(12_345u64) * pow10(18).unwrap() + pow10(17).unwrap() * U256::from(5u8);
        let v = normalize_units(raw, 18).unwrap();
        assert_eq!(v.value(), 12_345.5);
    }

    #[test]
    fn monotonic_in_raw_balance() {
        let mut last = NormalizedValue::ZERO;
        for step in 0..2_000u64 {
            let raw = U256::from(step * 999_999_937);
            let v = normalize_units(raw, 9).unwrap();
            assert!(v >= last, "normalize decreased at step {}", step);
            last = v;
        }
    }

    #[test]
    fn monotonic_in_unit_price() {
        let raw = U256::from(7_654_321u64);
        let mut last = NormalizedValue::ZERO;
        for cents in 0..500 {
            let v = normalize(raw, 4, cents as f64 / 100.0).unwrap();
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn u256_conversion_matches_u128() {
        let n: u128 = 340_282_366_920_938_463_463_374_607_431_768_211_455;
        assert_eq!(u256_to_f64(U256::from(n)), n as f64);
        assert_eq!(u256_to_f64(U256::zero()), 0.0);
    }

    #[test]
    fn sum_is_permutation_invariant() {
        let values: Vec<NormalizedValue> = [1e16, 0.1, 3.3, 7e-3, 1.0, 2.5e9, 0.2]
            .iter()
            .map(|v| normalize(U256::one(), 0, *v).unwrap())
            .collect();
        let forward = sum_values(values.iter().copied());
        let reversed = sum_values(values.iter().rev().copied());
        let mut rotated = values.clone();
        rotated.rotate_left(3);
        assert_eq!(forward.value().to_bits(), reversed.value().to_bits());
        assert_eq!(forward.value().to_bits(), sum_values(rotated).value().to_bits());
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(sum_values(Vec::new()), NormalizedValue::ZERO);
    }

    #[test]
    fn format_units_exact() {
        assert_eq!(format_units(U256::from(1_000_000_000u64), 9).unwrap(), "1.0");
        assert_eq!(format_units(U256::from(1_500_000_000u64), 9).unwrap(), "1.5");
        assert_eq!(format_units(U256::from(42u64), 9).unwrap(), "0.000000042");
        assert_eq!(format_units(U256::zero(), 9).unwrap(), "0.0");
        assert_eq!(format_units(U256::from(77u64), 0).unwrap(), "77");
    }

    #[test]
    fn format_units_rejects_bad_decimals() {
        assert!(format_units(U256::one(), 39).is_err());
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Block {
        #[serde(with = "hex_u64")]
        number: u64,
    }

    #[test]
    fn hex_u64_reads_and_writes_quantities() {
        let block: Block = serde_json::from_str(r#"{ "number": "0x1388" }"#).unwrap();
        assert_eq!(block.number, 5_000);
        assert_eq!(serde_json::to_string(&block).unwrap(), r#"{"number":"0x1388"}"#);
    }

    #[test]
    fn hex_u64_rejects_wide_quantities() {
        let wide = r#"{ "number": "0x10000000000000000" }"#;
        assert!(serde_json::from_str::<Block>(wide).is_err());
    }

    #[test]
    fn hex_u64_rejects_plain_numbers() {
        assert!(serde_json::from_str::<Block>(r#"{ "number": 5000 }"#).is_err());
    }
}
