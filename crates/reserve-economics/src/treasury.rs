// crates/reserve-economics/src/treasury.rs
//
// Treasury valuation: turn raw per-asset readings into one snapshot.
//
// Each asset kind resolves its unit price differently:
//   - FixedReserve:    unit price 1, the asset's own decimals
//   - OraclePriced:    oracle price / 10^oracle_decimals, the asset's decimals
//   - PooledPosition:  reading is already a 9-decimal value figure
//
// Aggregation is all-or-nothing: one failed reading fails the snapshot,
// since a partial total would understate the treasury.

use reserve_core::{
    normalize, normalize_units, sum_values, AssetDescriptor, AssetKind, NormalizedValue,
    RawLedgerReading, ReadOutcome, ReserveError, TreasuryEntry, TreasurySnapshot,
    PROTOCOL_DECIMALS, U256,
};

/// Convert a signed oracle price into a unit price.
///
/// # Errors
/// Returns `ReserveError::InvalidState` if the oracle reports zero or a
/// negative price, and `ReserveError::InvalidDecimals` for an unsupported
/// oracle decimal count.
pub fn oracle_unit_price(raw_price: i128, oracle_decimals: u32) -> Result<f64, ReserveError> {
    if raw_price <= 0 {
        return Err(ReserveError::InvalidState(format!(
            "oracle reported non-positive price {}",
            raw_price
        )));
    }
    let value = normalize_units(U256::from(raw_price.unsigned_abs()), oracle_decimals)?;
    Ok(value.value())
}

/// Value one asset from its raw balance and (for oracle-priced assets) the
/// oracle price outcome.
///
/// # Errors
/// - `ReserveError::InvalidInput` if an oracle-priced asset has no price input.
/// - The oracle read's own error if that read failed.
/// - Anything `normalize` or `oracle_unit_price` rejects.
pub fn value_asset(
    asset: &AssetDescriptor,
    balance: U256,
    oracle_price: Option<&ReadOutcome<i128>>,
) -> Result<NormalizedValue, ReserveError> {
    match &asset.kind {
        AssetKind::FixedReserve => normalize_units(balance, asset.decimals),
        AssetKind::OraclePriced {
            oracle,
            oracle_decimals,
        } => {
            let raw_price = match oracle_price {
                Some(Ok(price)) => *price,
                Some(Err(e)) => return Err(e.clone()),
                None => {
                    return Err(ReserveError::InvalidInput(format!(
                        "asset {} requires a price from oracle {}",
                        asset.label(),
                        oracle
                    )))
                }
            };
            let unit_price = oracle_unit_price(raw_price, *oracle_decimals)?;
            normalize(balance, asset.decimals, unit_price)
        }
        AssetKind::PooledPosition { .. } => normalize_units(balance, PROTOCOL_DECIMALS),
    }
}

/// Aggregate raw readings into a treasury snapshot.
///
/// The breakdown keeps input order; the total does not depend on it.
///
/// # Errors
/// Returns the first failed reading's error (in input order), or the first
/// valuation error. No partial snapshot is ever produced.
pub fn aggregate(readings: &[RawLedgerReading]) -> Result<TreasurySnapshot, ReserveError> {
    let mut entries = Vec::with_capacity(readings.len());

    for reading in readings {
        let balance = reading.balance.as_ref().map_err(Clone::clone)?;
        let value = value_asset(&reading.asset, *balance, reading.oracle_price.as_ref())?;
        entries.push(TreasuryEntry {
            asset: reading.asset.clone(),
            value,
        });
    }

    let total = sum_values(entries.iter().map(|e| e.value));
    Ok(TreasurySnapshot { entries, total })
}
