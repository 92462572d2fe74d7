// crates/reserve-core/src/asset.rs
//
// Treasury asset descriptors, raw readings, and the aggregated snapshot.

use serde::{Deserialize, Serialize};

use crate::decimal::{NormalizedValue, ORACLE_DECIMALS, U256};
use crate::error::ReserveError;

/// Outcome of a single upstream ledger read.
pub type ReadOutcome<T> = Result<T, ReserveError>;

/// How an asset's raw reading is turned into a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetKind {
    /// Reserve asset already denominated in the valuation unit (unit price 1).
    FixedReserve,
    /// Reserve asset priced through an oracle reporting a signed fixed-point price.
    OraclePriced {
        /// Oracle contract address.
        oracle: String,
        /// Decimal convention of the oracle's price.
        #[serde(default = "default_oracle_decimals")]
        oracle_decimals: u32,
    },
    /// Liquidity position valued by a pool-valuation source in protocol
    /// decimals (9).
    PooledPosition {
        /// Address of the valuation source (bonding calculator).
        valuation_source: String,
    },
}

fn default_oracle_decimals() -> u32 {
    ORACLE_DECIMALS
}

/// A configured treasury asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Ledger address of the asset (token or pool position).
    pub id: String,
    /// Display symbol, e.g. "DAI" or "HEC-USDC LP".
    #[serde(default)]
    pub symbol: Option<String>,
    /// Fixed-point decimals of the asset's raw balance.
    pub decimals: u32,
    /// Valuation strategy.
    pub kind: AssetKind,
}

impl AssetDescriptor {
    /// Symbol if configured, otherwise the address.
    pub fn label(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.id)
    }
}

/// One raw treasury reading as handed to the aggregator.
///
/// `balance` is the raw balance (or pooled total-value figure) and carries
/// the upstream error if the read failed. `oracle_price` is only consulted
/// for `AssetKind::OraclePriced` assets.
#[derive(Debug, Clone)]
pub struct RawLedgerReading {
    pub asset: AssetDescriptor,
    pub balance: ReadOutcome<U256>,
    pub oracle_price: Option<ReadOutcome<i128>>,
}

impl RawLedgerReading {
    /// A successful reading with no price input.
    pub fn new(asset: AssetDescriptor, balance: U256) -> Self {
        Self {
            asset,
            balance: Ok(balance),
            oracle_price: None,
        }
    }

    /// Attach an oracle price outcome.
    pub fn with_oracle_price(mut self, price: ReadOutcome<i128>) -> Self {
        self.oracle_price = Some(price);
        self
    }
}

/// One line of the treasury breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryEntry {
    pub asset: AssetDescriptor,
    pub value: NormalizedValue,
}

/// Treasury valuation: per-asset breakdown in input order plus the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasurySnapshot {
    pub entries: Vec<TreasuryEntry>,
    pub total: NormalizedValue,
}

impl TreasurySnapshot {
    /// Value of the asset with the given id, if present.
    pub fn value_of(&self, asset_id: &str) -> Option<NormalizedValue> {
        self.entries
            .iter()
            .find(|e| e.asset.id == asset_id)
            .map(|e| e.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_deserializes_with_default_oracle_decimals() {
        let json = r#"{"type":"oracle_priced","oracle":"0xfeed"}"#;
        let kind: AssetKind = serde_json::from_str(json).unwrap();
        assert_eq!(
            kind,
            AssetKind::OraclePriced {
                oracle: "0xfeed".to_string(),
                oracle_decimals: 8
            }
        );
    }

    #[test]
    fn descriptor_label_falls_back_to_id() {
        let mut asset = AssetDescriptor {
            id: "0xdai".to_string(),
            symbol: None,
            decimals: 18,
            kind: AssetKind::FixedReserve,
        };
        assert_eq!(asset.label(), "0xdai");
        asset.symbol = Some("DAI".to_string());
        assert_eq!(asset.label(), "DAI");
    }
}
