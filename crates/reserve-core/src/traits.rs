// crates/reserve-core/src/traits.rs

use async_trait::async_trait;

use crate::bond::BondInfo;
use crate::decimal::U256;
use crate::error::ReserveError;

/// Read-only access to raw ledger state.
///
/// Implementations return raw fixed-point integers exactly as the ledger
/// stores them. Transient transport failures must surface as
/// `ReserveError::LedgerRead`, logical rejections as
/// `ReserveError::ContractRevert`.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Token balance of `owner` in `asset`.
    async fn read_balance(&self, asset: &str, owner: &str) -> Result<U256, ReserveError>;

    /// Decimal count of `asset`.
    async fn read_decimals(&self, asset: &str) -> Result<u32, ReserveError>;

    /// Latest oracle price (8-decimal convention, signed).
    async fn read_oracle_price(&self, oracle: &str) -> Result<i128, ReserveError>;

    /// Total value of a pool position from a valuation source (9 decimals).
    async fn read_pooled_value(&self, valuation_source: &str, position: &str) -> Result<U256, ReserveError>;

    /// Depository `bondInfo` record for `owner`.
    async fn read_bond_info(&self, bond: &str, owner: &str) -> Result<BondInfo, ReserveError>;

    /// Claimable payout for `owner` (9 decimals).
    async fn read_pending_payout(&self, bond: &str, owner: &str) -> Result<U256, ReserveError>;

    /// Allowance `owner` granted `spender` on `asset`.
    async fn read_allowance(&self, asset: &str, owner: &str, spender: &str) -> Result<U256, ReserveError>;

    /// Circulating supply of the protocol token (9 decimals).
    async fn read_circulating_supply(&self, token: &str) -> Result<U256, ReserveError>;
}
