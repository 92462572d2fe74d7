// crates/reserve-core/src/bond.rs
//
// Bond descriptors, raw per-account bond state, and the derived summary.
//
// Payout amounts are in the protocol token's 9-decimal unit; allowance and
// balance are in the reserve asset's native decimals, given explicitly by
// the descriptor's `decimals_policy`.

use serde::{Deserialize, Serialize};

use crate::decimal::{hex_u64, U256};

/// A configured bond market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondDescriptor {
    /// Stable key, e.g. "dai" or "hec_usdc_lp".
    pub name: String,
    pub display_name: String,
    /// Icon reference passed through for display.
    #[serde(default)]
    pub icon: String,
    /// Whether the reserve asset is a liquidity-pool token.
    #[serde(default)]
    pub is_lp: bool,
    /// Decimals of the reserve asset (6 for USDC-style stablecoins, 18 otherwise).
    pub decimals_policy: u32,
    /// Bond depository contract.
    pub bond_address: String,
    /// Reserve asset deposited into the bond.
    pub reserve_address: String,
}

/// The depository's `bondInfo` record for one account.
///
/// Serialized as JSON-RPC returns it: every field a `0x` hex quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondInfo {
    /// Remaining payout, 9 decimals.
    pub payout: U256,
    /// Blocks left to vest.
    #[serde(with = "hex_u64")]
    pub vesting: u64,
    /// Block of the last interaction.
    #[serde(with = "hex_u64")]
    pub last_block: u64,
}

/// All raw state needed to summarize one account's position in one bond.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondState {
    pub payout: U256,
    pub vesting: u64,
    pub last_block: u64,
    /// Currently claimable payout, 9 decimals.
    pub pending_payout: U256,
    /// Reserve-asset allowance granted to the depository, native decimals.
    pub allowance: U256,
    /// Reserve-asset wallet balance, native decimals.
    pub balance: U256,
}

impl BondState {
    /// Combine the depository record with the separately-read amounts.
    pub fn from_parts(info: BondInfo, pending_payout: U256, allowance: U256, balance: U256) -> Self {
        Self {
            payout: info.payout,
            vesting: info.vesting,
            last_block: info.last_block,
            pending_payout,
            allowance,
            balance,
        }
    }
}

/// Derived per-account bond figures plus descriptor metadata for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBondSummary {
    pub bond: String,
    pub display_name: String,
    pub bond_icon: String,
    pub is_lp: bool,
    /// Raw reserve-asset allowance, compared by callers against raw thresholds.
    pub allowance: U256,
    /// Reserve-asset balance in whole units.
    pub balance: f64,
    /// Remaining payout in whole protocol tokens.
    pub interest_due: f64,
    pub bond_maturation_block: u64,
    /// Claimable payout in whole protocol tokens.
    pub pending_payout: f64,
    /// Claimable payout rendered exactly from the raw amount, e.g.
    /// `"0.123456789"`. Blank when no account is connected.
    pub pending_payout_display: String,
}

impl UserBondSummary {
    /// The summary reported when no account is connected: metadata only,
    /// every figure zero and the display string blank.
    pub fn disconnected(bond: &BondDescriptor) -> Self {
        Self {
            bond: bond.name.clone(),
            display_name: bond.display_name.clone(),
            bond_icon: bond.icon.clone(),
            is_lp: bond.is_lp,
            allowance: U256::zero(),
            balance: 0.0,
            interest_due: 0.0,
            bond_maturation_block: 0,
            pending_payout: 0.0,
            pending_payout_display: String::new(),
        }
    }
}
