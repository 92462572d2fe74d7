// crates/reserve-core/src/account.rs
//
// Wallet balances and staking allowances for one connected account.
//
// The protocol token, its staked form, and the pool token are all 9-decimal
// tokens. The stablecoin's decimals are fixed in configuration.

use serde::{Deserialize, Serialize};

use crate::decimal::U256;

/// Token and staking contracts the account view reads, per network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContracts {
    /// Protocol token (9 decimals).
    pub protocol_token: String,
    /// Staked protocol token (9 decimals).
    pub staked_token: String,
    /// Prize-pool ticket token (9 decimals). Networks without a pool leave
    /// this unset and report a zero pool balance.
    #[serde(default)]
    pub pool_token: Option<String>,
    /// Stablecoin shown alongside the protocol balances.
    pub stable_token: String,
    #[serde(default = "default_stable_decimals")]
    pub stable_decimals: u32,
    /// Spender of the protocol token when staking.
    pub staking_helper: String,
    /// Spender of the staked token when unstaking.
    pub staking: String,
}

fn default_stable_decimals() -> u32 {
    18
}

/// Raw balances and allowances read for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub protocol_balance: U256,
    pub staked_balance: U256,
    pub pool_balance: U256,
    pub stable_balance: U256,
    /// Protocol-token allowance granted to the staking helper.
    pub stake_allowance: U256,
    /// Staked-token allowance granted to the staking contract.
    pub unstake_allowance: U256,
}

/// Balances rendered exactly from their raw amounts, plus the raw staking
/// allowances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub protocol_token: String,
    pub staked_token: String,
    pub pool_token: String,
    pub stable: String,
    pub stake_allowance: U256,
    pub unstake_allowance: U256,
}

impl AccountBalances {
    /// Balances reported when no account is connected.
    pub fn disconnected() -> Self {
        Self {
            protocol_token: "0.0".to_string(),
            staked_token: "0.0".to_string(),
            pool_token: "0.0".to_string(),
            stable: "0.0".to_string(),
            stake_allowance: U256::zero(),
            unstake_allowance: U256::zero(),
        }
    }

    /// Whether the account has approved the staking helper at all.
    pub fn can_stake(&self) -> bool {
        !self.stake_allowance.is_zero()
    }

    /// Whether the account has approved the staking contract at all.
    pub fn can_unstake(&self) -> bool {
        !self.unstake_allowance.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contracts_default_to_18_decimal_stable_and_no_pool() {
        let json = r#"{
            "protocol_token": "0xhec",
            "staked_token": "0xshec",
            "stable_token": "0xdai",
            "staking_helper": "0xhelper",
            "staking": "0xstaking"
        }"#;
        let contracts: AccountContracts = serde_json::from_str(json).unwrap();
        assert_eq!(contracts.stable_decimals, 18);
        assert_eq!(contracts.pool_token, None);
    }

    #[test]
    fn disconnected_balances_cannot_stake() {
        let balances = AccountBalances::disconnected();
        assert_eq!(balances.protocol_token, "0.0");
        assert!(!balances.can_stake());
        assert!(!balances.can_unstake());
    }
}
