// crates/reserve-economics/src/account.rs
//
// Wallet balances for one account, rendered exactly.
//
// Balances are display strings built from the raw integers so no precision
// is lost on the way to the user. Allowances stay raw; callers compare them
// against raw thresholds.

use reserve_core::{
    format_units, AccountBalances, AccountContracts, AccountState, ReserveError, PROTOCOL_DECIMALS,
};

/// Render one account's balances.
///
/// `None` means no account is connected and yields
/// `AccountBalances::disconnected`.
///
/// # Errors
/// `ReserveError::InvalidDecimals` if the stablecoin's configured decimals
/// are out of range.
pub fn compute_account_balances(
    contracts: &AccountContracts,
    state: Option<&AccountState>,
) -> Result<AccountBalances, ReserveError> {
    let Some(state) = state else {
        return Ok(AccountBalances::disconnected());
    };

    Ok(AccountBalances {
        protocol_token: format_units(state.protocol_balance, PROTOCOL_DECIMALS)?,
        staked_token: format_units(state.staked_balance, PROTOCOL_DECIMALS)?,
        pool_token: format_units(state.pool_balance, PROTOCOL_DECIMALS)?,
        stable: format_units(state.stable_balance, contracts.stable_decimals)?,
        stake_allowance: state.stake_allowance,
        unstake_allowance: state.unstake_allowance,
    })
}
