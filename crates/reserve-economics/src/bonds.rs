// crates/reserve-economics/src/bonds.rs
//
// Per-account bond economics.
//
// Payouts are denominated in the protocol token (9 decimals). The reserve
// asset's decimals come from the bond's `decimals_policy`, fixed when the
// bond is configured.

use std::collections::BTreeMap;

use reserve_core::{
    format_units, normalize_units, BondDescriptor, BondState, ReserveError, UserBondSummary, PROTOCOL_DECIMALS,
};

/// Summarize one account's position in one bond.
///
/// `None` means no account is connected and yields
/// `UserBondSummary::disconnected`.
///
/// # Errors
/// - `ReserveError::InvalidState` if `vesting + last_block` overflows.
/// - `ReserveError::InvalidDecimals` if the bond's `decimals_policy` is out of range.
pub fn compute_user_bond(
    bond: &BondDescriptor,
    state: Option<&BondState>,
) -> Result<UserBondSummary, ReserveError> {
    let Some(state) = state else {
        return Ok(UserBondSummary::disconnected(bond));
    };

    let bond_maturation_block = state.vesting.checked_add(state.last_block).ok_or_else(|| {
        ReserveError::InvalidState(format!(
            "bond {} maturation block overflows: vesting {} + last block {}",
            bond.name, state.vesting, state.last_block
        ))
    })?;

    let interest_due = normalize_units(state.payout, PROTOCOL_DECIMALS)?;
    let pending_payout = normalize_units(state.pending_payout, PROTOCOL_DECIMALS)?;
    let pending_payout_display = format_units(state.pending_payout, PROTOCOL_DECIMALS)?;
    let balance = normalize_units(state.balance, bond.decimals_policy)?;

    Ok(UserBondSummary {
        bond: bond.name.clone(),
        display_name: bond.display_name.clone(),
        bond_icon: bond.icon.clone(),
        is_lp: bond.is_lp,
        allowance: state.allowance,
        balance: balance.value(),
        interest_due: interest_due.value(),
        bond_maturation_block,
        pending_payout: pending_payout.value(),
        pending_payout_display,
    })
}

/// Summarize every bond, keyed by bond name.
///
/// # Errors
/// Fails on the first bond `compute_user_bond` rejects.
pub fn compute_user_bonds<'a, I>(bonds: I) -> Result<BTreeMap<String, UserBondSummary>, ReserveError>
where
    I: IntoIterator<Item = (&'a BondDescriptor, Option<&'a BondState>)>,
{
    bonds
        .into_iter()
        .map(|(bond, state)| Ok((bond.name.clone(), compute_user_bond(bond, state)?)))
        .collect()
}
