// crates/reserve-cli/src/commands/bonds.rs
//
// `reserve bonds [--account <address>]`: per-bond summary for one account.
//
// Without an account every bond shows its disconnected (all-zero) summary
// and nothing is read from the ledger.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use reserve_core::{format_units, BondDescriptor, UserBondSummary};
use reserve_ledger::fetch_user_bonds;

use super::{report_unavailable, Context};
use crate::output::{format_json, format_table, OutputFormat};

/// A row in the bond table.
#[derive(Tabled)]
struct BondRow {
    #[tabled(rename = "Bond")]
    bond: String,
    #[tabled(rename = "LP")]
    is_lp: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Allowance")]
    allowance: String,
    #[tabled(rename = "Interest Due")]
    interest_due: String,
    #[tabled(rename = "Pending")]
    pending_payout: String,
    #[tabled(rename = "Matures At")]
    maturation: String,
}

#[derive(Serialize)]
struct BondJson<'a> {
    summaries: BTreeMap<&'a str, &'a UserBondSummary>,
    unavailable: BTreeMap<&'a str, String>,
}

fn row(bond: &BondDescriptor, summary: &UserBondSummary) -> BondRow {
    BondRow {
        bond: summary.display_name.clone(),
        is_lp: if summary.is_lp { "yes" } else { "no" }.to_string(),
        balance: format!("{:.4}", summary.balance),
        allowance: format_units(summary.allowance, bond.decimals_policy)
            .unwrap_or_else(|_| summary.allowance.to_string()),
        interest_due: format!("{:.4}", summary.interest_due),
        pending_payout: if summary.pending_payout_display.is_empty() {
            "--".to_string()
        } else {
            summary.pending_payout_display.clone()
        },
        maturation: if summary.bond_maturation_block == 0 {
            "--".to_string()
        } else {
            format!("block {}", summary.bond_maturation_block)
        },
    }
}

/// Run the bonds command.
pub async fn run(ctx: &Context, account: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let bonds = ctx.network.bond_descriptors();
    if account.is_none() {
        println!("No account given; showing disconnected summaries.");
    }

    let outcomes = match fetch_user_bonds(&ctx.reader, &bonds, account, &ctx.cancel).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            report_unavailable("Bonds", &e);
            return Ok(());
        }
    };

    match ctx.format {
        OutputFormat::Json => {
            let mut out = BondJson {
                summaries: BTreeMap::new(),
                unavailable: BTreeMap::new(),
            };
            for (name, outcome) in &outcomes {
                match outcome {
                    Ok(summary) => {
                        out.summaries.insert(name.as_str(), summary);
                    }
                    Err(e) => {
                        out.unavailable.insert(name.as_str(), e.to_string());
                    }
                }
            }
            println!("{}", format_json(&out));
        }
        OutputFormat::Table => {
            let mut rows = Vec::new();
            for bond in &bonds {
                match outcomes.get(&bond.name) {
                    Some(Ok(summary)) => rows.push(row(bond, summary)),
                    Some(Err(e)) => report_unavailable(&bond.display_name, e),
                    None => {}
                }
            }
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserve_core::{BondState, U256};
    use reserve_economics::compute_user_bond;

    fn dai_bond() -> BondDescriptor {
        BondDescriptor {
            name: "dai".to_string(),
            display_name: "DAI".to_string(),
            icon: String::new(),
            is_lp: false,
            decimals_policy: 18,
            bond_address: "0xdai_bond".to_string(),
            reserve_address: "0xdai".to_string(),
        }
    }

    #[test]
    fn pending_column_shows_exact_payout() {
        let bond = dai_bond();
        let state = BondState {
            pending_payout: U256::from(123_456_789u64),
            ..BondState::default()
        };
        let summary = compute_user_bond(&bond, Some(&state)).unwrap();
        assert_eq!(row(&bond, &summary).pending_payout, "0.123456789");
    }

    #[test]
    fn pending_column_blank_when_disconnected() {
        let bond = dai_bond();
        let summary = compute_user_bond(&bond, None).unwrap();
        let row = row(&bond, &summary);
        assert_eq!(row.pending_payout, "--");
        assert_eq!(row.maturation, "--");
    }
}
