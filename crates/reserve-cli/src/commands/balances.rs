// crates/reserve-cli/src/commands/balances.rs
//
// `reserve balances [--account <address>]`: wallet balances and staking
// approvals for one account.

use tabled::Tabled;

use reserve_core::AccountBalances;
use reserve_ledger::fetch_account_balances;

use super::{report_unavailable, Context};
use crate::output::{format_json, format_table, OutputFormat};

/// A row in the balances table.
#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Holding")]
    holding: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn rows(balances: &AccountBalances) -> Vec<BalanceRow> {
    let approval = |approved: bool| if approved { "approved" } else { "not approved" }.to_string();
    [
        ("Protocol token", balances.protocol_token.clone()),
        ("Staked token", balances.staked_token.clone()),
        ("Pool tickets", balances.pool_token.clone()),
        ("Stablecoin", balances.stable.clone()),
        ("Stake", approval(balances.can_stake())),
        ("Unstake", approval(balances.can_unstake())),
    ]
    .into_iter()
    .map(|(holding, amount)| BalanceRow {
        holding: holding.to_string(),
        amount,
    })
    .collect()
}

/// Run the balances command.
pub async fn run(ctx: &Context, account: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let contracts = ctx.network.account_contracts()?;
    if account.is_none() {
        println!("No account given; showing disconnected balances.");
    }

    let balances = match fetch_account_balances(&ctx.reader, contracts, account, &ctx.cancel).await {
        Ok(balances) => balances,
        Err(e) => {
            report_unavailable("Balances", &e);
            return Ok(());
        }
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&balances)),
        OutputFormat::Table => println!("{}", format_table(&rows(&balances))),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserve_core::U256;

    #[test]
    fn rows_show_exact_amounts_and_approvals() {
        let balances = AccountBalances {
            protocol_token: "12.345678901".to_string(),
            stake_allowance: U256::MAX,
            ..AccountBalances::disconnected()
        };
        let rows = rows(&balances);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].amount, "12.345678901");
        assert_eq!(rows[4].amount, "approved");
        assert_eq!(rows[5].amount, "not approved");
    }
}
