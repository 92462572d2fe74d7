// crates/reserve-cli/src/commands/treasury.rs
//
// `reserve treasury`: per-asset treasury breakdown and total.

use tabled::Tabled;

use reserve_core::{AssetKind, TreasurySnapshot};
use reserve_ledger::{cancellable, fetch_treasury, resolve_assets};

use super::{report_unavailable, Context};
use crate::output::{format_amount, format_json, format_table, OutputFormat};

/// A row in the treasury table.
#[derive(Tabled)]
struct TreasuryRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Decimals")]
    decimals: u32,
    #[tabled(rename = "Value")]
    value: String,
}

pub(crate) fn kind_label(kind: &AssetKind) -> &'static str {
    match kind {
        AssetKind::FixedReserve => "reserve",
        AssetKind::OraclePriced { .. } => "oracle",
        AssetKind::PooledPosition { .. } => "pool",
    }
}

pub(crate) fn print_snapshot(snapshot: &TreasurySnapshot) {
    let rows: Vec<TreasuryRow> = snapshot
        .entries
        .iter()
        .map(|e| TreasuryRow {
            asset: e.asset.label().to_string(),
            kind: kind_label(&e.asset.kind).to_string(),
            decimals: e.asset.decimals,
            value: format_amount(e.value.value()),
        })
        .collect();
    println!("{}", format_table(&rows));
    println!("Total: {}", format_amount(snapshot.total.value()));
}

/// Run the treasury command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let network = &ctx.network;
    let assets = match cancellable(&ctx.cancel, resolve_assets(&ctx.reader, &network.assets)).await {
        Ok(assets) => assets,
        Err(e) => {
            report_unavailable("Treasury", &e);
            return Ok(());
        }
    };

    match fetch_treasury(&ctx.reader, &network.treasury, &assets, &ctx.cancel).await {
        Ok(snapshot) => match ctx.format {
            OutputFormat::Json => println!("{}", format_json(&snapshot)),
            OutputFormat::Table => print_snapshot(&snapshot),
        },
        Err(e) => report_unavailable("Treasury", &e),
    }

    Ok(())
}
