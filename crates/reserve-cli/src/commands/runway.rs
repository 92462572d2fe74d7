// crates/reserve-cli/src/commands/runway.rs
//
// `reserve runway`: treasury total, circulating supply, and runway in days.

use reserve_ledger::{cancellable, fetch_runway, resolve_assets};

use super::{report_unavailable, treasury::print_snapshot, Context};
use crate::output::{format_amount, format_json, OutputFormat};

/// Run the runway command. `rebase_rate` overrides the configured rate.
pub async fn run(ctx: &Context, rebase_rate: Option<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let network = &ctx.network;
    let rate = rebase_rate.unwrap_or(ctx.config.runway.rebase_rate);

    let assets = match cancellable(&ctx.cancel, resolve_assets(&ctx.reader, &network.assets)).await {
        Ok(assets) => assets,
        Err(e) => {
            report_unavailable("Runway", &e);
            return Ok(());
        }
    };

    let report = match fetch_runway(
        &ctx.reader,
        &network.treasury,
        &network.protocol_token,
        &assets,
        rate,
        &ctx.cancel,
    )
    .await
    {
        Ok(report) => report,
        Err(e) => {
            report_unavailable("Runway", &e);
            return Ok(());
        }
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            print_snapshot(&report.snapshot);
            println!("Circulating supply: {}", format_amount(report.circulating_supply));
            println!("Rebase rate:        {:.4}% per epoch", report.rebase_rate * 100.0);
            println!("Runway:             {:.1} days ({:.1} epochs)", report.runway.days, report.runway.epochs);
            if report.runway.is_depleted() {
                println!("Warning: treasury value is below circulating supply.");
            }
        }
    }

    Ok(())
}
