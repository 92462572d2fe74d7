// crates/reserve-cli/src/commands/mod.rs
//
// Command module declarations for the Reserve CLI.

pub mod balances;
pub mod bonds;
pub mod runway;
pub mod treasury;

use reserve_core::ReserveError;
use reserve_ledger::{CancellationToken, SnapshotLedger, ThrottledReader};

use crate::config::{AppConfig, NetworkConfig};
use crate::output::OutputFormat;

/// Everything a command needs: the throttled reader, the selected network,
/// and the output mode.
pub struct Context {
    pub reader: ThrottledReader<SnapshotLedger>,
    pub config: AppConfig,
    pub network: NetworkConfig,
    pub format: OutputFormat,
    pub cancel: CancellationToken,
}

/// Print the "data unavailable" state for an engine error.
pub fn report_unavailable(what: &str, err: &ReserveError) {
    match err {
        ReserveError::Cancelled => println!("{}: cancelled", what),
        _ => {
            tracing::warn!("{} unavailable: {}", what, err);
            println!("{}: data unavailable ({})", what, err);
        }
    }
}
