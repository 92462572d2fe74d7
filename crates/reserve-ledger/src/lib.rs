// crates/reserve-ledger/src/lib.rs
//
// reserve-ledger: the asynchronous boundary between the Reserve engine and
// the ledger.
//
// Wraps any `LedgerReader` with a read policy (concurrency cap, per-read
// timeout, retry with backoff for transient failures), fans out the reads
// each computation needs, and hands the joined results to the pure
// calculators in reserve-economics. Also provides `SnapshotLedger`, an
// in-memory reader over a JSON dump of ledger state.

pub mod assets;
pub mod fetch;
pub mod policy;
pub mod retry;
pub mod snapshot;
pub mod throttle;

// Re-export key types for ergonomic access from downstream crates.
pub use assets::{resolve_assets, AssetConfig};
pub use fetch::{
    cancellable, fetch_account_balances, fetch_account_state, fetch_bond_state,
    fetch_circulating_supply, fetch_runway, fetch_treasury, fetch_treasury_readings,
    fetch_user_bond, fetch_user_bonds, BondOutcomes, RunwayReport,
};
pub use policy::ReadPolicy;
pub use snapshot::{LedgerSnapshot, SnapshotLedger};
pub use throttle::ThrottledReader;
pub use tokio_util::sync::CancellationToken;
