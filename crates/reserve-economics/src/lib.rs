// crates/reserve-economics/src/lib.rs
//
// reserve-economics: pure calculators over raw ledger readings.
//
// Treasury valuation, runway, per-account bond economics, and wallet
// balances. Every function here is side-effect free; ledger access lives in
// reserve-ledger.

pub mod account;
pub mod bonds;
pub mod runway;
pub mod treasury;

// Re-export key types for ergonomic access from downstream crates.
pub use account::compute_account_balances;
pub use bonds::{compute_user_bond, compute_user_bonds};
pub use runway::{compute_runway, runway_epochs, Runway, DEFAULT_REBASE_RATE, EPOCHS_PER_DAY};
pub use treasury::{aggregate, oracle_unit_price, value_asset};
