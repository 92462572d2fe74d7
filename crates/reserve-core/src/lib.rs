// crates/reserve-core/src/lib.rs
//
// reserve-core: Core types, fixed-point decimal utilities, and the ledger
// reader trait for the Reserve treasury engine.
//
// This is the leaf crate that every other crate in the workspace depends on.
// Everything here is pure: no I/O, no logging, no state between calls.

pub mod account;
pub mod asset;
pub mod bond;
pub mod decimal;
pub mod error;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use reserve_core::TreasurySnapshot;`

// Account types
pub use account::{AccountBalances, AccountContracts, AccountState};

// Asset types
pub use asset::{AssetDescriptor, AssetKind, RawLedgerReading, ReadOutcome, TreasuryEntry, TreasurySnapshot};

// Bond types
pub use bond::{BondDescriptor, BondInfo, BondState, UserBondSummary};

// Decimal utilities
pub use decimal::{
    format_units, normalize, normalize_units, pow10, sum_values, u256_to_f64, NormalizedValue,
    MAX_DECIMALS, ORACLE_DECIMALS, PROTOCOL_DECIMALS, U256,
};

// Error type
pub use error::ReserveError;

// Traits
pub use traits::LedgerReader;
