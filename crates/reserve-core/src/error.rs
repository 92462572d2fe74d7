// crates/reserve-core/src/error.rs

use thiserror::Error;

/// Engine-wide error types for the Reserve treasury engine.
///
/// Only `LedgerRead` is transient. Everything else is either a ledger-level
/// rejection or a problem with the inputs, and retrying cannot fix it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReserveError {
    /// Transient network/RPC failure while reading ledger state.
    #[error("Ledger read error: {0}")]
    LedgerRead(String),

    /// The ledger rejected the call (revert, missing contract).
    #[error("Contract revert: {0}")]
    ContractRevert(String),

    /// Malformed caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Decimal count outside the supported fixed-point range.
    #[error("Invalid decimals: {decimals} (supported range 0..={max})")]
    InvalidDecimals { decimals: u32, max: u32 },

    /// A computed intermediate is outside its valid domain.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The caller aborted the in-flight batch of reads.
    #[error("Ledger read batch cancelled")]
    Cancelled,

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ReserveError {
    /// Whether the ledger boundary may retry the operation that produced
    /// this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReserveError::LedgerRead(_))
    }

    /// Whether the error was caused by the caller's input rather than by the
    /// ledger or the computation.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ReserveError::InvalidInput(_) | ReserveError::InvalidDecimals { .. }
        )
    }
}

impl From<serde_json::Error> for ReserveError {
    fn from(e: serde_json::Error) -> Self {
        ReserveError::Serialization(e.to_string())
    }
}
