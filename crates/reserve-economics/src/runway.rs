// crates/reserve-economics/src/runway.rs
//
// Treasury runway: how many days the treasury sustains the rebase.
//
// Every epoch the staked supply grows by `rebase_rate`. Starting from the
// circulating supply, the treasury is exhausted after
//   epochs = ln(total_value / circulating_supply) / ln(1 + rebase_rate)
// epochs, and there are EPOCHS_PER_DAY epochs per day.
//
// A treasury worth less than the circulating supply gives a negative runway.
// That is a real (already depleted) result and is returned as such.

use serde::{Deserialize, Serialize};

use reserve_core::ReserveError;

/// Default per-epoch rebase rate (0.59%).
pub const DEFAULT_REBASE_RATE: f64 = 0.0059;

/// Rebase epochs per day (one every 8 hours).
pub const EPOCHS_PER_DAY: f64 = 3.0;

/// Runway expressed both in epochs and in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    pub epochs: f64,
    pub days: f64,
}

impl Runway {
    /// Compute the runway for the given treasury value and supply.
    ///
    /// # Errors
    /// See `runway_epochs`.
    pub fn compute(total_value: f64, circulating_supply: f64, rebase_rate: f64) -> Result<Self, ReserveError> {
        let epochs = runway_epochs(total_value, circulating_supply, rebase_rate)?;
        Ok(Self {
            epochs,
            days: epochs / EPOCHS_PER_DAY,
        })
    }

    /// Whether the treasury is already worth less than the circulating supply.
    pub fn is_depleted(&self) -> bool {
        self.epochs < 0.0
    }
}

/// Number of rebase epochs the treasury sustains.
///
/// # Errors
/// - `ReserveError::InvalidInput` if `circulating_supply <= 0`, or
///   `rebase_rate` is not a finite positive number.
/// - `ReserveError::InvalidState` if `total_value <= 0`, or the result is not
///   finite.
pub fn runway_epochs(total_value: f64, circulating_supply: f64, rebase_rate: f64) -> Result<f64, ReserveError> {
    // `!(x > 0.0)` also catches NaN.
    if !(circulating_supply > 0.0) {
        return Err(ReserveError::InvalidInput(format!(
            "circulating supply must be positive, got {}",
            circulating_supply
        )));
    }
    if !rebase_rate.is_finite() || rebase_rate <= 0.0 {
        return Err(ReserveError::InvalidInput(format!(
            "rebase rate must be a finite positive number, got {}",
            rebase_rate
        )));
    }
    if !(total_value > 0.0) {
        return Err(ReserveError::InvalidState(format!(
            "treasury value must be positive to compute runway, got {}",
            total_value
        )));
    }

    let epochs = (total_value / circulating_supply).ln() / rebase_rate.ln_1p();
    if !epochs.is_finite() {
        return Err(ReserveError::InvalidState(format!(
            "runway is not finite for treasury value {} and supply {}",
            total_value, circulating_supply
        )));
    }
    Ok(epochs)
}

/// Runway in days.
///
/// # Errors
/// See `runway_epochs`.
pub fn compute_runway(total_value: f64, circulating_supply: f64, rebase_rate: f64) -> Result<f64, ReserveError> {
    Ok(runway_epochs(total_value, circulating_supply, rebase_rate)? / EPOCHS_PER_DAY)
}
