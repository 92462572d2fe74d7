// crates/reserve-ledger/src/policy.rs
//
// Limits applied to every ledger read: per-attempt timeout, bounded retries
// with exponential backoff, and a cap on concurrent requests per reader.

use std::time::Duration;

use reserve_core::ReserveError;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry; doubles per retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Default ceiling for the retry delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(4);

/// Default cap on simultaneous requests against one ledger connection.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Read limits for one ledger connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPolicy {
    /// Upper bound on a single attempt.
    pub timeout: Duration,
    /// Retries after the first attempt, for transient failures only.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Ceiling on the retry delay.
    pub max_backoff: Duration,
    /// Maximum number of reads in flight at once.
    pub max_concurrent_requests: usize,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl ReadPolicy {
    /// Check that the policy can make progress.
    ///
    /// # Errors
    /// Returns `ReserveError::Config` for a zero timeout or a zero concurrency cap.
    pub fn validate(&self) -> Result<(), ReserveError> {
        if self.timeout.is_zero() {
            return Err(ReserveError::Config("ledger timeout must be non-zero".to_string()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ReserveError::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(ReadPolicy::default().validate().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let policy = ReadPolicy {
            max_concurrent_requests: 0,
            ..ReadPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(ReserveError::Config(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let policy = ReadPolicy {
            timeout: Duration::ZERO,
            ..ReadPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn backoff_doubles_up_to_ceiling() {
        let policy = ReadPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_millis(250));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(6), Duration::from_secs(4));
        assert_eq!(policy.backoff_for(60), Duration::from_secs(4));
    }
}
