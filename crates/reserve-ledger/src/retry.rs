// crates/reserve-ledger/src/retry.rs
//
// Timeout and retry helpers for individual ledger reads.
//
// Only `ReserveError::LedgerRead` is retried; a timed-out attempt is turned
// into one. Reverts and input/state errors return on the first attempt.

use std::future::Future;
use std::time::Duration;

use reserve_core::ReserveError;

use crate::policy::ReadPolicy;

/// Run `fut` with an upper bound on its duration.
///
/// # Errors
/// Returns `ReserveError::LedgerRead` if the deadline passes, otherwise the
/// future's own result.
pub async fn with_timeout<T, Fut>(timeout: Duration, op: &str, fut: Fut) -> Result<T, ReserveError>
where
    Fut: Future<Output = Result<T, ReserveError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ReserveError::LedgerRead(format!(
            "{} timed out after {:?}",
            op, timeout
        ))),
    }
}

/// Call `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy's retry budget is spent.
pub async fn with_retry<T, F, Fut>(policy: &ReadPolicy, op: &str, mut attempt: F) -> Result<T, ReserveError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReserveError>>,
{
    let mut retries = 0u32;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                let delay = policy.backoff_for(retries);
                tracing::warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    op,
                    e,
                    retries,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!("{} failed after {} retries: {}", op, retries, e);
                }
                return Err(e);
            }
        }
    }
}
