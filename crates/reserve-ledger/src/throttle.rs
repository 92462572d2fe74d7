// crates/reserve-ledger/src/throttle.rs
//
// A `LedgerReader` decorator that enforces a `ReadPolicy`.
//
// Every read waits for one of `max_concurrent_requests` permits, runs under
// the per-attempt timeout, and is retried with backoff on transient failure.
// The permit is released between attempts so backoff never blocks other
// reads, and time spent queueing for a permit does not count against the
// timeout.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use reserve_core::{BondInfo, LedgerReader, ReserveError, U256};

use crate::policy::ReadPolicy;
use crate::retry::{with_retry, with_timeout};

/// Wraps a reader with concurrency, timeout, and retry limits.
pub struct ThrottledReader<R> {
    inner: R,
    permits: Arc<Semaphore>,
    policy: ReadPolicy,
}

impl<R: LedgerReader> ThrottledReader<R> {
    /// Wrap `inner` with the given policy.
    ///
    /// # Errors
    /// Returns `ReserveError::Config` if the policy is invalid.
    pub fn new(inner: R, policy: ReadPolicy) -> Result<Self, ReserveError> {
        policy.validate()?;
        Ok(Self {
            inner,
            permits: Arc::new(Semaphore::new(policy.max_concurrent_requests)),
            policy,
        })
    }

    /// The wrapped reader.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// The policy every read runs under.
    pub fn policy(&self) -> &ReadPolicy {
        &self.policy
    }

    async fn gated<T, F, Fut>(&self, op: &'static str, mut read: F) -> Result<T, ReserveError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ReserveError>>,
    {
        let permits = &self.permits;
        let timeout = self.policy.timeout;
        with_retry(&self.policy, op, || {
            let attempt = read();
            async move {
                let _permit = permits
                    .acquire()
                    .await
                    .map_err(|_| ReserveError::Cancelled)?;
                with_timeout(timeout, op, attempt).await
            }
        })
        .await
    }
}

#[async_trait]
impl<R: LedgerReader> LedgerReader for ThrottledReader<R> {
    async fn read_balance(&self, asset: &str, owner: &str) -> Result<U256, ReserveError> {
        self.gated("read_balance", || self.inner.read_balance(asset, owner))
            .await
    }

    async fn read_decimals(&self, asset: &str) -> Result<u32, ReserveError> {
        self.gated("read_decimals", || self.inner.read_decimals(asset))
            .await
    }

    async fn read_oracle_price(&self, oracle: &str) -> Result<i128, ReserveError> {
        self.gated("read_oracle_price", || self.inner.read_oracle_price(oracle))
            .await
    }

    async fn read_pooled_value(&self, valuation_source: &str, position: &str) -> Result<U256, ReserveError> {
        self.gated("read_pooled_value", || {
            self.inner.read_pooled_value(valuation_source, position)
        })
        .await
    }

    async fn read_bond_info(&self, bond: &str, owner: &str) -> Result<BondInfo, ReserveError> {
        self.gated("read_bond_info", || self.inner.read_bond_info(bond, owner))
            .await
    }

    async fn read_pending_payout(&self, bond: &str, owner: &str) -> Result<U256, ReserveError> {
        self.gated("read_pending_payout", || {
            self.inner.read_pending_payout(bond, owner)
        })
        .await
    }

    async fn read_allowance(&self, asset: &str, owner: &str, spender: &str) -> Result<U256, ReserveError> {
        self.gated("read_allowance", || {
            self.inner.read_allowance(asset, owner, spender)
        })
        .await
    }

    async fn read_circulating_supply(&self, token: &str) -> Result<U256, ReserveError> {
        self.gated("read_circulating_supply", || {
            self.inner.read_circulating_supply(token)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures::future::join_all;

    use crate::snapshot::{LedgerSnapshot, SnapshotLedger};

    fn policy(max_concurrent_requests: usize) -> ReadPolicy {
        ReadPolicy {
            timeout: Duration::from_millis(200),
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            max_concurrent_requests,
        }
    }

    fn ledger() -> SnapshotLedger {
        let mut snapshot = LedgerSnapshot::default();
        snapshot
            .balances
            .entry("0xdai".to_string())
            .or_default()
            .insert("0xtreasury".to_string(), U256::from(5u64));
        snapshot.decimals.insert("0xdai".to_string(), 18);
        SnapshotLedger::new(snapshot)
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_cap() {
        let reader = ThrottledReader::new(ledger().with_latency(Duration::from_millis(10)), policy(3)).unwrap();
        let reads = (0..12).map(|_| reader.read_balance("0xdai", "0xtreasury"));
        let results = join_all(reads).await;

        assert!(results.iter().all(|r| r.as_ref().map(|v| *v == U256::from(5u64)).unwrap_or(false)));
        assert_eq!(reader.inner().read_count(), 12);
        assert!(reader.inner().peak_in_flight() <= 3);
        assert!(reader.inner().peak_in_flight() >= 2);
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let ledger = ledger();
        ledger
            .fail_next(
                "read_decimals",
                vec![
                    ReserveError::LedgerRead("502 bad gateway".into()),
                    ReserveError::LedgerRead("502 bad gateway".into()),
                ],
            )
            .unwrap();
        let reader = ThrottledReader::new(ledger, policy(2)).unwrap();

        assert_eq!(reader.read_decimals("0xdai").await.unwrap(), 18);
        assert_eq!(reader.inner().read_count(), 3);
    }

    #[tokio::test]
    async fn reverts_are_attempted_once() {
        let ledger = ledger();
        ledger
            .fail_next(
                "read_balance",
                vec![ReserveError::ContractRevert("paused".into())],
            )
            .unwrap();
        let reader = ThrottledReader::new(ledger, policy(2)).unwrap();

        let err = reader.read_balance("0xdai", "0xtreasury").await.unwrap_err();
        assert_eq!(err, ReserveError::ContractRevert("paused".into()));
        assert_eq!(reader.inner().read_count(), 1);
    }

    #[tokio::test]
    async fn slow_reads_time_out_after_retries() {
        let slow = ledger().with_latency(Duration::from_millis(100));
        let reader = ThrottledReader::new(
            slow,
            ReadPolicy {
                timeout: Duration::from_millis(10),
                ..policy(1)
            },
        )
        .unwrap();

        let err = reader.read_balance("0xdai", "0xtreasury").await.unwrap_err();
        assert!(matches!(err, ReserveError::LedgerRead(_)));
        assert_eq!(reader.inner().read_count(), 3);
    }

    #[test]
    fn invalid_policy_rejected() {
        assert!(ThrottledReader::new(ledger(), policy(0)).is_err());
    }

    #[test]
    fn policy_is_kept_as_given() {
        let reader = ThrottledReader::new(ledger(), policy(5)).unwrap();
        assert_eq!(reader.policy(), &policy(5));
    }
}
