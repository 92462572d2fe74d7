// crates/reserve-ledger/src/snapshot.rs
//
// In-memory ledger backed by a JSON dump of raw contract state.
//
// Quantities are `0x`-prefixed hex strings, the way JSON-RPC returns them.
// Unknown contracts revert; unknown holders of a known contract read as
// zero, matching ERC-20 semantics. The reader also records how many reads
// it served and the peak number in flight, and can replay scripted failures
// and artificial latency.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use reserve_core::{BondInfo, LedgerReader, ReserveError, U256};

/// Raw ledger state keyed by contract address, then holder address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// token -> holder -> balance
    #[serde(default)]
    pub balances: BTreeMap<String, BTreeMap<String, U256>>,
    /// token -> decimals
    #[serde(default)]
    pub decimals: BTreeMap<String, u32>,
    /// oracle -> latest signed price
    #[serde(default)]
    pub oracle_prices: BTreeMap<String, i128>,
    /// valuation source -> position -> total value (9 decimals)
    #[serde(default)]
    pub pooled_values: BTreeMap<String, BTreeMap<String, U256>>,
    /// bond -> holder -> bondInfo
    #[serde(default)]
    pub bonds: BTreeMap<String, BTreeMap<String, BondInfo>>,
    /// bond -> holder -> pending payout (9 decimals)
    #[serde(default)]
    pub pending_payouts: BTreeMap<String, BTreeMap<String, U256>>,
    /// token -> holder -> spender -> allowance
    #[serde(default)]
    pub allowances: BTreeMap<String, BTreeMap<String, BTreeMap<String, U256>>>,
    /// protocol token -> circulating supply (9 decimals)
    #[serde(default)]
    pub circulating_supply: BTreeMap<String, U256>,
}

impl LedgerSnapshot {
    fn is_token(&self, asset: &str) -> bool {
        self.balances.contains_key(asset) || self.decimals.contains_key(asset)
    }
}

fn not_a_contract(op: &str, address: &str) -> ReserveError {
    ReserveError::ContractRevert(format!("{}: no contract at {}", op, address))
}

/// Decrements the in-flight counter when a read finishes or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A `LedgerReader` serving reads from a `LedgerSnapshot`.
pub struct SnapshotLedger {
    snapshot: LedgerSnapshot,
    latency: Option<Duration>,
    reads: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    scripted_failures: Mutex<HashMap<String, VecDeque<ReserveError>>>,
}

impl SnapshotLedger {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot,
            latency: None,
            reads: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            scripted_failures: Mutex::new(HashMap::new()),
        }
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReserveError> {
        let snapshot: LedgerSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &str) -> Result<Self, ReserveError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ReserveError::Config(format!("cannot read ledger snapshot {}: {}", path, e)))?;
        Self::from_json(&contents)
    }

    /// Delay every read by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next calls of `op` (a `LedgerReader` method name such as
    /// `"read_balance"`) fail with `errors`, in order.
    pub fn fail_next(&self, op: &str, errors: Vec<ReserveError>) -> Result<(), ReserveError> {
        let mut scripted = self
            .scripted_failures
            .lock()
            .map_err(|e| ReserveError::InvalidState(format!("Mutex poisoned: {}", e)))?;
        scripted.entry(op.to_string()).or_default().extend(errors);
        Ok(())
    }

    /// Total reads served, including failed ones.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Highest number of reads observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn serve<T>(
        &self,
        op: &str,
        lookup: impl FnOnce(&LedgerSnapshot) -> Result<T, ReserveError>,
    ) -> Result<T, ReserveError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = {
            let mut failures = self
                .scripted_failures
                .lock()
                .map_err(|e| ReserveError::InvalidState(format!("Mutex poisoned: {}", e)))?;
            failures.get_mut(op).and_then(VecDeque::pop_front)
        };
        match scripted {
            Some(err) => Err(err),
            None => lookup(&self.snapshot),
        }
    }
}

#[async_trait]
impl LedgerReader for SnapshotLedger {
    async fn read_balance(&self, asset: &str, owner: &str) -> Result<U256, ReserveError> {
        self.serve("read_balance", |s| {
            if !s.is_token(asset) {
                return Err(not_a_contract("balanceOf", asset));
            }
            Ok(s.balances
                .get(asset)
                .and_then(|holders| holders.get(owner))
                .copied()
                .unwrap_or_default())
        })
        .await
    }

    async fn read_decimals(&self, asset: &str) -> Result<u32, ReserveError> {
        self.serve("read_decimals", |s| {
            s.decimals
                .get(asset)
                .copied()
                .ok_or_else(|| not_a_contract("decimals", asset))
        })
        .await
    }

    async fn read_oracle_price(&self, oracle: &str) -> Result<i128, ReserveError> {
        self.serve("read_oracle_price", |s| {
            s.oracle_prices
                .get(oracle)
                .copied()
                .ok_or_else(|| not_a_contract("assetPrice", oracle))
        })
        .await
    }

    async fn read_pooled_value(&self, valuation_source: &str, position: &str) -> Result<U256, ReserveError> {
        self.serve("read_pooled_value", |s| {
            let positions = s
                .pooled_values
                .get(valuation_source)
                .ok_or_else(|| not_a_contract("getTotalValue", valuation_source))?;
            positions.get(position).copied().ok_or_else(|| {
                ReserveError::ContractRevert(format!(
                    "getTotalValue: {} is not a valued pair",
                    position
                ))
            })
        })
        .await
    }

    async fn read_bond_info(&self, bond: &str, owner: &str) -> Result<BondInfo, ReserveError> {
        self.serve("read_bond_info", |s| {
            let holders = s
                .bonds
                .get(bond)
                .ok_or_else(|| not_a_contract("bondInfo", bond))?;
            Ok(holders.get(owner).copied().unwrap_or_default())
        })
        .await
    }

    async fn read_pending_payout(&self, bond: &str, owner: &str) -> Result<U256, ReserveError> {
        self.serve("read_pending_payout", |s| {
            if !s.bonds.contains_key(bond) && !s.pending_payouts.contains_key(bond) {
                return Err(not_a_contract("pendingPayoutFor", bond));
            }
            Ok(s.pending_payouts
                .get(bond)
                .and_then(|holders| holders.get(owner))
                .copied()
                .unwrap_or_default())
        })
        .await
    }

    async fn read_allowance(&self, asset: &str, owner: &str, spender: &str) -> Result<U256, ReserveError> {
        self.serve("read_allowance", |s| {
            if !s.is_token(asset) && !s.allowances.contains_key(asset) {
                return Err(not_a_contract("allowance", asset));
            }
            Ok(s.allowances
                .get(asset)
                .and_then(|owners| owners.get(owner))
                .and_then(|spenders| spenders.get(spender))
                .copied()
                .unwrap_or_default())
        })
        .await
    }

    async fn read_circulating_supply(&self, token: &str) -> Result<U256, ReserveError> {
        self.serve("read_circulating_supply", |s| {
            s.circulating_supply
                .get(token)
                .copied()
                .ok_or_else(|| not_a_contract("circulatingSupply", token))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "balances": { "0xdai": { "0xtreasury": "0xde0b6b3a7640000" } },
        "decimals": { "0xdai": 18 },
        "oracle_prices": { "0xfeed": 150000000 },
        "bonds": { "0xbond": { "0xalice": { "payout": "0x3b9aca00", "vesting": "0x3e8", "last_block": "0x1388" } } },
        "circulating_supply": { "0xhec": "0x3b9aca00" }
    }"#;

    #[tokio::test]
    async fn reads_hex_quantities() {
        let ledger = SnapshotLedger::from_json(SNAPSHOT).unwrap();
        let balance = ledger.read_balance("0xdai", "0xtreasury").await.unwrap();
        assert_eq!(balance, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(ledger.read_decimals("0xdai").await.unwrap(), 18);
        assert_eq!(ledger.read_oracle_price("0xfeed").await.unwrap(), 150_000_000);

        let info = ledger.read_bond_info("0xbond", "0xalice").await.unwrap();
        assert_eq!(info.payout, U256::from(1_000_000_000u64));
        assert_eq!(info.vesting + info.last_block, 6_000);
        assert_eq!(ledger.read_count(), 4);
    }

    #[tokio::test]
    async fn unknown_holder_reads_zero() {
        let ledger = SnapshotLedger::from_json(SNAPSHOT).unwrap();
        assert_eq!(ledger.read_balance("0xdai", "0xbob").await.unwrap(), U256::zero());
        assert_eq!(ledger.read_allowance("0xdai", "0xbob", "0xbond").await.unwrap(), U256::zero());
        assert_eq!(ledger.read_pending_payout("0xbond", "0xbob").await.unwrap(), U256::zero());
        assert_eq!(ledger.read_bond_info("0xbond", "0xbob").await.unwrap(), BondInfo::default());
    }

    #[tokio::test]
    async fn unknown_contract_reverts() {
        let ledger = SnapshotLedger::from_json(SNAPSHOT).unwrap();
        assert!(matches!(
            ledger.read_balance("0xnope", "0xtreasury").await,
            Err(ReserveError::ContractRevert(_))
        ));
        assert!(matches!(
            ledger.read_pooled_value("0xcalc", "0xlp").await,
            Err(ReserveError::ContractRevert(_))
        ));
        assert!(matches!(
            ledger.read_circulating_supply("0xdai").await,
            Err(ReserveError::ContractRevert(_))
        ));
    }

    #[tokio::test]
    async fn scripted_failures_replay_in_order() {
        let ledger = SnapshotLedger::from_json(SNAPSHOT).unwrap();
        ledger
            .fail_next(
                "read_decimals",
                vec![
                    ReserveError::LedgerRead("first".into()),
                    ReserveError::ContractRevert("second".into()),
                ],
            )
            .unwrap();
        assert_eq!(
            ledger.read_decimals("0xdai").await.unwrap_err(),
            ReserveError::LedgerRead("first".into())
        );
        assert_eq!(
            ledger.read_decimals("0xdai").await.unwrap_err(),
            ReserveError::ContractRevert("second".into())
        );
        assert_eq!(ledger.read_decimals("0xdai").await.unwrap(), 18);
    }

    #[test]
    fn malformed_snapshot_is_serialization_error() {
        let err = SnapshotLedger::from_json("{ \"decimals\": [] }").err().unwrap();
        assert!(matches!(err, ReserveError::Serialization(_)));
    }
}
