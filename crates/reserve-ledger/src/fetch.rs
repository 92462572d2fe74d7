// crates/reserve-ledger/src/fetch.rs
//
// Fan-out fetch pipelines.
//
// Every read a computation needs is independent of the others, so each
// pipeline issues all of them at once and joins before computing anything.
// Concurrency limits, timeouts, and retries belong to the reader (see
// `ThrottledReader`). Every pipeline can be aborted through a
// `CancellationToken`; an aborted pipeline returns `ReserveError::Cancelled`
// and never a partial result.

use std::collections::BTreeMap;
use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use reserve_core::{
    normalize_units, AccountBalances, AccountContracts, AccountState, AssetDescriptor, AssetKind,
    BondDescriptor, BondState, LedgerReader, RawLedgerReading, ReserveError, TreasurySnapshot,
    UserBondSummary, PROTOCOL_DECIMALS, U256,
};
use reserve_economics::{
    aggregate, compute_account_balances, compute_user_bond, compute_user_bonds, Runway,
};

/// Per-bond outcome of `fetch_user_bonds`, keyed by bond name.
pub type BondOutcomes = BTreeMap<String, Result<UserBondSummary, ReserveError>>;

/// Treasury snapshot together with the runway derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayReport {
    pub snapshot: TreasurySnapshot,
    /// Circulating supply in whole protocol tokens.
    pub circulating_supply: f64,
    pub rebase_rate: f64,
    pub runway: Runway,
}

/// Drive `fut` to completion unless `cancel` fires first.
///
/// # Errors
/// Returns `ReserveError::Cancelled` if the token is (or becomes) cancelled
/// before `fut` completes.
pub async fn cancellable<T, Fut>(cancel: &CancellationToken, fut: Fut) -> Result<T, ReserveError>
where
    Fut: Future<Output = Result<T, ReserveError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReserveError::Cancelled),
        result = fut => result,
    }
}

async fn read_asset<R>(reader: &R, treasury: &str, asset: &AssetDescriptor) -> RawLedgerReading
where
    R: LedgerReader + ?Sized,
{
    match &asset.kind {
        AssetKind::FixedReserve => RawLedgerReading {
            asset: asset.clone(),
            balance: reader.read_balance(&asset.id, treasury).await,
            oracle_price: None,
        },
        AssetKind::OraclePriced { oracle, .. } => {
            let (balance, price) = futures::join!(
                reader.read_balance(&asset.id, treasury),
                reader.read_oracle_price(oracle)
            );
            RawLedgerReading {
                asset: asset.clone(),
                balance,
                oracle_price: Some(price),
            }
        }
        AssetKind::PooledPosition { valuation_source } => RawLedgerReading {
            asset: asset.clone(),
            balance: reader.read_pooled_value(valuation_source, &asset.id).await,
            oracle_price: None,
        },
    }
}

/// Read every asset's raw state concurrently. Failed reads are recorded in
/// the returned readings rather than short-circuiting.
pub async fn fetch_treasury_readings<R>(
    reader: &R,
    treasury: &str,
    assets: &[AssetDescriptor],
) -> Vec<RawLedgerReading>
where
    R: LedgerReader + ?Sized,
{
    tracing::debug!("Fetching {} treasury assets held by {}", assets.len(), treasury);
    join_all(assets.iter().map(|asset| read_asset(reader, treasury, asset))).await
}

/// Read and aggregate the treasury.
///
/// # Errors
/// `ReserveError::Cancelled` if aborted, otherwise whatever `aggregate`
/// rejects (including the first failed read).
pub async fn fetch_treasury<R>(
    reader: &R,
    treasury: &str,
    assets: &[AssetDescriptor],
    cancel: &CancellationToken,
) -> Result<TreasurySnapshot, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let readings = cancellable(cancel, async {
        Ok(fetch_treasury_readings(reader, treasury, assets).await)
    })
    .await?;
    aggregate(&readings)
}

/// Circulating supply of the protocol token in whole tokens.
pub async fn fetch_circulating_supply<R>(reader: &R, token: &str) -> Result<f64, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let raw = reader.read_circulating_supply(token).await?;
    Ok(normalize_units(raw, PROTOCOL_DECIMALS)?.value())
}

/// Read the treasury and circulating supply together and derive the runway.
///
/// # Errors
/// `ReserveError::Cancelled` if aborted; any read, aggregation, or runway
/// error otherwise.
pub async fn fetch_runway<R>(
    reader: &R,
    treasury: &str,
    protocol_token: &str,
    assets: &[AssetDescriptor],
    rebase_rate: f64,
    cancel: &CancellationToken,
) -> Result<RunwayReport, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let (readings, supply) = cancellable(cancel, async {
        Ok(futures::join!(
            fetch_treasury_readings(reader, treasury, assets),
            fetch_circulating_supply(reader, protocol_token)
        ))
    })
    .await?;

    let snapshot = aggregate(&readings)?;
    let circulating_supply = supply?;
    let runway = Runway::compute(snapshot.total.value(), circulating_supply, rebase_rate)?;
    Ok(RunwayReport {
        snapshot,
        circulating_supply,
        rebase_rate,
        runway,
    })
}

/// Read one account's raw state for one bond: depository record, pending
/// payout, reserve allowance, and reserve balance, all concurrently.
pub async fn fetch_bond_state<R>(reader: &R, bond: &BondDescriptor, account: &str) -> Result<BondState, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let (info, pending_payout, allowance, balance) = futures::try_join!(
        reader.read_bond_info(&bond.bond_address, account),
        reader.read_pending_payout(&bond.bond_address, account),
        reader.read_allowance(&bond.reserve_address, account, &bond.bond_address),
        reader.read_balance(&bond.reserve_address, account)
    )?;
    Ok(BondState::from_parts(info, pending_payout, allowance, balance))
}

/// Summarize one bond for `account`.
///
/// With no account this returns the disconnected summary without touching
/// the ledger.
pub async fn fetch_user_bond<R>(
    reader: &R,
    bond: &BondDescriptor,
    account: Option<&str>,
    cancel: &CancellationToken,
) -> Result<UserBondSummary, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let Some(account) = account else {
        return compute_user_bond(bond, None);
    };
    let state = cancellable(cancel, fetch_bond_state(reader, bond, account)).await?;
    compute_user_bond(bond, Some(&state))
}

/// Summarize every bond for `account`, each bond independently: one bond's
/// failure does not hide the others.
///
/// With no account every bond gets its disconnected summary and nothing is
/// read.
///
/// # Errors
/// Only `ReserveError::Cancelled`; per-bond failures are in the map.
pub async fn fetch_user_bonds<R>(
    reader: &R,
    bonds: &[BondDescriptor],
    account: Option<&str>,
    cancel: &CancellationToken,
) -> Result<BondOutcomes, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let Some(account) = account else {
        let summaries = compute_user_bonds(bonds.iter().map(|bond| (bond, None)))?;
        return Ok(summaries
            .into_iter()
            .map(|(name, summary)| (name, Ok(summary)))
            .collect());
    };

    tracing::debug!("Fetching {} bonds for {}", bonds.len(), account);
    let states = cancellable(cancel, async {
        Ok(join_all(bonds.iter().map(|bond| fetch_bond_state(reader, bond, account))).await)
    })
    .await?;

    Ok(bonds
        .iter()
        .zip(states)
        .map(|(bond, state)| {
            let summary = state.and_then(|s| compute_user_bond(bond, Some(&s)));
            (bond.name.clone(), summary)
        })
        .collect())
}

/// Read one account's wallet balances and staking allowances, all
/// concurrently. Without a pool token the pool balance is zero and not read.
pub async fn fetch_account_state<R>(
    reader: &R,
    contracts: &AccountContracts,
    account: &str,
) -> Result<AccountState, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let pool_balance = async {
        match &contracts.pool_token {
            Some(pool) => reader.read_balance(pool, account).await,
            None => Ok(U256::zero()),
        }
    };

    let (
        protocol_balance,
        staked_balance,
        pool_balance,
        stable_balance,
        stake_allowance,
        unstake_allowance,
    ) = futures::try_join!(
        reader.read_balance(&contracts.protocol_token, account),
        reader.read_balance(&contracts.staked_token, account),
        pool_balance,
        reader.read_balance(&contracts.stable_token, account),
        reader.read_allowance(&contracts.protocol_token, account, &contracts.staking_helper),
        reader.read_allowance(&contracts.staked_token, account, &contracts.staking)
    )?;

    Ok(AccountState {
        protocol_balance,
        staked_balance,
        pool_balance,
        stable_balance,
        stake_allowance,
        unstake_allowance,
    })
}

/// Wallet balances for `account`.
///
/// With no account this returns `AccountBalances::disconnected` without
/// touching the ledger.
///
/// # Errors
/// `ReserveError::Cancelled` if aborted; the first failed read otherwise.
pub async fn fetch_account_balances<R>(
    reader: &R,
    contracts: &AccountContracts,
    account: Option<&str>,
    cancel: &CancellationToken,
) -> Result<AccountBalances, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let Some(account) = account else {
        return compute_account_balances(contracts, None);
    };

    tracing::debug!("Fetching wallet balances for {}", account);
    let state = cancellable(cancel, fetch_account_state(reader, contracts, account)).await?;
    compute_account_balances(contracts, Some(&state))
}

