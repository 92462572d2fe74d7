// crates/reserve-ledger/src/assets.rs
//
// Resolve configured treasury assets into descriptors.
//
// Configuration may leave an asset's decimals unset; those are read from
// the ledger, all at once, before any valuation happens.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use reserve_core::{
    AssetDescriptor, AssetKind, LedgerReader, ReserveError, MAX_DECIMALS, PROTOCOL_DECIMALS,
};

/// A treasury asset as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Read from the ledger when absent.
    #[serde(default)]
    pub decimals: Option<u32>,
    pub kind: AssetKind,
}

impl AssetConfig {
    /// Whether resolving this asset needs a `read_decimals` call.
    /// Pooled positions always use protocol decimals.
    pub fn needs_decimals(&self) -> bool {
        self.decimals.is_none() && !matches!(self.kind, AssetKind::PooledPosition { .. })
    }

    fn into_descriptor(self, decimals: u32) -> Result<AssetDescriptor, ReserveError> {
        if decimals > MAX_DECIMALS {
            return Err(ReserveError::InvalidDecimals {
                decimals,
                max: MAX_DECIMALS,
            });
        }
        Ok(AssetDescriptor {
            id: self.id,
            symbol: self.symbol,
            decimals,
            kind: self.kind,
        })
    }
}

/// Turn asset configs into descriptors, reading missing decimals
/// concurrently. Order is preserved.
///
/// # Errors
/// Fails if any decimals read fails or returns a value above `MAX_DECIMALS`.
pub async fn resolve_assets<R>(reader: &R, configs: &[AssetConfig]) -> Result<Vec<AssetDescriptor>, ReserveError>
where
    R: LedgerReader + ?Sized,
{
    let pending = configs.iter().filter(|c| c.needs_decimals()).count();
    if pending > 0 {
        tracing::debug!("Reading decimals for {} treasury assets", pending);
    }

    let resolved = configs.iter().map(|config| async move {
        let decimals = match (config.decimals, &config.kind) {
            (Some(d), _) => d,
            (None, AssetKind::PooledPosition { .. }) => PROTOCOL_DECIMALS,
            (None, _) => reader.read_decimals(&config.id).await?,
        };
        config.clone().into_descriptor(decimals)
    });
    try_join_all(resolved).await
}
