// crates/reserve-cli/src/config.rs
//
// Runtime configuration for the Reserve CLI.
// Loaded from a TOML file or populated with sensible defaults.
//
// Per-network tables list the treasury's assets and the bond markets.
// Each bond's reserve decimals are fixed here (`decimals_policy`), never
// derived from its name later.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::time::Duration;

use serde::Deserialize;

use reserve_core::{AccountContracts, BondDescriptor, ReserveError, MAX_DECIMALS};
use reserve_economics::DEFAULT_REBASE_RATE;
use reserve_ledger::policy::{
    DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_CONCURRENT_REQUESTS,
    DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT,
};
use reserve_ledger::{AssetConfig, ReadPolicy};

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Key into `networks` used when `--network` is not given.
    #[serde(default = "default_network")]
    pub network: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub runway: RunwaySettings,

    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// Limits for reads against one ledger connection.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunwaySettings {
    /// Per-epoch rebase rate.
    #[serde(default = "default_rebase_rate")]
    pub rebase_rate: f64,
}

/// Addresses and market list for one network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Address holding the protocol's reserves.
    pub treasury: String,
    /// Protocol token whose circulating supply backs the runway.
    pub protocol_token: String,
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
    #[serde(default)]
    pub bonds: Vec<BondConfig>,
    /// Wallet and staking contracts for the `balances` report.
    #[serde(default)]
    pub account: Option<AccountContracts>,
}

/// A bond market as written in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BondConfig {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_lp: bool,
    /// Reserve-asset decimals: 6 for USDC-style stablecoins.
    #[serde(default = "default_decimals_policy")]
    pub decimals_policy: u32,
    pub bond_address: String,
    pub reserve_address: String,
}

fn default_network() -> String {
    "mainnet".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_initial_backoff_ms() -> u64 {
    DEFAULT_INITIAL_BACKOFF.as_millis() as u64
}

fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF.as_millis() as u64
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_rebase_rate() -> f64 {
    DEFAULT_REBASE_RATE
}

fn default_decimals_policy() -> u32 {
    18
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl Default for RunwaySettings {
    fn default() -> Self {
        Self {
            rebase_rate: default_rebase_rate(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            log_level: default_log_level(),
            ledger: LedgerSettings::default(),
            runway: RunwaySettings::default(),
            networks: BTreeMap::new(),
        }
    }
}

impl LedgerSettings {
    pub fn to_policy(&self) -> ReadPolicy {
        ReadPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }
}

impl BondConfig {
    /// Resolve into the descriptor the calculators consume.
    pub fn to_descriptor(&self) -> BondDescriptor {
        BondDescriptor {
            name: self.name.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.name.to_uppercase()),
            icon: self.icon.clone(),
            is_lp: self.is_lp,
            decimals_policy: self.decimals_policy,
            bond_address: self.bond_address.clone(),
            reserve_address: self.reserve_address.clone(),
        }
    }
}

impl NetworkConfig {
    pub fn bond_descriptors(&self) -> Vec<BondDescriptor> {
        self.bonds.iter().map(BondConfig::to_descriptor).collect()
    }

    /// The wallet contracts, or a config error naming the missing table.
    pub fn account_contracts(&self) -> Result<&AccountContracts, ReserveError> {
        self.account.as_ref().ok_or_else(|| {
            ReserveError::Config("no [networks.<name>.account] table configured".to_string())
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &str) -> Result<Self, ReserveError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ReserveError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ReserveError> {
        let config: AppConfig =
            toml::from_str(contents).map_err(|e| ReserveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-references that serde cannot express.
    pub fn validate(&self) -> Result<(), ReserveError> {
        self.ledger.to_policy().validate()?;

        if !self.runway.rebase_rate.is_finite() || self.runway.rebase_rate <= 0.0 {
            return Err(ReserveError::Config(format!(
                "runway.rebase_rate must be positive, got {}",
                self.runway.rebase_rate
            )));
        }

        for (name, network) in &self.networks {
            for asset in &network.assets {
                if let Some(d) = asset.decimals {
                    if d > MAX_DECIMALS {
                        return Err(ReserveError::Config(format!(
                            "network {}: asset {} has {} decimals (max {})",
                            name, asset.id, d, MAX_DECIMALS
                        )));
                    }
                }
            }

            if let Some(account) = &network.account {
                if account.stable_decimals > MAX_DECIMALS {
                    return Err(ReserveError::Config(format!(
                        "network {}: account.stable_decimals is {} (max {})",
                        name, account.stable_decimals, MAX_DECIMALS
                    )));
                }
            }

            let mut seen = BTreeSet::new();
            for bond in &network.bonds {
                if bond.decimals_policy > MAX_DECIMALS {
                    return Err(ReserveError::Config(format!(
                        "network {}: bond {} has decimals_policy {} (max {})",
                        name, bond.name, bond.decimals_policy, MAX_DECIMALS
                    )));
                }
                if !seen.insert(bond.name.as_str()) {
                    return Err(ReserveError::Config(format!(
                        "network {}: duplicate bond name {}",
                        name, bond.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// The table for `name`.
    pub fn network_config(&self, name: &str) -> Result<&NetworkConfig, ReserveError> {
        self.networks.get(name).ok_or_else(|| {
            ReserveError::Config(format!(
                "network {} is not configured (known: {})",
                name,
                self.networks.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserve_core::AssetKind;

    const SAMPLE: &str = r#"
network = "fantom"

[ledger]
max_concurrent_requests = 4

[networks.fantom]
treasury = "0xtreasury"
protocol_token = "0xhec"

[[networks.fantom.assets]]
id = "0xdai"
symbol = "DAI"
decimals = 18
kind = { type = "fixed_reserve" }

[[networks.fantom.assets]]
id = "0xwftm"
symbol = "wFTM"
kind = { type = "oracle_priced", oracle = "0xfeed" }

[[networks.fantom.assets]]
id = "0xhec_usdc"
kind = { type = "pooled_position", valuation_source = "0xcalc" }

[[networks.fantom.bonds]]
name = "usdc"
display_name = "USDC"
decimals_policy = 6
bond_address = "0xusdc_bond"
reserve_address = "0xusdc"

[[networks.fantom.bonds]]
name = "dai"
bond_address = "0xdai_bond"
reserve_address = "0xdai"
"#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.network, "fantom");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.runway.rebase_rate, DEFAULT_REBASE_RATE);

        let policy = config.ledger.to_policy();
        assert_eq!(policy.max_concurrent_requests, 4);
        assert_eq!(policy.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(policy.timeout, DEFAULT_TIMEOUT);

        let network = config.network_config("fantom").unwrap();
        assert_eq!(network.assets.len(), 3);
        assert_eq!(
            network.assets[1].kind,
            AssetKind::OraclePriced {
                oracle: "0xfeed".to_string(),
                oracle_decimals: 8
            }
        );
        assert_eq!(network.assets[1].decimals, None);
    }

    #[test]
    fn bond_decimals_policy_resolved_at_load() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let bonds = config.network_config("fantom").unwrap().bond_descriptors();
        assert_eq!(bonds[0].decimals_policy, 6);
        assert_eq!(bonds[1].decimals_policy, 18);
        assert_eq!(bonds[1].display_name, "DAI");
    }

    #[test]
    fn unknown_network_is_config_error() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert!(matches!(
            config.network_config("ethereum"),
            Err(ReserveError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_rebase_rate() {
        let err = AppConfig::from_toml("[runway]\nrebase_rate = 0.0\n").unwrap_err();
        assert!(matches!(err, ReserveError::Config(_)));
    }

    #[test]
    fn rejects_zero_concurrency() {
        assert!(AppConfig::from_toml("[ledger]\nmax_concurrent_requests = 0\n").is_err());
    }

    #[test]
    fn rejects_duplicate_bond_names() {
        let toml = r#"
[networks.main]
treasury = "0xt"
protocol_token = "0xp"

[[networks.main.bonds]]
name = "dai"
bond_address = "0xa"
reserve_address = "0xb"

[[networks.main.bonds]]
name = "dai"
bond_address = "0xc"
reserve_address = "0xd"
"#;
        assert!(AppConfig::from_toml(toml).is_err());
    }

    #[test]
    fn rejects_out_of_range_decimals_policy() {
        let toml = r#"
[networks.main]
treasury = "0xt"
protocol_token = "0xp"

[[networks.main.bonds]]
name = "odd"
decimals_policy = 39
bond_address = "0xa"
reserve_address = "0xb"
"#;
        assert!(AppConfig::from_toml(toml).is_err());
    }

    #[test]
    fn account_table_is_optional() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let network = config.network_config("fantom").unwrap();
        assert!(matches!(
            network.account_contracts(),
            Err(ReserveError::Config(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_stable_decimals() {
        let toml = r#"
[networks.main]
treasury = "0xt"
protocol_token = "0xp"

[networks.main.account]
protocol_token = "0xp"
staked_token = "0xs"
stable_token = "0xd"
stable_decimals = 40
staking_helper = "0xh"
staking = "0xk"
"#;
        assert!(AppConfig::from_toml(toml).is_err());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.network, "mainnet");
        assert!(config.networks.is_empty());
    }

    #[test]
    fn example_config_is_valid() {
        let config = AppConfig::from_toml(include_str!("../../../configs/config.toml")).unwrap();
        let network = config.network_config(&config.network).unwrap();
        assert_eq!(network.assets.len(), 4);
        let bonds = network.bond_descriptors();
        assert_eq!(bonds.len(), 3);
        assert!(bonds[2].is_lp);

        let account = network.account_contracts().unwrap();
        assert_eq!(account.staked_token, "0xshec");
        assert_eq!(account.pool_token.as_deref(), Some("0xpool"));
        assert_eq!(account.stable_decimals, 18);
    }
}
