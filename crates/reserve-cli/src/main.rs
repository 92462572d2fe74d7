// crates/reserve-cli/src/main.rs
//
// CLI entrypoint for the Reserve treasury engine.
//
// Loads configuration, initializes tracing, opens a ledger snapshot behind a
// throttled reader, and runs one report: treasury, runway, bonds, or wallet
// balances.
// Ctrl-C cancels in-flight reads; a cancelled report prints nothing partial.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use commands::Context;
use config::AppConfig;
use output::OutputFormat;

use reserve_ledger::{CancellationToken, SnapshotLedger, ThrottledReader};

/// Reserve CLI: treasury runway and bond economics.
#[derive(Parser, Debug)]
#[command(
    name = "reserve",
    version = "0.1.0",
    about = "Treasury valuation, runway, and bond summaries from raw ledger state"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.reserve/config.toml")]
    config: String,

    /// Path to a JSON ledger snapshot.
    #[arg(long, global = true, default_value = "ledger.json")]
    ledger: String,

    /// Network to report on (overrides the config file).
    #[arg(long, global = true)]
    network: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Per-asset treasury breakdown and total value.
    Treasury,

    /// Days of rebase the treasury can sustain.
    Runway {
        /// Per-epoch rebase rate (overrides the config file).
        #[arg(long)]
        rebase_rate: Option<f64>,
    },

    /// Bond summaries for an account.
    Bonds {
        /// Account address; omit for the disconnected view.
        #[arg(long)]
        account: Option<String>,
    },

    /// Wallet balances and staking approvals for an account.
    Balances {
        /// Account address; omit for the disconnected view.
        #[arg(long)]
        account: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Configuration is read before tracing starts so its log level applies;
    // the outcome is logged right after.
    let config_path = expand_tilde(&cli.config);
    let loaded = AppConfig::load(&config_path);
    let log_level = loaded
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!("Could not load config from {}: {}. Using defaults.", config_path, e);
            AppConfig::default()
        }
    };

    let network_name = cli.network.clone().unwrap_or_else(|| config.network.clone());
    let network = config.network_config(&network_name)?.clone();
    tracing::info!(
        "Network {}: {} assets, {} bonds",
        network_name,
        network.assets.len(),
        network.bonds.len()
    );

    let ledger = SnapshotLedger::load(&cli.ledger)?;
    tracing::info!("Ledger snapshot loaded from {}", cli.ledger);
    let reader = ThrottledReader::new(ledger, config.ledger.to_policy())?;
    let policy = reader.policy();
    tracing::info!(
        "Ledger reads: up to {} concurrent, {:?} timeout, {} retries",
        policy.max_concurrent_requests,
        policy.timeout,
        policy.max_retries
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling ledger reads");
            on_interrupt.cancel();
        }
    });

    let ctx = Context {
        reader,
        config,
        network,
        format: cli.format,
        cancel,
    };

    match &cli.command {
        Commands::Treasury => commands::treasury::run(&ctx).await?,
        Commands::Runway { rebase_rate } => commands::runway::run(&ctx, *rebase_rate).await?,
        Commands::Bonds { account } => commands::bonds::run(&ctx, account.as_deref()).await?,
        Commands::Balances { account } => commands::balances::run(&ctx, account.as_deref()).await?,
    }

    Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}
