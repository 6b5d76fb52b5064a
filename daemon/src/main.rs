//! Shellbook daemon: runs the chain-identity verification API.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use shellbook_crypto::OsNonceSource;
use shellbook_ledger::HttpLedgerClient;
use shellbook_registry::{HttpRegistryClient, NoRegistry, RegistryLookup};
use shellbook_rpc::{ApiMetrics, AppState, RpcServer};
use shellbook_store_lmdb::LmdbEnvironment;
use shellbook_types::SystemClock;
use shellbook_utils::{init_logging, LogFormat};
use shellbook_verification::VerificationOrchestrator;

use crate::config::ServiceConfig;

#[derive(Parser)]
#[command(name = "shellbook-daemon", about = "Shellbook chain-identity verification service")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "SHELLBOOK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP API to.
    #[arg(long, env = "SHELLBOOK_BIND_ADDRESS", global = true)]
    bind_address: Option<String>,

    /// HTTP API port.
    #[arg(long, env = "SHELLBOOK_PORT", global = true)]
    port: Option<u16>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "SHELLBOOK_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Chain RPC endpoint.
    #[arg(long, env = "SHELLBOOK_LEDGER_RPC_URL", global = true)]
    ledger_rpc_url: Option<String>,

    /// History indexer endpoint.
    #[arg(long, env = "SHELLBOOK_LEDGER_INDEXER_URL", global = true)]
    ledger_indexer_url: Option<String>,

    /// Agent registry endpoint.
    #[arg(long, env = "SHELLBOOK_REGISTRY_URL", global = true)]
    registry_url: Option<String>,

    /// Require a memo-carrying transfer in addition to the signature.
    #[arg(long, env = "SHELLBOOK_REQUIRE_TRANSACTION_PROOF", global = true)]
    require_transaction_proof: Option<bool>,

    /// Expose Prometheus metrics at /metrics.
    #[arg(long, env = "SHELLBOOK_ENABLE_METRICS", global = true)]
    enable_metrics: Option<bool>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SHELLBOOK_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SHELLBOOK_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

impl Cli {
    /// Layer CLI flags and env vars over `base`.
    fn apply(self, mut base: ServiceConfig) -> (ServiceConfig, Command) {
        if let Some(v) = self.bind_address {
            base.bind_address = v;
        }
        if let Some(v) = self.port {
            base.port = v;
        }
        if let Some(v) = self.data_dir {
            base.data_dir = v;
        }
        if let Some(v) = self.ledger_rpc_url {
            base.ledger_rpc_url = v;
        }
        if let Some(v) = self.ledger_indexer_url {
            base.ledger_indexer_url = v;
        }
        if self.registry_url.is_some() {
            base.registry_url = self.registry_url;
        }
        if let Some(v) = self.require_transaction_proof {
            base.require_transaction_proof = v;
        }
        if let Some(v) = self.enable_metrics {
            base.enable_metrics = v;
        }
        if let Some(v) = self.log_format {
            base.log_format = v;
        }
        if let Some(v) = self.log_level {
            base.log_level = v;
        }
        (base, self.command)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(path)?,
        None => ServiceConfig::default(),
    };
    let config_path = cli.config.clone();
    let (config, command) = cli.apply(base);

    match command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string());
            Ok(())
        }
        Command::Serve => {
            init_logging(config.log_format, &config.log_level);
            if let Some(path) = config_path {
                info!(path = %path.display(), "loaded config");
            }
            serve(config).await
        }
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let env = LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)?;
    let identities = Arc::new(env.identity_store());
    let challenges = Arc::new(env.challenge_store());

    let ledger = Arc::new(HttpLedgerClient::with_timeout(
        config.ledger_rpc_url.clone(),
        config.ledger_indexer_url.clone(),
        timeout,
    ));
    let registry: Arc<dyn RegistryLookup> = match &config.registry_url {
        Some(url) => Arc::new(HttpRegistryClient::with_timeout(url.clone(), timeout)),
        None => {
            warn!("no registry_url configured; every link gets the base trust boost");
            Arc::new(NoRegistry)
        }
    };

    let orchestrator = VerificationOrchestrator::new(
        identities.clone(),
        challenges,
        Arc::new(OsNonceSource),
        ledger,
        registry,
        config.verification(),
    );
    let state = Arc::new(AppState {
        orchestrator,
        identities,
        clock: Arc::new(SystemClock),
        metrics: Arc::new(ApiMetrics::new()),
    });

    info!(
        addr = %addr,
        ledger = %config.ledger_rpc_url,
        indexer = %config.ledger_indexer_url,
        require_transaction_proof = config.require_transaction_proof,
        metrics = config.enable_metrics,
        "starting Shellbook verification service"
    );

    let server = RpcServer::new(addr, state, config.enable_metrics);
    server.start(shutdown_signal()).await?;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
