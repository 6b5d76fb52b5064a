//! Daemon configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shellbook_utils::LogFormat;
use shellbook_verification::VerificationConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid bind address {0}")]
    BindAddress(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    /// Chain RPC node (`/v1/chain/get_account`).
    #[serde(default = "default_ledger_url")]
    pub ledger_rpc_url: String,

    /// Hyperion history indexer (`/v2/history/get_transaction`).
    #[serde(default = "default_ledger_url")]
    pub ledger_indexer_url: String,

    /// Agent registry base URL. Without one every account gets the base boost.
    #[serde(default)]
    pub registry_url: Option<String>,

    #[serde(default = "default_native_token_contract")]
    pub native_token_contract: String,

    #[serde(default = "default_true")]
    pub require_transaction_proof: bool,

    #[serde(default = "default_challenge_ttl_secs")]
    pub challenge_ttl_secs: u64,

    /// Request timeout for ledger and registry calls.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./shellbook_data")
}

fn default_lmdb_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_ledger_url() -> String {
    "https://proton.eosusa.io".to_string()
}

fn default_native_token_contract() -> String {
    "eosio.token".to_string()
}

fn default_true() -> bool {
    true
}

fn default_challenge_ttl_secs() -> u64 {
    300
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::BindAddress(self.bind_address.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn verification(&self) -> VerificationConfig {
        VerificationConfig {
            require_transaction_proof: self.require_transaction_proof,
            challenge_ttl_secs: self.challenge_ttl_secs,
            native_token_contract: self.native_token_contract.clone(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            data_dir: default_data_dir(),
            lmdb_map_size: default_lmdb_map_size(),
            ledger_rpc_url: default_ledger_url(),
            ledger_indexer_url: default_ledger_url(),
            registry_url: None,
            native_token_contract: default_native_token_contract(),
            require_transaction_proof: true,
            challenge_ttl_secs: default_challenge_ttl_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            enable_metrics: true,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
