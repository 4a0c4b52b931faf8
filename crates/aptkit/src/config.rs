//! Client configuration.
//!
//! Layering is defaults, then an optional JSON file, then environment, then
//! whatever the caller sets through the `with_*` builders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::{AptosError, Result};
use crate::retry::RetryPolicy;
use crate::transaction::{TransactionOptions, DEFAULT_EXPIRATION_OFFSET_SECS, DEFAULT_MAX_GAS_AMOUNT};

/// Overrides the node URL
pub const ENV_NODE_URL: &str = "APTKIT_NODE_URL";
/// Overrides the network preset
pub const ENV_NETWORK: &str = "APTKIT_NETWORK";

/// Public Aptos networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Aptos Mainnet
    Mainnet,
    /// Aptos Testnet
    #[default]
    Testnet,
    /// Aptos Devnet
    Devnet,
    /// Local node
    Localnet,
}

impl Network {
    /// REST base URL, including the `/v1` prefix
    pub fn rest_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.aptoslabs.com/v1",
            Network::Testnet => "https://fullnode.testnet.aptoslabs.com/v1",
            Network::Devnet => "https://fullnode.devnet.aptoslabs.com/v1",
            Network::Localnet => "http://127.0.0.1:8080/v1",
        }
    }

    /// Explorer link for a transaction. Local nodes have no explorer.
    pub fn explorer_txn_url(&self, hash: &str) -> Option<String> {
        match self {
            Network::Mainnet => Some(format!("https://explorer.aptoslabs.com/txn/{}", hash)),
            Network::Localnet => None,
            other => Some(format!("https://explorer.aptoslabs.com/txn/{}?network={}", hash, other)),
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "localnet" | "local" => Ok(Network::Localnet),
            other => Err(AptosError::Config(format!("unknown network '{}'", other))),
        }
    }
}

/// Everything needed to reach a node and shape transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Network preset
    pub network: Network,
    /// Explicit REST URL; takes precedence over the preset
    pub node_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Retries for idempotent reads
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub retry_delay_ms: u64,
    /// Gas ceiling per transaction
    pub max_gas_amount: u64,
    /// Seconds added to the ledger timestamp for expiration
    pub expiration_offset_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Network::default())
    }
}

impl ClientConfig {
    /// Configuration for a network preset
    pub fn new(network: Network) -> Self {
        Self {
            network,
            node_url: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 200,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            expiration_offset_secs: DEFAULT_EXPIRATION_OFFSET_SECS,
        }
    }

    /// Sets the network preset
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Sets an explicit node URL
    pub fn with_node_url(mut self, url: impl Into<String>) -> Self {
        self.node_url = Some(url.into());
        self
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the maximum retry attempts
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the retry delay
    pub fn with_retry_delay(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    /// Sets the gas ceiling
    pub fn with_max_gas_amount(mut self, amount: u64) -> Self {
        self.max_gas_amount = amount;
        self
    }

    /// Sets the expiration offset
    pub fn with_expiration_offset(mut self, secs: u64) -> Self {
        self.expiration_offset_secs = secs;
        self
    }

    /// The REST base URL in effect
    pub fn rest_url(&self) -> &str {
        self.node_url.as_deref().unwrap_or_else(|| self.network.rest_url())
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.rest_url())
            .map_err(|e| AptosError::Config(format!("invalid node URL '{}': {}", self.rest_url(), e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AptosError::Config(format!("unsupported URL scheme '{}'", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(AptosError::Config(format!("node URL '{}' cannot be a base", url)));
        }
        if self.timeout_secs == 0 {
            return Err(AptosError::Config("timeout must be positive".into()));
        }
        if self.max_gas_amount == 0 {
            return Err(AptosError::Config("max gas amount must be positive".into()));
        }
        if self.expiration_offset_secs == 0 {
            return Err(AptosError::Config("expiration offset must be positive".into()));
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Retry schedule for reads
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    /// Gas and expiration policy for transactions
    pub fn transaction_options(&self) -> TransactionOptions {
        TransactionOptions {
            max_gas_amount: self.max_gas_amount,
            expiration_offset_secs: self.expiration_offset_secs,
        }
    }

    /// Loads a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AptosError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| AptosError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Writes the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| AptosError::Config(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| AptosError::Config(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Applies `APTKIT_NETWORK` and `APTKIT_NODE_URL` from the process
    /// environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key/value source.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = lookup(ENV_NETWORK).filter(|v| !v.trim().is_empty()) {
            self.network = network.parse()?;
        }
        if let Some(url) = lookup(ENV_NODE_URL).filter(|v| !v.trim().is_empty()) {
            self.node_url = Some(url.trim().to_string());
        }
        Ok(self)
    }
}
