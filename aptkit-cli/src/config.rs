//! Configuration and key loading

use anyhow::{bail, Context, Result};
use aptkit::{Account, ClientConfig, Network};
use clap::Args;
use std::path::{Path, PathBuf};

/// Environment variable holding the hex private key by default
pub const DEFAULT_KEY_ENV: &str = "APTOS_PRIVATE_KEY";

#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Network preset
    #[arg(long, global = true)]
    pub network: Option<Network>,

    /// REST endpoint, e.g. http://127.0.0.1:8080/v1
    #[arg(long, global = true)]
    pub node_url: Option<String>,

    /// Gas ceiling per transaction
    #[arg(long, global = true)]
    pub max_gas: Option<u64>,
}

impl ConnectionArgs {
    /// Defaults, then `--config`, then `APTKIT_*` variables, then flags.
    pub fn resolve(&self) -> Result<ClientConfig> {
        self.apply_flags(self.base()?.apply_env()?)
    }

    #[cfg(test)]
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_flags(self.base()?.apply_overrides(lookup)?)
    }

    fn base(&self) -> Result<ClientConfig> {
        Ok(match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        })
    }

    fn apply_flags(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Some(network) = self.network {
            config = config.with_network(network);
            // a network flag without a URL means the preset endpoint
            if self.node_url.is_none() {
                config.node_url = None;
            }
        }
        if let Some(url) = &self.node_url {
            config = config.with_node_url(url.clone());
        }
        if let Some(max_gas) = self.max_gas {
            config = config.with_max_gas_amount(max_gas);
        }

        config.validate()?;
        tracing::debug!(network = %config.network, url = config.rest_url(), "resolved configuration");
        Ok(config)
    }
}

#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    /// Environment variable that holds the hex private key
    #[arg(long, default_value = DEFAULT_KEY_ENV)]
    pub key_env: String,

    /// File containing the hex private key
    #[arg(long, conflicts_with = "key_env")]
    pub private_key_file: Option<PathBuf>,
}

impl KeyArgs {
    pub fn load(&self) -> Result<Account> {
        self.load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with<F>(&self, lookup: F) -> Result<Account>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = match &self.private_key_file {
            Some(path) => read_key_file(path)?,
            None => match lookup(&self.key_env) {
                Some(value) => value,
                None => bail!("set {} or pass --private-key-file", self.key_env),
            },
        };
        aptkit::import_account(raw.trim()).context("could not import private key")
    }
}

fn read_key_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read key file {}", path.display()))
}
