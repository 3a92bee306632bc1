use alloy_primitives::Address;
use config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network preset
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// RPC endpoint url, overrides the preset's public endpoint
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// PiggyBank address, overrides the preset's deployment
    #[serde(default)]
    pub piggy_bank_address: Option<Address>,

    /// How often `watch` re-reads the deposit list from the ledger
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// How often the wallet's chain is polled for changes
    #[serde(default = "default_chain_poll_interval_secs")]
    pub chain_poll_interval_secs: u64,
}

const fn default_network() -> NetworkType {
    NetworkType::FlowTestnet
}

const fn default_refresh_interval_secs() -> u64 {
    30
}

const fn default_chain_poll_interval_secs() -> u64 {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            piggy_bank_address: None,
            refresh_interval_secs: default_refresh_interval_secs(),
            chain_poll_interval_secs: default_chain_poll_interval_secs(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Network configuration with this file's overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);

        if let Some(rpc_url) = &self.rpc_url {
            builder = builder.rpc_url(rpc_url.clone());
        }

        if let Some(piggy_bank) = self.piggy_bank_address {
            builder = builder.piggy_bank(piggy_bank);
        }

        builder.build()
    }
}
