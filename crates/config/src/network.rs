//! Network configuration for the vault client.
//!
//! Provides chain-specific parameters (chain id, endpoints, native currency)
//! and the vault contract address for each supported network.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Network preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    /// Flow EVM testnet
    FlowTestnet,
    /// Local development node (anvil, hardhat)
    Local,
}

/// Native coin description, as wallets expect it in `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: Cow<'static, str>,
    pub symbol: Cow<'static, str>,
    pub decimals: u8,
}

/// Complete network configuration for the vault client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network preset this configuration was derived from
    pub network_type: NetworkType,
    /// Chain ID
    pub chain_id: u64,
    /// Human readable chain name
    pub chain_name: Cow<'static, str>,
    /// Public RPC endpoint
    pub rpc_url: Cow<'static, str>,
    /// Block explorer (empty for local networks)
    pub explorer_url: Cow<'static, str>,
    /// Native coin of the chain
    pub native_currency: NativeCurrency,
    /// PiggyBank vault contract address
    pub piggy_bank: Address,
}

impl NetworkConfig {
    /// Flow EVM testnet configuration.
    pub const fn flow_testnet() -> Self {
        Self {
            network_type: NetworkType::FlowTestnet,
            chain_id: 545,
            chain_name: Cow::Borrowed("Flow Testnet"),
            rpc_url: Cow::Borrowed("https://rpc.testnet.flow.evm.flow.com"),
            explorer_url: Cow::Borrowed("https://testnet.flowscan.org"),
            native_currency: NativeCurrency {
                name: Cow::Borrowed("FLOW"),
                symbol: Cow::Borrowed("FLOW"),
                decimals: 18,
            },
            piggy_bank: address!("0xaf54BEf4a78B675AF51A14FdB346b98FbD3Fdc3b"),
        }
    }

    /// Local development node configuration.
    ///
    /// There is no canonical vault deployment on a local node, so the vault
    /// address is zero until overridden.
    pub const fn local() -> Self {
        Self {
            network_type: NetworkType::Local,
            chain_id: 31337,
            chain_name: Cow::Borrowed("Localhost"),
            rpc_url: Cow::Borrowed("http://127.0.0.1:8545"),
            explorer_url: Cow::Borrowed(""),
            native_currency: NativeCurrency {
                name: Cow::Borrowed("Ether"),
                symbol: Cow::Borrowed("ETH"),
                decimals: 18,
            },
            piggy_bank: Address::ZERO,
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::FlowTestnet => Self::flow_testnet(),
            NetworkType::Local => Self::local(),
        }
    }

    /// Chain id in the `0x`-prefixed hex form wallets use.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Parameters for `wallet_addEthereumChain` (EIP-3085).
    pub fn add_chain_params(&self) -> AddChainParams {
        let block_explorer_urls = if self.explorer_url.is_empty() {
            vec![]
        } else {
            vec![self.explorer_url.to_string()]
        };

        AddChainParams {
            chain_id: self.chain_id_hex(),
            chain_name: self.chain_name.to_string(),
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls,
        }
    }
}

/// EIP-3085 `wallet_addEthereumChain` parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with Flow testnet defaults.
    pub const fn flow_testnet() -> Self {
        Self {
            config: NetworkConfig::flow_testnet(),
        }
    }

    /// Start with the defaults of the given preset.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override the vault contract address.
    pub const fn piggy_bank(mut self, address: Address) -> Self {
        self.config.piggy_bank = address;
        self
    }

    /// Override the RPC endpoint.
    pub fn rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.config.rpc_url = Cow::Owned(rpc_url.into());
        self
    }

    /// Build the network configuration.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}
