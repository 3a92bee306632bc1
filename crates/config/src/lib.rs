//! Configuration types for the piggy bank client.
//!
//! This crate provides:
//! - Network presets (Flow testnet, local node)
//! - The vault contract address for each network
//! - Chain parameters wallets need to add an unknown network

pub mod network;

pub use network::{AddChainParams, NativeCurrency, NetworkConfig, NetworkConfigBuilder, NetworkType};
