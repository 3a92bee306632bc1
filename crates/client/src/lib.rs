pub mod subscription;
pub mod wallet;

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
pub use subscription::ChainSubscription;
use thiserror::Error;
pub use wallet::{LocalWallet, RpcWallet, Wallet, WalletError};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider with wallet signing capability from a private key.
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let signer: PrivateKeySigner = private_key
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;

    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider)
}

/// Create a [`LocalWallet`] that signs with `private_key` and talks to `rpc_url`.
pub fn create_local_wallet(
    rpc_url: &str,
    private_key: &str,
) -> Result<LocalWallet<impl Provider + Clone>, ClientError> {
    let signer: PrivateKeySigner = private_key
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;

    let provider = create_wallet_provider(rpc_url, private_key)?;

    Ok(LocalWallet::new(provider, signer.address()))
}

/// Create an [`RpcWallet`] for an EIP-1193 wallet listening on `wallet_url`.
pub async fn create_rpc_wallet(
    wallet_url: &str,
) -> Result<RpcWallet<impl Provider + Clone>, ClientError> {
    let provider = create_provider(wallet_url).await?;
    Ok(RpcWallet::new(provider))
}
