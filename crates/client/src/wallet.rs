//! Wallet interface used during the connect handshake.
//!
//! A wallet hands out the active account, reports the chain it is connected
//! to and, when it supports it, switches or registers chains. Two
//! implementations are provided:
//! - [`LocalWallet`]: a private key bound to a single RPC endpoint
//! - [`RpcWallet`]: an EIP-1193 style wallet reachable over JSON-RPC
//!   (for example a desktop wallet exposing a local RPC port)

use alloy_primitives::Address;
use alloy_provider::Provider;
use config::AddChainParams;
use serde_json::{json, Value};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// EIP-1193 error code for a request the user rejected.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-3326 error code for a chain the wallet does not know.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet was configured at all
    #[error("No wallet available: set PRIVATE_KEY or WALLET_URL")]
    MissingProvider,

    /// The wallet returned an empty account list
    #[error("Wallet returned no accounts")]
    NoAccounts,

    /// The user declined the request in the wallet
    #[error("Request rejected by user")]
    UserRejected,

    /// The wallet has never seen the requested chain
    #[error("Chain {0} is not known to the wallet")]
    UnrecognizedChain(u64),

    /// The wallet cannot perform the requested operation
    #[error("Wallet does not support {0}")]
    Unsupported(&'static str),

    /// Any other JSON-RPC error response
    #[error("Wallet error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Transport level failure (connection refused, bad response)
    #[error("Wallet transport error: {0}")]
    Transport(String),
}

impl WalletError {
    /// Classify a wallet response error by its EIP-1193 code.
    fn classify(payload: Option<(i64, String)>, fallback: String, chain_id: u64) -> Self {
        match payload {
            Some((USER_REJECTED_CODE, _)) => Self::UserRejected,
            Some((UNRECOGNIZED_CHAIN_CODE, _)) => Self::UnrecognizedChain(chain_id),
            Some((code, message)) => Self::Rpc { code, message },
            None => Self::Transport(fallback),
        }
    }
}

/// Trait for the wallet side of the connect handshake.
pub trait Wallet: Send + Sync {
    /// Ask the wallet for its accounts. The first one is the active account.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, WalletError>> + Send;

    /// Chain the wallet is currently connected to.
    fn chain_id(&self) -> impl Future<Output = Result<u64, WalletError>> + Send;

    /// Ask the wallet to switch to `chain_id`.
    ///
    /// Returns [`WalletError::UnrecognizedChain`] when the chain has to be
    /// added first.
    fn switch_chain(&self, chain_id: u64) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// Ask the wallet to register a new chain.
    fn add_chain(
        &self,
        params: &AddChainParams,
    ) -> impl Future<Output = Result<(), WalletError>> + Send;
}

/// A private key bound to one RPC endpoint.
///
/// The endpoint decides the chain, so switching is only possible when the
/// endpoint already serves the requested chain.
#[derive(Clone)]
pub struct LocalWallet<P> {
    provider: P,
    address: Address,
}

impl<P> LocalWallet<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, address: Address) -> Self {
        Self { provider, address }
    }

    /// Signing provider backing this wallet.
    pub fn provider(&self) -> P {
        self.provider.clone()
    }

    pub const fn address(&self) -> Address {
        self.address
    }
}

impl<P> Wallet for LocalWallet<P>
where
    P: Provider + Clone,
{
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let current = self.chain_id().await?;
        if current == chain_id {
            return Ok(());
        }

        debug!(current, requested = chain_id, "Local wallet cannot switch chains");
        Err(WalletError::UnrecognizedChain(chain_id))
    }

    async fn add_chain(&self, _params: &AddChainParams) -> Result<(), WalletError> {
        Err(WalletError::Unsupported("adding chains to a local key"))
    }
}

/// An EIP-1193 wallet reachable over JSON-RPC.
#[derive(Clone)]
pub struct RpcWallet<P> {
    provider: P,
}

impl<P> RpcWallet<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Provider pointing at the wallet endpoint. Transactions sent through it
    /// are signed by the wallet.
    pub fn provider(&self) -> P {
        self.provider.clone()
    }
}

impl<P> Wallet for RpcWallet<P>
where
    P: Provider + Clone,
{
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let accounts: Vec<Address> = self
            .provider
            .raw_request("eth_requestAccounts".into(), ())
            .await
            .map_err(|e| {
                let payload = e.as_error_resp().map(|p| (p.code, p.message.to_string()));
                WalletError::classify(payload, e.to_string(), 0)
            })?;

        debug!(count = accounts.len(), "Wallet returned accounts");
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let params = vec![json!({ "chainId": format!("{:#x}", chain_id) })];

        let _: Value = self
            .provider
            .raw_request("wallet_switchEthereumChain".into(), params)
            .await
            .map_err(|e| {
                let payload = e.as_error_resp().map(|p| (p.code, p.message.to_string()));
                WalletError::classify(payload, e.to_string(), chain_id)
            })?;

        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        let _: Value = self
            .provider
            .raw_request("wallet_addEthereumChain".into(), vec![params.clone()])
            .await
            .map_err(|e| {
                let payload = e.as_error_resp().map(|p| (p.code, p.message.to_string()));
                WalletError::classify(payload, e.to_string(), 0)
            })?;

        Ok(())
    }
}
