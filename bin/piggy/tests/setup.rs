//! Common test setup utilities shared across integration tests.
#![allow(dead_code)] // not every test file uses every helper

use action::{Action, LockDuration};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use client::{LocalWallet, Wallet, WalletError};
use config::{AddChainParams, NetworkConfig};
use deposit::{
    parse_amount, unix_now, LedgerError, LedgerReader, PiggyBankReader, RawDeposit, TokenMetadata,
};
use piggy::{config::Config, controller::Controller, metrics::Metrics};
use serde::Deserialize;
use std::{
    collections::{HashMap, HashSet},
    future::pending,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

pub const ACCOUNT: Address = Address::repeat_byte(0xaa);
pub const FLOW_TESTNET: u64 = 545;

/// Local configuration with private key (git-ignored file)
#[derive(Debug, Deserialize)]
struct LocalConfig {
    private_key: String,
}

/// Load test configuration for live tests. Panics if not found or invalid.
pub fn load_test_config() -> Config {
    Config::from_file("tests/test-config.toml").expect("Failed to load tests/test-config.toml.")
}

/// Load private key for signing transactions.
///
/// Tries the PRIVATE_KEY environment variable, then
/// tests/test-config.local.toml (git-ignored).
pub fn load_private_key() -> Option<String> {
    if let Ok(pk) = std::env::var("PRIVATE_KEY") {
        eprintln!("✓ Loaded private key from PRIVATE_KEY environment variable");
        return Some(pk);
    }

    let local_config_path = "tests/test-config.local.toml";
    if let Ok(contents) = std::fs::read_to_string(local_config_path) {
        if let Ok(config) = toml::from_str::<LocalConfig>(&contents) {
            eprintln!("✓ Loaded private key from {}", local_config_path);
            return Some(config.private_key);
        }
    }

    eprintln!("⚠ No private key found. Set PRIVATE_KEY or create {local_config_path}");
    None
}

/// Signing wallet on the configured network, plus a controller connected
/// through it with the deployed vault attached.
///
/// # Panics
/// Panics if no private key is found or the connection fails.
pub async fn setup_live_controller() -> (
    LocalWallet<impl Provider + Clone + 'static>,
    Controller<PiggyBankReader<impl Provider + Clone + 'static>>,
) {
    let network = load_test_config().network_config();
    let private_key = load_private_key().expect(
        "Private key required for transaction signing.\n\
         Set PRIVATE_KEY environment variable or create tests/test-config.local.toml",
    );

    let wallet = client::create_local_wallet(&network.rpc_url, &private_key)
        .expect("Failed to create wallet");
    eprintln!("✓ Signing as {}", wallet.address());

    let reader = Arc::new(PiggyBankReader::new(wallet.provider(), network.piggy_bank));
    let mut controller = Controller::new(network, Metrics::new());
    controller.connect(&wallet).await.expect("connect failed");
    controller
        .set_ledger(Some(reader))
        .await
        .expect("initial reconciliation failed");

    (wallet, controller)
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// Vault held in memory. Actions write to it, the controller reads it.
#[derive(Default)]
pub struct InMemoryLedger {
    deposits: Mutex<Vec<RawDeposit>>,
    tokens: Mutex<HashMap<Address, TokenMetadata>>,
    fail: AtomicBool,
    empty_data: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_deposits(deposits: Vec<RawDeposit>) -> Arc<Self> {
        let ledger = Self::default();
        *ledger.deposits.lock().unwrap() = deposits;
        Arc::new(ledger)
    }

    pub fn add_token(&self, token: Address, decimals: u8, symbol: &str) {
        self.tokens.lock().unwrap().insert(
            token,
            TokenMetadata {
                decimals,
                symbol: symbol.to_string(),
            },
        );
    }

    pub fn push(&self, deposit: RawDeposit) {
        self.deposits.lock().unwrap().push(deposit);
    }

    pub fn mark_withdrawn(&self, index: u64) {
        self.deposits.lock().unwrap()[index as usize].withdrawn = true;
    }

    pub fn raw(&self) -> Vec<RawDeposit> {
        self.deposits.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_empty_data(&self, empty: bool) {
        self.empty_data.store(empty, Ordering::SeqCst);
    }

    /// Number of full reads (one per reconciliation).
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), LedgerError> {
        if self.empty_data.load(Ordering::SeqCst) {
            return Err(LedgerError::EmptyData);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(LedgerError::Call("connection refused".to_string()));
        }
        Ok(())
    }
}

impl LedgerReader for InMemoryLedger {
    async fn deposits_length(&self, _account: Address) -> Result<u64, LedgerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.deposits.lock().unwrap().len() as u64)
    }

    async fn get_deposit(&self, _account: Address, index: u64) -> Result<RawDeposit, LedgerError> {
        self.check()?;
        self.deposits
            .lock()
            .unwrap()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| LedgerError::Call(format!("index {} out of bounds", index)))
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        self.check()?;
        self.tokens
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(|| LedgerError::Call(format!("unknown token {}", token)))
    }
}

pub fn native(amount: U256, unlock_time: u64, withdrawn: bool) -> RawDeposit {
    RawDeposit {
        token: Address::ZERO,
        amount,
        unlock_time,
        withdrawn,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet
// ─────────────────────────────────────────────────────────────────────────────

/// Wallet that knows a set of chains and can be told to refuse switching.
pub struct MockWallet {
    accounts: Vec<Address>,
    chain_id: AtomicU64,
    known_chains: Mutex<HashSet<u64>>,
    reject_switch: AtomicBool,
    switch_calls: AtomicUsize,
    add_calls: AtomicUsize,
}

impl MockWallet {
    pub fn on_chain(chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            accounts: vec![ACCOUNT],
            chain_id: AtomicU64::new(chain_id),
            known_chains: Mutex::new(HashSet::from([chain_id, FLOW_TESTNET])),
            reject_switch: AtomicBool::new(false),
            switch_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
        })
    }

    /// Wallet on `chain_id` that has never heard of the vault's chain.
    pub fn without_vault_chain(chain_id: u64) -> Arc<Self> {
        let wallet = Self::on_chain(chain_id);
        wallet.known_chains.lock().unwrap().remove(&FLOW_TESTNET);
        wallet
    }

    pub fn without_accounts() -> Arc<Self> {
        Arc::new(Self {
            accounts: vec![],
            chain_id: AtomicU64::new(FLOW_TESTNET),
            known_chains: Mutex::new(HashSet::from([FLOW_TESTNET])),
            reject_switch: AtomicBool::new(false),
            switch_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
        })
    }

    pub fn reject_switch(&self) {
        self.reject_switch.store(true, Ordering::SeqCst);
    }

    /// Simulate the user changing chains in the wallet.
    pub fn move_to(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
    }

    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

impl Wallet for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);

        if self.reject_switch.load(Ordering::SeqCst) {
            return Err(WalletError::UserRejected);
        }
        if !self.known_chains.lock().unwrap().contains(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }

        self.chain_id.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);

        let chain_id = u64::from_str_radix(params.chain_id.trim_start_matches("0x"), 16)
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        // Wallets switch to a chain right after adding it.
        self.known_chains.lock().unwrap().insert(chain_id);
        self.chain_id.store(chain_id, Ordering::SeqCst);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// What a [`VaultAction`] does when executed.
#[derive(Clone)]
pub enum Op {
    DepositNative { amount: String, lock: LockDuration },
    WithdrawBatch(Vec<u64>),
    /// Fail with this message
    Fail(&'static str),
    /// Never resolve
    Hang,
}

/// Action that writes straight to an [`InMemoryLedger`].
pub struct VaultAction {
    ledger: Arc<InMemoryLedger>,
    op: Op,
    ready: bool,
    invalid: Option<&'static str>,
    completed: bool,
    executions: Arc<AtomicUsize>,
}

impl VaultAction {
    pub fn new(ledger: Arc<InMemoryLedger>, op: Op) -> Self {
        Self {
            ledger,
            op,
            ready: true,
            invalid: None,
            completed: false,
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Reject the input with `reason` when checked for readiness.
    pub fn invalid(mut self, reason: &'static str) -> Self {
        self.invalid = Some(reason);
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn executions(&self) -> Arc<AtomicUsize> {
        self.executions.clone()
    }
}

impl Action for VaultAction {
    async fn is_ready(&self) -> eyre::Result<bool> {
        if let Some(reason) = self.invalid {
            eyre::bail!("{}", reason);
        }
        Ok(self.ready)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.completed)
    }

    async fn execute(&mut self) -> eyre::Result<action::Result> {
        self.executions.fetch_add(1, Ordering::SeqCst);

        match &self.op {
            Op::DepositNative { amount, lock } => {
                let amount = parse_amount(amount, 18)?;
                self.ledger
                    .push(native(amount, unix_now() + lock.seconds(), false));
            }
            Op::WithdrawBatch(indices) => {
                for index in indices {
                    self.ledger.mark_withdrawn(*index);
                }
            }
            Op::Fail(message) => eyre::bail!("{}", message),
            Op::Hang => pending::<()>().await,
        }

        Ok(action::Result {
            tx_hash: TxHash::repeat_byte(0x01),
            block_number: Some(1),
            gas_used: None,
        })
    }

    fn description(&self) -> String {
        match &self.op {
            Op::DepositNative { amount, lock } => format!("Deposit {} locked for {}", amount, lock),
            Op::WithdrawBatch(indices) => format!("Withdraw deposits {:?}", indices),
            Op::Fail(_) => "Failing action".to_string(),
            Op::Hang => "Hanging action".to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "vault"
    }

    fn failure_message(&self) -> &'static str {
        "Deposit failed"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

pub fn controller() -> Controller<InMemoryLedger> {
    Controller::new(NetworkConfig::flow_testnet(), Metrics::new())
}

/// Controller connected on the vault's chain with `ledger` attached.
pub async fn ready_controller(ledger: Arc<InMemoryLedger>) -> Controller<InMemoryLedger> {
    let mut controller = controller();
    let wallet = MockWallet::on_chain(FLOW_TESTNET);

    controller
        .connect(wallet.as_ref())
        .await
        .expect("connect failed");
    controller
        .set_ledger(Some(ledger))
        .await
        .expect("initial reconciliation failed");

    controller
}
