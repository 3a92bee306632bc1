//! Command line client for the PiggyBank time-locked vault.
//!
//! - `deposits`: list the connected account's deposits
//! - `deposit-native` / `deposit-token`: lock funds for a chosen duration
//! - `withdraw` / `withdraw-batch`: take back one or every matured deposit
//! - `watch`: keep the deposit table on screen with live countdowns

use action::{
    deposit::{DepositNative, DepositNativeAction, DepositToken, DepositTokenAction},
    duration::PRESETS,
    withdraw::{Withdraw, WithdrawAction, WithdrawBatch, WithdrawBatchAction},
    LockDuration, LockUnit,
};
use alloy_primitives::Address;
use alloy_provider::Provider;
use clap::{Parser, Subcommand};
use client::{ChainSubscription, Wallet, WalletError};
use config::NetworkConfig;
use deposit::{unix_now, PiggyBankReader};
use piggy::{
    config::Config,
    controller::{ActionOutcome, Controller},
    metrics::{install_prometheus_exporter, Metrics},
    render,
};
use std::{path::Path, sync::Arc, time::Duration};
use tokio::time;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "piggy")]
#[command(about = "Lock funds in the PiggyBank vault and withdraw them once they mature")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "piggy.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: Option<String>,

    /// JSON-RPC endpoint of an EIP-1193 wallet, used when no private key is given
    #[arg(long, env = "WALLET_URL")]
    wallet_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List deposits of the connected account
    Deposits,

    /// Lock native coin
    DepositNative {
        /// Amount in whole coins, e.g. 0.05
        #[arg(short, long)]
        amount: String,

        /// Lock length, in `unit`s
        #[arg(short, long, default_value_t = 1)]
        duration: u64,

        /// seconds, minutes, hours or days
        #[arg(short, long, default_value = "minutes")]
        unit: LockUnit,
    },

    /// Approve and lock an ERC20 token
    DepositToken {
        /// Token contract address
        #[arg(short, long)]
        token: Address,

        /// Amount in whole tokens
        #[arg(short, long)]
        amount: String,

        /// Lock length, in `unit`s
        #[arg(short, long, default_value_t = 1)]
        duration: u64,

        /// seconds, minutes, hours or days
        #[arg(short, long, default_value = "minutes")]
        unit: LockUnit,
    },

    /// Withdraw one matured deposit
    Withdraw {
        /// Deposit index
        #[arg(short, long)]
        index: u64,
    },

    /// Withdraw every matured deposit in one transaction
    WithdrawBatch,

    /// Keep the deposit table on screen
    Watch {
        /// Seconds between screen refreshes
        #[arg(long, default_value_t = 1)]
        interval_secs: u64,

        /// Serve Prometheus metrics on this port
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Print the quick-pick lock durations
    Presets,
}

/// A command with its inputs validated, ready to run against the vault.
enum Request {
    Deposits,
    DepositNative {
        amount: String,
        lock: LockDuration,
    },
    DepositToken {
        token: Address,
        amount: String,
        lock: LockDuration,
    },
    Withdraw {
        index: u64,
    },
    WithdrawBatch,
    Watch {
        interval: Duration,
        metrics_port: Option<u16>,
    },
}

impl TryFrom<Command> for Request {
    type Error = eyre::Report;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        let request = match command {
            Command::Deposits => Self::Deposits,
            Command::DepositNative {
                amount,
                duration,
                unit,
            } => Self::DepositNative {
                amount,
                lock: LockDuration::new(duration, unit)?,
            },
            Command::DepositToken {
                token,
                amount,
                duration,
                unit,
            } => Self::DepositToken {
                token,
                amount,
                lock: LockDuration::new(duration, unit)?,
            },
            Command::Withdraw { index } => Self::Withdraw { index },
            Command::WithdrawBatch => Self::WithdrawBatch,
            Command::Watch {
                interval_secs,
                metrics_port,
            } => Self::Watch {
                interval: Duration::from_secs(interval_secs.max(1)),
                metrics_port,
            },
            Command::Presets => eyre::bail!("presets does not talk to the vault"),
        };

        Ok(request)
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if matches!(cli.command, Command::Presets) {
        for (label, magnitude, unit) in PRESETS {
            let lock = LockDuration::new(magnitude, unit)?;
            println!(
                "{label:<8} --duration {magnitude} --unit {unit}  ({}s)",
                lock.seconds()
            );
        }
        return Ok(());
    }

    let config = if Path::new(&cli.config).exists() {
        info!("Loading config: {}", cli.config);
        Config::from_file(&cli.config)?
    } else {
        info!("No config at {}, using defaults", cli.config);
        Config::default()
    };
    let network = config.network_config();

    info!("Loaded config:");
    info!("  Network: {}", network.chain_name);
    info!("  RPC URL: {}", network.rpc_url);
    info!("  PiggyBank: {}", network.piggy_bank);

    // Reject bad input before asking the wallet for anything.
    let request = Request::try_from(cli.command)?;

    if let Some(private_key) = cli.private_key {
        let wallet = client::create_local_wallet(&network.rpc_url, &private_key)?;
        let provider = wallet.provider();
        run(request, &config, network, Arc::new(wallet), provider).await
    } else if let Some(wallet_url) = cli.wallet_url {
        let wallet = client::create_rpc_wallet(&wallet_url).await?;
        let provider = wallet.provider();
        run(request, &config, network, Arc::new(wallet), provider).await
    } else {
        Err(WalletError::MissingProvider.into())
    }
}

async fn run<W, P>(
    request: Request,
    config: &Config,
    network: NetworkConfig,
    wallet: Arc<W>,
    provider: P,
) -> eyre::Result<()>
where
    W: Wallet + 'static,
    P: Provider + Clone + 'static,
{
    if let Request::Watch {
        metrics_port: Some(port),
        ..
    } = &request
    {
        install_prometheus_exporter(*port)?;
        info!(port, "Prometheus exporter listening");
    }

    let piggy_bank = network.piggy_bank;
    let mut controller = Controller::new(network, Metrics::new());

    let account = controller.connect(wallet.as_ref()).await?;
    controller
        .set_ledger(Some(Arc::new(PiggyBankReader::new(
            provider.clone(),
            piggy_bank,
        ))))
        .await?;

    match request {
        Request::Deposits => {}
        Request::DepositNative { amount, lock } => {
            let mut action = DepositNativeAction::new(
                provider,
                DepositNative {
                    piggy_bank,
                    depositor: account,
                    amount,
                    lock,
                },
            );
            report(&controller.execute(&mut action).await?);
        }
        Request::DepositToken {
            token,
            amount,
            lock,
        } => {
            let mut action = DepositTokenAction::new(
                provider,
                DepositToken {
                    piggy_bank,
                    depositor: account,
                    token,
                    amount,
                    lock,
                },
            );
            report(&controller.execute(&mut action).await?);
        }
        Request::Withdraw { index } => {
            let mut action = WithdrawAction::new(
                provider,
                Withdraw {
                    piggy_bank,
                    account,
                    index,
                },
            );
            report(&controller.execute(&mut action).await?);
        }
        Request::WithdrawBatch => {
            let outcome = controller
                .withdraw_matured(unix_now(), |indices| {
                    WithdrawBatchAction::new(
                        provider,
                        WithdrawBatch {
                            piggy_bank,
                            account,
                            indices,
                        },
                    )
                })
                .await?;
            report(&outcome);
        }
        Request::Watch { interval, .. } => {
            return watch(&mut controller, wallet, config, interval).await;
        }
    }

    print!(
        "{}",
        render::screen(&controller.snapshot(), controller.network(), unix_now())
    );

    Ok(())
}

fn report(outcome: &ActionOutcome) {
    println!("{}", outcome.description);
    println!("  tx: {}", outcome.result.tx_hash);
    if let Some(block_number) = outcome.result.block_number {
        println!("  block: {block_number}");
    }
    if outcome.stale {
        println!("  deposit list could not be refreshed, run `piggy deposits` to reload it");
    }
    println!();
}

async fn watch<W, R>(
    controller: &mut Controller<R>,
    wallet: Arc<W>,
    config: &Config,
    interval: Duration,
) -> eyre::Result<()>
where
    W: Wallet + 'static,
    R: deposit::LedgerReader,
{
    let mut chain = ChainSubscription::spawn(
        wallet,
        Duration::from_secs(config.chain_poll_interval_secs.max(1)),
    );

    let mut render_interval = time::interval(interval);
    let mut refresh_interval =
        time::interval(Duration::from_secs(config.refresh_interval_secs.max(1)));
    // The first tick completes immediately and connecting already reconciled.
    refresh_interval.tick().await;

    info!("Watching deposits, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = render_interval.tick() => {
                print!(
                    "\x1b[2J\x1b[H{}",
                    render::screen(&controller.snapshot(), controller.network(), unix_now())
                );
            }
            _ = refresh_interval.tick() => {
                if let Err(e) = controller.reconcile().await {
                    warn!(error = %e, "Refresh failed, keeping previous deposits");
                }
            }
            chain_id = chain.changed() => match chain_id {
                Some(chain_id) => controller.on_chain_changed(chain_id),
                None => {
                    warn!("Chain watcher stopped");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    chain.unsubscribe();
    Ok(())
}
