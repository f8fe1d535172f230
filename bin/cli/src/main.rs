#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::items_after_statements)]

mod config;
mod notify;

use std::{str::FromStr, sync::Arc, time::Duration};

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tabled::{settings::Style, Table, Tabled};
use tokio::signal;
use tracing::{error, info, warn};

use raffle_client::{
    view::{raffle_details, EntryFormView},
    EntryForm, EntryReceipt, LocalWallet, OnchainRaffle, RaffleClient, RaffleSnapshot, Submitter,
};
use raffle_types::ContractConfig;
use raffle_utils::{format_ether_or_na, LogFormat};

use crate::{config::Settings, notify::TerminalNotifier};

/// The CLI application that defines all available commands.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
enum Args {
    /// Print the raffle details once.
    Details(DetailsArgs),
    /// Follow the raffle until interrupted.
    Watch(WatchArgs),
    /// Enter the raffle.
    Enter(EnterArgs),
}

/// The connection arguments shared by every command.
#[derive(Debug, Clone, Parser)]
struct ConnectionArgs {
    /// The JSON-RPC URL of the node. Overrides `RAFFLE_RPC_URL`.
    #[arg(long)]
    rpc_url: Option<String>,
    /// The address of the raffle contract. Overrides `RAFFLE_CONTRACT_ADDRESS`.
    #[arg(long)]
    contract: Option<Address>,
    /// The log format. Overrides `RAFFLE_LOG_FORMAT`.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

/// The arguments for the `details` command.
#[derive(Debug, Clone, Parser)]
struct DetailsArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Print the snapshot as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// The arguments for the `watch` command.
#[derive(Debug, Clone, Parser)]
struct WatchArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Seconds between contract reads, 0 to read only once. Overrides `RAFFLE_POLL_INTERVAL_SECS`.
    #[arg(long)]
    poll_interval: Option<u64>,
}

/// The arguments for the `enter` command.
#[derive(Debug, Clone, Parser)]
struct EnterArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// The amount to pay, in ether.
    #[arg(long, help = "Amount in ETH, e.g. 0.01")]
    amount: String,
    /// The private key of the entering account. Overrides `RAFFLE_PRIVATE_KEY`.
    #[arg(long)]
    private_key: Option<String>,
}

/// A row of the details table.
#[derive(Tabled)]
struct DetailsTable {
    #[tabled(rename = "Detail")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// The main entry point for the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables.
    dotenv().ok();

    // Parse the arguments.
    let cli = Args::parse();

    // Load the settings.
    let settings = Settings::new()?;

    // Initialize logging.
    let connection = match &cli {
        Args::Details(args) => &args.connection,
        Args::Watch(args) => &args.connection,
        Args::Enter(args) => &args.connection,
    };
    raffle_utils::init_logger(connection.log_format.unwrap_or(settings.log_format));

    // Print the header.
    let header = include_str!("./header.txt");
    println!("{header}");

    // Run the command.
    match cli {
        Args::Details(args) => {
            let (rpc_url, config) = resolve(&settings, &args.connection)?;
            let raffle = OnchainRaffle::connect(&rpc_url, config)?;
            let client = RaffleClient::new(raffle.clone(), raffle, Duration::ZERO);
            let snapshot = client.fetch().await;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_details(&snapshot);
            }
        }
        Args::Watch(args) => {
            let (rpc_url, config) = resolve(&settings, &args.connection)?;
            let poll_interval =
                Duration::from_secs(args.poll_interval.unwrap_or(settings.poll_interval_secs));

            // Setup the client.
            let raffle = OnchainRaffle::connect(&rpc_url, config)?;
            let client = RaffleClient::new(raffle.clone(), raffle, poll_interval);
            info!(
                rpc = %rpc_url,
                contract = %config.address,
                poll_interval = ?poll_interval,
                "Watching raffle..."
            );

            // Run the client.
            let handle = client.spawn();
            let mut snapshots = handle.snapshots.clone();
            print_details(&snapshots.borrow_and_update());

            // Re-render on every change until a signal to shutdown.
            loop {
                tokio::select! {
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            error!("synchronizer exited unexpectedly");
                            break;
                        }
                        let snapshot = snapshots.borrow_and_update().clone();
                        print_details(&snapshot);
                    }
                    _ = signal::ctrl_c() => {
                        warn!("ctrl-c received, shutting down");
                        break;
                    }
                }
            }

            handle.shutdown().await;
            info!("graceful shutdown complete");
        }
        Args::Enter(args) => {
            let (rpc_url, config) = resolve(&settings, &args.connection)?;

            // Setup the signer, if any.
            let signer = args
                .private_key
                .or(settings.private_key)
                .map(|key| PrivateKeySigner::from_str(&key))
                .transpose()
                .context("invalid private key")?;

            // Read the raffle once to check the entry against.
            let raffle = OnchainRaffle::connect(&rpc_url, config)?;
            let snapshot = RaffleClient::new(raffle.clone(), raffle, Duration::ZERO).fetch().await;
            print_details(&snapshot);

            // Submit the entry.
            let wallet = LocalWallet::new(&rpc_url, config, signer)?;
            let mut submitter = Submitter::new(Arc::new(wallet), Arc::new(TerminalNotifier));
            let mut form = EntryForm::with_amount(args.amount);
            let view = EntryFormView::from(&form);
            info!(amount = %view.amount, "{}", view.button_label);

            let receipt = submitter.submit(&mut form, &snapshot).await?;
            print_receipt(&receipt);
        }
    }

    Ok(())
}

/// Resolves the RPC URL and contract from the arguments, falling back to the settings.
fn resolve(settings: &Settings, args: &ConnectionArgs) -> Result<(String, ContractConfig)> {
    let rpc_url = args.rpc_url.clone().unwrap_or_else(|| settings.rpc_url.clone());
    let address = match (args.contract, &settings.contract_address) {
        (Some(address), _) => address,
        (None, Some(address)) => Address::from_str(address)
            .with_context(|| format!("invalid RAFFLE_CONTRACT_ADDRESS: {address}"))?,
        (None, None) => bail!("no contract address: set RAFFLE_CONTRACT_ADDRESS or --contract"),
    };
    Ok((rpc_url, ContractConfig::new(address)))
}

fn print_details(snapshot: &RaffleSnapshot) {
    let rows = raffle_details(snapshot)
        .into_iter()
        .map(|row| DetailsTable { name: row.label.to_string(), value: row.value })
        .collect::<Vec<_>>();
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("\nRaffle Details:");
    println!("{table}\n");
}

fn print_receipt(receipt: &EntryReceipt) {
    let rows = vec![
        DetailsTable { name: "Transaction".to_string(), value: receipt.tx_hash.to_string() },
        DetailsTable {
            name: "Block".to_string(),
            value: receipt.block_number.map_or_else(|| "pending".to_string(), |b| b.to_string()),
        },
        DetailsTable { name: "Player".to_string(), value: receipt.player.to_string() },
        DetailsTable {
            name: "Amount".to_string(),
            value: format!("{} ETH", format_ether_or_na(receipt.value)),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("\nEntry:");
    println!("{table}\n");
}
