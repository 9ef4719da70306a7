// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::PathBuf;

use alloy::{
    primitives::{Address, U256},
    providers::ProviderBuilder,
};
use clap::{Args, Subcommand};
use eyre::Result;
use parcel_tools::{
    aggregate,
    deployments::Deployments,
    scanner::{self, RpcSource, ScanConfig, ScanReport},
    wallets::AddressBook,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconstruct transfer history from RPC logs.
    Scan(ScanArgs),
    /// Scan and print summary statistics.
    Summary(SummaryArgs),
    /// Inspect or update the deployment records file.
    #[command(subcommand)]
    Deployments(DeploymentsCommand),
    /// Inspect or update the named wallet address book.
    #[command(subcommand)]
    Wallets(WalletsCommand),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// JSON-RPC endpoint.
    #[arg(short, long, default_value = "http://localhost:8547")]
    endpoint: String,
    /// Collection contract address.
    #[arg(long)]
    address: Address,
    /// First block to scan; defaults to a recent window below the tip.
    #[arg(long)]
    from_block: Option<u64>,
    /// Last block to scan; defaults to the tip.
    #[arg(long)]
    to_block: Option<u64>,
    /// Blocks per log query before the splitting policy kicks in.
    #[arg(long, default_value_t = scanner::DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,
    /// How many recent blocks to cover when no start block is given.
    #[arg(long, default_value_t = scanner::DEFAULT_LOOKBACK)]
    lookback: u64,
    /// Print records as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    scan: ScanArgs,
    /// Restrict to one token id.
    #[arg(long)]
    token: Option<U256>,
    /// Restrict to one participant (wallet name or address).
    #[arg(long)]
    holder: Option<String>,
    /// Wallet address book used to resolve `--holder` names.
    #[arg(long, default_value = "wallets.json")]
    wallets: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum DeploymentsCommand {
    /// Print every recorded deployment.
    List {
        #[arg(long, default_value = "deployments.json")]
        file: PathBuf,
    },
    /// Record a deployment for a network.
    Add {
        network: String,
        address: Address,
        #[arg(long, default_value = "deployments.json")]
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum WalletsCommand {
    /// Print every named wallet.
    List {
        #[arg(long, default_value = "wallets.json")]
        file: PathBuf,
    },
    /// Name a wallet address.
    Add {
        name: String,
        address: Address,
        #[arg(long, default_value = "wallets.json")]
        file: PathBuf,
    },
}

pub async fn exec(command: Command) -> Result<()> {
    match command {
        Command::Scan(args) => {
            let report = scan(&args).await?;
            print_report(&report, args.json)?;
        }
        Command::Summary(args) => {
            let report = scan(&args.scan).await?;
            let mut events = report.events;
            if let Some(token) = args.token {
                events = aggregate::filter_by_token(&events, token);
            }
            if let Some(holder) = &args.holder {
                let book = AddressBook::load(&args.wallets)?;
                events = aggregate::filter_by_address(&events, book.resolve(holder)?);
            }
            let summary = aggregate::summarize(&events);
            if args.scan.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("transfers:    {}", summary.transfer_count);
                println!("participants: {}", summary.unique_participants);
                println!("volume:       {}", summary.total_volume);
                match (summary.first_timestamp, summary.last_timestamp) {
                    (Some(first), Some(last)) => println!("range:        {first} .. {last}"),
                    _ => println!("range:        (no transfers)"),
                }
            }
            if !report.skipped.is_empty() {
                log::warn!("scan skipped {} block range(s)", report.skipped.len());
            }
        }
        Command::Deployments(DeploymentsCommand::List { file }) => {
            let deployments = Deployments::load(&file)?;
            for (network, record) in deployments.iter() {
                println!("{network}: {} (deployed at {})", record.address, record.deployed_at);
            }
        }
        Command::Deployments(DeploymentsCommand::Add {
            network,
            address,
            file,
        }) => {
            let mut deployments = Deployments::load(&file)?;
            deployments.record(network, address);
            deployments.save(&file)?;
        }
        Command::Wallets(WalletsCommand::List { file }) => {
            let book = AddressBook::load(&file)?;
            for (name, address) in book.iter() {
                println!("{name}: {address}");
            }
        }
        Command::Wallets(WalletsCommand::Add {
            name,
            address,
            file,
        }) => {
            let mut book = AddressBook::load(&file)?;
            book.set(name, address);
            book.save(&file)?;
        }
    }
    Ok(())
}

async fn scan(args: &ScanArgs) -> Result<ScanReport> {
    let provider = ProviderBuilder::new().connect(&args.endpoint).await?;
    let source = RpcSource::new(provider, args.address);
    let config = ScanConfig {
        from_block: args.from_block,
        to_block: args.to_block,
        chunk_size: args.chunk_size,
        lookback: args.lookback,
        ..ScanConfig::default()
    };
    Ok(scanner::scan(&source, &config).await?)
}

fn print_report(report: &ScanReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report.events)?);
    } else {
        for event in &report.events {
            let tx = event
                .tx_hash
                .map(|hash| hash.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "block {:>10}  ts {:>12}  {:?}  {} -> {}  ids {:?}  amounts {:?}  tx {tx}",
                event.block_number,
                event.timestamp,
                event.kind,
                event.from,
                event.to,
                event.ids,
                event.amounts,
            );
        }
    }
    for (from, to) in &report.skipped {
        log::warn!("blocks {from}..={to} were skipped; history may be incomplete");
    }
    Ok(())
}
