//! Steam Market Lister - Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use steam_market_lister::{
    constants::DEFAULT_CONFIG_PATH, pricing, AppConfig, BatchSeller, CardReport,
    InventoryReconciler, InventorySource, ItemLedger, NamespaceSpec, PriceOracle, RateGovernor,
    SteamClient, SteamInventorySource, SteamMarketLister, SteamPriceOracle,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Track Steam inventories and list items on the Community Market
#[derive(Parser, Debug)]
#[command(name = "steam-lister", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "STEAM_LISTER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Emit JSON log lines
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all inventories and price newly seen items into the ledger
    Track,
    /// List every ledger item flagged for sale
    Sell,
    /// Show trading cards held across inventories
    Cards {
        /// Only this appid
        #[arg(long)]
        app_id: Option<u32>,
    },
    /// Look up the lowest market price of one item
    Price {
        /// Market hash name, e.g. "250180-MARCO ROSSI"
        name: String,
        #[arg(long, default_value_t = 753)]
        app_id: u32,
    },
    /// Fetch a single inventory and show its size
    Inventory {
        #[arg(long, default_value_t = 753)]
        app_id: u32,
        #[arg(long, default_value_t = 6)]
        context_id: u64,
    },
}

fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,steam_market_lister=debug"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json);

    info!(config_path = %args.config.display(), "Loading configuration");
    let config = AppConfig::load(&args.config)?;
    info!(
        ledger = %config.ledger_path.display(),
        namespaces = config.namespaces.len(),
        credentials = ?config.credentials,
        "Configuration loaded"
    );

    let client = SteamClient::new(&config).context("Failed to build HTTP client")?;
    let governor = RateGovernor::from(&config.pacing);
    let ledger = ItemLedger::new(&config.ledger_path);

    match args.command {
        Command::Track => {
            config.credentials.require_session()?;
            config.credentials.require_owner()?;
            let reconciler = InventoryReconciler::new(
                Arc::new(SteamInventorySource::new(client.clone(), governor.clone())),
                Arc::new(SteamPriceOracle::new(client.clone())),
                ledger,
                governor,
                config.namespaces.clone(),
            )
            .with_default_want_to_sell(config.default_want_to_sell);

            let summary = reconciler.reconcile(&config.credentials.steam_id).await;
            println!(
                "Total items in all games: {} ({} new, {} already tracked, {} without price)",
                summary.total_seen, summary.total_new, summary.already_tracked, summary.no_price
            );
        }
        Command::Sell => {
            config.credentials.require_session()?;
            let seller = BatchSeller::new(
                Arc::new(SteamMarketLister::new(client.clone())),
                ledger,
                governor,
            );

            let summary = seller.run().await;
            if summary.nothing_to_do() {
                println!("No items marked for sale (wantToSell: true) in the ledger.");
            } else {
                println!(
                    "Listed {} of {} items ({} failed, {} awaiting confirmation)",
                    summary.listed, summary.eligible, summary.failed, summary.awaiting_confirmation
                );
            }
        }
        Command::Cards { app_id } => {
            config.credentials.require_session()?;
            config.credentials.require_owner()?;
            let namespaces: Vec<NamespaceSpec> = config
                .namespaces
                .iter()
                .filter(|ns| app_id.map_or(true, |id| id == ns.app_id))
                .cloned()
                .collect();
            let source = SteamInventorySource::new(client.clone(), governor);
            let inventories = source
                .fetch_all(&config.credentials.steam_id, &namespaces)
                .await;

            let report = CardReport::build(&inventories, app_id);
            for namespace in &report.namespaces {
                println!("\nTrading Cards from {}:", namespace.namespace);
                for card in &namespace.cards {
                    println!("- {} (Amount: {})", card.market_name, card.amount);
                }
            }
            println!("\nTotal trading cards found: {}", report.total);
        }
        Command::Price { name, app_id } => {
            let oracle = SteamPriceOracle::new(client.clone());
            match oracle.lowest_price(&name, app_id).await {
                Some(lowest) => println!(
                    "Lowest price for {}: ${:.2} (list at ${:.2})",
                    name,
                    pricing::to_major(lowest),
                    pricing::to_major(pricing::suggested_price(lowest))
                ),
                None => println!("No price found for {}.", name),
            }
        }
        Command::Inventory { app_id, context_id } => {
            config.credentials.require_session()?;
            config.credentials.require_owner()?;
            let namespace = config
                .namespaces
                .iter()
                .find(|ns| ns.app_id == app_id && ns.context_id == context_id)
                .cloned()
                .unwrap_or_else(|| NamespaceSpec::new(app_id, context_id, app_id.to_string()));
            let source = SteamInventorySource::new(client.clone(), governor);
            match source
                .fetch_namespace(&config.credentials.steam_id, &namespace)
                .await
            {
                Some(inventory) => println!(
                    "{}: {} item types, {} assets",
                    namespace.name,
                    inventory.descriptions.len(),
                    inventory.assets.len()
                ),
                None => println!("Could not load inventory for {}.", namespace.name),
            }
        }
    }

    let metrics = client.metrics().await;
    info!(
        host = %metrics.host,
        requests = metrics.total_requests,
        failed = metrics.failed_requests,
        rate_limited = metrics.rate_limited,
        p50_ms = metrics.latency_p50_ms,
        p99_ms = metrics.latency_p99_ms,
        success_rate = metrics.success_rate,
        "Request metrics"
    );

    Ok(())
}
