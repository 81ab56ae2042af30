//! # Steam Market Lister
//!
//! Tracks the items held across several Steam inventories, prices new ones
//! against the Community Market and lists the ones flagged for sale.
//!
//! ## Pipeline
//!
//! ```text
//! InventorySource (one request per app/context)
//!     ↓
//! InventoryReconciler ── PriceOracle (lowest price − 1 cent)
//!     ↓
//! ItemLedger (items.json)
//!     ↓
//! BatchSeller ── MarketLister (sellitem)
//! ```
//!
//! Every request is paced by a [`RateGovernor`]; nothing runs concurrently.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use steam_market_lister::{
//!     AppConfig, BatchSeller, InventoryReconciler, ItemLedger, RateGovernor, SteamClient,
//!     SteamInventorySource, SteamMarketLister, SteamPriceOracle,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("steam-lister.toml".as_ref())?;
//! let client = SteamClient::new(&config)?;
//! let governor = RateGovernor::from(&config.pacing);
//! let ledger = ItemLedger::new(&config.ledger_path);
//!
//! let reconciler = InventoryReconciler::new(
//!     Arc::new(SteamInventorySource::new(client.clone(), governor.clone())),
//!     Arc::new(SteamPriceOracle::new(client.clone())),
//!     ledger.clone(),
//!     governor.clone(),
//!     config.namespaces.clone(),
//! );
//! let summary = reconciler.reconcile(&config.credentials.steam_id).await;
//! println!("{} new items", summary.total_new);
//!
//! let seller = BatchSeller::new(Arc::new(SteamMarketLister::new(client)), ledger, governor);
//! let batch = seller.run().await;
//! println!("{} listed, {} failed", batch.listed, batch.failed);
//! # Ok(())
//! # }
//! ```

pub mod cards;
pub mod config;
pub mod constants;
pub mod error;
pub mod governor;
pub mod ledger;
pub mod metrics;
pub mod pricing;
pub mod provider;
pub mod reconciler;
pub mod seller;
pub mod steam;
pub mod types;

// Re-export commonly used types
pub use cards::CardReport;
pub use config::{AppConfig, Credentials, PacingConfig};
pub use error::{ConfigError, LedgerError, SteamError};
pub use governor::RateGovernor;
pub use ledger::{ItemLedger, Ledger, LedgerEntry, LedgerKey, SellResult};
pub use metrics::RequestMetrics;
pub use provider::{InventorySource, MarketLister, PriceOracle, SellRequest};
pub use reconciler::{InventoryReconciler, ReconcileSummary};
pub use seller::{BatchSeller, BatchSummary};
pub use steam::{SteamClient, SteamInventorySource, SteamMarketLister, SteamPriceOracle};
pub use types::{NamespaceInventory, NamespaceSpec, SellOutcome};
