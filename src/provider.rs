//! Seams between the tracking pipeline and the marketplace
//!
//! The reconciler and the batch seller only see these traits; the Steam
//! implementations live in [`crate::steam`].

use crate::{
    ledger::LedgerEntry,
    pricing,
    types::{NamespaceInventory, NamespaceSpec, SellOutcome},
};
use async_trait::async_trait;

/// Lowest-price lookup for a named item
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Lowest listed price in minor units, or `None` when no price is available
    ///
    /// Never fails: transport and parse errors are reported as `None`.
    async fn lowest_price(&self, item_name: &str, app_id: u32) -> Option<u64>;

    /// Returns the name of this oracle
    fn oracle_name(&self) -> &'static str;
}

/// Per-namespace inventory snapshots
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetches one namespace; `None` when the snapshot is unusable
    async fn fetch_namespace(&self, owner_id: &str, namespace: &NamespaceSpec)
        -> Option<NamespaceInventory>;

    /// Fetches every namespace in order, pausing between requests
    ///
    /// Unusable namespaces are left out of the result.
    async fn fetch_all(
        &self,
        owner_id: &str,
        namespaces: &[NamespaceSpec],
    ) -> Vec<NamespaceInventory>;
}

/// A single sell submission
#[derive(Debug, Clone, PartialEq)]
pub struct SellRequest {
    pub asset_id: String,
    pub app_id: u32,
    pub context_id: String,
    pub amount: u32,
    /// Major units; converted to cents on submission
    pub price: f64,
}

impl SellRequest {
    pub fn price_minor(&self) -> u64 {
        pricing::to_minor(self.price)
    }
}

impl From<&LedgerEntry> for SellRequest {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            asset_id: entry.asset_id.clone(),
            app_id: entry.app_id,
            context_id: entry.context_id.clone(),
            amount: entry.amount,
            price: entry.price,
        }
    }
}

/// Lists one item for sale
#[async_trait]
pub trait MarketLister: Send + Sync {
    /// Submits a listing; transport failures come back as an unsuccessful outcome
    async fn submit(&self, request: &SellRequest) -> SellOutcome;
}
