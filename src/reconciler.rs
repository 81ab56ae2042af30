//! Inventory reconciliation
//!
//! Walks every namespace inventory, prices the assets the ledger does not
//! know yet and appends them. Known assets are skipped, so repeated runs only
//! do work for new items.

use crate::{
    error::LedgerError,
    governor::RateGovernor,
    ledger::{ItemLedger, LedgerEntry, LedgerKey},
    pricing,
    provider::{InventorySource, PriceOracle},
    types::{InventoryDescription, NamespaceInventory, NamespaceSpec},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// What a reconciliation run did
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Namespaces that returned a usable snapshot
    pub namespaces: usize,
    /// Descriptors seen across all namespaces
    pub total_seen: usize,
    /// Entries appended to the ledger
    pub total_new: usize,
    pub already_tracked: usize,
    /// Descriptors with no held units
    pub unjoined: usize,
    /// Assets left for a future run because no price was found
    pub no_price: usize,
    pub price_lookups: usize,
    /// Long pauses taken after every `cooldown_every` lookups
    pub cooldowns: usize,
    pub persist_failures: usize,
}

impl ReconcileSummary {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            namespaces: 0,
            total_seen: 0,
            total_new: 0,
            already_tracked: 0,
            unjoined: 0,
            no_price: 0,
            price_lookups: 0,
            cooldowns: 0,
            persist_failures: 0,
        }
    }
}

/// Prices and records newly seen assets
pub struct InventoryReconciler {
    inventory: Arc<dyn InventorySource>,
    oracle: Arc<dyn PriceOracle>,
    ledger: ItemLedger,
    governor: RateGovernor,
    namespaces: Vec<NamespaceSpec>,
    default_want_to_sell: bool,
}

impl InventoryReconciler {
    pub fn new(
        inventory: Arc<dyn InventorySource>,
        oracle: Arc<dyn PriceOracle>,
        ledger: ItemLedger,
        governor: RateGovernor,
        namespaces: Vec<NamespaceSpec>,
    ) -> Self {
        Self {
            inventory,
            oracle,
            ledger,
            governor,
            namespaces,
            default_want_to_sell: true,
        }
    }

    /// Sets the `wantToSell` flag given to new entries
    pub fn with_default_want_to_sell(mut self, want_to_sell: bool) -> Self {
        self.default_want_to_sell = want_to_sell;
        self
    }

    /// Runs one reconciliation pass for `owner_id`
    pub async fn reconcile(&self, owner_id: &str) -> ReconcileSummary {
        let mut summary = ReconcileSummary::start();
        tracing::info!(
            run_id = %summary.run_id,
            oracle = self.oracle.oracle_name(),
            "Starting inventory reconciliation"
        );

        let inventories = self.inventory.fetch_all(owner_id, &self.namespaces).await;
        summary.namespaces = inventories.len();

        let mut ledger = self.ledger.load().await;

        for inventory in &inventories {
            tracing::info!(
                namespace = %inventory.namespace.name,
                items = inventory.descriptions.len(),
                "Reconciling inventory"
            );
            summary.total_seen += inventory.descriptions.len();

            for description in &inventory.descriptions {
                let Some((key, amount)) = self.join(inventory, description) else {
                    summary.unjoined += 1;
                    continue;
                };

                if let Some(existing) = ledger.find(&key) {
                    tracing::info!(
                        item = description.lookup_name(),
                        key = %key,
                        price = existing.price,
                        sold = existing.sold,
                        "Already tracked"
                    );
                    summary.already_tracked += 1;
                    continue;
                }

                let name = description.lookup_name();
                tracing::info!(item = name, key = %key, "Fetching price");
                let lowest = self.oracle.lowest_price(name, key.app_id).await;
                summary.price_lookups += 1;

                match lowest {
                    None => {
                        tracing::warn!(item = name, key = %key, "No price in market");
                        summary.no_price += 1;
                    }
                    Some(lowest) => {
                        let price = pricing::to_major(pricing::suggested_price(lowest));
                        tracing::info!(
                            item = name,
                            key = %key,
                            lowest_price = pricing::to_major(lowest),
                            price,
                            "Priced new item"
                        );

                        let entry = LedgerEntry::new(key, amount, price, self.default_want_to_sell);
                        match self.ledger.append(&mut ledger, entry).await {
                            Ok(()) => summary.total_new += 1,
                            Err(LedgerError::DuplicateKey(key)) => {
                                tracing::warn!(key = %key, "Entry already tracked, not appended");
                            }
                            Err(e) => {
                                // in memory already, only the write failed
                                tracing::error!(error = %e, "Failed to save ledger");
                                summary.persist_failures += 1;
                                summary.total_new += 1;
                            }
                        }
                    }
                }

                self.governor.short_pause().await;
                if self.governor.cooldown_if_due(summary.price_lookups).await {
                    summary.cooldowns += 1;
                }
            }
        }

        summary.finished_at = Utc::now();
        tracing::info!(
            run_id = %summary.run_id,
            total_seen = summary.total_seen,
            total_new = summary.total_new,
            already_tracked = summary.already_tracked,
            no_price = summary.no_price,
            cooldowns = summary.cooldowns,
            "Inventory reconciliation finished"
        );
        summary
    }

    /// Resolves the ledger key and held amount for a descriptor
    fn join(
        &self,
        inventory: &NamespaceInventory,
        description: &InventoryDescription,
    ) -> Option<(LedgerKey, u32)> {
        let asset = inventory.join(description)?;
        if asset.amount == 0 {
            return None;
        }

        let app_id = match description.app_id {
            0 => inventory.namespace.app_id,
            app_id => app_id,
        };
        let context_id = if asset.context_id.is_empty() {
            inventory.namespace.context_id.to_string()
        } else {
            asset.context_id.clone()
        };

        Some((LedgerKey::new(app_id, context_id, asset.asset_id.clone()), asset.amount))
    }
}
