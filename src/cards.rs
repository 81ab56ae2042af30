//! Trading card report over fetched inventories

use crate::types::NamespaceInventory;
use serde::Serialize;

/// One card type held in a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLine {
    pub market_name: String,
    pub amount: u32,
}

/// Cards held in one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceCards {
    pub namespace: String,
    pub app_id: u32,
    pub cards: Vec<CardLine>,
}

/// Trading cards across namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardReport {
    pub namespaces: Vec<NamespaceCards>,
    pub total: u64,
}

impl CardReport {
    /// Collects trading cards from `inventories`, optionally limited to one app
    ///
    /// A card type with no joined asset counts as one card.
    pub fn build(inventories: &[NamespaceInventory], app_id: Option<u32>) -> Self {
        let mut report = CardReport::default();

        for inventory in inventories {
            if app_id.is_some_and(|id| id != inventory.namespace.app_id) {
                continue;
            }

            let cards: Vec<CardLine> = inventory
                .descriptions
                .iter()
                .filter(|d| d.is_trading_card())
                .map(|d| CardLine {
                    market_name: d.market_name.clone(),
                    amount: inventory.join(d).map_or(1, |asset| asset.amount),
                })
                .collect();

            if cards.is_empty() {
                continue;
            }

            report.total += cards.iter().map(|c| u64::from(c.amount)).sum::<u64>();
            report.namespaces.push(NamespaceCards {
                namespace: inventory.namespace.name.clone(),
                app_id: inventory.namespace.app_id,
                cards,
            });
        }

        report
    }
}
