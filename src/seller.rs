//! Batch listing of ledger entries flagged for sale

use crate::{
    governor::RateGovernor,
    ledger::{ItemLedger, LedgerKey},
    provider::{MarketLister, SellRequest},
    types::SellOutcome,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// What a batch run did
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Entries that were eligible for sale
    pub eligible: usize,
    pub listed: usize,
    pub failed: usize,
    /// Listings that still need a mobile or email confirmation
    pub awaiting_confirmation: usize,
    /// Whether the ledger was written back
    pub persisted: bool,
}

impl BatchSummary {
    /// True when nothing was eligible for sale
    pub fn nothing_to_do(&self) -> bool {
        self.eligible == 0
    }
}

/// Submits every entry with `wantToSell` set and not yet sold
pub struct BatchSeller {
    lister: Arc<dyn MarketLister>,
    ledger: ItemLedger,
    governor: RateGovernor,
}

impl BatchSeller {
    pub fn new(lister: Arc<dyn MarketLister>, ledger: ItemLedger, governor: RateGovernor) -> Self {
        Self {
            lister,
            ledger,
            governor,
        }
    }

    /// Lists eligible entries one by one and records the outcomes
    ///
    /// The ledger is written once, after the whole batch.
    pub async fn run(&self) -> BatchSummary {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let mut ledger = self.ledger.load().await;
        let eligible = ledger.eligible_for_sale();

        let mut summary = BatchSummary {
            run_id,
            started_at,
            finished_at: started_at,
            eligible: eligible.len(),
            listed: 0,
            failed: 0,
            awaiting_confirmation: 0,
            persisted: false,
        };

        if eligible.is_empty() {
            tracing::info!(run_id = %run_id, "No items marked for sale");
            return summary;
        }

        tracing::info!(run_id = %run_id, items = eligible.len(), "Starting batch listing");

        let mut results: Vec<(LedgerKey, SellOutcome)> = Vec::with_capacity(eligible.len());
        for entry in &eligible {
            let request = SellRequest::from(entry);
            tracing::info!(
                asset_id = %request.asset_id,
                app_id = request.app_id,
                context_id = %request.context_id,
                amount = request.amount,
                price = request.price,
                "Listing"
            );
            let outcome = self.lister.submit(&request).await;
            results.push((entry.key(), outcome));
            self.governor.short_pause().await;
        }

        for (key, outcome) in &results {
            if outcome.success {
                summary.listed += 1;
                if outcome.requires_confirmation {
                    summary.awaiting_confirmation += 1;
                }
            } else {
                summary.failed += 1;
            }
            if !ledger.record_attempt(key, outcome) {
                tracing::warn!(key = %key, "Listed item no longer in ledger");
            }
        }

        match self.ledger.persist(ledger.entries()).await {
            Ok(()) => summary.persisted = true,
            Err(e) => tracing::error!(error = %e, "Failed to save sale results"),
        }

        summary.finished_at = Utc::now();
        tracing::info!(
            run_id = %run_id,
            listed = summary.listed,
            failed = summary.failed,
            "Batch listing finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerEntry;
    use crate::provider::mock::MockLister;
    use tempfile::{tempdir, TempDir};

    fn entry(asset_id: &str, want_to_sell: bool, sold: bool) -> LedgerEntry {
        let mut entry = LedgerEntry::new(LedgerKey::new(753, "6", asset_id), 1, 0.49, want_to_sell);
        entry.sold = sold;
        entry
    }

    async fn setup(entries: Vec<LedgerEntry>) -> (TempDir, ItemLedger, Arc<MockLister>) {
        let dir = tempdir().unwrap();
        let ledger = ItemLedger::new(dir.path().join("items.json"));
        if !entries.is_empty() {
            ledger.persist(&entries).await.unwrap();
        }
        (dir, ledger, Arc::new(MockLister::new()))
    }

    fn seller(ledger: &ItemLedger, lister: &Arc<MockLister>) -> BatchSeller {
        BatchSeller::new(lister.clone(), ledger.clone(), RateGovernor::unpaced())
    }

    #[tokio::test]
    async fn test_successful_listing_marks_sold() {
        let (_dir, ledger, lister) = setup(vec![entry("X", true, false)]).await;
        lister.set_outcome("X", SellOutcome::listed());

        let summary = seller(&ledger, &lister).run().await;

        assert_eq!(summary.listed, 1);
        assert!(summary.persisted);
        let entries = ledger.load_all().await;
        assert!(entries[0].sold);
        assert!(entries[0].want_to_sell);
        assert_eq!(entries[0].sold_attempts, 1);
        assert_eq!(lister.submitted()[0].price_minor(), 49);
    }

    #[tokio::test]
    async fn test_rejected_listing_is_never_retried() {
        let (_dir, ledger, lister) = setup(vec![entry("X", true, false)]).await;
        lister.set_outcome("X", SellOutcome::rejected("rate limited"));

        let summary = seller(&ledger, &lister).run().await;
        assert_eq!(summary.failed, 1);

        let entries = ledger.load_all().await;
        assert!(!entries[0].want_to_sell);
        assert!(!entries[0].sold);
        assert_eq!(entries[0].sold_attempts, 1);
        let result = entries[0].sell_result.as_ref().unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("rate limited"));

        let second = seller(&ledger, &lister).run().await;
        assert!(second.nothing_to_do());
        assert_eq!(lister.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_records_null_message() {
        let (_dir, ledger, lister) = setup(vec![entry("X", true, false)]).await;
        lister.set_outcome("X", SellOutcome::transport_failure());

        seller(&ledger, &lister).run().await;

        let entries = ledger.load_all().await;
        assert!(!entries[0].want_to_sell);
        assert_eq!(entries[0].sell_result.as_ref().unwrap().message, None);
    }

    #[tokio::test]
    async fn test_only_eligible_entries_submitted_in_order() {
        let (_dir, ledger, lister) = setup(vec![
            entry("c", true, false),
            entry("sold", true, true),
            entry("keep", false, false),
            entry("a", true, false),
        ])
        .await;
        lister.set_outcome("a", SellOutcome::rejected("nope"));

        let summary = seller(&ledger, &lister).run().await;

        let submitted: Vec<_> = lister
            .submitted()
            .into_iter()
            .map(|r| r.asset_id)
            .collect();
        assert_eq!(submitted, vec!["c", "a"]);
        assert_eq!(summary.eligible, 2);
        assert_eq!(summary.listed, 1);
        assert_eq!(summary.failed, 1);

        let entries = ledger.load_all().await;
        assert_eq!(entries.len(), 4);
        assert!(entries[0].sold);
        assert_eq!(entries[1].sold_attempts, 0);
        assert!(entries[1].sell_result.is_none());
        assert_eq!(entries[2].sold_attempts, 0);
        assert!(!entries[3].want_to_sell);
    }

    #[tokio::test]
    async fn test_duplicated_entry_submitted_once() {
        let (_dir, ledger, lister) =
            setup(vec![entry("X", true, false), entry("X", true, false)]).await;
        lister.set_outcome("X", SellOutcome::rejected("rate limited"));

        let first = seller(&ledger, &lister).run().await;
        assert_eq!(first.eligible, 1);
        for _ in 0..2 {
            assert!(seller(&ledger, &lister).run().await.nothing_to_do());
        }

        assert_eq!(lister.submitted().len(), 1);
        let entries = ledger.load_all().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sold_attempts, 1);
        assert!(!entries[0].want_to_sell);
        assert_eq!(entries[1].sold_attempts, 0);
    }

    #[tokio::test]
    async fn test_nothing_to_do_does_not_write() {
        let (_dir, ledger, lister) = setup(vec![]).await;

        let summary = seller(&ledger, &lister).run().await;

        assert!(summary.nothing_to_do());
        assert!(!summary.persisted);
        assert!(!ledger.path().exists());
    }

    #[tokio::test]
    async fn test_attempts_accumulate() {
        let mut previous = entry("X", true, false);
        previous.sold_attempts = 2;
        let (_dir, ledger, lister) = setup(vec![previous]).await;

        seller(&ledger, &lister).run().await;

        assert_eq!(ledger.load_all().await[0].sold_attempts, 3);
    }

    #[tokio::test]
    async fn test_confirmation_is_counted() {
        let (_dir, ledger, lister) = setup(vec![entry("X", true, false)]).await;
        lister.set_outcome(
            "X",
            SellOutcome {
                success: true,
                message: None,
                requires_confirmation: true,
            },
        );

        let summary = seller(&ledger, &lister).run().await;
        assert_eq!(summary.awaiting_confirmation, 1);
    }
}
