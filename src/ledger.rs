//! Persisted item ledger
//!
//! The ledger is a single JSON document listing every tracked asset with its
//! listing price and sale status. It is loaded once per run, mutated in memory
//! and written back whole.

use crate::{
    error::LedgerError,
    types::{string_or_number, u32_from_string_or_number, SellOutcome},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a tracked asset
///
/// Asset ids are only unique within an app and context, so all three make up the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub app_id: u32,
    pub context_id: String,
    pub asset_id: String,
}

impl LedgerKey {
    pub fn new(app_id: u32, context_id: impl Into<String>, asset_id: impl Into<String>) -> Self {
        Self {
            app_id,
            context_id: context_id.into(),
            asset_id: asset_id.into(),
        }
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_id, self.context_id, self.asset_id)
    }
}

/// Result of the last sell submission for an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellResult {
    pub success: bool,
    pub message: Option<String>,
}

/// One tracked asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "assetid", deserialize_with = "string_or_number")]
    pub asset_id: String,
    #[serde(rename = "appid")]
    pub app_id: u32,
    #[serde(rename = "contextid", deserialize_with = "string_or_number")]
    pub context_id: String,
    #[serde(deserialize_with = "u32_from_string_or_number")]
    pub amount: u32,
    /// Listing price in major units, two decimals
    pub price: f64,
    pub sold: bool,
    #[serde(rename = "wantToSell")]
    pub want_to_sell: bool,
    #[serde(rename = "soldAttempts", default, skip_serializing_if = "is_zero")]
    pub sold_attempts: u32,
    #[serde(rename = "sellResult", default, skip_serializing_if = "Option::is_none")]
    pub sell_result: Option<SellResult>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl LedgerEntry {
    /// A freshly priced, unsold entry
    pub fn new(key: LedgerKey, amount: u32, price: f64, want_to_sell: bool) -> Self {
        Self {
            asset_id: key.asset_id,
            app_id: key.app_id,
            context_id: key.context_id,
            amount,
            price,
            sold: false,
            want_to_sell,
            sold_attempts: 0,
            sell_result: None,
        }
    }

    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.app_id, self.context_id.clone(), self.asset_id.clone())
    }

    /// Flagged for sale and not yet sold
    pub fn is_eligible_for_sale(&self) -> bool {
        self.want_to_sell && !self.sold
    }

    /// Applies the outcome of a sell submission
    ///
    /// A failed submission clears `want_to_sell` for good so the entry is never
    /// picked again.
    pub fn record_attempt(&mut self, outcome: &SellOutcome) {
        self.sold = outcome.success;
        if !outcome.success {
            self.want_to_sell = false;
        }
        self.sell_result = Some(SellResult {
            success: outcome.success,
            message: outcome.message.clone(),
        });
        self.sold_attempts = self.sold_attempts.saturating_add(1);
    }
}

/// In-memory ledger, insertion ordered, indexed by [`LedgerKey`]
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    index: HashMap<LedgerKey, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a loaded document
    ///
    /// Duplicate keys are kept in the document; lookups resolve to the first one.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let key = entry.key();
            if index.contains_key(&key) {
                tracing::warn!(key = %key, "Duplicate ledger entry, keeping the first one");
                continue;
            }
            index.insert(key, position);
        }
        Self { entries, index }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn find(&self, key: &LedgerKey) -> Option<&LedgerEntry> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    pub fn find_mut(&mut self, key: &LedgerKey) -> Option<&mut LedgerEntry> {
        match self.index.get(key) {
            Some(&position) => self.entries.get_mut(position),
            None => None,
        }
    }

    /// Adds a new entry; an already tracked key is rejected
    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let key = entry.key();
        if self.index.contains_key(&key) {
            return Err(LedgerError::DuplicateKey(key.to_string()));
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Entries flagged for sale and not yet sold, in ledger order
    ///
    /// Later copies of a duplicated key are never offered, since sell
    /// outcomes are only recorded against the first one.
    pub fn eligible_for_sale(&self) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(position, entry)| {
                entry.is_eligible_for_sale() && self.index.get(&entry.key()) == Some(position)
            })
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// Applies a sell outcome to the entry under `key`; false when it is not tracked
    pub fn record_attempt(&mut self, key: &LedgerKey, outcome: &SellOutcome) -> bool {
        match self.find_mut(key) {
            Some(entry) => {
                entry.record_attempt(outcome);
                true
            }
            None => false,
        }
    }
}

/// File-backed ledger document
#[derive(Debug, Clone)]
pub struct ItemLedger {
    path: PathBuf,
}

impl ItemLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every entry
    ///
    /// A missing document is an empty ledger. A corrupt one is reported and
    /// also treated as empty.
    pub async fn load_all(&self) -> Vec<LedgerEntry> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No ledger yet, starting empty");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read ledger, treating it as empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<LedgerEntry>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ledger is corrupt, treating it as empty"
                );
                Vec::new()
            }
        }
    }

    /// Loads the document into an indexed [`Ledger`]
    pub async fn load(&self) -> Ledger {
        Ledger::from_entries(self.load_all().await)
    }

    /// Looks up one entry straight from disk
    pub async fn find(&self, key: &LedgerKey) -> Option<LedgerEntry> {
        self.load_all()
            .await
            .into_iter()
            .find(|entry| &entry.key() == key)
    }

    /// Appends to the in-memory ledger and writes the whole document back
    pub async fn append(&self, ledger: &mut Ledger, entry: LedgerEntry) -> Result<(), LedgerError> {
        ledger.append(entry)?;
        self.persist(ledger.entries()).await
    }

    /// Overwrites the document with `entries`
    pub async fn persist(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "Ledger saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(asset_id: &str, want_to_sell: bool) -> LedgerEntry {
        LedgerEntry::new(LedgerKey::new(753, "6", asset_id), 1, 0.49, want_to_sell)
    }

    #[test]
    fn test_append_rejects_duplicate_key() {
        let mut ledger = Ledger::new();
        ledger.append(entry("1", true)).unwrap();
        assert!(matches!(
            ledger.append(entry("1", false)),
            Err(LedgerError::DuplicateKey(_))
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_same_asset_id_in_other_namespace_is_distinct() {
        let mut ledger = Ledger::new();
        ledger.append(entry("1", true)).unwrap();
        ledger
            .append(LedgerEntry::new(LedgerKey::new(730, "2", "1"), 1, 1.0, true))
            .unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains(&LedgerKey::new(730, "2", "1")));
        assert!(!ledger.contains(&LedgerKey::new(730, "6", "1")));
    }

    #[test]
    fn test_record_attempt_success() {
        let mut item = entry("X", true);
        item.record_attempt(&SellOutcome::listed());
        assert!(item.sold);
        assert!(item.want_to_sell);
        assert_eq!(item.sold_attempts, 1);
        assert_eq!(
            item.sell_result,
            Some(SellResult {
                success: true,
                message: None
            })
        );
    }

    #[test]
    fn test_record_attempt_failure_clears_want_to_sell() {
        let mut item = entry("X", true);
        item.record_attempt(&SellOutcome::rejected("rate limited"));
        assert!(!item.sold);
        assert!(!item.want_to_sell);
        assert!(!item.is_eligible_for_sale());
        assert_eq!(item.sold_attempts, 1);

        item.record_attempt(&SellOutcome::transport_failure());
        assert_eq!(item.sold_attempts, 2);
        assert_eq!(item.sell_result.as_ref().unwrap().message, None);
    }

    #[test]
    fn test_eligible_for_sale_keeps_order() {
        let mut sold = entry("2", true);
        sold.sold = true;
        let ledger = Ledger::from_entries(vec![
            entry("3", true),
            sold,
            entry("4", false),
            entry("1", true),
        ]);
        let ids: Vec<_> = ledger
            .eligible_for_sale()
            .into_iter()
            .map(|e| e.asset_id)
            .collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_duplicate_key_offered_once() {
        let mut ledger = Ledger::from_entries(vec![entry("X", true), entry("X", true)]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.eligible_for_sale().len(), 1);

        ledger.record_attempt(&LedgerKey::new(753, "6", "X"), &SellOutcome::rejected("no"));
        assert!(ledger.eligible_for_sale().is_empty());
        assert!(!ledger.entries()[0].want_to_sell);
        assert!(ledger.entries()[1].want_to_sell);
    }

    #[test]
    fn test_document_field_names() {
        let mut item = entry("30012345678", true);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["assetid"], "30012345678");
        assert_eq!(json["appid"], 753);
        assert_eq!(json["contextid"], "6");
        assert_eq!(json["price"], 0.49);
        assert_eq!(json["wantToSell"], true);
        assert!(json.get("soldAttempts").is_none());
        assert!(json.get("sellResult").is_none());

        item.record_attempt(&SellOutcome::rejected("nope"));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["soldAttempts"], 1);
        assert_eq!(json["sellResult"]["success"], false);
        assert_eq!(json["sellResult"]["message"], "nope");
    }

    #[test]
    fn test_reads_numeric_context_id() {
        let parsed: LedgerEntry = serde_json::from_str(
            r#"{"assetid":"9","appid":753,"contextid":6,"amount":1,"price":0.03,"sold":false,"wantToSell":true}"#,
        )
        .unwrap();
        assert_eq!(parsed.context_id, "6");
        assert_eq!(parsed.sold_attempts, 0);
        assert!(parsed.sell_result.is_none());
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let dir = tempdir().unwrap();
        let store = ItemLedger::new(dir.path().join("items.json"));
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, "[{ not json").unwrap();
        let store = ItemLedger::new(&path);
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = tempdir().unwrap();
        let store = ItemLedger::new(dir.path().join("nested").join("items.json"));

        let mut ledger = store.load().await;
        store.append(&mut ledger, entry("1", true)).await.unwrap();
        store.append(&mut ledger, entry("2", false)).await.unwrap();

        let reloaded = store.load().await;
        assert_eq!(reloaded.entries(), ledger.entries());

        let found = store.find(&LedgerKey::new(753, "6", "2")).await.unwrap();
        assert!(!found.want_to_sell);
        assert!(store.find(&LedgerKey::new(753, "6", "9")).await.is_none());
    }
}
