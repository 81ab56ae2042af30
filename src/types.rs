//! Wire types for the Steam Community endpoints

use serde::{Deserialize, Deserializer, Serialize};

/// One inventory partition to scan: a Steam app and one of its contexts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    /// Steam appid
    pub app_id: u32,
    /// Context within the app (6 for Steam community items, 2 for most games)
    pub context_id: u64,
    /// Display name used in logs
    pub name: String,
}

impl NamespaceSpec {
    pub fn new(app_id: u32, context_id: u64, name: impl Into<String>) -> Self {
        Self {
            app_id,
            context_id,
            name: name.into(),
        }
    }
}

/// Item type metadata, shared by every physical unit of that type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDescription {
    #[serde(rename = "appid", default)]
    pub app_id: u32,
    #[serde(rename = "classid", deserialize_with = "string_or_number")]
    pub class_id: String,
    #[serde(rename = "instanceid", deserialize_with = "string_or_number")]
    pub instance_id: String,
    #[serde(default)]
    pub market_hash_name: String,
    #[serde(default)]
    pub market_name: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
}

impl InventoryDescription {
    /// Name the price overview endpoint understands
    pub fn lookup_name(&self) -> &str {
        if self.market_hash_name.is_empty() {
            &self.market_name
        } else {
            &self.market_hash_name
        }
    }

    /// Whether this item type is a trading card
    pub fn is_trading_card(&self) -> bool {
        self.type_tag.to_lowercase().contains("trading card")
    }

    /// Whether `asset` is a unit of this item type
    pub fn matches(&self, asset: &InventoryAsset) -> bool {
        self.class_id == asset.class_id && self.instance_id == asset.instance_id
    }
}

/// One physical holding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAsset {
    #[serde(rename = "appid", default)]
    pub app_id: u32,
    #[serde(rename = "contextid", deserialize_with = "string_or_number", default)]
    pub context_id: String,
    #[serde(rename = "assetid", deserialize_with = "string_or_number")]
    pub asset_id: String,
    #[serde(rename = "classid", deserialize_with = "string_or_number")]
    pub class_id: String,
    #[serde(rename = "instanceid", deserialize_with = "string_or_number")]
    pub instance_id: String,
    #[serde(deserialize_with = "u32_from_string_or_number", default = "default_amount")]
    pub amount: u32,
}

fn default_amount() -> u32 {
    1
}

/// Raw inventory response; either list may be missing for empty or private inventories
#[derive(Debug, Deserialize)]
pub struct InventoryResponse {
    pub assets: Option<Vec<InventoryAsset>>,
    pub descriptions: Option<Vec<InventoryDescription>>,
    #[serde(default)]
    pub total_inventory_count: Option<u64>,
}

/// Snapshot of one namespace inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInventory {
    pub namespace: NamespaceSpec,
    pub descriptions: Vec<InventoryDescription>,
    pub assets: Vec<InventoryAsset>,
}

impl NamespaceInventory {
    /// First asset holding units of `description`
    pub fn join(&self, description: &InventoryDescription) -> Option<&InventoryAsset> {
        self.assets.iter().find(|asset| description.matches(asset))
    }
}

/// Price overview response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceOverviewResponse {
    #[serde(default)]
    pub success: bool,
    pub lowest_price: Option<String>,
    pub median_price: Option<String>,
    pub volume: Option<String>,
}

/// Sell endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellItemResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    #[serde(default)]
    pub requires_confirmation: Option<serde_json::Value>,
}

/// Classified outcome of a single sell submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellOutcome {
    pub success: bool,
    pub message: Option<String>,
    /// Listing created but waits for a mobile/email confirmation
    pub requires_confirmation: bool,
}

impl SellOutcome {
    /// Outcome for a submission that never produced a readable response
    pub fn transport_failure() -> Self {
        Self::default()
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            requires_confirmation: false,
        }
    }

    pub fn listed() -> Self {
        Self {
            success: true,
            message: None,
            requires_confirmation: false,
        }
    }
}

impl From<SellItemResponse> for SellOutcome {
    fn from(response: SellItemResponse) -> Self {
        Self {
            success: response.success,
            message: response.message,
            requires_confirmation: response.requires_confirmation.as_ref().is_some_and(truthy),
        }
    }
}

/// Steam sends flags as `1`/`0` or as booleans
fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

/// Steam encodes ids and amounts as strings in some places and numbers in others
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

pub(crate) fn u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => u32::try_from(n).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_accepts_string_fields() {
        let asset: InventoryAsset = serde_json::from_value(serde_json::json!({
            "appid": 753,
            "contextid": "6",
            "assetid": "30012345678",
            "classid": "667924416",
            "instanceid": "0",
            "amount": "3"
        }))
        .unwrap();

        assert_eq!(asset.context_id, "6");
        assert_eq!(asset.asset_id, "30012345678");
        assert_eq!(asset.amount, 3);
    }

    #[test]
    fn test_inventory_without_assets() {
        let response: InventoryResponse =
            serde_json::from_str(r#"{"total_inventory_count":0,"success":1}"#).unwrap();
        assert!(response.assets.is_none());
        assert!(response.descriptions.is_none());
    }

    #[test]
    fn test_lookup_name_falls_back_to_market_name() {
        let description = InventoryDescription {
            app_id: 753,
            class_id: "1".to_string(),
            instance_id: "0".to_string(),
            market_hash_name: String::new(),
            market_name: "Widget".to_string(),
            type_tag: "Portal Trading Card".to_string(),
        };
        assert_eq!(description.lookup_name(), "Widget");
        assert!(description.is_trading_card());
    }

    #[test]
    fn test_sell_response_confirmation_flag() {
        let response: SellItemResponse = serde_json::from_str(
            r#"{"success":true,"requires_confirmation":1,"needs_mobile_confirmation":true}"#,
        )
        .unwrap();
        let outcome = SellOutcome::from(response);
        assert!(outcome.success);
        assert!(outcome.requires_confirmation);
        assert_eq!(outcome.message, None);
    }
}
