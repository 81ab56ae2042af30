//! Inventory snapshots through `/inventory/{owner}/{appid}/{contextid}`

use crate::{
    error::SteamError,
    governor::RateGovernor,
    provider::InventorySource,
    steam::SteamClient,
    types::{InventoryResponse, NamespaceInventory, NamespaceSpec},
};
use async_trait::async_trait;

/// Inventory source backed by the community inventory endpoint
#[derive(Clone)]
pub struct SteamInventorySource {
    client: SteamClient,
    governor: RateGovernor,
}

impl SteamInventorySource {
    pub fn new(client: SteamClient, governor: RateGovernor) -> Self {
        Self { client, governor }
    }

    /// Builds the inventory URL for one namespace
    pub fn build_url(&self, owner_id: &str, namespace: &NamespaceSpec) -> String {
        format!(
            "{}?l={}&count={}",
            self.client.url(&format!(
                "/inventory/{}/{}/{}",
                owner_id, namespace.app_id, namespace.context_id
            )),
            self.client.language(),
            self.client.page_size()
        )
    }

    /// Fetches the raw inventory document for one namespace
    pub async fn fetch_raw(
        &self,
        owner_id: &str,
        namespace: &NamespaceSpec,
    ) -> Result<InventoryResponse, SteamError> {
        let url = self.build_url(owner_id, namespace);
        tracing::debug!(url = %url, "Fetching inventory");
        self.client.get_json_authenticated(&url).await
    }
}

#[async_trait]
impl InventorySource for SteamInventorySource {
    async fn fetch_namespace(
        &self,
        owner_id: &str,
        namespace: &NamespaceSpec,
    ) -> Option<NamespaceInventory> {
        tracing::info!(
            namespace = %namespace.name,
            app_id = namespace.app_id,
            "Fetching inventory"
        );

        let response = match self.fetch_raw(owner_id, namespace).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(namespace = %namespace.name, error = %e, "Could not load inventory");
                return None;
            }
        };

        match (response.descriptions, response.assets) {
            (Some(descriptions), Some(assets)) => Some(NamespaceInventory {
                namespace: namespace.clone(),
                descriptions,
                assets,
            }),
            _ => {
                tracing::warn!(
                    namespace = %namespace.name,
                    total = ?response.total_inventory_count,
                    "Inventory response missing descriptions or assets"
                );
                None
            }
        }
    }

    async fn fetch_all(
        &self,
        owner_id: &str,
        namespaces: &[NamespaceSpec],
    ) -> Vec<NamespaceInventory> {
        let mut inventories = Vec::with_capacity(namespaces.len());
        for namespace in namespaces {
            if let Some(inventory) = self.fetch_namespace(owner_id, namespace).await {
                inventories.push(inventory);
            }
            self.governor.short_pause().await;
        }
        inventories
    }
}
