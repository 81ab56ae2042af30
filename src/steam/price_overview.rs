//! Lowest-price lookups through the public price overview endpoint

use crate::{
    constants::PRICE_OVERVIEW_ENDPOINT,
    error::SteamError,
    pricing,
    provider::PriceOracle,
    steam::SteamClient,
    types::PriceOverviewResponse,
};
use async_trait::async_trait;

/// Price oracle backed by `/market/priceoverview/`
#[derive(Clone)]
pub struct SteamPriceOracle {
    client: SteamClient,
}

impl SteamPriceOracle {
    pub fn new(client: SteamClient) -> Self {
        Self { client }
    }

    /// Builds the price overview URL for an item
    pub fn build_url(&self, item_name: &str, app_id: u32) -> String {
        format!(
            "{}?currency={}&appid={}&market_hash_name={}",
            self.client.url(PRICE_OVERVIEW_ENDPOINT),
            self.client.currency(),
            app_id,
            urlencoding::encode(item_name)
        )
    }

    /// Fetches the raw overview for an item
    pub async fn fetch_overview(
        &self,
        item_name: &str,
        app_id: u32,
    ) -> Result<PriceOverviewResponse, SteamError> {
        let url = self.build_url(item_name, app_id);
        tracing::debug!(url = %url, "Fetching price overview");
        self.client.get_json(&url).await
    }
}

#[async_trait]
impl PriceOracle for SteamPriceOracle {
    async fn lowest_price(&self, item_name: &str, app_id: u32) -> Option<u64> {
        let overview = match self.fetch_overview(item_name, app_id).await {
            Ok(overview) => overview,
            Err(e) => {
                tracing::warn!(item = item_name, app_id, error = %e, "Price lookup failed");
                return None;
            }
        };

        let raw = overview.lowest_price?;
        let price = pricing::parse_currency(&raw);
        if price.is_none() {
            tracing::warn!(item = item_name, app_id, raw = %raw, "Unparseable lowest price");
        }
        price
    }

    fn oracle_name(&self) -> &'static str {
        "steam_price_overview"
    }
}
