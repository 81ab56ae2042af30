//! Sell submissions through `/market/sellitem/`

use crate::{
    constants::SELL_ITEM_ENDPOINT,
    error::SteamError,
    provider::{MarketLister, SellRequest},
    steam::SteamClient,
    types::{SellItemResponse, SellOutcome},
};
use async_trait::async_trait;
use serde::Serialize;

/// Form body of a sell request; `price` is what the seller receives, in cents
#[derive(Debug, Serialize)]
struct SellItemForm<'a> {
    sessionid: &'a str,
    appid: u32,
    contextid: &'a str,
    assetid: &'a str,
    amount: u32,
    price: u64,
}

/// Market lister backed by the community sell endpoint
#[derive(Clone)]
pub struct SteamMarketLister {
    client: SteamClient,
}

impl SteamMarketLister {
    pub fn new(client: SteamClient) -> Self {
        Self { client }
    }

    /// Sends the sell request and decodes Steam's answer
    pub async fn sell_item(&self, request: &SellRequest) -> Result<SellItemResponse, SteamError> {
        let form = SellItemForm {
            sessionid: &self.client.credentials().session_id,
            appid: request.app_id,
            contextid: &request.context_id,
            assetid: &request.asset_id,
            amount: request.amount,
            price: request.price_minor(),
        };
        self.client
            .post_form_authenticated(&self.client.url(SELL_ITEM_ENDPOINT), &form)
            .await
    }
}

#[async_trait]
impl MarketLister for SteamMarketLister {
    async fn submit(&self, request: &SellRequest) -> SellOutcome {
        let outcome = match self.sell_item(request).await {
            Ok(response) => SellOutcome::from(response),
            Err(e) => {
                tracing::error!(
                    asset_id = %request.asset_id,
                    error = %e,
                    "Network error while listing"
                );
                return SellOutcome::transport_failure();
            }
        };

        if outcome.success {
            tracing::info!(
                asset_id = %request.asset_id,
                app_id = request.app_id,
                context_id = %request.context_id,
                amount = request.amount,
                price = request.price,
                "Listed"
            );
            if outcome.requires_confirmation {
                tracing::info!(asset_id = %request.asset_id, "Listing awaits confirmation");
            }
        } else {
            tracing::warn!(
                asset_id = %request.asset_id,
                message = ?outcome.message,
                "Listing rejected"
            );
        }
        outcome
    }
}
