//! Shared HTTP transport for the Steam Community endpoints

use crate::{
    config::{AppConfig, Credentials},
    constants::{MARKET_ENDPOINT, USER_AGENT},
    error::SteamError,
    metrics::{MetricsCollector, RequestMetrics},
};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cookie-authenticated JSON client
///
/// Cheap to clone; clones share the connection pool, credentials and metrics.
#[derive(Clone)]
pub struct SteamClient {
    client: Client,
    base_url: String,
    credentials: Arc<Credentials>,
    metrics: Arc<MetricsCollector>,
    currency: u32,
    language: String,
    page_size: u32,
}

impl SteamClient {
    /// Creates a client from the application config
    pub fn new(config: &AppConfig) -> Result<Self, SteamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(SteamError::NetworkError)?;

        let base_url = config.base_url().to_string();
        let host = reqwest::Url::parse(&base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| base_url.clone());

        Ok(Self {
            client,
            base_url,
            credentials: Arc::new(config.credentials.clone()),
            metrics: Arc::new(MetricsCollector::new(&host)),
            currency: config.currency,
            language: config.language.clone(),
            page_size: config.inventory_page_size,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn currency(&self) -> u32 {
        self.currency
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current transport metrics
    pub async fn metrics(&self) -> RequestMetrics {
        self.metrics.get_metrics().await
    }

    /// GETs `url` without cookies and decodes the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SteamError> {
        self.execute(self.client.get(url), false).await
    }

    /// GETs `url` with the session cookies and decodes the JSON body
    pub async fn get_json_authenticated<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, SteamError> {
        let request = self
            .client
            .get(url)
            .header(header::COOKIE, self.credentials.cookie_header());
        self.execute(request, false).await
    }

    /// POSTs a form with the session cookies and decodes the JSON body
    ///
    /// The body is decoded whatever the status code, since Steam explains
    /// rejected listings in error responses.
    pub async fn post_form_authenticated<F, T>(&self, url: &str, form: &F) -> Result<T, SteamError>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(url)
            .header(header::COOKIE, self.credentials.cookie_header())
            .header(header::ORIGIN, self.base_url.as_str())
            .header(header::REFERER, self.url(MARKET_ENDPOINT))
            .form(form);
        self.execute(request, true).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        decode_error_bodies: bool,
    ) -> Result<T, SteamError> {
        let start = Instant::now();
        let result = self.send_and_decode(request, decode_error_bodies).await;
        self.metrics
            .record_request(start.elapsed(), result.is_ok())
            .await;
        if matches!(result, Err(SteamError::RateLimitExceeded)) {
            self.metrics.record_rate_limited().await;
        }
        result
    }

    async fn send_and_decode<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        decode_error_bodies: bool,
    ) -> Result<T, SteamError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SteamError::RateLimitExceeded);
        }

        let response_text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() && !decode_error_bodies {
            return Err(SteamError::ApiError(format!(
                "HTTP {}: {}",
                status,
                truncate(&response_text)
            )));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            SteamError::invalid_response(format!(
                "Failed to parse response (HTTP {}): {}. Response: {}",
                status,
                e,
                truncate(&response_text)
            ))
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> SteamError {
    if error.is_timeout() {
        SteamError::Timeout
    } else {
        SteamError::NetworkError(error)
    }
}

fn truncate(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base() {
        let config = AppConfig {
            community_url: "http://localhost:9000/".to_string(),
            ..AppConfig::default()
        };
        let client = SteamClient::new(&config).unwrap();
        assert_eq!(
            client.url("/market/sellitem/"),
            "http://localhost:9000/market/sellitem/"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = truncate(&body);
        assert!(cut.len() <= 200);
        assert!(body.starts_with(cut));
        assert_eq!(truncate("short"), "short");
    }
}
