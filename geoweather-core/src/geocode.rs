//! Forward geocoding: free text to coordinates, via Nominatim (OpenStreetMap).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::instrument;

use crate::{
    Config,
    config::{DEFAULT_NOMINATIM_BASE_URL, DEFAULT_USER_AGENT},
    error::GeocodeError,
    model::GeocodingMatch,
};

/// Results requested per search; only the first is used.
pub const SEARCH_LIMIT: usize = 5;

#[async_trait]
pub trait LocationSearch: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Vec<GeocodingMatch>, GeocodeError>;

    /// Best match, or `None` when the service found nothing.
    async fn search_first(&self, query: &str) -> Result<Option<GeocodingMatch>, GeocodeError> {
        Ok(self.search(query).await?.into_iter().next())
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    user_agent: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct NominatimItem {
    lat: String,
    lon: String,
    display_name: String,
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new(DEFAULT_NOMINATIM_BASE_URL, DEFAULT_USER_AGENT)
    }
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.geocoder_base_url(), config.user_agent())
    }
}

#[async_trait]
impl LocationSearch for NominatimClient {
    #[instrument(skip(self), level = "info")]
    async fn search(&self, query: &str) -> Result<Vec<GeocodingMatch>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let url = format!("{}/search", self.base_url);
        let limit = SEARCH_LIMIT.to_string();

        let res = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "0"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Nominatim request failed");
                GeocodeError::SearchUnavailable(e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Nominatim API request failed");
            return Err(GeocodeError::SearchUnavailable(format!("status {status}")));
        }

        let items: Vec<NominatimItem> = res.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to decode Nominatim response");
            GeocodeError::SearchFailed(e.to_string())
        })?;

        tracing::debug!(count = items.len(), "Nominatim results");

        Ok(items
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|item| GeocodingMatch {
                latitude: item.lat,
                longitude: item.lon,
                display_name: item.display_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_query_is_rejected_without_network() {
        // Unroutable base URL: any request would fail with SearchUnavailable.
        let client = NominatimClient::new("http://127.0.0.1:9", "test");
        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, GeocodeError::EmptyQuery));
        assert_eq!(err.user_message(), "Please enter a location to search.");
    }

    #[test]
    fn from_config_uses_configured_endpoint() {
        let mut cfg = Config::default();
        cfg.geocoder.base_url = Some("http://localhost:8080/".into());
        cfg.geocoder.user_agent = Some("agent/1.0".into());

        let client = NominatimClient::from_config(&cfg);
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.user_agent, "agent/1.0");
    }
}
