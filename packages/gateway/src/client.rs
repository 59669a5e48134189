//! HTTP implementation of the [`Gateway`] trait.

use nabeeh_api_models::{
    HeatmapResponse, IncidentsResponse, InspectorDetail, NationwideSummary, PortDetail, PortKpis,
    PortSummary,
};
use nabeeh_query::{QueryParams, format_instant};
use serde::de::DeserializeOwned;

use crate::url::{build_url, server_message};
use crate::{Gateway, GatewayConfig, RemoteError};

/// Analytics API client over `reqwest`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl ApiClient {
    /// Creates a client for the given configuration.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a client configured from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GatewayConfig::from_env())
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Issues a single `GET` and decodes the JSON body.
    ///
    /// The body is read as text first so that failures can be logged
    /// with what the server actually sent.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = build_url(&self.config.base_url, segments, query)?;
        log::debug!("GET {url}");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            log::warn!("GET {url} failed: {e}");
            RemoteError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = server_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            });
            log::warn!("GET {url} returned {status}: {message}");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            log::warn!(
                "GET {url} returned malformed JSON ({} bytes): {e}",
                text.len()
            );
            RemoteError::Decode(e)
        })
    }
}

/// Query pairs for the legacy endpoints, which take the port as a
/// parameter and ignore filters.
fn legacy_pairs(port_id: &str, params: &QueryParams) -> Vec<(&'static str, String)> {
    vec![
        ("port_id", port_id.to_string()),
        ("from", format_instant(&params.from)),
        ("to", format_instant(&params.to)),
    ]
}

/// Query pairs for the list and detail endpoints. Port context is only
/// meaningful for inspector detail and is stripped elsewhere.
fn filter_pairs(params: &QueryParams) -> Vec<(&'static str, String)> {
    let mut pairs = params.to_query_pairs();
    pairs.retain(|(key, _)| *key != "port_id");
    pairs
}

#[async_trait::async_trait]
impl Gateway for ApiClient {
    async fn ports(&self, params: &QueryParams) -> Result<Vec<PortSummary>, RemoteError> {
        self.get_json(&["api", "ports"], &filter_pairs(params)).await
    }

    async fn summary(&self, params: &QueryParams) -> Result<NationwideSummary, RemoteError> {
        self.get_json(&["api", "summary"], &filter_pairs(params))
            .await
    }

    async fn port_detail(
        &self,
        port_id: &str,
        params: &QueryParams,
    ) -> Result<PortDetail, RemoteError> {
        self.get_json(
            &["api", "ports", port_id, "details"],
            &filter_pairs(params),
        )
        .await
    }

    async fn inspector_detail(
        &self,
        inspector_id: &str,
        params: &QueryParams,
    ) -> Result<InspectorDetail, RemoteError> {
        self.get_json(
            &["api", "inspectors", inspector_id],
            &params.to_query_pairs(),
        )
        .await
    }

    async fn heatmap(&self, params: &QueryParams) -> Result<HeatmapResponse, RemoteError> {
        self.get_json(&["api", "heatmap"], &filter_pairs(params))
            .await
    }

    async fn kpis(&self, port_id: &str, params: &QueryParams) -> Result<PortKpis, RemoteError> {
        self.get_json(&["api", "kpis"], &legacy_pairs(port_id, params))
            .await
    }

    async fn incidents(
        &self,
        port_id: &str,
        params: &QueryParams,
        limit: u32,
    ) -> Result<IncidentsResponse, RemoteError> {
        let mut pairs = legacy_pairs(port_id, params);
        pairs.push(("limit", limit.to_string()));
        self.get_json(&["api", "incidents"], &pairs).await
    }
}
