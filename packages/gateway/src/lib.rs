#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Remote data gateway for the port risk analytics API.
//!
//! One function per logical resource, each issuing a single `GET`. The
//! gateway owns URL construction and error normalization only: it does
//! not retry, time out, or cache. Those concerns belong to the query
//! cache sitting in front of it.

pub mod client;
pub mod url;

use nabeeh_api_models::{
    HeatmapResponse, IncidentsResponse, InspectorDetail, NationwideSummary, PortDetail, PortKpis,
    PortSummary,
};
use nabeeh_query::QueryParams;
use thiserror::Error;

pub use client::ApiClient;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "NABEEH_API_URL";

/// Base URL used when [`API_URL_ENV`] is unset or empty.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default number of incidents requested from the legacy endpoint.
pub const DEFAULT_INCIDENT_LIMIT: u32 = 10;

/// Errors from remote requests.
///
/// Every variant is local to the request that produced it; none is fatal
/// to the dashboard.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the status reason text.
        message: String,
    },

    /// The request never produced a response (connection, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be used.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },
}

impl RemoteError {
    /// HTTP status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the resource simply does not exist (HTTP 404).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Returns `true` if the failure only affects the request that
    /// produced it, so the caller should show it and allow a retry.
    ///
    /// Status, transport and decode failures are one category for
    /// callers; none of them takes the dashboard down.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Transport(_) | Self::Decode(_) | Self::InvalidUrl { .. }
        )
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API base URL without a trailing slash.
    pub base_url: String,
}

impl GatewayConfig {
    /// Creates a config for `base_url`, trimming trailing slashes.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = if trimmed.is_empty() {
            DEFAULT_API_URL
        } else {
            trimmed
        };
        Self {
            base_url: base_url.to_string(),
        }
    }

    /// Reads the base URL from [`API_URL_ENV`], falling back to
    /// [`DEFAULT_API_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_default();
        Self::new(&base_url)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Typed access to every analytics endpoint.
///
/// Implemented by [`ApiClient`] over HTTP; the query layer depends only
/// on this trait.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /api/ports`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn ports(&self, params: &QueryParams) -> Result<Vec<PortSummary>, RemoteError>;

    /// `GET /api/summary`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn summary(&self, params: &QueryParams) -> Result<NationwideSummary, RemoteError>;

    /// `GET /api/ports/{id}/details`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn port_detail(
        &self,
        port_id: &str,
        params: &QueryParams,
    ) -> Result<PortDetail, RemoteError>;

    /// `GET /api/inspectors/{id}`. Port context travels in
    /// `params.port_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn inspector_detail(
        &self,
        inspector_id: &str,
        params: &QueryParams,
    ) -> Result<InspectorDetail, RemoteError>;

    /// `GET /api/heatmap`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn heatmap(&self, params: &QueryParams) -> Result<HeatmapResponse, RemoteError>;

    /// Legacy `GET /api/kpis`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn kpis(&self, port_id: &str, params: &QueryParams) -> Result<PortKpis, RemoteError>;

    /// Legacy `GET /api/incidents`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the request or decoding fails.
    async fn incidents(
        &self,
        port_id: &str,
        params: &QueryParams,
        limit: u32,
    ) -> Result<IncidentsResponse, RemoteError>;
}
