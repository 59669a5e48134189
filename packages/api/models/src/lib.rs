#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the port risk analytics backend.
//!
//! These types mirror the JSON the backend returns. The backend contract
//! is trusted: beyond JSON shape, nothing here is validated. All
//! aggregates (risk scores, levels, heat intensities) are computed
//! server-side and are treated as opaque values.

use std::collections::BTreeMap;

use nabeeh_risk_models::{RiskLevel, Severity, ViolationType};
use serde::{Deserialize, Serialize};

/// Counts keyed by violation type or severity name.
pub type Breakdown = BTreeMap<String, u64>;

/// A border port with its risk aggregates over the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSummary {
    /// Port identifier (e.g. `"DMM"`).
    pub id: String,
    /// Arabic display name.
    pub name_ar: String,
    /// English display name.
    #[serde(default)]
    pub name_en: String,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Raw composite risk score.
    #[serde(default)]
    pub risk_score: f64,
    /// Categorical risk.
    #[serde(default)]
    pub risk_level: RiskLevel,
    /// Incidents recorded in the window.
    #[serde(default)]
    pub incident_count: u64,
    /// Distinct inspectors involved in those incidents.
    #[serde(default)]
    pub unique_inspectors_count: u64,
    /// Most recent incident timestamp (ISO 8601).
    #[serde(default)]
    pub last_incident_at: Option<String>,
}

/// Kingdom-wide aggregates for the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationwideSummary {
    /// Sum of all port risk scores.
    pub total_risk_score: f64,
    /// Total incidents.
    pub total_incidents: u64,
    /// Distinct inspectors with at least one incident.
    pub total_inspectors_impacted: u64,
    /// Ports with at least one incident.
    pub total_ports_affected: u64,
    /// Most recent incident timestamp (ISO 8601).
    pub last_incident_at: Option<String>,
    /// Incident counts by severity.
    #[serde(default)]
    pub incidents_by_severity: Breakdown,
    /// Incident counts by violation type.
    #[serde(default)]
    pub incidents_by_violation: Breakdown,
}

/// Per-inspector aggregates listed inside a port detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorSummary {
    /// Inspector identifier.
    pub id: String,
    /// Categorical risk.
    pub risk_level: RiskLevel,
    /// Raw composite risk score.
    pub risk_score: f64,
    /// Incidents attributed to this inspector.
    pub incident_count: u64,
    /// Most recent incident timestamp (ISO 8601).
    pub last_incident_at: Option<String>,
}

/// A recent incident as listed in a port detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortIncident {
    /// Incident identifier.
    pub id: String,
    /// When the incident was detected (ISO 8601).
    pub timestamp: String,
    /// Violation type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Incident severity.
    pub severity: Severity,
    /// Inspector the incident is attributed to.
    pub inspector_id: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

impl PortIncident {
    /// Returns the parsed violation type, if it is in the known taxonomy.
    #[must_use]
    pub fn violation_type(&self) -> Option<ViolationType> {
        self.kind.parse().ok()
    }
}

/// Port summary plus breakdowns, top inspectors and recent incidents.
///
/// Fetched lazily when a port becomes selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDetail {
    /// The summary fields.
    #[serde(flatten)]
    pub summary: PortSummary,
    /// Incident counts by violation type.
    #[serde(default)]
    pub violations_breakdown: Breakdown,
    /// Incident counts by severity.
    #[serde(default)]
    pub severity_breakdown: Breakdown,
    /// Bounded top-N inspectors by incident count.
    #[serde(default)]
    pub top_inspectors: Vec<InspectorSummary>,
    /// Bounded list of the most recent incidents.
    #[serde(default)]
    pub recent_incidents: Vec<PortIncident>,
}

/// A recent incident as listed in an inspector detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorIncident {
    /// Incident identifier.
    pub id: String,
    /// When the incident was detected (ISO 8601).
    pub timestamp: String,
    /// Violation type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Incident severity.
    pub severity: Severity,
    /// Port the incident happened at.
    pub port_id: String,
    /// Arabic port name.
    #[serde(default)]
    pub port_name_ar: String,
    /// English port name.
    #[serde(default)]
    pub port_name_en: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Drill-down record for a single inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorDetail {
    /// Inspector identifier.
    pub id: String,
    /// Raw composite risk score.
    pub risk_score: f64,
    /// Categorical risk.
    pub risk_level: RiskLevel,
    /// Incidents attributed to this inspector.
    pub total_incidents: u64,
    /// Most recent incident timestamp (ISO 8601).
    pub last_incident_at: Option<String>,
    /// Incident counts by violation type.
    #[serde(default)]
    pub violations_breakdown: Breakdown,
    /// Incident counts by severity.
    #[serde(default)]
    pub severity_breakdown: Breakdown,
    /// Ports where this inspector has incidents.
    #[serde(default)]
    pub ports_affected: Vec<String>,
    /// Bounded list of the most recent incidents.
    #[serde(default)]
    pub recent_incidents: Vec<InspectorIncident>,
}

/// One weighted heatmap sample. On the wire this is a `[lat, lng,
/// intensity]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct HeatmapPoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Pre-normalized weight in `[0, 1]`, used as-is.
    pub intensity: f64,
}

impl From<[f64; 3]> for HeatmapPoint {
    fn from([lat, lng, intensity]: [f64; 3]) -> Self {
        Self {
            lat,
            lng,
            intensity,
        }
    }
}

impl From<HeatmapPoint> for [f64; 3] {
    fn from(p: HeatmapPoint) -> Self {
        [p.lat, p.lng, p.intensity]
    }
}

/// Response from the heatmap endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResponse {
    /// Weighted samples.
    pub points: Vec<HeatmapPoint>,
    /// Window start echoed by the server.
    pub from: String,
    /// Window end echoed by the server.
    pub to: String,
}

/// Legacy per-port KPI record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortKpis {
    /// Port identifier.
    pub port_id: String,
    /// Window start echoed by the server.
    pub from: String,
    /// Window end echoed by the server.
    pub to: String,
    /// Raw composite risk score.
    pub risk_score: f64,
    /// Categorical risk.
    pub risk_level: RiskLevel,
    /// Incident counts by violation type.
    #[serde(default)]
    pub counts: Breakdown,
    /// Total incidents.
    pub total_events: u64,
    /// Distinct inspectors.
    #[serde(default)]
    pub unique_inspectors: u64,
    /// Most recent incident timestamp (ISO 8601).
    pub last_incident_at: Option<String>,
}

/// A raw incident from the legacy incidents endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident identifier.
    pub id: String,
    /// Port the incident happened at.
    pub port_id: String,
    /// When the incident was detected (ISO 8601).
    pub timestamp: String,
    /// Detection channel name.
    pub source: String,
    /// Violation type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Incident severity.
    pub severity: Severity,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
    /// Free-text description.
    #[serde(default)]
    pub short_description: Option<String>,
    /// Inspector the incident is attributed to.
    #[serde(default)]
    pub inspector_id: Option<String>,
}

/// Response from the legacy incidents endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentsResponse {
    /// Port identifier.
    pub port_id: String,
    /// Window start echoed by the server.
    pub from: String,
    /// Window end echoed by the server.
    pub to: String,
    /// Incidents, most recent first.
    pub incidents: Vec<Incident>,
}
