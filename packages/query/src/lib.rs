#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query parameter derivation for the dashboard.
//!
//! Turns a selected [`TimeRange`] and [`FilterSelection`] into the
//! canonical [`QueryParams`] sent to every analytics endpoint. The
//! [`ParamsMemo`] keeps the derived object referentially stable while its
//! inputs are unchanged, so unrelated UI state never invalidates query
//! keys.

pub mod memo;
pub mod time_range;

use chrono::{DateTime, Utc};
use nabeeh_risk_models::{Severity, ViolationType};
use serde::{Deserialize, Serialize};

pub use memo::ParamsMemo;
pub use time_range::{Clock, FixedClock, ResolvedRange, SystemClock, TimeRange, format_instant};

/// Optional violation type and severity filters. `None` means "no
/// filter".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Restrict to one violation type.
    pub violation_type: Option<ViolationType>,
    /// Restrict to one severity.
    pub severity: Option<Severity>,
}

impl FilterSelection {
    /// Returns a copy with the violation type chip toggled: picking the
    /// active type clears the filter, picking another replaces it.
    #[must_use]
    pub fn toggle_violation_type(self, violation_type: ViolationType) -> Self {
        let violation_type = if self.violation_type == Some(violation_type) {
            None
        } else {
            Some(violation_type)
        };
        Self {
            violation_type,
            ..self
        }
    }

    /// Returns a copy with the severity filter replaced.
    #[must_use]
    pub const fn with_severity(self, severity: Option<Severity>) -> Self {
        Self {
            violation_type: self.violation_type,
            severity,
        }
    }

    /// Returns `true` if neither filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violation_type.is_none() && self.severity.is_none()
    }
}

/// Canonical parameter object shared by every analytics request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryParams {
    /// Window start.
    pub from: DateTime<Utc>,
    /// Window end.
    pub to: DateTime<Utc>,
    /// Violation type filter.
    pub violation_type: Option<ViolationType>,
    /// Severity filter.
    pub severity: Option<Severity>,
    /// Port context (inspector detail, legacy endpoints).
    pub port_id: Option<String>,
}

impl QueryParams {
    /// Builds params from a resolved window and filters, with no port
    /// context.
    #[must_use]
    pub const fn new(range: ResolvedRange, filters: FilterSelection) -> Self {
        Self {
            from: range.from,
            to: range.to,
            violation_type: filters.violation_type,
            severity: filters.severity,
            port_id: None,
        }
    }

    /// Returns a copy carrying the given port context.
    #[must_use]
    pub fn with_port(&self, port_id: impl Into<String>) -> Self {
        Self {
            port_id: Some(port_id.into()),
            ..self.clone()
        }
    }

    /// Returns the filter part of these params.
    #[must_use]
    pub const fn filters(&self) -> FilterSelection {
        FilterSelection {
            violation_type: self.violation_type,
            severity: self.severity,
        }
    }

    /// Serializes into query string pairs in wire order. Absent values
    /// are omitted rather than sent empty.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", format_instant(&self.from)),
            ("to", format_instant(&self.to)),
        ];
        if let Some(violation_type) = self.violation_type {
            pairs.push(("violationType", violation_type.to_string()));
        }
        if let Some(severity) = self.severity {
            pairs.push(("severity", severity.to_string()));
        }
        if let Some(port_id) = self.port_id.as_deref().filter(|id| !id.is_empty()) {
            pairs.push(("port_id", port_id.to_string()));
        }
        pairs
    }
}
