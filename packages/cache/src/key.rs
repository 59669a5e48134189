//! Cache keys.

use std::fmt;
use std::sync::Arc;

use nabeeh_query::{QueryParams, format_instant};
use strum_macros::{AsRefStr, Display};

/// Logical resource behind a cache entry, one per analytics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    /// Port list with risk aggregates.
    Ports,
    /// Nationwide summary.
    Summary,
    /// Detail for one port.
    PortDetail,
    /// Detail for one inspector.
    InspectorDetail,
    /// Heatmap points.
    Heatmap,
}

impl Resource {
    /// Returns `true` for resources that need a selected entity id.
    #[must_use]
    pub const fn requires_entity(self) -> bool {
        matches!(self, Self::PortDetail | Self::InspectorDetail)
    }
}

/// Identity of one cached query: `(resource, params, entity id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey {
    /// Which endpoint.
    pub resource: Resource,
    /// Derived parameters (shared with the memo that produced them).
    pub params: Arc<QueryParams>,
    /// Selected port or inspector id, for detail resources.
    pub entity_id: Option<String>,
}

impl QueryKey {
    /// Key for a list/summary resource.
    #[must_use]
    pub const fn new(resource: Resource, params: Arc<QueryParams>) -> Self {
        Self {
            resource,
            params,
            entity_id: None,
        }
    }

    /// Key for a detail resource.
    ///
    /// Returns `None` when no entity is selected; the query stays
    /// disabled rather than being issued without its id. Resources that
    /// take no entity ignore `entity_id`.
    #[must_use]
    pub fn for_entity(
        resource: Resource,
        params: Arc<QueryParams>,
        entity_id: Option<&str>,
    ) -> Option<Self> {
        if !resource.requires_entity() {
            return Some(Self::new(resource, params));
        }
        let entity_id = entity_id.filter(|id| !id.is_empty())?;
        Some(Self {
            resource,
            params,
            entity_id: Some(entity_id.to_string()),
        })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        if let Some(id) = &self.entity_id {
            write!(f, "[{id}]")?;
        }
        write!(
            f,
            " {}..{}",
            format_instant(&self.params.from),
            format_instant(&self.params.to)
        )?;
        if let Some(violation_type) = self.params.violation_type {
            write!(f, " type={violation_type}")?;
        }
        if let Some(severity) = self.params.severity {
            write!(f, " severity={severity}")?;
        }
        Ok(())
    }
}
