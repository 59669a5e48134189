#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Which port and inspector the user is looking at.
//!
//! An inspector can only be selected inside a selected port, and the
//! [`SelectionState`] enum has no way to express anything else. Every
//! transition reports a [`SelectionChange`] so callers know which
//! queries to re-key.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from selection transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// An inspector was picked while no port is selected.
    #[error("cannot select inspector {inspector_id}: no port is selected")]
    NoPortSelected {
        /// The rejected inspector.
        inspector_id: String,
    },
    /// An empty id was supplied.
    #[error("{0} id must not be empty")]
    EmptyId(&'static str),
}

/// Current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    /// Nationwide view, nothing selected.
    #[default]
    Idle,
    /// Port overlay open.
    PortSelected {
        /// Selected port.
        port_id: String,
    },
    /// Port overlay plus inspector drawer open.
    PortAndInspectorSelected {
        /// Selected port.
        port_id: String,
        /// Inspector shown in the drawer.
        inspector_id: String,
    },
}

/// What a transition changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// The selected port changed (including to or from none).
    pub port: bool,
    /// The selected inspector changed (including to or from none).
    pub inspector: bool,
}

impl SelectionChange {
    const NONE: Self = Self {
        port: false,
        inspector: false,
    };

    /// Returns `true` if anything changed.
    #[must_use]
    pub const fn any(self) -> bool {
        self.port || self.inspector
    }
}

/// Selection state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    state: SelectionState,
}

impl Selection {
    /// Creates an idle selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Selected port, if any.
    #[must_use]
    pub fn selected_port_id(&self) -> Option<&str> {
        port_of(&self.state)
    }

    /// Selected inspector, if any.
    #[must_use]
    pub fn selected_inspector_id(&self) -> Option<&str> {
        inspector_of(&self.state)
    }

    /// Whether the port overlay is shown.
    #[must_use]
    pub const fn is_port_overlay_open(&self) -> bool {
        !matches!(self.state, SelectionState::Idle)
    }

    /// Whether the inspector drawer is shown.
    #[must_use]
    pub const fn is_inspector_drawer_open(&self) -> bool {
        matches!(self.state, SelectionState::PortAndInspectorSelected { .. })
    }

    fn transition(&mut self, next: SelectionState) -> SelectionChange {
        let change = SelectionChange {
            port: self.selected_port_id() != port_of(&next),
            inspector: self.selected_inspector_id() != inspector_of(&next),
        };
        if change.any() {
            log::debug!("Selection {:?} -> {next:?}", self.state);
            self.state = next;
        }
        change
    }

    /// Selects `port_id`. Any selected inspector is cleared, including
    /// when the same port is selected again.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::EmptyId`] if `port_id` is empty
    pub fn select_port(&mut self, port_id: &str) -> Result<SelectionChange, SelectionError> {
        if port_id.is_empty() {
            return Err(SelectionError::EmptyId("port"));
        }
        Ok(self.transition(SelectionState::PortSelected {
            port_id: port_id.to_string(),
        }))
    }

    /// Returns to the nationwide view. Calling it while idle does nothing.
    pub fn deselect_port(&mut self) -> SelectionChange {
        self.transition(SelectionState::Idle)
    }

    /// Marker click: selects `port_id`, or deselects if it is already the
    /// selected port.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::EmptyId`] if `port_id` is empty
    pub fn toggle_port(&mut self, port_id: &str) -> Result<SelectionChange, SelectionError> {
        if self.selected_port_id() == Some(port_id) {
            Ok(self.deselect_port())
        } else {
            self.select_port(port_id)
        }
    }

    /// Opens the drawer for `inspector_id` within the selected port.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::NoPortSelected`] while idle; the state is left
    ///   unchanged
    /// * [`SelectionError::EmptyId`] if `inspector_id` is empty
    pub fn select_inspector(
        &mut self,
        inspector_id: &str,
    ) -> Result<SelectionChange, SelectionError> {
        if inspector_id.is_empty() {
            return Err(SelectionError::EmptyId("inspector"));
        }
        let Some(port_id) = self.selected_port_id() else {
            log::warn!("Ignoring inspector {inspector_id}: no port selected");
            return Err(SelectionError::NoPortSelected {
                inspector_id: inspector_id.to_string(),
            });
        };
        let next = SelectionState::PortAndInspectorSelected {
            port_id: port_id.to_string(),
            inspector_id: inspector_id.to_string(),
        };
        Ok(self.transition(next))
    }

    /// Closes the inspector drawer, keeping the port selected.
    pub fn close_inspector_drawer(&mut self) -> SelectionChange {
        match &self.state {
            SelectionState::PortAndInspectorSelected { port_id, .. } => {
                let next = SelectionState::PortSelected {
                    port_id: port_id.clone(),
                };
                self.transition(next)
            }
            _ => SelectionChange::NONE,
        }
    }
}

fn port_of(state: &SelectionState) -> Option<&str> {
    match state {
        SelectionState::Idle => None,
        SelectionState::PortSelected { port_id }
        | SelectionState::PortAndInspectorSelected { port_id, .. } => Some(port_id),
    }
}

fn inspector_of(state: &SelectionState) -> Option<&str> {
    match state {
        SelectionState::PortAndInspectorSelected { inspector_id, .. } => Some(inspector_id),
        _ => None,
    }
}
