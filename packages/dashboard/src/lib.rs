#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Port risk dashboard.
//!
//! Ties the query deriver, cache, gateway, selection, and map layers
//! together behind a single [`Dashboard`] controller, and provides the
//! interactive terminal front end used by the `nabeeh_dashboard` binary.

pub mod config;
pub mod controller;
pub mod interactive;
pub mod render;

pub use config::{ConfigError, DashboardConfig};
pub use controller::{Caches, Dashboard, MapInputs, PanelState};
