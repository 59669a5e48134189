#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map view synchronization.
//!
//! The map itself is an imperative object owned by some rendering
//! backend. This crate describes it through the [`MapBackend`] and
//! [`MapSurface`] traits and provides [`MapViewSync`], which owns the
//! surface and its layer handles and reconciles them with declarative
//! inputs (heat points, ports, selection, hover, theme).

pub mod style;
pub mod sync;

use nabeeh_api_models::HeatmapPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use style::{MarkerStyle, marker_style, risk_color};
pub use sync::{MapIntent, MapViewSync};

/// Nationwide view center.
pub const NATIONWIDE_CENTER: LatLng = LatLng {
    lat: 24.5,
    lng: 46.5,
};

/// Nationwide view zoom.
pub const NATIONWIDE_ZOOM: f64 = 5.0;

/// Minimum zoom when flying to a selected port.
pub const SELECTED_PORT_ZOOM: f64 = 7.0;

/// Heat layer rendering options.
pub const HEAT_LAYER_OPTIONS: HeatLayerOptions = HeatLayerOptions {
    radius: 30,
    blur: 20,
    max_zoom: 17,
    max: 1.0,
    min_opacity: 0.4,
    gradient: &[
        (0.0, "rgba(79, 187, 189, 0)"),
        (0.25, "rgba(79, 187, 189, 0.6)"),
        (0.5, "rgba(250, 187, 51, 0.75)"),
        (0.75, "rgba(232, 74, 65, 0.85)"),
        (1.0, "rgba(232, 74, 65, 1)"),
    ],
};

const CARTO_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors &copy; CARTO";

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Color scheme of the base map and markers.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    /// Light basemap.
    #[default]
    Light,
    /// Dark basemap.
    Dark,
}

impl Theme {
    /// Base tile source for this theme.
    #[must_use]
    pub const fn tile_source(self) -> TileSource {
        let url = match self {
            Self::Light => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            Self::Dark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        };
        TileSource {
            url,
            attribution: CARTO_ATTRIBUTION,
            subdomains: "abcd",
            max_zoom: 19,
        }
    }
}

/// A raster tile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSource {
    /// URL template.
    pub url: &'static str,
    /// Attribution text.
    pub attribution: &'static str,
    /// Values substituted for `{s}`.
    pub subdomains: &'static str,
    /// Highest zoom the source serves.
    pub max_zoom: u8,
}

/// Heat layer rendering options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatLayerOptions {
    /// Point radius in pixels.
    pub radius: u32,
    /// Blur radius in pixels.
    pub blur: u32,
    /// Zoom at which points reach full intensity.
    pub max_zoom: u8,
    /// Intensity mapped to the top of the gradient.
    pub max: f64,
    /// Minimum layer opacity.
    pub min_opacity: f64,
    /// Color stops from 0 to 1.
    pub gradient: &'static [(f64, &'static str)],
}

/// Options passed to [`MapBackend::create`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    /// Initial center.
    pub center: LatLng,
    /// Initial zoom.
    pub zoom: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: NATIONWIDE_CENTER,
            zoom: NATIONWIDE_ZOOM,
        }
    }
}

/// Handle to a layer on a [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// Why a surface could not be created.
#[derive(Debug, Error)]
pub enum MapInitError {
    /// The host container has no size yet. Creation is retried on the
    /// next layout pass.
    #[error("map container is not ready")]
    ContainerNotReady,
    /// Any other backend failure.
    #[error("map backend failed: {0}")]
    Backend(String),
}

/// Creates map surfaces.
pub trait MapBackend {
    /// The surface type produced.
    type Surface: MapSurface;

    /// Creates a surface.
    ///
    /// # Errors
    ///
    /// * [`MapInitError::ContainerNotReady`] if the container cannot host
    ///   a map yet
    /// * [`MapInitError::Backend`] for any other failure
    fn create(&mut self, options: &MapOptions) -> Result<Self::Surface, MapInitError>;
}

/// An imperative map.
///
/// Removing a layer or marker that does not exist must be a no-op.
pub trait MapSurface {
    /// Adds a base tile layer.
    fn add_tile_layer(&mut self, source: &TileSource) -> LayerId;

    /// Adds a heat layer.
    fn add_heat_layer(&mut self, points: &[HeatmapPoint], options: &HeatLayerOptions) -> LayerId;

    /// Removes a layer.
    fn remove_layer(&mut self, layer: LayerId);

    /// Adds the marker for `port_id` or updates it in place.
    fn upsert_marker(&mut self, port_id: &str, position: LatLng, style: &MarkerStyle);

    /// Removes the marker for `port_id`.
    fn remove_marker(&mut self, port_id: &str);

    /// Animates the camera.
    fn fly_to(&mut self, center: LatLng, zoom: f64);

    /// Moves the camera without animation.
    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Current zoom.
    fn zoom(&self) -> f64;

    /// Releases the surface. No other method is called afterwards.
    fn destroy(&mut self);
}
