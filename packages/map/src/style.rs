//! Marker styling.

use nabeeh_risk_models::RiskLevel;

use crate::Theme;

const SELECTED_SIZE: u32 = 20;
const HOVERED_SIZE: u32 = 16;
const DEFAULT_SIZE: u32 = 12;

const SELECTED_Z: i32 = 1000;
const HOVERED_Z: i32 = 800;
const HIGH_RISK_Z: i32 = 600;
const DEFAULT_Z: i32 = 500;

const SELECTED_BORDER: &str = "#2053A4";

/// Fill color for a risk level.
#[must_use]
pub const fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "#4FBBBD",
        RiskLevel::Medium => "#FABB33",
        RiskLevel::High => "#E84A41",
    }
}

/// Resolved appearance of one port marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Diameter in pixels.
    pub size: u32,
    /// Fill color.
    pub fill: &'static str,
    /// Border color.
    pub border: &'static str,
    /// Border width in pixels.
    pub border_width: u32,
    /// Stacking order; higher is drawn on top.
    pub z_index: i32,
}

/// Computes a marker's style.
#[must_use]
pub const fn marker_style(
    is_selected: bool,
    is_hovered: bool,
    risk_level: RiskLevel,
    theme: Theme,
) -> MarkerStyle {
    let idle_border = match theme {
        Theme::Light => "#1D3761",
        Theme::Dark => "#E6EDF7",
    };

    let (size, border, border_width) = if is_selected {
        (SELECTED_SIZE, SELECTED_BORDER, 3)
    } else if is_hovered {
        (HOVERED_SIZE, idle_border, 2)
    } else {
        (DEFAULT_SIZE, idle_border, 2)
    };

    let z_index = if is_selected {
        SELECTED_Z
    } else if is_hovered {
        HOVERED_Z
    } else if matches!(risk_level, RiskLevel::High) {
        HIGH_RISK_Z
    } else {
        DEFAULT_Z
    };

    MarkerStyle {
        size,
        fill: risk_color(risk_level),
        border,
        border_width,
        z_index,
    }
}
