#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Risk level, severity, and violation taxonomy types.
//!
//! These are the closed enumerations shared by every layer of the
//! dashboard: the API models, the query parameter deriver, the map marker
//! styling, and the translation tables. Risk levels are computed by the
//! backend; the client only ever reads them.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Backend-computed categorical risk for a port or inspector.
///
/// Deserialization is lenient: any value outside the closed set is read
/// as [`RiskLevel::Low`] so that an unexpected backend value degrades to
/// the lowest visual treatment instead of failing the whole response.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Composite score below the medium threshold.
    #[default]
    Low,
    /// Composite score between the medium and high thresholds.
    Medium,
    /// Composite score at or above the high threshold.
    High,
}

impl RiskLevel {
    /// Parses a risk level, falling back to [`RiskLevel::Low`] for any
    /// unrecognized value.
    #[must_use]
    pub fn from_lenient(value: &str) -> Self {
        value.trim().to_ascii_uppercase().parse().unwrap_or_default()
    }

    /// Returns all variants in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_lenient(&raw))
    }
}

/// Severity of a single incident, also usable as a query filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
}

impl Severity {
    /// Returns all variants in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Detection channel that produced an incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventSource {
    /// Camera analytics.
    Video,
    /// Microphone analytics.
    Audio,
}

/// Closed taxonomy of compliance violations detected at ports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationType {
    // ── Video ───────────────────────────────────────────
    /// Physical violence.
    Violence,
    /// Camera lens obstructed.
    CameraBlocking,
    /// Camera pointed away or otherwise misused.
    CameraMisuse,
    /// Body camera shaken or unstable.
    CameraShake,
    /// Smoking on duty.
    Smoking,

    // ── Audio ───────────────────────────────────────────
    /// Raised voice.
    Shouting,
    /// Insults or abusive speech.
    AbusiveLanguage,
}

impl ViolationType {
    /// All violation types in display order.
    pub const ALL: &'static [Self] = &[
        Self::Violence,
        Self::CameraBlocking,
        Self::CameraMisuse,
        Self::CameraShake,
        Self::Smoking,
        Self::Shouting,
        Self::AbusiveLanguage,
    ];

    /// Returns the detection channel this violation is reported by.
    #[must_use]
    pub const fn source(self) -> EventSource {
        match self {
            Self::Violence
            | Self::CameraBlocking
            | Self::CameraMisuse
            | Self::CameraShake
            | Self::Smoking => EventSource::Video,
            Self::Shouting | Self::AbusiveLanguage => EventSource::Audio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_risk_level_falls_back_to_low() {
        assert_eq!(RiskLevel::from_lenient("UNKNOWN"), RiskLevel::Low);
        assert_eq!(RiskLevel::from_lenient(""), RiskLevel::Low);
        assert_eq!(RiskLevel::from_lenient("high"), RiskLevel::High);
        assert_eq!(RiskLevel::from_lenient(" MEDIUM "), RiskLevel::Medium);
    }

    #[test]
    fn risk_level_deserializes_leniently() {
        let level: RiskLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(level, RiskLevel::Low);
        let level: RiskLevel = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn severity_is_strict() {
        assert!(serde_json::from_str::<Severity>("\"UNKNOWN\"").is_err());
        assert_eq!("MEDIUM".parse::<Severity>().unwrap(), Severity::Medium);
    }

    #[test]
    fn violation_wire_names_are_snake_case() {
        let names: Vec<&str> = ViolationType::ALL.iter().map(AsRef::as_ref).collect();
        assert_eq!(
            names,
            [
                "violence",
                "camera_blocking",
                "camera_misuse",
                "camera_shake",
                "smoking",
                "shouting",
                "abusive_language",
            ]
        );
        let parsed: ViolationType = serde_json::from_str("\"abusive_language\"").unwrap();
        assert_eq!(parsed, ViolationType::AbusiveLanguage);
    }

    #[test]
    fn audio_violations_are_shouting_and_abuse() {
        let audio: Vec<ViolationType> = ViolationType::ALL
            .iter()
            .copied()
            .filter(|v| v.source() == EventSource::Audio)
            .collect();
        assert_eq!(
            audio,
            [ViolationType::Shouting, ViolationType::AbusiveLanguage]
        );
    }
}
