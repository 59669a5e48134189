#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard translations.
//!
//! Arabic is the default language. The language is always passed
//! explicitly through a [`Translator`]; there is no global setting.

mod ar;
mod en;

use chrono::{DateTime, Utc};
use nabeeh_query::TimeRange;
use nabeeh_risk_models::{RiskLevel, Severity, ViolationType};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Placeholder shown for a missing value.
pub const MISSING: &str = "—";

/// Display language.
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
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Lang {
    /// Arabic.
    #[default]
    Ar,
    /// English.
    En,
}

impl Lang {
    /// All languages.
    pub const ALL: &'static [Self] = &[Self::Ar, Self::En];

    /// Text direction of the language.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Ar => Direction::Rtl,
            Self::En => Direction::Ltr,
        }
    }

    /// The language's own name for itself.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Ar => "العربية",
            Self::En => "English",
        }
    }
}

/// Text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Right to left.
    Rtl,
    /// Left to right.
    Ltr,
}

/// Translatable UI strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Key {
    AppTitle,
    AppSubtitle,
    Nationwide,
    FilterLast24h,
    FilterLast7d,
    FilterLast30d,
    TotalRiskScore,
    TotalIncidents,
    TotalInspectorsImpacted,
    TotalPortsAffected,
    LastIncident,
    IncidentCount,
    UniqueInspectors,
    RiskLevel,
    RiskLow,
    RiskMedium,
    RiskHigh,
    SeverityLow,
    SeverityMedium,
    SeverityHigh,
    Violence,
    CameraBlocking,
    CameraMisuse,
    CameraShake,
    Smoking,
    Shouting,
    AbusiveLanguage,
    AllViolations,
    AllSeverities,
    FilterByViolation,
    FilterBySeverity,
    PortDetails,
    NoPortSelected,
    TopInspectors,
    InspectorDetails,
    InspectorId,
    ViolationsBreakdown,
    SeverityBreakdown,
    PortsAffected,
    RecentIncidents,
    NoIncidents,
    Confidence,
    Total,
    ResetView,
    Language,
    Back,
    Close,
    Loading,
    Error,
    NoData,
    ChooseAction,
    ChangeTimeRange,
    TimeRange,
    OpenPort,
    OpenInspector,
    CloseInspector,
    BackToNationwide,
    PortKpis,
    Refresh,
    SwitchLanguage,
    Quit,
}

/// Resolves [`Key`]s and domain values to text in one language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Translator {
    lang: Lang,
}

impl Translator {
    /// Creates a translator for `lang`.
    #[must_use]
    pub const fn new(lang: Lang) -> Self {
        Self { lang }
    }

    /// The language.
    #[must_use]
    pub const fn lang(self) -> Lang {
        self.lang
    }

    /// Text direction of the language.
    #[must_use]
    pub const fn direction(self) -> Direction {
        self.lang.direction()
    }

    /// Translates `key`.
    #[must_use]
    pub const fn t(self, key: Key) -> &'static str {
        match self.lang {
            Lang::Ar => ar::text(key),
            Lang::En => en::text(key),
        }
    }

    /// Label for a risk level.
    #[must_use]
    pub const fn risk_level(self, level: RiskLevel) -> &'static str {
        self.t(match level {
            RiskLevel::Low => Key::RiskLow,
            RiskLevel::Medium => Key::RiskMedium,
            RiskLevel::High => Key::RiskHigh,
        })
    }

    /// Label for a severity.
    #[must_use]
    pub const fn severity(self, severity: Severity) -> &'static str {
        self.t(match severity {
            Severity::Low => Key::SeverityLow,
            Severity::Medium => Key::SeverityMedium,
            Severity::High => Key::SeverityHigh,
        })
    }

    /// Label for a violation type.
    #[must_use]
    pub const fn violation_type(self, violation_type: ViolationType) -> &'static str {
        self.t(match violation_type {
            ViolationType::Violence => Key::Violence,
            ViolationType::CameraBlocking => Key::CameraBlocking,
            ViolationType::CameraMisuse => Key::CameraMisuse,
            ViolationType::CameraShake => Key::CameraShake,
            ViolationType::Smoking => Key::Smoking,
            ViolationType::Shouting => Key::Shouting,
            ViolationType::AbusiveLanguage => Key::AbusiveLanguage,
        })
    }

    /// Label for a time range filter.
    #[must_use]
    pub const fn time_range(self, range: TimeRange) -> &'static str {
        self.t(match range {
            TimeRange::Last24Hours => Key::FilterLast24h,
            TimeRange::Last7Days => Key::FilterLast7d,
            TimeRange::Last30Days => Key::FilterLast30d,
        })
    }

    /// Label for a wire code as found in breakdown maps and incident
    /// types: a violation type or a severity name. Unknown codes are
    /// returned unchanged.
    #[must_use]
    pub fn code<'a>(self, code: &'a str) -> &'a str {
        if let Ok(violation_type) = code.parse::<ViolationType>() {
            self.violation_type(violation_type)
        } else if let Ok(severity) = code.parse::<Severity>() {
            self.severity(severity)
        } else {
            code
        }
    }

    /// Formats an RFC 3339 timestamp for display in UTC, or
    /// [`MISSING`] when absent or unparseable.
    #[must_use]
    pub fn format_timestamp(self, timestamp: Option<&str>) -> String {
        timestamp
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or_else(
                || MISSING.to_string(),
                |at| {
                    at.with_timezone(&Utc)
                        .format("%Y-%m-%d %H:%M UTC")
                        .to_string()
                },
            )
    }
}
