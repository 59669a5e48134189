//! Time range keys and their resolution against a clock.
//!
//! Offsets are calendar-based: hours and days are subtracted on the wall
//! clock of the evaluation timezone, so a 24 hour window that crosses a
//! DST transition spans 23 or 25 real hours.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Closed set of time windows offered by the dashboard filters.
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
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TimeRange {
    /// The last 24 hours.
    #[default]
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    Last24Hours,
    /// The last 7 days.
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Last7Days,
    /// The last 30 days.
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Last30Days,
}

impl TimeRange {
    /// All time ranges in display order.
    pub const ALL: &'static [Self] = &[Self::Last24Hours, Self::Last7Days, Self::Last30Days];

    /// Resolves this key to a concrete window ending at `now`.
    ///
    /// `to` is always `now`; `from` is `now` minus the calendar offset in
    /// `now`'s timezone.
    #[must_use]
    pub fn resolve<Tz: TimeZone>(self, now: &DateTime<Tz>) -> ResolvedRange {
        let local = now.naive_local();
        let shifted = match self {
            Self::Last24Hours => local.checked_sub_signed(Duration::hours(24)),
            Self::Last7Days => local.checked_sub_days(Days::new(7)),
            Self::Last30Days => local.checked_sub_days(Days::new(30)),
        };

        let from = shifted
            .and_then(|naive| to_instant(&now.timezone(), naive))
            .unwrap_or_else(|| now.with_timezone(&Utc) - self.nominal_duration());

        ResolvedRange {
            from,
            to: now.with_timezone(&Utc),
        }
    }

    /// Nominal length of the window, ignoring calendar irregularities.
    #[must_use]
    pub fn nominal_duration(self) -> Duration {
        match self {
            Self::Last24Hours => Duration::hours(24),
            Self::Last7Days => Duration::days(7),
            Self::Last30Days => Duration::days(30),
        }
    }
}

/// Maps a wall-clock time back to an instant. Ambiguous times (DST fall
/// back) take the earlier instant; times skipped by a DST jump resolve to
/// `None` so the caller can fall back to fixed-length subtraction.
fn to_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// A concrete `[from, to]` window.
///
/// A snapshot: resolving the same key again later yields a later `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedRange {
    /// Window start.
    pub from: DateTime<Utc>,
    /// Window end (the moment of resolution).
    pub to: DateTime<Utc>,
}

/// Formats an instant as ISO 8601 UTC with a `Z` suffix.
///
/// Whole seconds render without a fractional part
/// (`2024-01-01T12:00:00Z`); anything finer renders with milliseconds.
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    let precision = if instant.timestamp_subsec_nanos() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Millis
    };
    instant.to_rfc3339_opts(precision, true)
}

/// Source of "now" for time range resolution.
pub trait Clock: Send + Sync {
    /// Timezone whose calendar the offsets are applied in.
    type Tz: TimeZone;

    /// Returns the current instant.
    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall clock in the local timezone of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = chrono::Local;

    fn now(&self) -> DateTime<Self::Tz> {
        chrono::Local::now()
    }
}

/// A clock frozen at a given UTC instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    type Tz = Utc;

    fn now(&self) -> DateTime<Self::Tz> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn every_range_ends_now_and_starts_before() {
        let now = Utc::now();
        for range in TimeRange::ALL {
            let resolved = range.resolve(&now);
            assert!(resolved.from < resolved.to, "{range} produced from >= to");
            assert_eq!(resolved.to, now);
        }
    }

    #[test]
    fn last_24_hours_from_fixed_instant() {
        let resolved = TimeRange::Last24Hours.resolve(&at("2024-01-02T12:00:00Z"));
        assert_eq!(format_instant(&resolved.from), "2024-01-01T12:00:00Z");
        assert_eq!(format_instant(&resolved.to), "2024-01-02T12:00:00Z");
    }

    #[test]
    fn day_offsets_use_calendar_days() {
        let now = at("2024-03-31T08:30:00Z");
        assert_eq!(
            format_instant(&TimeRange::Last7Days.resolve(&now).from),
            "2024-03-24T08:30:00Z"
        );
        assert_eq!(
            format_instant(&TimeRange::Last30Days.resolve(&now).from),
            "2024-03-01T08:30:00Z"
        );
    }

    #[test]
    fn offsets_apply_in_the_clock_timezone() {
        let riyadh = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = riyadh.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
        let resolved = TimeRange::Last24Hours.resolve(&now);
        assert_eq!(format_instant(&resolved.from), "2023-12-31T22:00:00Z");
        assert_eq!(format_instant(&resolved.to), "2024-01-01T22:00:00Z");
    }

    #[test]
    fn sub_second_instants_keep_millis() {
        let instant = at("2024-01-02T12:00:00.250Z");
        assert_eq!(format_instant(&instant), "2024-01-02T12:00:00.250Z");
    }

    #[test]
    fn range_keys_round_trip_through_strings() {
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Last7Days);
        assert_eq!(TimeRange::Last30Days.to_string(), "30d");
        assert!("1y".parse::<TimeRange>().is_err());
    }
}
