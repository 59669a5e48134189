//! Memoized parameter derivation.

use std::sync::Arc;

use crate::{Clock, FilterSelection, QueryParams, ResolvedRange, SystemClock, TimeRange};

/// Derives [`QueryParams`] and keeps them referentially stable.
///
/// Calling [`ParamsMemo::derive`] with the same time range and filters as
/// the previous call returns the same `Arc` (pointer-equal). The resolved
/// `[from, to]` window is memoized per time range key: a filter-only
/// change reuses it, so the new params differ from the old ones only in
/// the changed filter field.
pub struct ParamsMemo<C: Clock = SystemClock> {
    clock: C,
    window: Option<(TimeRange, ResolvedRange)>,
    current: Option<(TimeRange, FilterSelection, Arc<QueryParams>)>,
}

impl Default for ParamsMemo<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> ParamsMemo<C> {
    /// Creates an empty memo reading time from `clock`.
    #[must_use]
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            window: None,
            current: None,
        }
    }

    /// Returns the params for `range` and `filters`, reusing the previous
    /// object when both are unchanged.
    pub fn derive(&mut self, range: TimeRange, filters: FilterSelection) -> Arc<QueryParams> {
        if let Some((cached_range, cached_filters, params)) = &self.current
            && *cached_range == range
            && *cached_filters == filters
        {
            return Arc::clone(params);
        }

        let window = match self.window {
            Some((cached_range, window)) if cached_range == range => window,
            _ => {
                let window = range.resolve(&self.clock.now());
                log::debug!(
                    "Resolved time range {range}: {} .. {}",
                    window.from,
                    window.to
                );
                self.window = Some((range, window));
                window
            }
        };

        let params = Arc::new(QueryParams::new(window, filters));
        self.current = Some((range, filters, Arc::clone(&params)));
        params
    }

    /// Returns the most recently derived params, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<QueryParams>> {
        self.current.as_ref().map(|(_, _, params)| Arc::clone(params))
    }

    /// Drops the memoized window so the next derivation re-reads the
    /// clock. Used for manual refresh.
    pub fn invalidate(&mut self) {
        self.window = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use nabeeh_risk_models::{Severity, ViolationType};

    use super::*;
    use crate::FixedClock;

    fn memo() -> ParamsMemo<FixedClock> {
        let now = DateTime::parse_from_rfc3339("2024-01-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        ParamsMemo::new(FixedClock(now))
    }

    #[test]
    fn unchanged_inputs_keep_identity() {
        let mut memo = memo();
        let filters = FilterSelection::default();
        let first = memo.derive(TimeRange::Last24Hours, filters);
        let second = memo.derive(TimeRange::Last24Hours, filters);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn severity_change_only_touches_severity() {
        let mut memo = memo();
        let filters = FilterSelection {
            violation_type: Some(ViolationType::Violence),
            severity: None,
        };
        let before = memo.derive(TimeRange::Last7Days, filters);
        let after = memo.derive(
            TimeRange::Last7Days,
            filters.with_severity(Some(Severity::High)),
        );

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.from, after.from);
        assert_eq!(before.to, after.to);
        assert_eq!(after.severity, Some(Severity::High));
        assert_eq!(
            QueryParams {
                severity: before.severity,
                ..(*after).clone()
            },
            *before
        );
    }

    #[test]
    fn time_range_change_resolves_a_new_window() {
        let mut memo = memo();
        let filters = FilterSelection::default();
        let day = memo.derive(TimeRange::Last24Hours, filters);
        let month = memo.derive(TimeRange::Last30Days, filters);
        assert_eq!(day.to, month.to);
        assert!(month.from < day.from);
    }

    #[test]
    fn invalidate_forces_a_new_object() {
        let mut memo = memo();
        let filters = FilterSelection::default();
        let first = memo.derive(TimeRange::Last24Hours, filters);
        memo.invalidate();
        assert!(memo.current().is_none());
        let second = memo.derive(TimeRange::Last24Hours, filters);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }
}
