//! Plain-text rendering of dashboard panels.

use nabeeh_api_models::{Breakdown, InspectorDetail, NationwideSummary, PortDetail, PortSummary};
use nabeeh_i18n::{Key, Lang, Translator};
use nabeeh_query::{FilterSelection, TimeRange};

use crate::PanelState;

/// Number of ports listed in the overview table.
pub const PORT_TABLE_LIMIT: usize = 15;

fn panel<T>(
    t: Translator,
    state: &PanelState<T>,
    idle: Key,
    body: impl FnOnce(&T) -> Vec<String>,
) -> Vec<String> {
    match state {
        PanelState::Idle => vec![t.t(idle).to_string()],
        PanelState::Loading => vec![t.t(Key::Loading).to_string()],
        PanelState::Success { data, .. } => body(data),
        PanelState::Error { error, stale_data } => {
            let mut lines = vec![format!("{}: {error}", t.t(Key::Error))];
            if let Some(data) = stale_data {
                lines.extend(body(data));
            }
            lines
        }
    }
}

/// Port name in the translator's language, falling back to the Arabic
/// name when no English name is known.
#[must_use]
pub fn port_name(t: Translator, port: &PortSummary) -> &str {
    match t.lang() {
        Lang::En if !port.name_en.is_empty() => &port.name_en,
        _ => &port.name_ar,
    }
}

/// One line describing the active time range and filters.
#[must_use]
pub fn filters_line(t: Translator, range: TimeRange, filters: FilterSelection) -> String {
    let violation = filters
        .violation_type
        .map_or_else(|| t.t(Key::AllViolations), |v| t.violation_type(v));
    let severity = filters
        .severity
        .map_or_else(|| t.t(Key::AllSeverities), |s| t.severity(s));
    format!("{} | {violation} | {severity}", t.time_range(range))
}

fn breakdown(t: Translator, title: Key, counts: &Breakdown) -> Vec<String> {
    let mut lines = vec![format!("{}:", t.t(title))];
    if counts.is_empty() {
        lines.push(format!("  {}", t.t(Key::NoData)));
    }
    lines.extend(
        counts
            .iter()
            .map(|(code, count)| format!("  {}: {count}", t.code(code))),
    );
    lines
}

/// Nationwide KPI panel.
#[must_use]
pub fn summary(t: Translator, state: &PanelState<NationwideSummary>) -> String {
    panel(t, state, Key::NoData, |s| {
        let mut lines = vec![
            format!("{}: {:.1}", t.t(Key::TotalRiskScore), s.total_risk_score),
            format!("{}: {}", t.t(Key::TotalIncidents), s.total_incidents),
            format!(
                "{}: {}",
                t.t(Key::TotalInspectorsImpacted),
                s.total_inspectors_impacted
            ),
            format!("{}: {}", t.t(Key::TotalPortsAffected), s.total_ports_affected),
            format!(
                "{}: {}",
                t.t(Key::LastIncident),
                t.format_timestamp(s.last_incident_at.as_deref())
            ),
        ];
        lines.extend(breakdown(t, Key::ViolationsBreakdown, &s.incidents_by_violation));
        lines
    })
    .join("\n")
}

/// Ports sorted by descending risk score, for the overview table and
/// the port picker.
#[must_use]
pub fn ranked_ports(ports: &[PortSummary]) -> Vec<&PortSummary> {
    let mut ranked: Vec<&PortSummary> = ports.iter().collect();
    ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score).then_with(|| a.id.cmp(&b.id)));
    ranked
}

/// One table row for a port.
#[must_use]
pub fn port_row(t: Translator, port: &PortSummary) -> String {
    format!(
        "{:<6} {:<24} {:>7.1}  {:<12} {:>5}",
        port.id,
        port_name(t, port),
        port.risk_score,
        t.risk_level(port.risk_level),
        port.incident_count
    )
}

/// Port table, highest risk first.
#[must_use]
pub fn ports(t: Translator, state: &PanelState<Vec<PortSummary>>) -> String {
    panel(t, state, Key::NoData, |ports| {
        if ports.is_empty() {
            return vec![t.t(Key::NoData).to_string()];
        }
        ranked_ports(ports)
            .into_iter()
            .take(PORT_TABLE_LIMIT)
            .map(|port| port_row(t, port))
            .collect()
    })
    .join("\n")
}

/// Port overlay.
#[must_use]
pub fn port_detail(t: Translator, state: &PanelState<PortDetail>) -> String {
    panel(t, state, Key::NoPortSelected, |detail| {
        let port = &detail.summary;
        let mut lines = vec![
            format!("{}: {}", t.t(Key::PortDetails), port_name(t, port)),
            format!(
                "{}: {} ({:.1})",
                t.t(Key::RiskLevel),
                t.risk_level(port.risk_level),
                port.risk_score
            ),
            format!("{}: {}", t.t(Key::IncidentCount), port.incident_count),
            format!(
                "{}: {}",
                t.t(Key::UniqueInspectors),
                port.unique_inspectors_count
            ),
        ];
        lines.extend(breakdown(t, Key::ViolationsBreakdown, &detail.violations_breakdown));
        lines.extend(breakdown(t, Key::SeverityBreakdown, &detail.severity_breakdown));

        lines.push(format!("{}:", t.t(Key::TopInspectors)));
        lines.extend(detail.top_inspectors.iter().map(|inspector| {
            format!(
                "  {:<10} {:<12} {:>4}",
                inspector.id,
                t.risk_level(inspector.risk_level),
                inspector.incident_count
            )
        }));

        lines.push(format!("{}:", t.t(Key::RecentIncidents)));
        if detail.recent_incidents.is_empty() {
            lines.push(format!("  {}", t.t(Key::NoIncidents)));
        }
        lines.extend(detail.recent_incidents.iter().map(|incident| {
            format!(
                "  {}  {}  {}  {}",
                t.format_timestamp(Some(&incident.timestamp)),
                t.code(&incident.kind),
                t.severity(incident.severity),
                incident.inspector_id
            )
        }));
        lines
    })
    .join("\n")
}

/// Inspector drawer.
#[must_use]
pub fn inspector_detail(t: Translator, state: &PanelState<InspectorDetail>) -> String {
    panel(t, state, Key::NoData, |detail| {
        let mut lines = vec![
            format!("{}: {}", t.t(Key::InspectorId), detail.id),
            format!(
                "{}: {} ({:.1})",
                t.t(Key::RiskLevel),
                t.risk_level(detail.risk_level),
                detail.risk_score
            ),
            format!("{}: {}", t.t(Key::TotalIncidents), detail.total_incidents),
            format!(
                "{}: {}",
                t.t(Key::LastIncident),
                t.format_timestamp(detail.last_incident_at.as_deref())
            ),
            format!(
                "{}: {}",
                t.t(Key::PortsAffected),
                detail.ports_affected.join(", ")
            ),
        ];
        lines.extend(breakdown(t, Key::ViolationsBreakdown, &detail.violations_breakdown));

        lines.push(format!("{}:", t.t(Key::RecentIncidents)));
        lines.extend(detail.recent_incidents.iter().map(|incident| {
            let name = match t.lang() {
                Lang::En if !incident.port_name_en.is_empty() => &incident.port_name_en,
                _ => &incident.port_name_ar,
            };
            format!(
                "  {}  {}  {}  {name}",
                t.format_timestamp(Some(&incident.timestamp)),
                t.code(&incident.kind),
                t.severity(incident.severity),
            )
        }));
        lines
    })
    .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nabeeh_gateway::RemoteError;
    use nabeeh_risk_models::{RiskLevel, Severity, ViolationType};

    use super::*;

    fn port(id: &str, risk_score: f64) -> PortSummary {
        PortSummary {
            id: id.to_string(),
            name_ar: "منفذ".to_string(),
            name_en: String::new(),
            lat: 0.0,
            lng: 0.0,
            risk_score,
            risk_level: RiskLevel::Medium,
            incident_count: 3,
            unique_inspectors_count: 1,
            last_incident_at: None,
        }
    }

    #[test]
    fn ranks_by_risk_score() {
        let ports = vec![port("A", 1.0), port("B", 9.0), port("C", 9.0)];
        let ids: Vec<&str> = ranked_ports(&ports).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["B", "C", "A"]);
    }

    #[test]
    fn english_name_falls_back_to_arabic() {
        let en = Translator::new(Lang::En);
        assert_eq!(port_name(en, &port("A", 0.0)), "منفذ");
    }

    #[test]
    fn idle_port_detail_prompts_for_selection() {
        let en = Translator::new(Lang::En);
        assert_eq!(port_detail(en, &PanelState::Idle), "No Port Selected");
    }

    #[test]
    fn error_keeps_stale_rows() {
        let en = Translator::new(Lang::En);
        let state = PanelState::Error {
            error: Arc::new(RemoteError::Status {
                status: 503,
                message: "down".to_string(),
            }),
            stale_data: Some(Arc::new(vec![port("A", 2.0)])),
        };
        let text = ports(en, &state);
        assert!(text.starts_with("Failed to load data: HTTP 503: down"));
        assert!(text.contains("Medium Risk"));
    }

    #[test]
    fn filters_line_names_active_filters() {
        let en = Translator::new(Lang::En);
        let filters = FilterSelection {
            violation_type: Some(ViolationType::Smoking),
            severity: None,
        };
        assert_eq!(
            filters_line(en, TimeRange::Last7Days, filters),
            "This Week | Smoking | All Severities"
        );
        let filters = filters.with_severity(Some(Severity::High));
        assert!(filters_line(en, TimeRange::Last24Hours, filters).ends_with("| High"));
    }
}
