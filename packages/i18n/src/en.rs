use crate::Key;

pub const fn text(key: Key) -> &'static str {
    match key {
        Key::AppTitle => "Compliance Risk Alert & Monitoring System",
        Key::AppSubtitle => "Risk Monitoring Dashboard",
        Key::Nationwide => "Kingdom Overview",
        Key::FilterLast24h => "Today",
        Key::FilterLast7d => "This Week",
        Key::FilterLast30d => "This Month",
        Key::TotalRiskScore => "Risk Index",
        Key::TotalIncidents => "Recorded Violations",
        Key::TotalInspectorsImpacted => "Involved Inspectors",
        Key::TotalPortsAffected => "Affected Ports",
        Key::LastIncident => "Last Violation",
        Key::IncidentCount => "Violation Count",
        Key::UniqueInspectors => "Unique Inspectors",
        Key::RiskLevel => "Risk Level",
        Key::RiskLow => "Low Risk",
        Key::RiskMedium => "Medium Risk",
        Key::RiskHigh => "High Risk",
        Key::SeverityLow => "Low",
        Key::SeverityMedium => "Medium",
        Key::SeverityHigh => "High",
        Key::Violence => "Physical Assault",
        Key::CameraBlocking => "Camera Blocking",
        Key::CameraMisuse => "Camera Tampering",
        Key::CameraShake => "Camera Shake",
        Key::Smoking => "Smoking",
        Key::Shouting => "Raised Voice",
        Key::AbusiveLanguage => "Verbal Abuse",
        Key::AllViolations => "All Violations",
        Key::AllSeverities => "All Severities",
        Key::FilterByViolation => "Filter by Violation Type",
        Key::FilterBySeverity => "Filter by Severity",
        Key::PortDetails => "Port Details",
        Key::NoPortSelected => "No Port Selected",
        Key::TopInspectors => "Top Violating Inspectors",
        Key::InspectorDetails => "Inspector Details",
        Key::InspectorId => "Inspector ID",
        Key::ViolationsBreakdown => "Violations by Type",
        Key::SeverityBreakdown => "Violations by Severity",
        Key::PortsAffected => "Related Ports",
        Key::RecentIncidents => "Recent Violations",
        Key::NoIncidents => "No violations recorded",
        Key::Confidence => "Confidence",
        Key::Total => "Total",
        Key::ResetView => "Reset Map View",
        Key::Language => "Language",
        Key::Back => "Back",
        Key::Close => "Close",
        Key::Loading => "Loading...",
        Key::Error => "Failed to load data",
        Key::NoData => "No data available",
        Key::ChooseAction => "What would you like to do?",
        Key::ChangeTimeRange => "Change time range",
        Key::TimeRange => "Time range",
        Key::OpenPort => "Open a port",
        Key::OpenInspector => "Open an inspector",
        Key::CloseInspector => "Close inspector",
        Key::BackToNationwide => "Back to nationwide view",
        Key::PortKpis => "Port KPIs and latest incidents",
        Key::Refresh => "Refresh",
        Key::SwitchLanguage => "Switch language",
        Key::Quit => "Quit",
    }
}
