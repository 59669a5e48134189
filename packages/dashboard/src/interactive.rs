//! Interactive terminal dashboard.
//!
//! Prints the nationwide panels, then lets the user change filters and
//! drill into ports and inspectors through `dialoguer` menus.

use std::sync::Arc;

use dialoguer::Select;
use nabeeh_cache::DEFAULT_CACHE_TIME;
use nabeeh_gateway::{ApiClient, DEFAULT_INCIDENT_LIMIT, Gateway};
use nabeeh_i18n::{Key, Lang, MISSING, Translator};
use nabeeh_query::{Clock, FilterSelection, SystemClock, TimeRange};
use nabeeh_risk_models::{Severity, ViolationType};

use crate::{Caches, Dashboard, DashboardConfig, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    TimeRange,
    ViolationType,
    Severity,
    SelectPort,
    SelectInspector,
    CloseInspector,
    DeselectPort,
    LegacyKpis,
    Refresh,
    Language,
    Quit,
}

impl Action {
    const fn label(self, t: Translator) -> &'static str {
        t.t(match self {
            Self::TimeRange => Key::ChangeTimeRange,
            Self::ViolationType => Key::FilterByViolation,
            Self::Severity => Key::FilterBySeverity,
            Self::SelectPort => Key::OpenPort,
            Self::SelectInspector => Key::OpenInspector,
            Self::CloseInspector => Key::CloseInspector,
            Self::DeselectPort => Key::BackToNationwide,
            Self::LegacyKpis => Key::PortKpis,
            Self::Refresh => Key::Refresh,
            Self::Language => Key::SwitchLanguage,
            Self::Quit => Key::Quit,
        })
    }

    fn available<G: Gateway + 'static, C: Clock>(dashboard: &Dashboard<G, C>) -> Vec<Self> {
        let selection = dashboard.selection();
        let mut actions = vec![Self::TimeRange, Self::ViolationType, Self::Severity, Self::SelectPort];
        if selection.is_port_overlay_open() {
            actions.push(Self::SelectInspector);
        }
        if selection.is_inspector_drawer_open() {
            actions.push(Self::CloseInspector);
        }
        if selection.is_port_overlay_open() {
            actions.extend([Self::DeselectPort, Self::LegacyKpis]);
        }
        actions.extend([Self::Refresh, Self::Language, Self::Quit]);
        actions
    }
}

fn print_panels<G: Gateway + 'static, C: Clock>(t: Translator, dashboard: &Dashboard<G, C>) {
    println!();
    println!("{} | {}", t.t(Key::AppTitle), t.t(Key::Nationwide));
    println!(
        "{}",
        render::filters_line(t, dashboard.time_range(), dashboard.filters())
    );
    println!();
    println!("{}", render::summary(t, &dashboard.summary()));
    println!();
    println!("{}", render::ports(t, &dashboard.ports()));

    if dashboard.selection().is_port_overlay_open() {
        println!();
        println!("{}", render::port_detail(t, &dashboard.port_detail()));
    }
    if dashboard.selection().is_inspector_drawer_open() {
        println!();
        println!("{}", render::inspector_detail(t, &dashboard.inspector_detail()));
    }
    println!();
}

fn pick<T: Copy>(prompt: &str, options: &[(String, T)]) -> dialoguer::Result<T> {
    let labels: Vec<&str> = options.iter().map(|(label, _)| label.as_str()).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(options[idx].1)
}

/// Runs the dashboard until the user quits.
///
/// # Errors
///
/// * If the terminal prompt fails
pub async fn run(config: DashboardConfig) -> dialoguer::Result<()> {
    let gateway = Arc::new(ApiClient::new(config.gateway.clone()));
    log::info!("Using analytics API at {}", gateway.base_url());

    let caches = Caches::new(config.stale_time);
    let mut dashboard = Dashboard::new(gateway, SystemClock, &caches);
    let mut lang = config.lang;

    loop {
        let t = Translator::new(lang);
        dashboard.refresh().await;
        caches.gc(DEFAULT_CACHE_TIME);
        print_panels(t, &dashboard);

        let actions = Action::available(&dashboard);
        let labels: Vec<&str> = actions.iter().map(|action| action.label(t)).collect();
        let idx = Select::new()
            .with_prompt(t.t(Key::ChooseAction))
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[idx] {
            Action::TimeRange => {
                let options: Vec<(String, TimeRange)> = TimeRange::ALL
                    .iter()
                    .map(|range| (t.time_range(*range).to_string(), *range))
                    .collect();
                dashboard.set_time_range(pick(t.t(Key::TimeRange), &options)?);
            }
            Action::ViolationType => {
                let mut options = vec![(t.t(Key::AllViolations).to_string(), None)];
                options.extend(
                    ViolationType::ALL
                        .iter()
                        .map(|v| (t.violation_type(*v).to_string(), Some(*v))),
                );
                let choice = pick(t.t(Key::FilterByViolation), &options)?;
                let filters = dashboard.filters();
                dashboard.set_filters(FilterSelection {
                    violation_type: choice,
                    ..filters
                });
            }
            Action::Severity => {
                let mut options = vec![(t.t(Key::AllSeverities).to_string(), None)];
                options.extend(
                    Severity::all()
                        .iter()
                        .map(|s| (t.severity(*s).to_string(), Some(*s))),
                );
                dashboard.set_severity(pick(t.t(Key::FilterBySeverity), &options)?);
            }
            Action::SelectPort => select_port(t, &mut dashboard)?,
            Action::SelectInspector => select_inspector(t, &mut dashboard)?,
            Action::CloseInspector => {
                dashboard.close_inspector_drawer();
            }
            Action::DeselectPort => {
                dashboard.deselect_port();
            }
            Action::LegacyKpis => print_legacy(t, &mut dashboard).await,
            Action::Refresh => dashboard.reload().await,
            Action::Language => {
                lang = match lang {
                    Lang::Ar => Lang::En,
                    Lang::En => Lang::Ar,
                };
            }
            Action::Quit => return Ok(()),
        }
    }
}

fn select_port<G: Gateway + 'static, C: Clock>(
    t: Translator,
    dashboard: &mut Dashboard<G, C>,
) -> dialoguer::Result<()> {
    let Some(ports) = dashboard.ports().data().cloned() else {
        println!("{}", t.t(Key::NoData));
        return Ok(());
    };
    let ranked = render::ranked_ports(&ports);
    if ranked.is_empty() {
        println!("{}", t.t(Key::NoData));
        return Ok(());
    }

    let labels: Vec<String> = ranked.iter().map(|port| render::port_row(t, port)).collect();
    let idx = Select::new()
        .with_prompt(t.t(Key::PortDetails))
        .items(&labels)
        .default(0)
        .interact()?;

    if let Err(e) = dashboard.select_port(&ranked[idx].id) {
        log::warn!("{e}");
    }
    Ok(())
}

fn select_inspector<G: Gateway + 'static, C: Clock>(
    t: Translator,
    dashboard: &mut Dashboard<G, C>,
) -> dialoguer::Result<()> {
    let Some(detail) = dashboard.port_detail().data().cloned() else {
        println!("{}", t.t(Key::Loading));
        return Ok(());
    };
    if detail.top_inspectors.is_empty() {
        println!("{}", t.t(Key::NoData));
        return Ok(());
    }

    let labels: Vec<String> = detail
        .top_inspectors
        .iter()
        .map(|inspector| {
            format!(
                "{:<10} {:<12} {:>4}",
                inspector.id,
                t.risk_level(inspector.risk_level),
                inspector.incident_count
            )
        })
        .collect();
    let idx = Select::new()
        .with_prompt(t.t(Key::TopInspectors))
        .items(&labels)
        .default(0)
        .interact()?;

    if let Err(e) = dashboard.select_inspector(&detail.top_inspectors[idx].id) {
        log::warn!("{e}");
    }
    Ok(())
}

async fn print_legacy<G: Gateway + 'static, C: Clock>(t: Translator, dashboard: &mut Dashboard<G, C>) {
    let Some(port_id) = dashboard.selection().selected_port_id().map(String::from) else {
        return;
    };
    let params = dashboard.params();
    let gateway = Arc::clone(dashboard.gateway());

    let (kpis, incidents) = tokio::join!(
        gateway.kpis(&port_id, &params),
        gateway.incidents(&port_id, &params, DEFAULT_INCIDENT_LIMIT)
    );

    match kpis {
        Ok(kpis) => {
            println!(
                "{}: {} ({:.1})",
                t.t(Key::RiskLevel),
                t.risk_level(kpis.risk_level),
                kpis.risk_score
            );
            println!("{}: {}", t.t(Key::Total), kpis.total_events);
            println!("{}: {}", t.t(Key::UniqueInspectors), kpis.unique_inspectors);
            for (code, count) in &kpis.counts {
                println!("  {}: {count}", t.code(code));
            }
        }
        Err(e) => println!("{}: {e}", t.t(Key::Error)),
    }

    match incidents {
        Ok(response) if response.incidents.is_empty() => println!("{}", t.t(Key::NoIncidents)),
        Ok(response) => {
            println!("{}:", t.t(Key::RecentIncidents));
            for incident in &response.incidents {
                println!(
                    "  {}  {}  {}  {}",
                    t.format_timestamp(Some(&incident.timestamp)),
                    t.code(&incident.kind),
                    incident.inspector_id.as_deref().unwrap_or(MISSING),
                    incident.source
                );
            }
        }
        Err(e) => println!("{}: {e}", t.t(Key::Error)),
    }
}
