//! The dashboard controller.
//!
//! Owns the UI-facing state (time range, filters, selection) and one
//! subscription per panel. Every state change re-derives the query keys;
//! panels whose key did not change keep their data untouched.

use std::sync::Arc;
use std::time::Duration;

use nabeeh_api_models::{
    HeatmapPoint, HeatmapResponse, InspectorDetail, NationwideSummary, PortDetail, PortSummary,
};
use nabeeh_cache::{QueryCache, QueryKey, QueryState, QuerySubscription, Resource};
use nabeeh_gateway::{Gateway, RemoteError};
use nabeeh_map::{MapBackend, MapIntent, MapViewSync};
use nabeeh_query::{Clock, FilterSelection, ParamsMemo, QueryParams, SystemClock, TimeRange};
use nabeeh_risk_models::{Severity, ViolationType};
use nabeeh_selection::{Selection, SelectionChange, SelectionError};

/// State of one panel.
pub type PanelState<T> = QueryState<T, RemoteError>;

type Subscription<T> = QuerySubscription<T, RemoteError>;

/// Query caches for every panel resource.
///
/// Cloning shares the underlying entries, so several dashboards built
/// from the same `Caches` share data and in-flight requests.
#[derive(Clone)]
pub struct Caches {
    ports: QueryCache<Vec<PortSummary>, RemoteError>,
    summary: QueryCache<NationwideSummary, RemoteError>,
    heatmap: QueryCache<HeatmapResponse, RemoteError>,
    port_detail: QueryCache<PortDetail, RemoteError>,
    inspector_detail: QueryCache<InspectorDetail, RemoteError>,
}

impl Caches {
    /// Creates empty caches whose entries stay fresh for `stale_time`.
    #[must_use]
    pub fn new(stale_time: Duration) -> Self {
        Self {
            ports: QueryCache::new(stale_time),
            summary: QueryCache::new(stale_time),
            heatmap: QueryCache::new(stale_time),
            port_detail: QueryCache::new(stale_time),
            inspector_detail: QueryCache::new(stale_time),
        }
    }

    /// Drops entries not read within `cache_time`.
    pub fn gc(&self, cache_time: Duration) -> usize {
        self.ports.gc(cache_time)
            + self.summary.gc(cache_time)
            + self.heatmap.gc(cache_time)
            + self.port_detail.gc(cache_time)
            + self.inspector_detail.gc(cache_time)
    }
}

/// Inputs for the map view, taken from the current panel states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapInputs {
    /// Heat layer points.
    pub points: Vec<HeatmapPoint>,
    /// Port markers.
    pub ports: Vec<PortSummary>,
    /// Selected port.
    pub selected_port: Option<String>,
}

impl MapInputs {
    /// Pushes these inputs into a map synchronizer.
    pub fn apply<B: MapBackend>(&self, map: &mut MapViewSync<B>) {
        map.set_points(&self.points);
        map.set_ports(&self.ports);
        map.set_selected_port(self.selected_port.as_deref());
    }
}

/// Dashboard state and its data subscriptions.
pub struct Dashboard<G: Gateway + 'static, C: Clock = SystemClock> {
    gateway: Arc<G>,
    memo: ParamsMemo<C>,
    range: TimeRange,
    filters: FilterSelection,
    selection: Selection,
    ports: Subscription<Vec<PortSummary>>,
    summary: Subscription<NationwideSummary>,
    heatmap: Subscription<HeatmapResponse>,
    port_detail: Subscription<PortDetail>,
    inspector_detail: Subscription<InspectorDetail>,
}

impl<G: Gateway + 'static, C: Clock> Dashboard<G, C> {
    /// Creates a dashboard reading through `caches`, starting on the
    /// default time range with no filters and nothing selected.
    #[must_use]
    pub fn new(gateway: Arc<G>, clock: C, caches: &Caches) -> Self {
        let mut dashboard = Self {
            gateway,
            memo: ParamsMemo::new(clock),
            range: TimeRange::default(),
            filters: FilterSelection::default(),
            selection: Selection::new(),
            ports: QuerySubscription::new(caches.ports.clone()),
            summary: QuerySubscription::new(caches.summary.clone()),
            heatmap: QuerySubscription::new(caches.heatmap.clone()),
            port_detail: QuerySubscription::new(caches.port_detail.clone()),
            inspector_detail: QuerySubscription::new(caches.inspector_detail.clone()),
        };
        dashboard.rekey();
        dashboard
    }

    /// The gateway panels are loaded through.
    pub const fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Current params.
    pub fn params(&mut self) -> Arc<QueryParams> {
        self.memo.derive(self.range, self.filters)
    }

    fn rekey(&mut self) {
        let params = self.params();
        let port_id = self.selection.selected_port_id();

        self.ports
            .set_key(Some(QueryKey::new(Resource::Ports, Arc::clone(&params))));
        self.summary
            .set_key(Some(QueryKey::new(Resource::Summary, Arc::clone(&params))));
        self.heatmap
            .set_key(Some(QueryKey::new(Resource::Heatmap, Arc::clone(&params))));
        self.port_detail.set_key(QueryKey::for_entity(
            Resource::PortDetail,
            Arc::clone(&params),
            port_id,
        ));

        let inspector_key = port_id.and_then(|port_id| {
            QueryKey::for_entity(
                Resource::InspectorDetail,
                Arc::new(params.with_port(port_id)),
                self.selection.selected_inspector_id(),
            )
        });
        self.inspector_detail.set_key(inspector_key);
    }

    /// Selected time range.
    pub const fn time_range(&self) -> TimeRange {
        self.range
    }

    /// Active filters.
    pub const fn filters(&self) -> FilterSelection {
        self.filters
    }

    /// Current selection.
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Switches the time range.
    pub fn set_time_range(&mut self, range: TimeRange) {
        if self.range != range {
            log::debug!("Time range -> {range}");
            self.range = range;
            self.rekey();
        }
    }

    /// Replaces both filters.
    pub fn set_filters(&mut self, filters: FilterSelection) {
        if self.filters != filters {
            log::debug!("Filters -> {filters:?}");
            self.filters = filters;
            self.rekey();
        }
    }

    /// Toggles the violation type chip.
    pub fn toggle_violation_type(&mut self, violation_type: ViolationType) {
        self.set_filters(self.filters.toggle_violation_type(violation_type));
    }

    /// Sets or clears the severity filter.
    pub fn set_severity(&mut self, severity: Option<Severity>) {
        self.set_filters(self.filters.with_severity(severity));
    }

    fn apply_change(&mut self, change: SelectionChange) -> SelectionChange {
        if change.any() {
            self.rekey();
        }
        change
    }

    /// Selects a port.
    ///
    /// # Errors
    ///
    /// * If `port_id` is empty
    pub fn select_port(&mut self, port_id: &str) -> Result<SelectionChange, SelectionError> {
        let change = self.selection.select_port(port_id)?;
        Ok(self.apply_change(change))
    }

    /// Returns to the nationwide view.
    pub fn deselect_port(&mut self) -> SelectionChange {
        let change = self.selection.deselect_port();
        self.apply_change(change)
    }

    /// Opens the inspector drawer.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::NoPortSelected`] while no port is selected
    /// * If `inspector_id` is empty
    pub fn select_inspector(
        &mut self,
        inspector_id: &str,
    ) -> Result<SelectionChange, SelectionError> {
        let change = self.selection.select_inspector(inspector_id)?;
        Ok(self.apply_change(change))
    }

    /// Closes the inspector drawer.
    pub fn close_inspector_drawer(&mut self) -> SelectionChange {
        let change = self.selection.close_inspector_drawer();
        self.apply_change(change)
    }

    /// Applies a selection change requested by the map.
    ///
    /// # Errors
    ///
    /// * If the intent names an empty port id
    pub fn apply_map_intent(&mut self, intent: MapIntent) -> Result<SelectionChange, SelectionError> {
        match intent {
            MapIntent::SelectPort(port_id) => self.select_port(&port_id),
            MapIntent::DeselectPort => Ok(self.deselect_port()),
        }
    }

    /// Ports panel.
    pub fn ports(&self) -> PanelState<Vec<PortSummary>> {
        self.ports.state()
    }

    /// Nationwide summary panel.
    pub fn summary(&self) -> PanelState<NationwideSummary> {
        self.summary.state()
    }

    /// Heatmap panel.
    pub fn heatmap(&self) -> PanelState<HeatmapResponse> {
        self.heatmap.state()
    }

    /// Port overlay.
    pub fn port_detail(&self) -> PanelState<PortDetail> {
        self.port_detail.state()
    }

    /// Inspector drawer.
    pub fn inspector_detail(&self) -> PanelState<InspectorDetail> {
        self.inspector_detail.state()
    }

    /// Map inputs from the data currently held.
    pub fn map_inputs(&self) -> MapInputs {
        MapInputs {
            points: self
                .heatmap
                .state()
                .data()
                .map(|heatmap| heatmap.points.clone())
                .unwrap_or_default(),
            ports: self
                .ports
                .state()
                .data()
                .map(|ports| ports.as_ref().clone())
                .unwrap_or_default(),
            selected_port: self.selection.selected_port_id().map(String::from),
        }
    }

    /// Loads every enabled panel concurrently.
    ///
    /// Fresh cached data is used as is. A failure only affects the panel
    /// it belongs to.
    pub async fn refresh(&self) {
        let gateway = Arc::clone(&self.gateway);
        let ports = self.ports.request(move |key| {
            let params = Arc::clone(&key.params);
            async move { gateway.ports(&params).await }
        });

        let gateway = Arc::clone(&self.gateway);
        let summary = self.summary.request(move |key| {
            let params = Arc::clone(&key.params);
            async move { gateway.summary(&params).await }
        });

        let gateway = Arc::clone(&self.gateway);
        let heatmap = self.heatmap.request(move |key| {
            let params = Arc::clone(&key.params);
            async move { gateway.heatmap(&params).await }
        });

        let gateway = Arc::clone(&self.gateway);
        let port_detail = self.port_detail.request(move |key| {
            let params = Arc::clone(&key.params);
            let port_id = key.entity_id.clone().unwrap_or_default();
            async move { gateway.port_detail(&port_id, &params).await }
        });

        let gateway = Arc::clone(&self.gateway);
        let inspector_detail = self.inspector_detail.request(move |key| {
            let params = Arc::clone(&key.params);
            let inspector_id = key.entity_id.clone().unwrap_or_default();
            async move { gateway.inspector_detail(&inspector_id, &params).await }
        });

        tokio::join!(ports, summary, heatmap, port_detail, inspector_detail);
    }

    /// Manual refresh: re-reads the clock so the window ends now, then
    /// loads every panel.
    pub async fn reload(&mut self) {
        self.memo.invalidate();
        self.rekey();
        self.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{DateTime, Utc};
    use nabeeh_api_models::{IncidentsResponse, PortKpis};
    use nabeeh_map::{
        HeatLayerOptions, LatLng, LayerId, MapInitError, MapOptions, MapSurface, MarkerStyle,
        NATIONWIDE_CENTER, NATIONWIDE_ZOOM, SELECTED_PORT_ZOOM, TileSource,
    };
    use nabeeh_query::FixedClock;
    use nabeeh_risk_models::RiskLevel;

    use super::*;

    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<String>>,
        fail_heatmap: bool,
        port_detail_calls: AtomicUsize,
    }

    impl FakeGateway {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn port(id: &str) -> PortSummary {
        PortSummary {
            id: id.to_string(),
            name_ar: "الدمام".to_string(),
            name_en: "Dammam".to_string(),
            lat: 26.4,
            lng: 50.1,
            risk_score: 12.5,
            risk_level: RiskLevel::High,
            incident_count: 4,
            unique_inspectors_count: 2,
            last_incident_at: None,
        }
    }

    fn summary() -> NationwideSummary {
        NationwideSummary {
            total_risk_score: 1.0,
            total_incidents: 1,
            total_inspectors_impacted: 1,
            total_ports_affected: 1,
            last_incident_at: None,
            incidents_by_severity: BTreeMap::new(),
            incidents_by_violation: BTreeMap::new(),
        }
    }

    #[async_trait::async_trait]
    impl Gateway for FakeGateway {
        async fn ports(&self, _: &QueryParams) -> Result<Vec<PortSummary>, RemoteError> {
            self.record("ports".to_string());
            Ok(vec![port("DMM")])
        }

        async fn summary(&self, _: &QueryParams) -> Result<NationwideSummary, RemoteError> {
            self.record("summary".to_string());
            Ok(summary())
        }

        async fn port_detail(
            &self,
            port_id: &str,
            _: &QueryParams,
        ) -> Result<PortDetail, RemoteError> {
            self.port_detail_calls.fetch_add(1, Ordering::SeqCst);
            self.record(format!("port_detail:{port_id}"));
            Ok(PortDetail {
                summary: port(port_id),
                violations_breakdown: BTreeMap::new(),
                severity_breakdown: BTreeMap::new(),
                top_inspectors: Vec::new(),
                recent_incidents: Vec::new(),
            })
        }

        async fn inspector_detail(
            &self,
            inspector_id: &str,
            params: &QueryParams,
        ) -> Result<InspectorDetail, RemoteError> {
            self.record(format!(
                "inspector_detail:{inspector_id}@{}",
                params.port_id.as_deref().unwrap_or("-")
            ));
            Ok(InspectorDetail {
                id: inspector_id.to_string(),
                risk_score: 0.0,
                risk_level: RiskLevel::Low,
                total_incidents: 0,
                last_incident_at: None,
                violations_breakdown: BTreeMap::new(),
                severity_breakdown: BTreeMap::new(),
                ports_affected: Vec::new(),
                recent_incidents: Vec::new(),
            })
        }

        async fn heatmap(&self, params: &QueryParams) -> Result<HeatmapResponse, RemoteError> {
            self.record("heatmap".to_string());
            if self.fail_heatmap {
                return Err(RemoteError::Status {
                    status: 500,
                    message: "Failed to query".to_string(),
                });
            }
            Ok(HeatmapResponse {
                points: vec![HeatmapPoint {
                    lat: 24.0,
                    lng: 46.0,
                    intensity: 0.5,
                }],
                from: params.from.to_rfc3339(),
                to: params.to.to_rfc3339(),
            })
        }

        async fn kpis(&self, _: &str, _: &QueryParams) -> Result<PortKpis, RemoteError> {
            unreachable!("legacy endpoint is not used by the dashboard")
        }

        async fn incidents(
            &self,
            _: &str,
            _: &QueryParams,
            _: u32,
        ) -> Result<IncidentsResponse, RemoteError> {
            unreachable!("legacy endpoint is not used by the dashboard")
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum MapOp {
        Heat(usize),
        Marker(String),
        FlyTo(LatLng, f64),
        SetView(LatLng, f64),
    }

    type MapLog = Rc<RefCell<Vec<MapOp>>>;

    struct RecordingSurface {
        log: MapLog,
        next_id: u64,
        zoom: f64,
    }

    impl MapSurface for RecordingSurface {
        fn add_tile_layer(&mut self, _: &TileSource) -> LayerId {
            self.next_id += 1;
            LayerId(self.next_id)
        }

        fn add_heat_layer(&mut self, points: &[HeatmapPoint], _: &HeatLayerOptions) -> LayerId {
            self.next_id += 1;
            self.log.borrow_mut().push(MapOp::Heat(points.len()));
            LayerId(self.next_id)
        }

        fn remove_layer(&mut self, _: LayerId) {}

        fn upsert_marker(&mut self, port_id: &str, _: LatLng, _: &MarkerStyle) {
            self.log
                .borrow_mut()
                .push(MapOp::Marker(port_id.to_string()));
        }

        fn remove_marker(&mut self, _: &str) {}

        fn fly_to(&mut self, center: LatLng, zoom: f64) {
            self.zoom = zoom;
            self.log.borrow_mut().push(MapOp::FlyTo(center, zoom));
        }

        fn set_view(&mut self, center: LatLng, zoom: f64) {
            self.zoom = zoom;
            self.log.borrow_mut().push(MapOp::SetView(center, zoom));
        }

        fn zoom(&self) -> f64 {
            self.zoom
        }

        fn destroy(&mut self) {}
    }

    struct RecordingBackend(MapLog);

    impl MapBackend for RecordingBackend {
        type Surface = RecordingSurface;

        fn create(&mut self, options: &MapOptions) -> Result<RecordingSurface, MapInitError> {
            Ok(RecordingSurface {
                log: Rc::clone(&self.0),
                next_id: 0,
                zoom: options.zoom,
            })
        }
    }

    fn setup(gateway: FakeGateway) -> (Dashboard<FakeGateway, FixedClock>, Arc<FakeGateway>) {
        let now = DateTime::parse_from_rfc3339("2024-01-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let gateway = Arc::new(gateway);
        let caches = Caches::new(Duration::from_secs(30));
        (
            Dashboard::new(Arc::clone(&gateway), FixedClock(now), &caches),
            gateway,
        )
    }

    #[tokio::test]
    async fn no_detail_requests_without_port() {
        let (dashboard, gateway) = setup(FakeGateway::default());
        dashboard.refresh().await;

        let mut calls = gateway.calls();
        calls.sort();
        assert_eq!(calls, ["heatmap", "ports", "summary"]);
        assert_eq!(gateway.port_detail_calls.load(Ordering::SeqCst), 0);
        assert!(dashboard.port_detail().is_idle());
        assert!(dashboard.inspector_detail().is_idle());
    }

    #[tokio::test]
    async fn inspector_detail_carries_port_context() {
        let (mut dashboard, gateway) = setup(FakeGateway::default());
        dashboard.select_port("DMM").unwrap();
        dashboard.select_inspector("I-7").unwrap();
        dashboard.refresh().await;

        let calls = gateway.calls();
        assert!(calls.contains(&"port_detail:DMM".to_string()));
        assert!(calls.contains(&"inspector_detail:I-7@DMM".to_string()));
        assert_eq!(
            dashboard.inspector_detail().data().unwrap().id,
            "I-7".to_string()
        );
    }

    #[tokio::test]
    async fn selecting_another_port_closes_drawer() {
        let (mut dashboard, _) = setup(FakeGateway::default());
        dashboard.select_port("DMM").unwrap();
        dashboard.select_inspector("I-7").unwrap();
        dashboard.select_port("JED").unwrap();

        assert!(!dashboard.selection().is_inspector_drawer_open());
        assert!(dashboard.inspector_detail().is_idle());
    }

    #[tokio::test]
    async fn fresh_data_is_not_refetched() {
        let (dashboard, gateway) = setup(FakeGateway::default());
        dashboard.refresh().await;
        dashboard.refresh().await;
        assert_eq!(gateway.calls().len(), 3);
    }

    #[tokio::test]
    async fn failure_stays_local_to_its_panel() {
        let (dashboard, _) = setup(FakeGateway {
            fail_heatmap: true,
            ..FakeGateway::default()
        });
        dashboard.refresh().await;

        assert_eq!(dashboard.heatmap().error().unwrap().status(), Some(500));
        assert_eq!(dashboard.ports().data().unwrap().len(), 1);
        assert!(dashboard.summary().data().is_some());
        assert!(dashboard.map_inputs().points.is_empty());
    }

    #[tokio::test]
    async fn severity_change_keeps_window() {
        let (mut dashboard, _) = setup(FakeGateway::default());
        let before = dashboard.params();
        dashboard.set_severity(Some(Severity::High));
        let after = dashboard.params();

        assert_eq!(before.from, after.from);
        assert_eq!(before.to, after.to);
        assert_eq!(after.severity, Some(Severity::High));
        assert_eq!(before.violation_type, after.violation_type);
    }

    #[tokio::test]
    async fn map_intents_drive_selection() {
        let (mut dashboard, _) = setup(FakeGateway::default());
        dashboard.refresh().await;

        dashboard
            .apply_map_intent(MapIntent::SelectPort("DMM".to_string()))
            .unwrap();
        let inputs = dashboard.map_inputs();
        assert_eq!(inputs.selected_port.as_deref(), Some("DMM"));
        assert_eq!(inputs.ports.len(), 1);
        assert_eq!(inputs.points.len(), 1);

        dashboard.apply_map_intent(MapIntent::DeselectPort).unwrap();
        assert_eq!(dashboard.map_inputs().selected_port, None);
    }

    #[tokio::test]
    async fn panel_data_and_marker_clicks_reach_the_map() {
        let (mut dashboard, _) = setup(FakeGateway::default());
        let log = MapLog::default();
        let mut map = MapViewSync::new(RecordingBackend(Rc::clone(&log)));
        map.mount();

        dashboard.refresh().await;
        dashboard.map_inputs().apply(&mut map);
        assert!(log.borrow().contains(&MapOp::Heat(1)));
        assert!(log.borrow().contains(&MapOp::Marker("DMM".to_string())));

        let intent = map.click_marker("DMM");
        assert_eq!(intent, MapIntent::SelectPort("DMM".to_string()));
        dashboard.apply_map_intent(intent).unwrap();
        dashboard.refresh().await;
        dashboard.map_inputs().apply(&mut map);
        assert_eq!(
            log.borrow().last(),
            Some(&MapOp::FlyTo(LatLng::new(26.4, 50.1), SELECTED_PORT_ZOOM))
        );
        assert_eq!(map.selected_port(), Some("DMM"));
        assert!(dashboard.port_detail().data().is_some());

        let intent = map.click_marker("DMM");
        assert_eq!(intent, MapIntent::DeselectPort);
        dashboard.apply_map_intent(intent).unwrap();
        dashboard.map_inputs().apply(&mut map);
        assert_eq!(
            log.borrow().last(),
            Some(&MapOp::FlyTo(NATIONWIDE_CENTER, NATIONWIDE_ZOOM))
        );
        assert_eq!(map.selected_port(), None);
        assert!(dashboard.port_detail().is_idle());
    }

    #[tokio::test]
    async fn reset_control_clears_selection_with_one_camera_move() {
        let (mut dashboard, _) = setup(FakeGateway::default());
        let log = MapLog::default();
        let mut map = MapViewSync::new(RecordingBackend(Rc::clone(&log)));
        map.mount();

        dashboard.refresh().await;
        dashboard.select_port("DMM").unwrap();
        dashboard.map_inputs().apply(&mut map);
        log.borrow_mut().clear();

        let intent = map.reset_view();
        dashboard.apply_map_intent(intent).unwrap();
        dashboard.map_inputs().apply(&mut map);

        let moves: Vec<MapOp> = log
            .borrow()
            .iter()
            .filter(|op| matches!(op, MapOp::FlyTo(..) | MapOp::SetView(..)))
            .cloned()
            .collect();
        assert_eq!(moves, vec![MapOp::SetView(NATIONWIDE_CENTER, NATIONWIDE_ZOOM)]);
        assert!(dashboard.selection().selected_port_id().is_none());
    }
}
