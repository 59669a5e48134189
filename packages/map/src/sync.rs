//! Reconciles a [`MapSurface`] with dashboard state.

use std::collections::BTreeMap;

use nabeeh_api_models::{HeatmapPoint, PortSummary};
use nabeeh_risk_models::RiskLevel;

use crate::{
    HEAT_LAYER_OPTIONS, LatLng, LayerId, MapBackend, MapInitError, MapOptions, MapSurface,
    MarkerStyle, NATIONWIDE_CENTER, NATIONWIDE_ZOOM, SELECTED_PORT_ZOOM, Theme, marker_style,
};

/// Selection change requested by a map interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapIntent {
    /// Select this port.
    SelectPort(String),
    /// Return to the nationwide view.
    DeselectPort,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PortMarker {
    position: LatLng,
    risk_level: RiskLevel,
}

/// Owns a map surface and keeps it matching the inputs it is given.
///
/// Inputs may be set at any time. While no surface exists they are
/// stored and applied once [`Self::layout`] manages to create one.
pub struct MapViewSync<B: MapBackend> {
    backend: B,
    surface: Option<B::Surface>,
    mounted: bool,
    tile_layer: Option<LayerId>,
    heat_layer: Option<LayerId>,
    rendered: BTreeMap<String, (LatLng, MarkerStyle)>,
    points: Vec<HeatmapPoint>,
    ports: BTreeMap<String, PortMarker>,
    selected: Option<String>,
    hovered: Option<String>,
    theme: Theme,
    /// A port was selected before its position was known.
    camera_pending: bool,
    /// The reset control already put the camera on the nationwide view.
    camera_home: bool,
}

impl<B: MapBackend> MapViewSync<B> {
    /// Creates an unmounted synchronizer.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            surface: None,
            mounted: false,
            tile_layer: None,
            heat_layer: None,
            rendered: BTreeMap::new(),
            points: Vec::new(),
            ports: BTreeMap::new(),
            selected: None,
            hovered: None,
            theme: Theme::Light,
            camera_pending: false,
            camera_home: false,
        }
    }

    /// The surface, once created.
    pub const fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    /// Returns `true` if a surface exists.
    pub const fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    /// Currently hovered port.
    pub fn hovered_port(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Currently selected port.
    pub fn selected_port(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Attaches to the host and attempts to create the surface.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.try_create();
    }

    /// Layout pass. Creates the surface if an earlier attempt was
    /// deferred.
    pub fn layout(&mut self) {
        if self.mounted && self.surface.is_none() {
            self.try_create();
        }
    }

    /// Destroys the surface and forgets every handle into it.
    pub fn unmount(&mut self) {
        self.mounted = false;
        if let Some(mut surface) = self.surface.take() {
            log::debug!("Destroying map surface");
            surface.destroy();
        }
        self.tile_layer = None;
        self.heat_layer = None;
        self.rendered.clear();
        self.camera_home = false;
    }

    fn try_create(&mut self) {
        let options = self.selected_position().map_or_else(MapOptions::default, |center| {
            MapOptions {
                center,
                zoom: SELECTED_PORT_ZOOM,
            }
        });

        match self.backend.create(&options) {
            Ok(surface) => {
                log::debug!("Created map surface");
                self.surface = Some(surface);
                self.camera_pending = self.selected.is_some() && self.selected_position().is_none();
                self.sync_tiles();
                self.sync_heat();
                self.sync_markers();
            }
            Err(MapInitError::ContainerNotReady) => {
                log::debug!("Map container not ready, deferring creation");
            }
            Err(e) => {
                log::warn!("Map creation failed, will retry on next layout: {e}");
            }
        }
    }

    fn selected_position(&self) -> Option<LatLng> {
        let id = self.selected.as_deref()?;
        self.ports.get(id).map(|port| port.position)
    }

    /// Replaces the heat points. Identical points are ignored.
    pub fn set_points(&mut self, points: &[HeatmapPoint]) {
        if self.points == points {
            return;
        }
        self.points = points.to_vec();
        self.sync_heat();
    }

    /// Replaces the ports shown as markers.
    pub fn set_ports(&mut self, ports: &[PortSummary]) {
        self.ports = ports
            .iter()
            .map(|port| {
                (
                    port.id.clone(),
                    PortMarker {
                        position: LatLng::new(port.lat, port.lng),
                        risk_level: port.risk_level,
                    },
                )
            })
            .collect();

        if self
            .hovered
            .as_ref()
            .is_some_and(|id| !self.ports.contains_key(id))
        {
            self.hovered = None;
        }

        self.sync_markers();

        if self.camera_pending
            && let Some(position) = self.selected_position()
            && let Some(surface) = &mut self.surface
        {
            self.camera_pending = false;
            let zoom = surface.zoom().max(SELECTED_PORT_ZOOM);
            surface.fly_to(position, zoom);
        }
    }

    /// Updates the selected port and moves the camera to match.
    ///
    /// Selecting flies to the port without zooming out; deselecting flies
    /// back to the nationwide view unless [`Self::reset_view`] already
    /// moved the camera there.
    pub fn set_selected_port(&mut self, port_id: Option<&str>) {
        if self.selected.as_deref() == port_id {
            return;
        }
        let camera_home = std::mem::take(&mut self.camera_home);
        self.selected = port_id.map(String::from);
        self.sync_markers();

        let target = self.selected_position();
        self.camera_pending = self.selected.is_some() && target.is_none();

        let Some(surface) = &mut self.surface else {
            return;
        };
        match (&self.selected, target) {
            (Some(_), Some(position)) => {
                let zoom = surface.zoom().max(SELECTED_PORT_ZOOM);
                surface.fly_to(position, zoom);
            }
            (Some(id), None) => {
                log::debug!("Selected port {id} has no known position yet");
            }
            (None, _) if camera_home => {}
            (None, _) => surface.fly_to(NATIONWIDE_CENTER, NATIONWIDE_ZOOM),
        }
    }

    /// Switches the base map and marker colors.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme == theme {
            return;
        }
        self.theme = theme;
        self.sync_tiles();
        self.sync_markers();
    }

    /// Pointer entered the marker for `port_id`.
    pub fn pointer_enter(&mut self, port_id: &str) {
        if !self.ports.contains_key(port_id) || self.hovered.as_deref() == Some(port_id) {
            return;
        }
        self.hovered = Some(port_id.to_string());
        self.sync_markers();
    }

    /// Pointer left the marker for `port_id`. Ignored unless that marker
    /// is the hovered one.
    pub fn pointer_leave(&mut self, port_id: &str) {
        if self.hovered.as_deref() != Some(port_id) {
            return;
        }
        self.hovered = None;
        self.sync_markers();
    }

    /// Marker click: selects the port, or deselects it if it is already
    /// selected.
    ///
    /// The selection itself is owned by the caller, which is expected to
    /// apply the intent and call [`Self::set_selected_port`].
    #[must_use]
    pub fn click_marker(&self, port_id: &str) -> MapIntent {
        if self.selected.as_deref() == Some(port_id) {
            MapIntent::DeselectPort
        } else {
            MapIntent::SelectPort(port_id.to_string())
        }
    }

    /// "Reset view" control: jumps to the nationwide view and asks for
    /// the selection to be cleared.
    #[must_use]
    pub fn reset_view(&mut self) -> MapIntent {
        if let Some(surface) = &mut self.surface {
            surface.set_view(NATIONWIDE_CENTER, NATIONWIDE_ZOOM);
            self.camera_home = true;
        }
        MapIntent::DeselectPort
    }

    fn sync_tiles(&mut self) {
        let Some(surface) = &mut self.surface else {
            return;
        };
        let next = surface.add_tile_layer(&self.theme.tile_source());
        if let Some(previous) = self.tile_layer.replace(next) {
            surface.remove_layer(previous);
        }
    }

    /// Adds the new heat layer before removing the old one so the map
    /// never shows an empty frame in between.
    fn sync_heat(&mut self) {
        let Some(surface) = &mut self.surface else {
            return;
        };
        let next = if self.points.is_empty() {
            None
        } else {
            Some(surface.add_heat_layer(&self.points, &HEAT_LAYER_OPTIONS))
        };
        if let Some(previous) = std::mem::replace(&mut self.heat_layer, next) {
            surface.remove_layer(previous);
        }
    }

    fn sync_markers(&mut self) {
        let Some(surface) = &mut self.surface else {
            return;
        };

        let stale: Vec<String> = self
            .rendered
            .keys()
            .filter(|id| !self.ports.contains_key(*id))
            .cloned()
            .collect();
        for id in stale {
            surface.remove_marker(&id);
            self.rendered.remove(&id);
        }

        for (id, port) in &self.ports {
            let style = marker_style(
                self.selected.as_ref() == Some(id),
                self.hovered.as_ref() == Some(id),
                port.risk_level,
                self.theme,
            );
            let next = (port.position, style);
            if self.rendered.get(id) != Some(&next) {
                surface.upsert_marker(id, port.position, &style);
                self.rendered.insert(id.clone(), next);
            }
        }
    }
}

impl<B: MapBackend> Drop for MapViewSync<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{HeatLayerOptions, TileSource};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        AddTiles(&'static str),
        AddHeat(LayerId, usize),
        Remove(LayerId),
        Upsert(String, MarkerStyle),
        RemoveMarker(String),
        FlyTo(LatLng, f64),
        SetView(LatLng, f64),
        Destroy,
    }

    type Log = Rc<RefCell<Vec<Op>>>;

    struct FakeSurface {
        log: Log,
        next_id: u64,
        zoom: f64,
    }

    impl MapSurface for FakeSurface {
        fn add_tile_layer(&mut self, source: &TileSource) -> LayerId {
            self.next_id += 1;
            self.log.borrow_mut().push(Op::AddTiles(source.url));
            LayerId(self.next_id)
        }

        fn add_heat_layer(&mut self, points: &[HeatmapPoint], _: &HeatLayerOptions) -> LayerId {
            self.next_id += 1;
            let id = LayerId(self.next_id);
            self.log.borrow_mut().push(Op::AddHeat(id, points.len()));
            id
        }

        fn remove_layer(&mut self, layer: LayerId) {
            self.log.borrow_mut().push(Op::Remove(layer));
        }

        fn upsert_marker(&mut self, port_id: &str, _: LatLng, style: &MarkerStyle) {
            self.log
                .borrow_mut()
                .push(Op::Upsert(port_id.to_string(), *style));
        }

        fn remove_marker(&mut self, port_id: &str) {
            self.log
                .borrow_mut()
                .push(Op::RemoveMarker(port_id.to_string()));
        }

        fn fly_to(&mut self, center: LatLng, zoom: f64) {
            self.zoom = zoom;
            self.log.borrow_mut().push(Op::FlyTo(center, zoom));
        }

        fn set_view(&mut self, center: LatLng, zoom: f64) {
            self.zoom = zoom;
            self.log.borrow_mut().push(Op::SetView(center, zoom));
        }

        fn zoom(&self) -> f64 {
            self.zoom
        }

        fn destroy(&mut self) {
            self.log.borrow_mut().push(Op::Destroy);
        }
    }

    struct FakeBackend {
        log: Log,
        not_ready_attempts: usize,
        created: Rc<RefCell<usize>>,
    }

    impl MapBackend for FakeBackend {
        type Surface = FakeSurface;

        fn create(&mut self, options: &MapOptions) -> Result<FakeSurface, MapInitError> {
            if self.not_ready_attempts > 0 {
                self.not_ready_attempts -= 1;
                return Err(MapInitError::ContainerNotReady);
            }
            *self.created.borrow_mut() += 1;
            Ok(FakeSurface {
                log: Rc::clone(&self.log),
                next_id: 0,
                zoom: options.zoom,
            })
        }
    }

    fn setup(not_ready_attempts: usize) -> (MapViewSync<FakeBackend>, Log, Rc<RefCell<usize>>) {
        let log = Log::default();
        let created = Rc::new(RefCell::new(0));
        let sync = MapViewSync::new(FakeBackend {
            log: Rc::clone(&log),
            not_ready_attempts,
            created: Rc::clone(&created),
        });
        (sync, log, created)
    }

    fn port(id: &str, risk_level: RiskLevel) -> PortSummary {
        PortSummary {
            id: id.to_string(),
            name_ar: id.to_string(),
            name_en: id.to_string(),
            lat: 26.4,
            lng: 50.1,
            risk_score: 0.0,
            risk_level,
            incident_count: 0,
            unique_inspectors_count: 0,
            last_incident_at: None,
        }
    }

    fn point(intensity: f64) -> HeatmapPoint {
        HeatmapPoint {
            lat: 24.0,
            lng: 46.0,
            intensity,
        }
    }

    fn last_style(log: &Log, id: &str) -> MarkerStyle {
        log.borrow()
            .iter()
            .rev()
            .find_map(|op| match op {
                Op::Upsert(port, style) if port == id => Some(*style),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn deferred_creation_applies_pending_inputs() {
        let (mut sync, log, created) = setup(1);
        sync.set_ports(&[port("DMM", RiskLevel::High)]);
        sync.set_points(&[point(0.5)]);

        sync.mount();
        assert!(!sync.is_ready());
        assert!(log.borrow().is_empty());

        sync.layout();
        assert!(sync.is_ready());
        assert_eq!(*created.borrow(), 1);
        let ops = log.borrow();
        assert!(ops.contains(&Op::AddTiles(Theme::Light.tile_source().url)));
        assert!(ops.iter().any(|op| matches!(op, Op::AddHeat(_, 1))));
        assert!(ops.iter().any(|op| matches!(op, Op::Upsert(id, _) if id == "DMM")));
    }

    #[test]
    fn surface_created_and_destroyed_once() {
        let (mut sync, log, created) = setup(0);
        sync.mount();
        sync.mount();
        sync.layout();
        assert_eq!(*created.borrow(), 1);

        sync.unmount();
        sync.unmount();
        drop(sync);
        let destroys = log.borrow().iter().filter(|op| **op == Op::Destroy).count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn heat_layer_is_added_before_old_one_is_removed() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_points(&[point(0.2)]);
        let first = sync.heat_layer.unwrap();

        log.borrow_mut().clear();
        sync.set_points(&[point(0.9)]);
        let second = sync.heat_layer.unwrap();

        assert_eq!(
            *log.borrow(),
            vec![Op::AddHeat(second, 1), Op::Remove(first)]
        );
    }

    #[test]
    fn identical_points_are_ignored() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_points(&[point(0.2)]);
        log.borrow_mut().clear();
        sync.set_points(&[point(0.2)]);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn clicking_selected_marker_deselects_and_returns_home() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_ports(&[port("DMM", RiskLevel::Medium)]);

        let intent = sync.click_marker("DMM");
        assert_eq!(intent, MapIntent::SelectPort("DMM".to_string()));
        sync.set_selected_port(Some("DMM"));
        assert_eq!(
            log.borrow().last(),
            Some(&Op::FlyTo(LatLng::new(26.4, 50.1), SELECTED_PORT_ZOOM))
        );

        let intent = sync.click_marker("DMM");
        assert_eq!(intent, MapIntent::DeselectPort);
        sync.set_selected_port(None);
        assert_eq!(
            log.borrow().last(),
            Some(&Op::FlyTo(NATIONWIDE_CENTER, NATIONWIDE_ZOOM))
        );
        assert_eq!(last_style(&log, "DMM").z_index, 500);
    }

    #[test]
    fn selecting_never_zooms_out() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_ports(&[port("DMM", RiskLevel::Low)]);
        sync.surface.as_mut().unwrap().set_view(NATIONWIDE_CENTER, 11.0);

        sync.set_selected_port(Some("DMM"));
        assert_eq!(
            log.borrow().last(),
            Some(&Op::FlyTo(LatLng::new(26.4, 50.1), 11.0))
        );
    }

    #[test]
    fn selection_before_ports_flies_once_known() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_selected_port(Some("DMM"));
        assert!(!log.borrow().iter().any(|op| matches!(op, Op::FlyTo(..))));

        sync.set_ports(&[port("DMM", RiskLevel::Low)]);
        assert_eq!(
            log.borrow().last(),
            Some(&Op::FlyTo(LatLng::new(26.4, 50.1), SELECTED_PORT_ZOOM))
        );
        assert_eq!(last_style(&log, "DMM").z_index, 1000);
    }

    #[test]
    fn hover_is_exclusive() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_ports(&[port("DMM", RiskLevel::Low), port("JED", RiskLevel::High)]);

        sync.pointer_enter("DMM");
        sync.pointer_enter("JED");
        assert_eq!(sync.hovered_port(), Some("JED"));
        assert_eq!(last_style(&log, "DMM").z_index, 500);
        assert_eq!(last_style(&log, "JED").z_index, 800);

        sync.pointer_leave("DMM");
        assert_eq!(sync.hovered_port(), Some("JED"));
        sync.pointer_leave("JED");
        assert_eq!(sync.hovered_port(), None);
        assert_eq!(last_style(&log, "JED").z_index, 600);
    }

    #[test]
    fn theme_swaps_tiles_without_recreating() {
        let (mut sync, log, created) = setup(0);
        sync.mount();
        sync.set_ports(&[port("DMM", RiskLevel::Low)]);
        let light_tiles = sync.tile_layer.unwrap();

        sync.set_theme(Theme::Dark);
        assert_eq!(*created.borrow(), 1);
        let ops = log.borrow();
        assert!(ops.contains(&Op::AddTiles(Theme::Dark.tile_source().url)));
        assert!(ops.contains(&Op::Remove(light_tiles)));
        drop(ops);
        assert_eq!(last_style(&log, "DMM").border, "#E6EDF7");
    }

    #[test]
    fn removed_ports_lose_their_markers() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_ports(&[port("DMM", RiskLevel::Low), port("JED", RiskLevel::Low)]);
        sync.set_ports(&[port("JED", RiskLevel::Low)]);
        assert!(log.borrow().contains(&Op::RemoveMarker("DMM".to_string())));
    }

    #[test]
    fn reset_view_always_recenters() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        assert_eq!(sync.reset_view(), MapIntent::DeselectPort);
        assert_eq!(
            log.borrow().last(),
            Some(&Op::SetView(NATIONWIDE_CENTER, NATIONWIDE_ZOOM))
        );
    }

    #[test]
    fn reset_with_selection_moves_camera_once() {
        let (mut sync, log, _) = setup(0);
        sync.mount();
        sync.set_ports(&[port("DMM", RiskLevel::Low)]);
        sync.set_selected_port(Some("DMM"));
        log.borrow_mut().clear();

        assert_eq!(sync.reset_view(), MapIntent::DeselectPort);
        sync.set_selected_port(None);

        let moves: Vec<Op> = log
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::FlyTo(..) | Op::SetView(..)))
            .cloned()
            .collect();
        assert_eq!(moves, vec![Op::SetView(NATIONWIDE_CENTER, NATIONWIDE_ZOOM)]);
        assert_eq!(last_style(&log, "DMM").z_index, 500);

        // A later selection and deselection flies as usual.
        sync.set_selected_port(Some("DMM"));
        sync.set_selected_port(None);
        assert_eq!(
            log.borrow().last(),
            Some(&Op::FlyTo(NATIONWIDE_CENTER, NATIONWIDE_ZOOM))
        );
    }
}
