//! The map session: one owner for viewport, overlays, labels and selection.

use crate::config::{MapConfig, TileLayerConfig};
use crate::coordinator::PopupCoordinator;
use crate::error::LoadError;
use crate::geo::LatLng;
use crate::geojson::Geometry;
use crate::labels::LabelSet;
use crate::loader::OverlayLoader;
use crate::registry::{LoadState, OverlayId, OverlayRegistry};
use crate::surface::MapSurface;
use crate::viewport::ViewportController;
use std::time::Instant;

/// Input reported by the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Mouse wheel over the map. `delta_y < 0` means scrolling up.
    Wheel { delta_y: f64, shift: bool },
    /// Click somewhere on the map; hit testing decides whether it selects an overlay.
    MapClicked { location: LatLng },
    /// Click known to be inside an overlay.
    OverlayClicked { id: OverlayId, location: LatLng },
    /// The user closed a popup.
    PopupClosed { id: OverlayId },
    /// A zoom finished; `level` is the new zoom.
    ZoomChanged { level: i32 },
}

/// How the widget should treat the native event that produced a [`MapEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub suppress_scroll: bool,
}

pub struct MapSession {
    tile_layers: Vec<TileLayerConfig>,
    viewport: ViewportController,
    registry: OverlayRegistry,
    labels: LabelSet,
    popups: PopupCoordinator,
}

impl MapSession {
    pub fn new(config: MapConfig) -> Self {
        let viewport = ViewportController::new(config.zoom, config.hint_delay());
        let registry = OverlayRegistry::new(config.overlays);
        let labels = LabelSet::from_registry(&registry);

        Self {
            tile_layers: config.tile_layers,
            viewport,
            registry,
            labels,
            popups: PopupCoordinator::default(),
        }
    }

    /// Adds tile layers and label markers to the surface.
    pub fn start(&mut self, surface: &mut dyn MapSurface) {
        for layer in &self.tile_layers {
            surface.add_tile_layer(layer);
        }
        self.viewport.set_zoom(surface.zoom());
        self.labels.attach_all(self.viewport.zoom(), surface);
    }

    /// Starts fetching every overlay that has not been requested yet.
    pub fn begin_loading(&mut self, loader: &OverlayLoader) {
        let pending: Vec<OverlayId> = self
            .registry
            .iter()
            .filter(|overlay| matches!(overlay.state, LoadState::Pending))
            .map(|overlay| overlay.id)
            .collect();

        for id in pending {
            if let Some(overlay) = self.registry.get(id) {
                loader.spawn(id, overlay.config.display_name(), &overlay.config.source);
            }
            self.registry.mark_loading(id);
        }
    }

    /// Applies every fetch result the loader has collected.
    pub fn poll_loads(&mut self, loader: &OverlayLoader, surface: &mut dyn MapSurface) {
        for outcome in loader.poll() {
            self.complete_load(outcome.id, outcome.result, surface);
        }
    }

    pub fn complete_load(
        &mut self,
        id: OverlayId,
        result: Result<Geometry, LoadError>,
        surface: &mut dyn MapSurface,
    ) {
        self.registry.complete_load(id, result, surface);
    }

    pub fn dispatch(
        &mut self,
        event: MapEvent,
        now: Instant,
        surface: &mut dyn MapSurface,
    ) -> EventResponse {
        match event {
            MapEvent::Wheel { delta_y, shift } => {
                let outcome = self.viewport.handle_wheel(delta_y, shift, now, surface);
                return EventResponse {
                    suppress_scroll: outcome.suppress_scroll,
                };
            }
            MapEvent::MapClicked { location } => {
                self.viewport.handle_click();
                match self.registry.hit_test(location) {
                    Some(id) => self.open(id, location, surface),
                    None => {
                        if let Some(id) = self.popups.selected() {
                            surface.close_popup();
                            self.close(id, surface);
                        }
                    }
                }
            }
            MapEvent::OverlayClicked { id, location } => self.open(id, location, surface),
            MapEvent::PopupClosed { id } => self.close(id, surface),
            MapEvent::ZoomChanged { level } => {
                self.viewport.set_zoom(level);
                self.labels.apply_zoom(level, surface);
            }
        }

        EventResponse::default()
    }

    /// Fires the hint dismiss timer if due. Returns true if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.viewport.tick(now)
    }

    /// When [`tick`](Self::tick) next needs to run.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.viewport.next_deadline()
    }

    pub fn hint_visible(&self) -> bool {
        self.viewport.hint_visible()
    }

    pub fn zoom(&self) -> i32 {
        self.viewport.zoom()
    }

    pub fn selected(&self) -> Option<OverlayId> {
        self.popups.selected()
    }

    pub fn label_visible(&self, id: OverlayId) -> bool {
        self.labels.is_visible(id)
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn tile_layers(&self) -> &[TileLayerConfig] {
        &self.tile_layers
    }

    /// Closes any popup, cancels the hint and detaches all markers.
    pub fn shutdown(&mut self, surface: &mut dyn MapSurface) {
        if let Some(id) = self.popups.selected() {
            surface.close_popup();
            self.close(id, surface);
        }
        self.viewport.handle_click();
        self.labels.detach_all(surface);
    }

    fn open(&mut self, id: OverlayId, location: LatLng, surface: &mut dyn MapSurface) {
        self.popups.on_overlay_click(
            id,
            location,
            &self.registry,
            &mut self.labels,
            self.viewport.zoom(),
            surface,
        );
    }

    fn close(&mut self, id: OverlayId, surface: &mut dyn MapSurface) {
        self.popups
            .on_popup_close(id, &mut self.labels, self.viewport.zoom(), surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LabelConfig, ZoomBand};
    use crate::registry::tests::{overlay_config, square};
    use crate::surface::testing::{Call, RecordingSurface};
    use std::time::Duration;

    const A: OverlayId = OverlayId(0);
    const B: OverlayId = OverlayId(1);

    fn config() -> MapConfig {
        let mut a = overlay_config("lpnf", "Los Padres", "#66CDAA");
        a.label = Some(LabelConfig {
            position: LatLng::new(0.5, 0.5),
            text: "Los Padres National Forest".to_owned(),
            band: ZoomBand::new(6, 10),
        });
        let mut b = overlay_config("cpnm", "Carrizo Plain", "#ff7700");
        b.label = Some(LabelConfig {
            position: LatLng::new(2.5, 2.5),
            text: "Carrizo Plain".to_owned(),
            band: ZoomBand::new(7, 11),
        });

        MapConfig {
            center: LatLng::new(1.0, 1.0),
            zoom: 8,
            min_zoom: 3,
            max_zoom: 18,
            hint_delay_ms: 2000,
            tile_layers: Vec::new(),
            overlays: vec![a, b],
        }
    }

    /// A started session with both overlays loaded: A covers (0,0)-(1,1), B covers (2,2)-(3,3).
    fn loaded() -> (MapSession, RecordingSurface) {
        let mut session = MapSession::new(config());
        let mut surface = RecordingSurface::new(8);
        session.start(&mut surface);
        session.complete_load(A, Ok(square(0.0, 0.0, 1.0, 1.0)), &mut surface);
        session.complete_load(B, Ok(square(2.0, 2.0, 3.0, 3.0)), &mut surface);
        surface.calls.clear();
        (session, surface)
    }

    fn click(session: &mut MapSession, surface: &mut RecordingSurface, lat: f64, lng: f64) {
        let location = LatLng::new(lat, lng);
        session.dispatch(MapEvent::MapClicked { location }, Instant::now(), surface);
    }

    fn zoom_to(session: &mut MapSession, surface: &mut RecordingSurface, level: i32) {
        surface.zoom = level;
        session.dispatch(MapEvent::ZoomChanged { level }, Instant::now(), surface);
    }

    #[test]
    fn labels_start_with_band_verdict() {
        let (session, surface) = loaded();
        assert!(session.label_visible(A));
        assert!(session.label_visible(B));
        assert!(surface.marker_shown(A) && surface.marker_shown(B));
    }

    #[test]
    fn click_inside_opens_popup_with_that_overlays_content() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 2.5, 2.5);

        let popup = surface.popup.as_ref().unwrap();
        assert_eq!(popup.id, B);
        assert_eq!(popup.location, LatLng::new(2.5, 2.5));
        assert_eq!(popup.content.title, "Carrizo Plain");
        assert_eq!(popup.content.body, "Carrizo Plain body");
        assert_eq!(popup.content.accent_color.to_string(), "#FF7700");
        assert_eq!(session.selected(), Some(B));
        assert!(!session.label_visible(B));
        assert!(!surface.markers.contains_key(&B));
    }

    #[test]
    fn click_outside_everything_opens_nothing() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 10.0, 10.0);

        assert!(surface.popup.is_none());
        assert!(surface.calls.is_empty());
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn opening_b_closes_a_first() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 0.5, 0.5);
        surface.calls.clear();
        click(&mut session, &mut surface, 2.5, 2.5);

        assert_eq!(
            surface.calls,
            vec![
                Call::ClosePopup,
                Call::AddMarker(A),
                Call::SetMarkerVisible(A, true),
                Call::OpenPopup(B),
                Call::RemoveMarker(B),
            ]
        );
        assert_eq!(session.selected(), Some(B));
        assert!(session.label_visible(A));
        assert!(!session.label_visible(B));
    }

    #[test]
    fn clicking_same_overlay_repositions_without_toggling() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 0.5, 0.5);
        click(&mut session, &mut surface, 0.25, 0.75);

        let popup = surface.popup.as_ref().unwrap();
        assert_eq!(popup.id, A);
        assert_eq!(popup.location, LatLng::new(0.25, 0.75));
        assert_eq!(session.selected(), Some(A));
        assert!(!session.label_visible(A));
    }

    #[test]
    fn closing_popup_recomputes_label_for_current_zoom() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 0.5, 0.5);
        // Leave A's band while its popup is open.
        zoom_to(&mut session, &mut surface, 12);
        session.dispatch(MapEvent::PopupClosed { id: A }, Instant::now(), &mut surface);

        assert_eq!(session.selected(), None);
        assert!(!session.label_visible(A));
        assert_eq!(surface.markers.get(&A), Some(&false));

        zoom_to(&mut session, &mut surface, 9);
        assert!(session.label_visible(A));
    }

    #[test]
    fn zoom_does_not_reveal_suppressed_label() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 0.5, 0.5);
        zoom_to(&mut session, &mut surface, 9);

        assert!(!session.label_visible(A));
        assert!(!surface.markers.contains_key(&A));
        assert!(session.label_visible(B));
    }

    #[test]
    fn visibility_invariant_holds_across_zoom_and_selection() {
        let (mut session, mut surface) = loaded();
        let bands = [(A, ZoomBand::new(6, 10)), (B, ZoomBand::new(7, 11))];

        for level in 3..=18 {
            for selection in [None, Some((0.5, 0.5)), Some((2.5, 2.5))] {
                match selection {
                    Some((lat, lng)) => click(&mut session, &mut surface, lat, lng),
                    None => click(&mut session, &mut surface, 10.0, 10.0),
                }
                zoom_to(&mut session, &mut surface, level);

                for (id, band) in bands {
                    let expected = band.contains(level) && session.selected() != Some(id);
                    assert_eq!(session.label_visible(id), expected, "{id} at zoom {level}");
                    assert_eq!(surface.marker_shown(id), expected, "{id} at zoom {level}");
                }
            }
        }
    }

    #[test]
    fn click_on_empty_map_closes_open_popup() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 0.5, 0.5);
        click(&mut session, &mut surface, 10.0, 10.0);

        assert!(surface.popup.is_none());
        assert_eq!(session.selected(), None);
        assert!(session.label_visible(A));
    }

    #[test]
    fn stale_popup_close_is_ignored() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 2.5, 2.5);
        surface.calls.clear();
        session.dispatch(MapEvent::PopupClosed { id: A }, Instant::now(), &mut surface);

        assert!(surface.calls.is_empty());
        assert_eq!(session.selected(), Some(B));
    }

    #[test]
    fn unloaded_overlay_cannot_be_clicked() {
        let mut session = MapSession::new(config());
        let mut surface = RecordingSurface::new(8);
        session.start(&mut surface);
        session.complete_load(
            A,
            Err(LoadError::BadResponse {
                status: reqwest::StatusCode::NOT_FOUND,
            }),
            &mut surface,
        );

        click(&mut session, &mut surface, 0.5, 0.5);

        assert!(surface.popup.is_none());
        assert!(session.label_visible(A), "labels do not depend on geometry");
    }

    #[test]
    fn wheel_without_shift_shows_hint_and_keeps_zoom() {
        let (mut session, mut surface) = loaded();
        let t0 = Instant::now();

        let response = session.dispatch(
            MapEvent::Wheel {
                delta_y: -100.0,
                shift: false,
            },
            t0,
            &mut surface,
        );

        assert!(response.suppress_scroll);
        assert!(session.hint_visible());
        assert_eq!(surface.zoom, 8);
        assert_eq!(session.next_deadline(), Some(t0 + Duration::from_millis(2000)));

        assert!(session.tick(t0 + Duration::from_millis(2000)));
        assert!(!session.hint_visible());
    }

    #[test]
    fn shift_wheel_zooms_in_one_step_and_hides_hint() {
        let (mut session, mut surface) = loaded();
        let t0 = Instant::now();
        let wheel = |shift| MapEvent::Wheel {
            delta_y: -100.0,
            shift,
        };

        session.dispatch(wheel(false), t0, &mut surface);
        let response = session.dispatch(wheel(true), t0, &mut surface);

        assert!(response.suppress_scroll);
        assert!(!session.hint_visible());
        assert_eq!(surface.zoom, 9);
    }

    #[test]
    fn click_hides_hint() {
        let (mut session, mut surface) = loaded();
        let t0 = Instant::now();

        session.dispatch(
            MapEvent::Wheel {
                delta_y: 3.0,
                shift: false,
            },
            t0,
            &mut surface,
        );
        click(&mut session, &mut surface, 10.0, 10.0);

        assert!(!session.hint_visible());
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn start_adds_tile_layers_and_markers() {
        let mut config = config();
        config.tile_layers = vec![TileLayerConfig {
            name: "World Imagery".to_owned(),
            url_template: "https://example.invalid/{z}/{y}/{x}".to_owned(),
            max_zoom: 18,
            attribution: None,
            z_index: 200,
        }];
        let mut session = MapSession::new(config);
        let mut surface = RecordingSurface::new(5);

        session.start(&mut surface);

        assert_eq!(surface.calls[0], Call::AddTileLayer("World Imagery".to_owned()));
        assert!(surface.calls.contains(&Call::AddMarker(A)));
        assert!(surface.calls.contains(&Call::AddMarker(B)));
        assert_eq!(session.zoom(), 5);
        assert!(!session.label_visible(A));
        assert!(!session.label_visible(B));
    }

    #[test]
    fn shutdown_releases_popup_and_markers() {
        let (mut session, mut surface) = loaded();

        click(&mut session, &mut surface, 0.5, 0.5);
        session.shutdown(&mut surface);

        assert!(surface.popup.is_none());
        assert!(surface.markers.is_empty());
        assert_eq!(session.selected(), None);
    }
}
