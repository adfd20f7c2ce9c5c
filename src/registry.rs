//! The set of configured boundary overlays and their load state.

use crate::config::OverlayConfig;
use crate::error::LoadError;
use crate::geo::LatLng;
use crate::geojson::Geometry;
use crate::surface::MapSurface;
use std::fmt;
use std::sync::Arc;

/// Index of an overlay in the registry, in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub usize);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

/// Load progress of an overlay's geometry.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Not requested yet.
    Pending,
    /// Fetch in flight.
    Loading,
    /// Geometry is on the map.
    Ready(Arc<Geometry>),
    /// Loading failed; the overlay stays off the map.
    Failed(String),
}

#[derive(Debug)]
pub struct Overlay {
    pub id: OverlayId,
    pub config: OverlayConfig,
    pub state: LoadState,
}

impl Overlay {
    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        match &self.state {
            LoadState::Ready(geometry) => Some(geometry),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct OverlayRegistry {
    overlays: Vec<Overlay>,
    /// Loaded overlays, bottom to top. Matches fetch completion order.
    render_order: Vec<OverlayId>,
}

impl OverlayRegistry {
    pub fn new(configs: Vec<OverlayConfig>) -> Self {
        let overlays = configs
            .into_iter()
            .enumerate()
            .map(|(index, config)| Overlay {
                id: OverlayId(index),
                config,
                state: LoadState::Pending,
            })
            .collect();

        Self {
            overlays,
            render_order: Vec::new(),
        }
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter()
    }

    pub fn render_order(&self) -> &[OverlayId] {
        &self.render_order
    }

    /// Marks an overlay as having a fetch in flight.
    pub fn mark_loading(&mut self, id: OverlayId) {
        if let Some(overlay) = self.overlays.get_mut(id.0) {
            overlay.state = LoadState::Loading;
        }
    }

    /// Applies the outcome of a fetch.
    ///
    /// On success the geometry is handed to the surface on top of everything
    /// loaded so far. On failure the error is logged and nothing else changes.
    pub fn complete_load(
        &mut self,
        id: OverlayId,
        result: Result<Geometry, LoadError>,
        surface: &mut dyn MapSurface,
    ) {
        let Some(overlay) = self.overlays.get_mut(id.0) else {
            log::warn!("Ignoring load result for unknown {id}");
            return;
        };

        if matches!(overlay.state, LoadState::Ready(_)) {
            log::warn!("{} is already loaded", overlay.config.display_name());
            return;
        }

        match result {
            Ok(geometry) => {
                if geometry.is_empty() {
                    log::warn!(
                        "{} contains no polygons; nothing will be drawn",
                        overlay.config.display_name()
                    );
                }
                log::info!(
                    "Loaded {}: {} polygon(s), {} skipped",
                    overlay.config.display_name(),
                    geometry.polygons.len(),
                    geometry.skipped
                );
                let geometry = Arc::new(geometry);
                surface.add_overlay(id, geometry.clone(), &overlay.config.style);
                overlay.state = LoadState::Ready(geometry);
                self.render_order.push(id);
            }
            Err(err) => {
                log::error!("Failed to load {}: {err}", overlay.config.display_name());
                overlay.state = LoadState::Failed(err.to_string());
            }
        }
    }

    /// Topmost loaded overlay containing `location`.
    pub fn hit_test(&self, location: LatLng) -> Option<OverlayId> {
        self.render_order.iter().rev().copied().find(|&id| {
            self.get(id)
                .and_then(Overlay::geometry)
                .is_some_and(|geometry| geometry.contains(location))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::{OverlayStyle, PopupContent};
    use crate::surface::testing::{Call, RecordingSurface};

    /// A square GeoJSON polygon spanning `[lng0, lng1] x [lat0, lat1]`.
    pub fn square_geojson(lat0: f64, lng0: f64, lat1: f64, lng1: f64) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","properties":{{}},
            "geometry":{{"type":"Polygon","coordinates":[[[{lng0},{lat0}],[{lng1},{lat0}],[{lng1},{lat1}],[{lng0},{lat1}],[{lng0},{lat0}]]]}}}}]}}"#
        )
    }

    pub fn square(lat0: f64, lng0: f64, lat1: f64, lng1: f64) -> Geometry {
        Geometry::from_geojson_str(&square_geojson(lat0, lng0, lat1, lng1)).unwrap()
    }

    pub fn overlay_config(key: &str, title: &str, hex: &str) -> OverlayConfig {
        let color: Color = hex.parse().unwrap();
        OverlayConfig {
            key: key.to_owned(),
            source: format!("https://example.invalid/{key}.geojson"),
            style: OverlayStyle {
                color,
                weight: 1.0,
                opacity: 0.4,
                fill_color: color,
                fill_opacity: 0.4,
            },
            popup: PopupContent {
                title: title.to_owned(),
                body: format!("{title} body"),
                link_url: None,
                image_url: None,
                accent_color: color,
            },
            label: None,
        }
    }

    fn bad_response() -> LoadError {
        LoadError::BadResponse {
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }

    fn four_overlays() -> OverlayRegistry {
        OverlayRegistry::new(vec![
            overlay_config("lpnf", "Los Padres", "#66CDAA"),
            overlay_config("cpnm", "Carrizo Plain", "#ff7700"),
            overlay_config("bcnwr", "Bitter Creek", "#EFDF09"),
            overlay_config("hmnwr", "Hopper Mountain", "#EFDF09"),
        ])
    }

    #[test]
    fn failed_overlay_does_not_block_the_others() {
        let mut registry = four_overlays();
        let mut surface = RecordingSurface::new(8);

        for overlay_index in 0..4 {
            registry.mark_loading(OverlayId(overlay_index));
        }

        // Completion order differs from configuration order.
        registry.complete_load(OverlayId(2), Ok(square(0.0, 0.0, 1.0, 1.0)), &mut surface);
        registry.complete_load(OverlayId(1), Err(bad_response()), &mut surface);
        registry.complete_load(OverlayId(3), Ok(square(2.0, 2.0, 3.0, 3.0)), &mut surface);
        registry.complete_load(OverlayId(0), Ok(square(4.0, 4.0, 5.0, 5.0)), &mut surface);

        assert_eq!(
            surface.calls,
            vec![
                Call::AddOverlay(OverlayId(2)),
                Call::AddOverlay(OverlayId(3)),
                Call::AddOverlay(OverlayId(0)),
            ]
        );
        assert_eq!(registry.render_order(), &[OverlayId(2), OverlayId(3), OverlayId(0)]);
        assert!(matches!(
            registry.get(OverlayId(1)).map(|o| &o.state),
            Some(LoadState::Failed(msg)) if msg.contains("404")
        ));
    }

    #[test]
    fn overlays_are_styled_with_their_own_config() {
        let mut registry = four_overlays();
        let mut surface = RecordingSurface::new(8);

        registry.complete_load(OverlayId(1), Ok(square(0.0, 0.0, 1.0, 1.0)), &mut surface);

        let (id, style) = surface.overlays[0];
        assert_eq!(id, OverlayId(1));
        assert_eq!(style.fill_color, Color::rgb(0xff, 0x77, 0x00));
    }

    #[test]
    fn hit_test_prefers_topmost_and_ignores_unloaded() {
        let mut registry = four_overlays();
        let mut surface = RecordingSurface::new(8);

        registry.complete_load(OverlayId(0), Ok(square(0.0, 0.0, 2.0, 2.0)), &mut surface);
        registry.complete_load(OverlayId(1), Ok(square(1.0, 1.0, 3.0, 3.0)), &mut surface);

        assert_eq!(registry.hit_test(LatLng::new(0.5, 0.5)), Some(OverlayId(0)));
        assert_eq!(registry.hit_test(LatLng::new(1.5, 1.5)), Some(OverlayId(1)));
        assert_eq!(registry.hit_test(LatLng::new(10.0, 10.0)), None);
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut registry = four_overlays();
        let mut surface = RecordingSurface::new(8);

        registry.complete_load(OverlayId(0), Ok(square(0.0, 0.0, 1.0, 1.0)), &mut surface);
        registry.complete_load(OverlayId(0), Ok(square(0.0, 0.0, 1.0, 1.0)), &mut surface);
        registry.complete_load(OverlayId(9), Err(bad_response()), &mut surface);

        assert_eq!(surface.calls, vec![Call::AddOverlay(OverlayId(0))]);
        assert_eq!(registry.render_order().len(), 1);
    }
}
