//! The egui map widget state the session drives.

use crate::projection;
use eframe::egui;
use public_lands_map::{
    Geometry, LabelConfig, LatLng, MapConfig, MapEvent, MapSurface, OverlayId, OverlayStyle,
    PopupContent, TileLayerConfig,
};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct OverlayLayer {
    pub geometry: Arc<Geometry>,
    pub style: OverlayStyle,
}

pub struct Marker {
    pub label: LabelConfig,
    pub visible: bool,
}

pub struct OpenPopup {
    pub id: OverlayId,
    pub location: LatLng,
    pub content: PopupContent,
}

/// Pan/zoom state plus everything the session has put on the map.
pub struct MapView {
    pub center: LatLng,
    zoom: i32,
    min_zoom: i32,
    max_zoom: i32,
    /// Sorted by z-index
    pub tile_layers: Vec<TileLayerConfig>,
    /// Bottom to top
    pub overlays: Vec<OverlayLayer>,
    pub markers: BTreeMap<OverlayId, Marker>,
    pub popup: Option<OpenPopup>,
    events: Vec<MapEvent>,
}

impl MapView {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            center: config.center,
            zoom: config.zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            tile_layers: Vec::new(),
            overlays: Vec::new(),
            markers: BTreeMap::new(),
            popup: None,
            events: Vec::new(),
        }
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < self.max_zoom
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > self.min_zoom
    }

    pub fn pan(&mut self, delta: egui::Vec2) {
        self.center = projection::pan(self.center, self.zoom, delta);
    }

    /// The user dismissed the popup from its close button.
    pub fn request_close_popup(&mut self) {
        if let Some(popup) = self.popup.take() {
            self.events.push(MapEvent::PopupClosed { id: popup.id });
        }
    }

    /// Takes the events reported since the last call.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_zoom(&mut self, zoom: i32) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if zoom != self.zoom {
            self.zoom = zoom;
            self.events.push(MapEvent::ZoomChanged { level: zoom });
        }
    }
}

impl MapSurface for MapView {
    fn add_tile_layer(&mut self, layer: &TileLayerConfig) {
        self.tile_layers.push(layer.clone());
        self.tile_layers.sort_by_key(|layer| layer.z_index);
    }

    fn add_overlay(&mut self, _id: OverlayId, geometry: Arc<Geometry>, style: &OverlayStyle) {
        self.overlays.push(OverlayLayer {
            geometry,
            style: *style,
        });
    }

    fn add_marker(&mut self, id: OverlayId, label: &LabelConfig) {
        self.markers.insert(
            id,
            Marker {
                label: label.clone(),
                visible: false,
            },
        );
    }

    fn remove_marker(&mut self, id: OverlayId) {
        self.markers.remove(&id);
    }

    fn set_marker_visible(&mut self, id: OverlayId, visible: bool) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.visible = visible;
        }
    }

    fn open_popup(&mut self, id: OverlayId, location: LatLng, content: &PopupContent) {
        self.popup = Some(OpenPopup {
            id,
            location,
            content: content.clone(),
        });
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }

    fn zoom(&self) -> i32 {
        self.zoom
    }

    fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + 1);
    }

    fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - 1);
    }
}
