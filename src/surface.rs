//! The capabilities the session needs from a map widget.

use crate::config::{LabelConfig, OverlayStyle, PopupContent, TileLayerConfig};
use crate::geo::LatLng;
use crate::geojson::Geometry;
use crate::registry::OverlayId;
use std::sync::Arc;

/// A map widget the session drives.
///
/// Implementations own rendering, projection and pan state. They report
/// "zoom finished changing" and user-initiated popup closes back to the
/// session as [`MapEvent`](crate::session::MapEvent)s.
pub trait MapSurface {
    fn add_tile_layer(&mut self, layer: &TileLayerConfig);

    /// Adds a loaded overlay on top of previously added ones.
    fn add_overlay(&mut self, id: OverlayId, geometry: Arc<Geometry>, style: &OverlayStyle);

    /// Attaches a label marker. New markers start hidden.
    fn add_marker(&mut self, id: OverlayId, label: &LabelConfig);

    fn remove_marker(&mut self, id: OverlayId);

    fn set_marker_visible(&mut self, id: OverlayId, visible: bool);

    /// Opens the popup for `id` at `location`, replacing any open popup.
    /// Must not report a `PopupClosed` event for the replaced popup.
    fn open_popup(&mut self, id: OverlayId, location: LatLng, content: &PopupContent);

    /// Closes the open popup, if any, without reporting `PopupClosed`.
    fn close_popup(&mut self);

    fn zoom(&self) -> i32;

    fn zoom_in(&mut self);

    fn zoom_out(&mut self);
}
