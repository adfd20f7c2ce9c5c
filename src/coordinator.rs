//! Keeps popups and label markers from showing for the same overlay at once.

use crate::geo::LatLng;
use crate::labels::LabelSet;
use crate::registry::{OverlayId, OverlayRegistry};
use crate::surface::MapSurface;

/// Tracks the single selected (popup-open) overlay.
#[derive(Debug, Default)]
pub struct PopupCoordinator {
    selected: Option<OverlayId>,
}

impl PopupCoordinator {
    pub fn selected(&self) -> Option<OverlayId> {
        self.selected
    }

    /// Opens `id`'s popup at `location`, closing any open popup first.
    pub fn on_overlay_click(
        &mut self,
        id: OverlayId,
        location: LatLng,
        registry: &OverlayRegistry,
        labels: &mut LabelSet,
        zoom: i32,
        surface: &mut dyn MapSurface,
    ) {
        let Some(overlay) = registry.get(id) else {
            log::warn!("Click on unknown {id}");
            return;
        };

        if let Some(previous) = self.selected {
            surface.close_popup();
            self.on_popup_close(previous, labels, zoom, surface);
        }

        surface.open_popup(id, location, &overlay.config.popup);
        labels.suppress(id, surface);
        self.selected = Some(id);
    }

    /// Clears the selection and brings back the overlay's label, if any.
    ///
    /// Closes reported for an overlay that is no longer selected are stale and ignored.
    pub fn on_popup_close(
        &mut self,
        id: OverlayId,
        labels: &mut LabelSet,
        zoom: i32,
        surface: &mut dyn MapSurface,
    ) {
        if self.selected != Some(id) {
            log::debug!("Ignoring close for {id}: not the open popup");
            return;
        }

        self.selected = None;
        labels.restore(id, zoom, surface);
    }
}
