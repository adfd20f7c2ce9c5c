//! Zoom-banded label markers.

use crate::config::LabelConfig;
use crate::registry::{OverlayId, OverlayRegistry};
use crate::surface::MapSurface;
use std::collections::BTreeMap;

#[derive(Debug)]
struct LabelEntry {
    config: LabelConfig,
    /// False while the owning overlay's popup is open.
    attached: bool,
    /// Last verdict of the zoom band rule.
    in_band: bool,
}

/// The label markers of all overlays that have one.
#[derive(Debug, Default)]
pub struct LabelSet {
    entries: BTreeMap<OverlayId, LabelEntry>,
}

impl LabelSet {
    pub fn from_registry(registry: &OverlayRegistry) -> Self {
        let entries = registry
            .iter()
            .filter_map(|overlay| {
                let config = overlay.config.label.clone()?;
                Some((
                    overlay.id,
                    LabelEntry {
                        config,
                        attached: false,
                        in_band: false,
                    },
                ))
            })
            .collect();

        Self { entries }
    }

    /// Attaches every marker hidden, then runs the band check for `zoom`.
    pub fn attach_all(&mut self, zoom: i32, surface: &mut dyn MapSurface) {
        for (&id, entry) in &mut self.entries {
            surface.add_marker(id, &entry.config);
            entry.attached = true;
            entry.in_band = false;
        }
        self.apply_zoom(zoom, surface);
    }

    /// Re-evaluates every attached marker against its band.
    pub fn apply_zoom(&mut self, zoom: i32, surface: &mut dyn MapSurface) {
        for (&id, entry) in &mut self.entries {
            if !entry.attached {
                continue;
            }
            entry.in_band = entry.config.band.contains(zoom);
            surface.set_marker_visible(id, entry.in_band);
        }
    }

    /// Takes the marker off the map while its overlay's popup is open.
    pub fn suppress(&mut self, id: OverlayId, surface: &mut dyn MapSurface) {
        if let Some(entry) = self.entries.get_mut(&id)
            && entry.attached
        {
            surface.remove_marker(id);
            entry.attached = false;
        }
    }

    /// Puts a suppressed marker back, visible only if `zoom` is in its band.
    pub fn restore(&mut self, id: OverlayId, zoom: i32, surface: &mut dyn MapSurface) {
        if let Some(entry) = self.entries.get_mut(&id)
            && !entry.attached
        {
            surface.add_marker(id, &entry.config);
            entry.attached = true;
            entry.in_band = entry.config.band.contains(zoom);
            surface.set_marker_visible(id, entry.in_band);
        }
    }

    /// Effective visibility: attached and inside the band.
    pub fn is_visible(&self, id: OverlayId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.attached && entry.in_band)
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Detaches every marker.
    pub fn detach_all(&mut self, surface: &mut dyn MapSurface) {
        for (&id, entry) in &mut self.entries {
            if entry.attached {
                surface.remove_marker(id);
                entry.attached = false;
            }
        }
    }
}
