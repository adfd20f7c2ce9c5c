//! Map configuration: tile layers, boundary overlays, labels and viewport defaults.

use crate::color::Color;
use crate::error::ConfigError;
use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Pane z-index that boundary overlays are drawn in.
/// Tile layers with a lower z-index render beneath them, higher above.
pub const OVERLAY_PANE_Z_INDEX: i32 = 400;

fn default_hint_delay_ms() -> u64 {
    2000
}

fn default_tile_max_zoom() -> i32 {
    18
}

/// Root configuration for a map session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial center of the view
    pub center: LatLng,
    /// Initial zoom level
    pub zoom: i32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    /// How long the "hold shift to zoom" hint stays up
    #[serde(default = "default_hint_delay_ms")]
    pub hint_delay_ms: u64,
    #[serde(default)]
    pub tile_layers: Vec<TileLayerConfig>,
    #[serde(default)]
    pub overlays: Vec<OverlayConfig>,
}

/// An XYZ raster tile layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileLayerConfig {
    pub name: String,
    /// URL template containing `{z}`, `{x}` and `{y}`
    pub url_template: String,
    #[serde(default = "default_tile_max_zoom")]
    pub max_zoom: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    /// Stacking order relative to other panes (overlays sit at 400)
    pub z_index: i32,
}

/// Stroke and fill styling for a boundary overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub color: Color,
    pub weight: f32,
    pub opacity: f32,
    pub fill_color: Color,
    pub fill_opacity: f32,
}

/// What the popup shows when an overlay is clicked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub accent_color: Color,
}

/// Half-open zoom interval `(min, max]` in which a label may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomBand {
    pub min: i32,
    pub max: i32,
}

impl ZoomBand {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, zoom: i32) -> bool {
        self.min < zoom && zoom <= self.max
    }
}

/// A text label pinned to a coordinate, shown while zoomed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub position: LatLng,
    pub text: String,
    pub band: ZoomBand,
}

/// A boundary dataset and everything needed to present it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Unique key (e.g. "lpnf")
    pub key: String,
    /// URL of the GeoJSON document
    pub source: String,
    pub style: OverlayStyle,
    pub popup: PopupContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelConfig>,
}

impl OverlayConfig {
    /// Name used when logging about this overlay.
    pub fn display_name(&self) -> &str {
        &self.popup.title
    }
}

impl Default for MapConfig {
    /// An empty map over the Central Coast of California.
    fn default() -> Self {
        Self {
            center: LatLng::new(35.3, -120.5),
            zoom: 8,
            min_zoom: 3,
            max_zoom: 18,
            hint_delay_ms: default_hint_delay_ms(),
            tile_layers: Vec::new(),
            overlays: Vec::new(),
        }
    }
}

impl MapConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(ron_string: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron_string)?;
        config.validate()?;
        Ok(config)
    }

    pub fn hint_delay(&self) -> Duration {
        Duration::from_millis(self.hint_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_zoom > self.max_zoom || !(self.min_zoom..=self.max_zoom).contains(&self.zoom) {
            return Err(ConfigError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
                initial: self.zoom,
            });
        }

        let mut keys = HashSet::new();
        for overlay in &self.overlays {
            if !keys.insert(overlay.key.as_str()) {
                return Err(ConfigError::DuplicateKey(overlay.key.clone()));
            }
            if let Some(label) = &overlay.label
                && label.band.min >= label.band.max
            {
                return Err(ConfigError::InvalidBand {
                    key: overlay.key.clone(),
                    min: label.band.min,
                    max: label.band.max,
                });
            }
        }

        Ok(())
    }
}
