//! Interactive public-land boundary map.
//!
//! The library holds everything that does not need a window: configuration,
//! GeoJSON loading, and the [`MapSession`](session::MapSession) that coordinates
//! scroll-zoom gating, popups and zoom-banded labels through a [`MapSurface`](surface::MapSurface).

pub mod color;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod geo;
pub mod geojson;
pub mod labels;
pub mod loader;
pub mod registry;
pub mod session;
pub mod surface;
pub mod viewport;

pub use color::Color;
pub use config::{
    LabelConfig, MapConfig, OVERLAY_PANE_Z_INDEX, OverlayConfig, OverlayStyle, PopupContent,
    TileLayerConfig, ZoomBand,
};
pub use error::{ConfigError, LoadError};
pub use geo::{BoundingBox, LatLng, Polygon};
pub use geojson::Geometry;
pub use loader::OverlayLoader;
pub use registry::OverlayId;
pub use session::{EventResponse, MapEvent, MapSession};
pub use surface::MapSurface;
