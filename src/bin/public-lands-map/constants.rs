/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Concurrent tile and image downloads.
pub const TILE_DOWNLOAD_CONCURRENCY: usize = 8;

/// Remote textures kept in memory before the least recently used are dropped.
pub const MAX_CACHED_TEXTURES: usize = 384;

/// Height of the floating zoom controls in pixels.
pub const ZOOM_CONTROLS_HEIGHT: f32 = 36.0;

/// Width of an overlay popup in pixels.
pub const POPUP_WIDTH: f32 = 240.0;

/// Gap between a popup and the clicked point.
pub const POPUP_OFFSET: f32 = 10.0;

/// Text of the scroll-zoom hint.
pub const HINT_TEXT: &str = "Hold Shift and scroll to zoom the map";
