//! Embedded configuration loading.

use public_lands_map::{ConfigError, MapConfig};
use rust_embed::RustEmbed;
use std::path::Path;

/// Embeds the default map configuration from the assets/ directory.
/// In debug mode, assets are loaded from the filesystem for faster iteration.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

const CONFIG_ASSET: &str = "map.ron";

/// Loads the map configuration embedded in the binary.
pub fn load_embedded_config() -> Result<MapConfig, ConfigError> {
    let file = Assets::get(CONFIG_ASSET).ok_or(ConfigError::NotFound)?;
    let ron_string = std::str::from_utf8(&file.data)?;
    MapConfig::from_ron_str(ron_string)
}

/// Loads a configuration file from disk.
pub fn load_config_file(path: &Path) -> Result<MapConfig, ConfigError> {
    let ron_string = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    MapConfig::from_ron_str(&ron_string)
}
