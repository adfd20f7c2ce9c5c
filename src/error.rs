//! Error types for configuration and overlay loading.

use thiserror::Error;

/// Why an overlay's geometry could not be loaded.
///
/// Every variant is handled the same way: the failure is logged with the
/// overlay's display name and the overlay is never added to the map.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("server responded with HTTP {status}")]
    BadResponse { status: reqwest::StatusCode },
    #[error("malformed GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur when loading the map configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("map.ron not found in embedded assets")]
    NotFound,
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid UTF-8 in map.ron: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("failed to parse map configuration: {0}")]
    Parse(#[from] ron::de::SpannedError),
    #[error("overlay '{key}': zoom band min ({min}) must be below max ({max})")]
    InvalidBand { key: String, min: i32, max: i32 },
    #[error("zoom range {min}..={max} is empty or does not contain the initial zoom {initial}")]
    InvalidZoomRange { min: i32, max: i32, initial: i32 },
    #[error("duplicate overlay key '{0}'")]
    DuplicateKey(String),
}
