//! Concurrent GeoJSON fetching.
//!
//! Each overlay is fetched on its own task. Results come back over a channel
//! and are applied on the UI thread in whatever order they complete.

use crate::error::LoadError;
use crate::geojson::Geometry;
use crate::registry::OverlayId;
use std::sync::{Arc, mpsc};
use tokio::runtime::Handle;

pub const USER_AGENT: &str = concat!("public-lands-map/", env!("CARGO_PKG_VERSION"));

/// A finished fetch.
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: OverlayId,
    pub result: Result<Geometry, LoadError>,
}

/// Fetches and parses one GeoJSON document.
pub async fn fetch_geometry(client: &reqwest::Client, url: &str) -> Result<Geometry, LoadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::BadResponse { status });
    }

    let body = response.text().await?;
    Ok(Geometry::from_geojson_str(&body)?)
}

/// Spawns overlay fetches on a tokio runtime and collects their results.
pub struct OverlayLoader {
    handle: Handle,
    client: reqwest::Client,
    tx: mpsc::Sender<LoadOutcome>,
    rx: mpsc::Receiver<LoadOutcome>,
    /// Called from the fetch task after each result is sent (e.g. to request a repaint)
    on_complete: Arc<dyn Fn() + Send + Sync>,
}

impl OverlayLoader {
    pub fn new(handle: Handle, on_complete: impl Fn() + Send + Sync + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            handle,
            client: reqwest::Client::new(),
            tx,
            rx,
            on_complete: Arc::new(on_complete),
        }
    }

    pub fn spawn(&self, id: OverlayId, display_name: &str, url: &str) {
        log::info!("Fetching {display_name} from {url}");

        let client = self.client.clone();
        let tx = self.tx.clone();
        let on_complete = self.on_complete.clone();
        let url = url.to_owned();

        self.handle.spawn(async move {
            let result = fetch_geometry(&client, &url).await;
            // The receiver is gone once the session has been torn down.
            if tx.send(LoadOutcome { id, result }).is_ok() {
                on_complete();
            }
        });
    }

    /// Drains every result that has arrived since the last poll.
    pub fn poll(&self) -> Vec<LoadOutcome> {
        self.rx.try_iter().collect()
    }
}
