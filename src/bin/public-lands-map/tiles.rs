//! Remote raster textures: map tiles and popup images.

use crate::constants::{MAX_CACHED_TEXTURES, TILE_DOWNLOAD_CONCURRENCY};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use public_lands_map::loader::USER_AGENT;
use std::collections::HashMap;
use std::sync::{Arc, mpsc};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// Errors that can occur when fetching and decoding a remote image.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("server responded with HTTP {0}")]
    BadResponse(reqwest::StatusCode),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("download semaphore closed")]
    Closed,
}

/// Decoded image data ready for texture creation.
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// State of a texture being loaded asynchronously.
enum TextureState {
    Loading(mpsc::Receiver<Result<DecodedImage, ImageLoadError>>),
    Ready(TextureHandle),
    /// Already logged; the slot stays blank.
    Failed,
}

struct Entry {
    state: TextureState,
    last_used: u64,
}

/// Fills `{z}`, `{x}` and `{y}` in a tile URL template.
pub fn apply_tile_template(template: &str, z: i32, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

async fn fetch_and_decode(
    client: &reqwest::Client,
    semaphore: &Semaphore,
    url: &str,
) -> Result<DecodedImage, ImageLoadError> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| ImageLoadError::Closed)?;

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ImageLoadError::BadResponse(response.status()));
    }

    let bytes = response.bytes().await?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}

/// Texture cache keyed by URL, filled by background downloads.
pub struct RemoteTextures {
    handle: Handle,
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
    entries: HashMap<String, Entry>,
    frame: u64,
}

impl RemoteTextures {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            client: reqwest::Client::new(),
            semaphore: Arc::new(Semaphore::new(TILE_DOWNLOAD_CONCURRENCY)),
            entries: HashMap::new(),
            frame: 0,
        }
    }

    /// Returns the texture for `url`, starting a download the first time it is asked for.
    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> Option<&TextureHandle> {
        let frame = self.frame;
        if !self.entries.contains_key(url) {
            let state = self.spawn(ctx, url);
            self.entries.insert(
                url.to_owned(),
                Entry {
                    state,
                    last_used: frame,
                },
            );
        }

        let entry = self.entries.get_mut(url)?;
        entry.last_used = frame;
        match &entry.state {
            TextureState::Ready(texture) => Some(texture),
            _ => None,
        }
    }

    /// Turns finished downloads into textures and evicts stale entries.
    /// Call once per frame before any [`get`](Self::get).
    pub fn poll(&mut self, ctx: &egui::Context) {
        self.frame += 1;

        for (url, entry) in &mut self.entries {
            let TextureState::Loading(rx) = &entry.state else {
                continue;
            };

            match rx.try_recv() {
                Ok(Ok(decoded)) => {
                    let image = ColorImage::from_rgba_unmultiplied(
                        [decoded.width as usize, decoded.height as usize],
                        &decoded.pixels,
                    );
                    let texture = ctx.load_texture(url, image, TextureOptions::LINEAR);
                    entry.state = TextureState::Ready(texture);
                }
                Ok(Err(err)) => {
                    log::debug!("{url}: {err}");
                    entry.state = TextureState::Failed;
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::debug!("{url}: channel disconnected");
                    entry.state = TextureState::Failed;
                }
                Err(mpsc::TryRecvError::Empty) => {}
            }
        }

        self.evict();
    }

    fn spawn(&self, ctx: &egui::Context, url: &str) -> TextureState {
        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();
        let client = self.client.clone();
        let semaphore = self.semaphore.clone();
        let url = url.to_owned();

        self.handle.spawn(async move {
            let result = fetch_and_decode(&client, &semaphore, &url).await;
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        TextureState::Loading(rx)
    }

    /// Drops the least recently used finished entries beyond the cache limit.
    fn evict(&mut self) {
        if self.entries.len() <= MAX_CACHED_TEXTURES {
            return;
        }

        let mut finished: Vec<(u64, String)> = self
            .entries
            .iter()
            .filter(|(_, entry)| !matches!(entry.state, TextureState::Loading(_)))
            .map(|(url, entry)| (entry.last_used, url.clone()))
            .collect();
        finished.sort_unstable();

        let excess = self.entries.len() - MAX_CACHED_TEXTURES;
        for (_, url) in finished.into_iter().take(excess) {
            self.entries.remove(&url);
        }
    }
}
