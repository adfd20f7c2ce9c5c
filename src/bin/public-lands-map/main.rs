#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod assets;
mod colors;
mod constants;
mod overlays;
mod projection;
mod tiles;
mod ui;
mod view;

use assets::{load_config_file, load_embedded_config};
use clap::Parser;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use public_lands_map::{ConfigError, MapConfig, MapSession, OverlayLoader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tiles::RemoteTextures;
use view::MapView;

/// Interactive map of public-land boundaries.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// RON map configuration to use instead of the embedded one
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Main application state for the public lands map.
pub struct PublicLandsApp {
    session: MapSession,
    view: MapView,
    loader: OverlayLoader,
    textures: RemoteTextures,
    toasts: Toasts,
    _runtime: tokio::runtime::Runtime,
}

impl PublicLandsApp {
    fn new(cc: &eframe::CreationContext<'_>, args: Args) -> Self {
        let mut toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let (config, errors) = load_config(args.config.as_deref());
        for err in &errors {
            log::error!("{err}");
            toasts.add(Toast {
                kind: ToastKind::Error,
                text: err.to_string().into(),
                options: ToastOptions::default()
                    .duration_in_seconds(10.0)
                    .show_icon(true),
                ..Default::default()
            });
        }

        let runtime = tokio::runtime::Runtime::new().expect("create tokio runtime");

        let ctx = cc.egui_ctx.clone();
        let loader = OverlayLoader::new(runtime.handle().clone(), move || ctx.request_repaint());
        let textures = RemoteTextures::new(runtime.handle().clone());

        let mut view = MapView::new(&config);
        let mut session = MapSession::new(config);
        session.start(&mut view);
        session.begin_loading(&loader);

        Self {
            session,
            view,
            loader,
            textures,
            toasts,
            _runtime: runtime,
        }
    }

    /// Feeds zoom and popup-close events reported by the view back into the session.
    /// Returns true if any event was handled.
    fn dispatch_view_events(&mut self, now: Instant) -> bool {
        let events = self.view.drain_events();
        let handled = !events.is_empty();
        for event in events {
            self.session.dispatch(event, now, &mut self.view);
        }
        handled
    }
}

/// Loads the user's config if given, falling back to the embedded one and
/// then to an empty map. Returns every error encountered along the way.
fn load_config(path: Option<&Path>) -> (MapConfig, Vec<ConfigError>) {
    let mut errors = Vec::new();

    if let Some(path) = path {
        match load_config_file(path) {
            Ok(config) => return (config, errors),
            Err(err) => errors.push(err),
        }
    }

    match load_embedded_config() {
        Ok(config) => (config, errors),
        Err(err) => {
            errors.push(err);
            (MapConfig::default(), errors)
        }
    }
}

impl eframe::App for PublicLandsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.session.poll_loads(&self.loader, &mut self.view);
        self.textures.poll(ctx);
        self.session.tick(now);
        self.handle_keyboard_input(ctx);

        self.show_status_bar(ctx);
        self.show_central_panel(ctx, now);
        // Late events (popup close button) changed state this frame has already drawn.
        if self.dispatch_view_events(now) {
            ctx.request_repaint();
        }

        if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        // Show toasts
        self.toasts.show(ctx);
    }
}

impl Drop for PublicLandsApp {
    fn drop(&mut self) {
        self.session.shutdown(&mut self.view);
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Public Lands Map"),
        ..Default::default()
    };

    eframe::run_native(
        "Public Lands Map",
        options,
        Box::new(move |cc| Ok(Box::new(PublicLandsApp::new(cc, args)))),
    )
}
