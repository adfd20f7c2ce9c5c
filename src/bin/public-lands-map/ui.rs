//! UI rendering methods for the public lands map application.

use crate::PublicLandsApp;
use crate::colors;
use crate::constants::{POPUP_OFFSET, POPUP_WIDTH, ZOOM_CONTROLS_HEIGHT};
use crate::overlays::{draw_hint, draw_labels, draw_overlay, draw_tile_layer};
use crate::projection::ScreenProjection;
use eframe::egui;
use public_lands_map::registry::LoadState;
use public_lands_map::{MapEvent, MapSurface, OVERLAY_PANE_Z_INDEX};
use std::time::Instant;

impl PublicLandsApp {
    /// Handles keyboard shortcuts for zooming.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                self.view.zoom_in();
            }
            if i.key_pressed(egui::Key::Minus) {
                self.view.zoom_out();
            }
        });
    }

    /// Renders the bottom status bar with controls hint, load progress and tile attribution.
    pub fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Shift+Scroll: Zoom | Drag: Pan | +/-: Zoom | Click a boundary for details");

                let loading = self
                    .session
                    .registry()
                    .iter()
                    .filter(|overlay| matches!(overlay.state, LoadState::Loading))
                    .count();
                if loading > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.label(format!("Loading {loading} boundary layer(s)"));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    for attribution in self
                        .session
                        .tile_layers()
                        .iter()
                        .filter_map(|layer| layer.attribution.as_deref())
                    {
                        ui.small(attribution);
                    }
                });
            });
        });
    }

    /// Renders the central panel containing the map view.
    pub fn show_central_panel(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let panel_rect = ui.max_rect();
                // Button zooms must land before the map reads the zoom for this frame.
                self.show_zoom_controls(ctx, panel_rect);
                self.show_map(ui, ctx, now);
            });
    }

    /// Handles input on the map, then draws tiles, overlays, labels, hint and popup.
    fn show_map(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, now: Instant) {
        let (map_rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        let projection = ScreenProjection::new(map_rect, self.view.center, self.view.zoom());
        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let location = projection.to_lat_lng(pos);
            self.session
                .dispatch(MapEvent::MapClicked { location }, now, &mut self.view);
        }

        self.handle_wheel(ctx, &response, now);

        if response.dragged() {
            self.view.pan(response.drag_delta());
        }

        // Zoom changes must reach the label rule before drawing.
        self.dispatch_view_events(now);

        let projection = ScreenProjection::new(map_rect, self.view.center, self.view.zoom());
        let painter = ui.painter_at(map_rect);
        painter.rect_filled(map_rect, 0.0, colors::MAP_BACKGROUND);

        let (below, above): (Vec<_>, Vec<_>) = self
            .view
            .tile_layers
            .iter()
            .partition(|layer| layer.z_index < OVERLAY_PANE_Z_INDEX);

        for layer in below {
            draw_tile_layer(&painter, ctx, &projection, layer, &mut self.textures);
        }
        for overlay in &self.view.overlays {
            draw_overlay(&painter, &projection, overlay);
        }
        for layer in above {
            draw_tile_layer(&painter, ctx, &projection, layer, &mut self.textures);
        }

        draw_labels(&painter, &projection, &self.view.markers);

        if self.session.hint_visible() {
            draw_hint(&painter, map_rect);
        }

        self.show_popup(ctx, &projection);
    }

    /// Sends wheel input over the map through the scroll gate.
    fn handle_wheel(&mut self, ctx: &egui::Context, response: &egui::Response, now: Instant) {
        if !response.contains_pointer() {
            return;
        }

        let (events, delta, shift) = ctx.input(|i| {
            i.events.iter().fold(
                (0usize, 0.0f32, i.modifiers.shift),
                |(count, delta, shift), event| match event {
                    egui::Event::MouseWheel {
                        delta: wheel,
                        modifiers,
                        ..
                    } => {
                        // Some platforms turn Shift+wheel into horizontal scrolling.
                        let dy = if wheel.y != 0.0 { wheel.y } else { wheel.x };
                        (count + 1, delta + dy, shift || modifiers.shift)
                    }
                    _ => (count, delta, shift),
                },
            )
        });

        if events == 0 {
            return;
        }

        // egui reports scrolling up as positive; the session expects the DOM convention.
        let event = MapEvent::Wheel {
            delta_y: -f64::from(delta),
            shift,
        };
        let handled = self.session.dispatch(event, now, &mut self.view);

        if handled.suppress_scroll {
            ctx.input_mut(|i| {
                i.smooth_scroll_delta = egui::Vec2::ZERO;
                i.raw_scroll_delta = egui::Vec2::ZERO;
            });
        }
    }

    /// Renders the open popup anchored above its clicked location.
    fn show_popup(&mut self, ctx: &egui::Context, projection: &ScreenProjection) {
        let Some(popup) = &self.view.popup else {
            return;
        };

        // Keep the card reachable when its location is panned out of view.
        let anchor = projection.clamp_to_view(
            projection.to_screen(popup.location),
            egui::vec2(POPUP_WIDTH / 2.0 + POPUP_OFFSET, POPUP_OFFSET),
        );

        let id = popup.id;
        let content = popup.content.clone();
        let accent = colors::opaque(content.accent_color);
        let mut close_requested = false;

        egui::Area::new(egui::Id::new(("overlay_popup", id.0)))
            .order(egui::Order::Foreground)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(anchor - egui::vec2(0.0, POPUP_OFFSET))
            .constrain_to(projection.rect)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .stroke(egui::Stroke::new(2.0, accent))
                    .show(ui, |ui| {
                        ui.set_width(POPUP_WIDTH);

                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(&content.title).heading().color(accent));
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("×").on_hover_text("Close").clicked() {
                                        close_requested = true;
                                    }
                                },
                            );
                        });
                        ui.label(egui::RichText::new(&content.body).strong());

                        if let Some(url) = &content.image_url {
                            match self.textures.get(ctx, url) {
                                Some(texture) => {
                                    let size = texture.size_vec2();
                                    let scaled = size * (POPUP_WIDTH / size.x.max(1.0));
                                    ui.image(egui::load::SizedTexture::new(texture.id(), scaled));
                                }
                                None => {
                                    ui.spinner();
                                }
                            }
                        }

                        if let Some(link) = &content.link_url {
                            ui.hyperlink_to("Learn more", link);
                        }
                    });
            });

        if close_requested {
            self.view.request_close_popup();
        }
    }

    /// Renders the floating zoom controls panel.
    fn show_zoom_controls(&mut self, ctx: &egui::Context, panel_rect: egui::Rect) {
        let margin = 12.0;
        let panel_width = 120.0;

        let anchor_pos = egui::pos2(
            panel_rect.right() - panel_width - margin,
            panel_rect.bottom() - ZOOM_CONTROLS_HEIGHT - margin,
        );

        egui::Area::new(egui::Id::new("zoom_controls"))
            .fixed_pos(anchor_pos)
            .interactable(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui
                                .add_enabled(self.view.can_zoom_out(), egui::Button::new("−"))
                                .on_hover_text("Zoom out (-)")
                                .clicked()
                            {
                                self.view.zoom_out();
                            }
                            ui.label(format!("z{}", self.view.zoom()));
                            if ui
                                .add_enabled(self.view.can_zoom_in(), egui::Button::new("+"))
                                .on_hover_text("Zoom in (+)")
                                .clicked()
                            {
                                self.view.zoom_in();
                            }
                        });
                    });
            });
    }
}
