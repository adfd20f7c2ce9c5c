//! Drawing functions for tiles, boundary overlays, labels and the scroll hint.

use crate::colors;
use crate::constants::{HINT_TEXT, TILE_SIZE};
use crate::projection::ScreenProjection;
use crate::tiles::{RemoteTextures, apply_tile_template};
use crate::view::{Marker, OverlayLayer};
use eframe::egui;
use public_lands_map::{LatLng, OverlayId, TileLayerConfig};
use std::collections::BTreeMap;

const FULL_UV: egui::Rect = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

/// Draws the tiles of one XYZ layer that intersect the viewport.
///
/// Above the layer's max zoom the deepest available tiles are stretched.
pub fn draw_tile_layer(
    painter: &egui::Painter,
    ctx: &egui::Context,
    projection: &ScreenProjection,
    layer: &TileLayerConfig,
    textures: &mut RemoteTextures,
) {
    let tile_zoom = projection.zoom.clamp(0, layer.max_zoom.max(0));
    let tile_span = TILE_SIZE * 2f64.powi(projection.zoom - tile_zoom);
    let tiles_per_axis = 1i64 << tile_zoom;

    let min = projection.screen_to_world(projection.rect.min);
    let max = projection.screen_to_world(projection.rect.max);

    let x_range = (min[0] / tile_span).floor() as i64..=(max[0] / tile_span).floor() as i64;
    let y_start = ((min[1] / tile_span).floor() as i64).max(0);
    let y_end = ((max[1] / tile_span).floor() as i64).min(tiles_per_axis - 1);

    for ty in y_start..=y_end {
        for tx in x_range.clone() {
            let wrapped_x = tx.rem_euclid(tiles_per_axis) as u32;
            let url = apply_tile_template(&layer.url_template, tile_zoom, wrapped_x, ty as u32);
            let Some(texture) = textures.get(ctx, &url) else {
                continue;
            };

            let top_left =
                projection.world_to_screen([tx as f64 * tile_span, ty as f64 * tile_span]);
            let tile_rect =
                egui::Rect::from_min_size(top_left, egui::Vec2::splat(tile_span as f32));
            painter.image(texture.id(), tile_rect, FULL_UV, egui::Color32::WHITE);
        }
    }
}

/// Draws a boundary overlay: triangulated fill, then outlines.
pub fn draw_overlay(painter: &egui::Painter, projection: &ScreenProjection, layer: &OverlayLayer) {
    let geometry = &layer.geometry;
    let Some(bounds) = geometry.bounds else {
        return;
    };
    if !projection
        .rect
        .intersects(projection.bounds_to_screen(bounds))
    {
        return;
    }

    let style = layer.style;
    let fill = colors::with_opacity(style.fill_color, style.fill_opacity);
    let stroke = egui::Stroke::new(style.weight, colors::with_opacity(style.color, style.opacity));
    let to_screen = |ring: &[LatLng]| -> Vec<egui::Pos2> {
        ring.iter().map(|&p| projection.to_screen(p)).collect()
    };

    for polygon in &geometry.polygons {
        if !projection
            .rect
            .intersects(projection.bounds_to_screen(polygon.bounds))
        {
            continue;
        }

        if fill.a() > 0 && !polygon.fill_triangles.is_empty() {
            let mut mesh = egui::Mesh::default();
            for &vertex in &polygon.fill_vertices {
                mesh.colored_vertex(projection.to_screen(vertex), fill);
            }
            for &[a, b, c] in &polygon.fill_triangles {
                mesh.add_triangle(a, b, c);
            }
            painter.add(egui::Shape::mesh(mesh));
        }

        if stroke.width > 0.0 {
            painter.add(egui::Shape::closed_line(to_screen(&polygon.exterior), stroke));
            for hole in &polygon.holes {
                painter.add(egui::Shape::closed_line(to_screen(hole), stroke));
            }
        }
    }
}

/// Draws the visible label markers as boxed text.
pub fn draw_labels(
    painter: &egui::Painter,
    projection: &ScreenProjection,
    markers: &BTreeMap<OverlayId, Marker>,
) {
    let font_id = egui::FontId::proportional(13.0);

    for marker in markers.values().filter(|marker| marker.visible) {
        let pos = projection.to_screen(marker.label.position);
        if !projection.rect.expand(100.0).contains(pos) {
            continue;
        }

        let galley =
            painter.layout_no_wrap(marker.label.text.clone(), font_id.clone(), colors::LABEL_TEXT);
        let background = egui::Rect::from_center_size(pos, galley.size() + egui::vec2(10.0, 6.0));
        painter.rect_filled(background, 3.0, colors::LABEL_BACKGROUND);

        // Shadow
        painter.text(
            pos + egui::vec2(1.0, 1.0),
            egui::Align2::CENTER_CENTER,
            &marker.label.text,
            font_id.clone(),
            colors::LABEL_SHADOW,
        );

        // Main text
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            &marker.label.text,
            font_id.clone(),
            colors::LABEL_TEXT,
        );
    }
}

/// Draws the "hold shift" banner centered in the map.
pub fn draw_hint(painter: &egui::Painter, map_rect: egui::Rect) {
    let font_id = egui::FontId::proportional(18.0);
    let galley = painter.layout_no_wrap(HINT_TEXT.to_owned(), font_id.clone(), colors::HINT_TEXT);
    let banner =
        egui::Rect::from_center_size(map_rect.center(), galley.size() + egui::vec2(32.0, 20.0));

    painter.rect_filled(banner, 6.0, colors::HINT_BACKGROUND);
    painter.text(
        map_rect.center(),
        egui::Align2::CENTER_CENTER,
        HINT_TEXT,
        font_id,
        colors::HINT_TEXT,
    );
}
