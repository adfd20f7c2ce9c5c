//! Web Mercator projection between coordinates and screen positions.

use crate::constants::TILE_SIZE;
use eframe::egui;
use public_lands_map::LatLng;
use std::f64::consts::PI;

/// Latitude beyond which Web Mercator is undefined for square tiles.
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Size of the world in pixels at the given zoom.
pub fn world_size(zoom: i32) -> f64 {
    TILE_SIZE * 2f64.powi(zoom)
}

/// Projects a coordinate to world pixels at `zoom` (origin top-left).
pub fn project(point: LatLng, zoom: i32) -> [f64; 2] {
    let size = world_size(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - lat.tan().asinh() / PI) / 2.0 * size;
    [x, y]
}

/// Inverse of [`project`].
pub fn unproject(world: [f64; 2], zoom: i32) -> LatLng {
    let size = world_size(zoom);
    let lng = world[0] / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * world[1] / size)).sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Maps between coordinates and a screen rectangle for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ScreenProjection {
    pub rect: egui::Rect,
    pub zoom: i32,
    center_world: [f64; 2],
}

impl ScreenProjection {
    pub fn new(rect: egui::Rect, center: LatLng, zoom: i32) -> Self {
        Self {
            rect,
            zoom,
            center_world: project(center, zoom),
        }
    }

    pub fn to_screen(&self, point: LatLng) -> egui::Pos2 {
        let [x, y] = project(point, self.zoom);
        self.world_to_screen([x, y])
    }

    pub fn world_to_screen(&self, world: [f64; 2]) -> egui::Pos2 {
        let center = self.rect.center();
        egui::pos2(
            center.x + (world[0] - self.center_world[0]) as f32,
            center.y + (world[1] - self.center_world[1]) as f32,
        )
    }

    pub fn to_lat_lng(&self, pos: egui::Pos2) -> LatLng {
        unproject(self.screen_to_world(pos), self.zoom)
    }

    pub fn screen_to_world(&self, pos: egui::Pos2) -> [f64; 2] {
        let center = self.rect.center();
        [
            self.center_world[0] + f64::from(pos.x - center.x),
            self.center_world[1] + f64::from(pos.y - center.y),
        ]
    }

    /// Screen rectangle covered by a lat/lng box.
    pub fn bounds_to_screen(&self, bounds: public_lands_map::BoundingBox) -> egui::Rect {
        egui::Rect::from_two_pos(
            self.to_screen(LatLng::new(bounds.north, bounds.west)),
            self.to_screen(LatLng::new(bounds.south, bounds.east)),
        )
    }

    /// Moves `pos` inside the view, keeping `margin` from each edge where the view is large enough.
    pub fn clamp_to_view(&self, pos: egui::Pos2, margin: egui::Vec2) -> egui::Pos2 {
        let inner = self.rect.shrink2(margin);
        let clamp = |value: f32, min: f32, max: f32| {
            if min > max {
                (min + max) / 2.0
            } else {
                value.clamp(min, max)
            }
        };
        egui::pos2(
            clamp(pos.x, inner.left(), inner.right()),
            clamp(pos.y, inner.top(), inner.bottom()),
        )
    }
}

/// Moves `center` so the map follows a drag of `delta` screen pixels.
pub fn pan(center: LatLng, zoom: i32, delta: egui::Vec2) -> LatLng {
    let [x, y] = project(center, zoom);
    let size = world_size(zoom);
    let y = (y - f64::from(delta.y)).clamp(0.0, size);
    let x = (x - f64::from(delta.x)).rem_euclid(size);
    unproject([x, y], zoom)
}
