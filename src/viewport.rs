//! Scroll-to-zoom gating.
//!
//! Plain wheel events never zoom the map. They show a transient hint telling
//! the user to hold Shift; Shift+wheel zooms one step per event.

use crate::surface::MapSurface;
use std::time::{Duration, Instant};

/// What the caller must do with the native wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelOutcome {
    /// The native scroll must not reach the page / surrounding scroll area.
    pub suppress_scroll: bool,
}

/// Owns the current zoom level and the scroll-gate hint.
#[derive(Debug)]
pub struct ViewportController {
    zoom: i32,
    hint_visible: bool,
    /// Deadline of the single pending dismiss timer
    dismiss_at: Option<Instant>,
    hint_delay: Duration,
}

impl ViewportController {
    pub fn new(zoom: i32, hint_delay: Duration) -> Self {
        Self {
            zoom,
            hint_visible: false,
            dismiss_at: None,
            hint_delay,
        }
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// When the pending dismiss timer fires, if one is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dismiss_at
    }

    /// Handles a wheel event. `delta_y < 0` scrolls up (zoom in).
    pub fn handle_wheel(
        &mut self,
        delta_y: f64,
        shift_pressed: bool,
        now: Instant,
        surface: &mut dyn MapSurface,
    ) -> WheelOutcome {
        if shift_pressed {
            self.hide_hint();
            if delta_y < 0.0 {
                surface.zoom_in();
            } else if delta_y > 0.0 {
                surface.zoom_out();
            }
        } else {
            self.hint_visible = true;
            // Replaces any earlier timer.
            self.dismiss_at = Some(now + self.hint_delay);
        }

        WheelOutcome {
            suppress_scroll: true,
        }
    }

    /// Any click on the map dismisses the hint immediately.
    pub fn handle_click(&mut self) {
        if self.hint_visible {
            self.hide_hint();
        }
    }

    /// Records the zoom level reported by the surface once a zoom completes.
    pub fn set_zoom(&mut self, zoom: i32) {
        self.zoom = zoom;
    }

    /// Fires the dismiss timer if its deadline has passed. Returns true if the hint was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.dismiss_at {
            Some(deadline) if now >= deadline => {
                self.hide_hint();
                true
            }
            _ => false,
        }
    }

    fn hide_hint(&mut self) {
        self.hint_visible = false;
        self.dismiss_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{Call, RecordingSurface};

    const DELAY: Duration = Duration::from_millis(2000);

    #[test]
    fn plain_wheel_shows_hint_without_zooming() {
        let mut surface = RecordingSurface::new(8);
        let mut viewport = ViewportController::new(8, DELAY);
        let t0 = Instant::now();

        let outcome = viewport.handle_wheel(-100.0, false, t0, &mut surface);

        assert!(outcome.suppress_scroll);
        assert!(viewport.hint_visible());
        assert_eq!(surface.zoom, 8);
        assert!(surface.calls.is_empty());

        assert!(!viewport.tick(t0 + Duration::from_millis(1999)));
        assert!(viewport.hint_visible());
        assert!(viewport.tick(t0 + DELAY));
        assert!(!viewport.hint_visible());
        assert_eq!(viewport.next_deadline(), None);
    }

    #[test]
    fn newer_hint_replaces_pending_timer() {
        let mut surface = RecordingSurface::new(8);
        let mut viewport = ViewportController::new(8, DELAY);
        let t0 = Instant::now();

        viewport.handle_wheel(50.0, false, t0, &mut surface);
        let t1 = t0 + Duration::from_millis(1500);
        viewport.handle_wheel(50.0, false, t1, &mut surface);

        // The first timer would have fired here.
        assert!(!viewport.tick(t0 + DELAY));
        assert!(viewport.hint_visible());
        assert_eq!(viewport.next_deadline(), Some(t1 + DELAY));
        assert!(viewport.tick(t1 + DELAY));
    }

    #[test]
    fn shift_wheel_zooms_and_clears_hint() {
        let mut surface = RecordingSurface::new(8);
        let mut viewport = ViewportController::new(8, DELAY);
        let t0 = Instant::now();

        viewport.handle_wheel(10.0, false, t0, &mut surface);
        assert!(viewport.hint_visible());

        let outcome = viewport.handle_wheel(-100.0, true, t0, &mut surface);
        assert!(outcome.suppress_scroll);
        assert!(!viewport.hint_visible());
        assert_eq!(viewport.next_deadline(), None);
        assert_eq!(surface.zoom, 9);

        viewport.handle_wheel(100.0, true, t0, &mut surface);
        assert_eq!(surface.calls, vec![Call::ZoomIn, Call::ZoomOut]);
        assert_eq!(surface.zoom, 8);
    }

    #[test]
    fn shift_wheel_with_zero_delta_is_a_no_op() {
        let mut surface = RecordingSurface::new(8);
        let mut viewport = ViewportController::new(8, DELAY);

        let outcome = viewport.handle_wheel(0.0, true, Instant::now(), &mut surface);

        assert!(outcome.suppress_scroll);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn click_dismisses_hint() {
        let mut surface = RecordingSurface::new(8);
        let mut viewport = ViewportController::new(8, DELAY);
        let t0 = Instant::now();

        viewport.handle_click();
        assert!(!viewport.hint_visible());

        viewport.handle_wheel(10.0, false, t0, &mut surface);
        viewport.handle_click();
        assert!(!viewport.hint_visible());
        assert!(!viewport.tick(t0 + DELAY));
    }
}
