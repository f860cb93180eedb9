//! Camera module for pan/zoom transforms over the infinite wall.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level. Never zero: the transform must stay invertible.
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 5.0;

/// Scroll-wheel sensitivity for exponential zoom.
pub const SCROLL_SENSITIVITY: f64 = 0.005;

/// Camera manages the view transform for the wall.
///
/// It handles panning (translation) and zooming (scaling), converting between
/// device (screen) coordinates and world coordinates. World coordinates are
/// what goes over the wire; every client's camera is purely local state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in device space.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform for rendering (world to device).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (device to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a device-space point to world coordinates:
    /// `(device - offset) / zoom`.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to device coordinates:
    /// `world * zoom + offset`.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in device coordinates.
    ///
    /// Panning never changes zoom and is independent of cursor position.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera by a multiplicative factor, keeping the given device
    /// point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        // Clamp first: the anchor math below must use the clamped value or
        // the anchor point drifts once a zoom limit is hit.
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so world_point stays at screen_point.
        self.offset = Vec2::new(
            screen_point.x - world_point.x * new_zoom,
            screen_point.y - world_point.y * new_zoom,
        );
    }

    /// Zoom from a scroll-wheel delta, anchored at the cursor.
    ///
    /// Positive deltas (scrolling down) zoom out, matching wheel semantics:
    /// the factor is `exp(-delta * SCROLL_SENSITIVITY)`.
    pub fn zoom_scroll(&mut self, cursor: Point, scroll_delta: f64) {
        self.zoom_at(cursor, (-scroll_delta * SCROLL_SENSITIVITY).exp());
    }

    /// Stroke width to hand the renderer so strokes keep a constant device
    /// thickness regardless of zoom.
    pub fn stroke_width(&self, base: f64) -> f64 {
        base / self.zoom
    }

    /// Reset camera to the origin at 100% zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_is_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let world = camera.screen_to_world(screen);
        assert!((world.x - screen.x).abs() < f64::EPSILON);
        assert!((world.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_at_zoom_extremes() {
        for zoom in [MIN_ZOOM, 0.37, 1.0, MAX_ZOOM] {
            let mut camera = Camera::new();
            camera.offset = Vec2::new(-310.0, 42.0);
            camera.zoom = zoom;

            let original = Point::new(-9876.5, 4321.0);
            let back = camera.world_to_screen(camera.screen_to_world(original));
            assert!((back.x - original.x).abs() < 1e-8);
            assert!((back.y - original.y).abs() < 1e-8);
        }
    }

    #[test]
    fn test_zoom_keeps_cursor_anchored() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(40.0, -7.0);
        camera.zoom = 1.2;

        let cursor = Point::new(333.0, 141.0);
        let world_before = camera.screen_to_world(cursor);
        camera.zoom_scroll(cursor, 120.0);
        let world_after = camera.screen_to_world(cursor);

        assert!((world_before.x - world_after.x).abs() < 1e-9);
        assert!((world_before.y - world_after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_anchored_even_at_clamp() {
        let mut camera = Camera::new();
        camera.zoom = 4.9;

        let cursor = Point::new(100.0, 100.0);
        let world_before = camera.screen_to_world(cursor);
        // Large zoom-in, hits MAX_ZOOM.
        camera.zoom_scroll(cursor, -10_000.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);

        let world_after = camera.screen_to_world(cursor);
        assert!((world_before.x - world_after.x).abs() < 1e-9);
        assert!((world_before.y - world_after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);

        camera.zoom = 1.0;
        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scroll_direction() {
        let mut camera = Camera::new();
        camera.zoom_scroll(Point::ZERO, 120.0);
        assert!(camera.zoom < 1.0, "scrolling down zooms out");

        camera.reset();
        camera.zoom_scroll(Point::ZERO, -120.0);
        assert!(camera.zoom > 1.0, "scrolling up zooms in");
    }

    #[test]
    fn test_pan_leaves_zoom_alone() {
        let mut camera = Camera::new();
        camera.zoom = 2.5;
        camera.pan(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
        assert!((camera.zoom - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stroke_width_compensates_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        assert!((camera.stroke_width(5.0) - 2.5).abs() < f64::EPSILON);
    }
}
