//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Pinch gestures with fingers closer than this (screen px) are ignored.
const MIN_PINCH_DISTANCE: f64 = 1.0;

/// Camera manages the view transform for the puzzle table.
///
/// `screen = world * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current zoom level.
    pub scale: f64,
    /// Minimum allowed zoom level
    pub min_scale: f64,
    /// Maximum allowed zoom level
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.1,
            max_scale: 8.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with a custom zoom range.
    pub fn with_scale_range(min_scale: f64, max_scale: f64) -> Self {
        Self {
            scale: 1.0_f64.clamp(min_scale, max_scale),
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// World-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Screen-to-world transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Pan the camera by a delta in screen coordinates. Unbounded.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_scale = self.clamp_scale(self.scale * factor);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        // Convert screen point to world before zoom
        let world_point = self.screen_to_world(screen_point);

        self.scale = new_scale;

        // Adjust offset so world_point stays at screen_point
        self.anchor(world_point, screen_point);
    }

    /// Shift the offset so `world_point` renders at `screen_point`.
    pub fn anchor(&mut self, world_point: Point, screen_point: Point) {
        self.offset = screen_point.to_vec2() - world_point.to_vec2() * self.scale;
    }

    /// Reset camera to identity.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = self.clamp_scale(1.0);
    }

    /// Camera that shows `bounds` inside `viewport`.
    ///
    /// `padding` is kept on every side and `reserved_bottom` is removed from
    /// the bottom of the viewport before fitting (status strip).
    pub fn fitted(&self, bounds: Rect, viewport: Size, padding: f64, reserved_bottom: f64) -> Camera {
        let area = Size::new(
            viewport.width.max(1.0),
            (viewport.height - reserved_bottom).max(1.0),
        );
        let padded = Size::new(
            (area.width - padding * 2.0).max(1.0),
            (area.height - padding * 2.0).max(1.0),
        );

        let mut fitted = *self;
        if bounds.width() > 0.0 && bounds.height() > 0.0 {
            let scale_x = padded.width / bounds.width();
            let scale_y = padded.height / bounds.height();
            fitted.scale = self.clamp_scale(scale_x.min(scale_y));
        }

        // Center the bounds in the remaining area
        let area_center = Point::new(area.width / 2.0, area.height / 2.0);
        fitted.anchor(bounds.center(), area_center);
        fitted
    }

    /// Fit the camera in place. See [`Camera::fitted`].
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64, reserved_bottom: f64) {
        *self = self.fitted(bounds, viewport, padding, reserved_bottom);
    }

    /// Linear blend of scale and offset; `t` in `[0, 1]`.
    pub fn lerp(&self, target: &Camera, t: f64) -> Camera {
        Camera {
            offset: self.offset.lerp(target.offset, t),
            scale: self.scale + (target.scale - self.scale) * t,
            min_scale: target.min_scale,
            max_scale: target.max_scale,
        }
    }
}

/// Snapshot taken when a second finger lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pinch {
    /// Screen distance between the two pointers at gesture start.
    pub initial_distance: f64,
    /// Camera scale at gesture start.
    pub initial_scale: f64,
    /// World point that was under the midpoint at gesture start.
    pub world_anchor: Point,
}

impl Pinch {
    /// Start a pinch. Returns `None` when the pointers coincide.
    pub fn begin(camera: &Camera, a: Point, b: Point) -> Option<Self> {
        let initial_distance = a.distance(b);
        if initial_distance < MIN_PINCH_DISTANCE {
            return None;
        }
        Some(Self {
            initial_distance,
            initial_scale: camera.scale,
            world_anchor: camera.screen_to_world(a.midpoint(b)),
        })
    }

    /// Update the camera for the current pointer pair.
    ///
    /// Scale follows the distance ratio and the start world point stays
    /// under the (moving) midpoint.
    pub fn apply(&self, camera: &mut Camera, a: Point, b: Point) {
        let distance = a.distance(b);
        camera.scale = camera.clamp_scale(self.initial_scale * distance / self.initial_distance);
        camera.anchor(self.world_anchor, a.midpoint(b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_scale() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        camera.scale = 2.0;
        let world = camera.screen_to_world(Point::new(150.0, 300.0));
        assert_point_eq(world, Point::new(50.0, 100.0));
    }

    #[test]
    fn test_roundtrip_conversion() {
        for (scale, offset) in [(1.5, Vec2::new(30.0, -20.0)), (0.13, Vec2::new(-900.0, 4.5)), (7.9, Vec2::ZERO)] {
            let camera = Camera { scale, offset, ..Camera::new() };
            let original = Point::new(123.0, -456.0);
            let back = camera.screen_to_world(camera.world_to_screen(original));
            assert_point_eq(back, original);
        }
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut camera = Camera { offset: Vec2::new(12.0, 40.0), scale: 1.3, ..Camera::new() };
        let screen = Point::new(320.0, 200.0);
        let world_before = camera.screen_to_world(screen);
        camera.zoom_at(screen, 1.7);
        assert!((camera.scale - 1.3 * 1.7).abs() < 1e-12);
        assert_point_eq(camera.screen_to_world(screen), world_before);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.scale - camera.min_scale).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1.0e6);
        assert!((camera.scale - camera.max_scale).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_is_unbounded() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(-1.0e6, 20.0));
        assert_eq!(camera.offset, Vec2::new(-1.0e6, 20.0));
    }

    #[test]
    fn test_fit_centers_in_area_above_band() {
        let camera = Camera::new();
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let fitted = camera.fitted(bounds, Size::new(800.0, 540.0), 20.0, 40.0);
        // Area is 800x500, padded 760x460: width limits the scale.
        assert!((fitted.scale - 3.8).abs() < 1e-12);
        assert_point_eq(fitted.world_to_screen(bounds.center()), Point::new(400.0, 250.0));
    }

    #[test]
    fn test_fit_respects_scale_range() {
        let camera = Camera::with_scale_range(0.5, 2.0);
        let tiny = Rect::new(0.0, 0.0, 1.0, 1.0);
        let fitted = camera.fitted(tiny, Size::new(800.0, 600.0), 0.0, 0.0);
        assert!((fitted.scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pinch_scales_and_tracks_midpoint() {
        let mut camera = Camera { offset: Vec2::new(10.0, 10.0), ..Camera::new() };
        let a = Point::new(100.0, 100.0);
        let b = Point::new(200.0, 100.0);
        let pinch = Pinch::begin(&camera, a, b).unwrap();
        let anchor = pinch.world_anchor;

        let a2 = Point::new(50.0, 150.0);
        let b2 = Point::new(250.0, 150.0);
        pinch.apply(&mut camera, a2, b2);
        assert!((camera.scale - 2.0).abs() < 1e-12);
        assert_point_eq(camera.world_to_screen(anchor), a2.midpoint(b2));
    }

    #[test]
    fn test_pinch_requires_distinct_pointers() {
        let camera = Camera::new();
        assert!(Pinch::begin(&camera, Point::new(5.0, 5.0), Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Camera::new();
        let b = Camera { offset: Vec2::new(100.0, -50.0), scale: 3.0, ..Camera::new() };
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.scale - 2.0).abs() < 1e-12);
    }
}
