//! Eye target calculator.
//!
//! Pure functions from canvas/image geometry, the fixed eye layout and the
//! optional tracked point to the pupil position the motion controller steers
//! toward. No state, no drawing.

use crate::geometry::{letterbox_scale, Point, Size};
use crate::layout::{EyeOffset, EyeRadii};
use serde::Serialize;

/// A pupil's position and size on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EyeLocation {
    pub center: Point,
    pub radius: f64,
}

/// Current canvas and decorative-image dimensions. Both must be non-empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub canvas: Size,
    pub image: Size,
}

impl Scene {
    pub fn new(canvas: Size, image: Size) -> Self {
        Self { canvas, image }
    }

    pub fn scale(&self) -> f64 {
        letterbox_scale(self.canvas, self.image)
    }
}

/// Scaled socket geometry for one eye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EyeGeometry {
    pub socket_center: Point,
    pub socket_radius: f64,
    pub pupil_radius: f64,
}

impl EyeGeometry {
    /// Pupil travel across the socket: twice the gap between the radii.
    pub fn travel(&self) -> f64 {
        2.0 * (self.socket_radius - self.pupil_radius)
    }

    pub fn rest(&self) -> EyeLocation {
        EyeLocation {
            center: self.socket_center,
            radius: self.pupil_radius,
        }
    }
}

/// Socket center and scaled radii for the eye at `offset`.
pub fn eye_geometry(scene: &Scene, radii: EyeRadii, offset: EyeOffset) -> EyeGeometry {
    let scale = scene.scale();
    let center = scene.canvas.center();
    EyeGeometry {
        socket_center: Point::new(
            center.x + offset.x_offset * scale,
            center.y + offset.y_offset * scale,
        ),
        socket_radius: radii.socket * scale,
        pupil_radius: radii.pupil * scale,
    }
}

/// Where the pupil should be.
///
/// With no tracked point the pupil rests at the socket center. Otherwise the
/// tracked point's offset from the canvas center, as a fraction of the canvas
/// size, is scaled by the socket travel. The horizontal component is flipped
/// because the camera image is mirrored. The result is not clamped to the
/// socket: a point far outside the frame pushes the pupil out of it.
pub fn compute_target(
    scene: &Scene,
    radii: EyeRadii,
    offset: EyeOffset,
    tracked: Option<Point>,
) -> EyeLocation {
    let eye = eye_geometry(scene, radii, offset);
    let Some(point) = tracked else {
        return eye.rest();
    };

    let travel = eye.travel();
    let canvas = scene.canvas;
    let dx = (point.x - canvas.width / 2.0) / canvas.width * travel;
    let dy = (point.y - canvas.height / 2.0) / canvas.height * travel;

    EyeLocation {
        center: Point::new(eye.socket_center.x - dx, eye.socket_center.y + dy),
        radius: eye.pupil_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn scene_800x600() -> Scene {
        Scene::new(Size::new(800.0, 600.0), Size::new(400.0, 300.0))
    }

    fn radii() -> EyeRadii {
        EyeRadii { pupil: 30.0, socket: 80.0 }
    }

    const LEFT: EyeOffset = EyeOffset { x_offset: -165.0, y_offset: -135.0 };
    const RIGHT: EyeOffset = EyeOffset { x_offset: 140.0, y_offset: -100.0 };

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!((p.x - x).abs() < EPS && (p.y - y).abs() < EPS, "got {p:?}, want ({x}, {y})");
    }

    #[test]
    fn test_rest_position_without_tracking() {
        let t = compute_target(&scene_800x600(), radii(), LEFT, None);
        assert_point(t.center, 70.0, 30.0);
        assert!((t.radius - 60.0).abs() < EPS);
    }

    #[test]
    fn test_right_eye_rest_position() {
        let t = compute_target(&scene_800x600(), radii(), RIGHT, None);
        assert_point(t.center, 680.0, 100.0);
    }

    #[test]
    fn test_tracked_point_at_center_is_rest() {
        let scene = scene_800x600();
        let rest = compute_target(&scene, radii(), LEFT, None);
        let t = compute_target(&scene, radii(), LEFT, Some(Point::new(400.0, 300.0)));
        assert_eq!(t, rest);
    }

    #[test]
    fn test_tracked_top_left_corner() {
        let scene = scene_800x600();
        let eye = eye_geometry(&scene, radii(), LEFT);
        assert!((eye.travel() - 200.0).abs() < EPS);

        let t = compute_target(&scene, radii(), LEFT, Some(Point::new(0.0, 0.0)));
        // X mirrored (+100), Y as-is (-100).
        assert_point(t.center, 70.0 + 100.0, 30.0 - 100.0);
        assert!((t.radius - 60.0).abs() < EPS);
    }

    #[test]
    fn test_off_frame_point_is_not_clamped() {
        let scene = scene_800x600();
        let eye = eye_geometry(&scene, radii(), LEFT);
        let t = compute_target(&scene, radii(), LEFT, Some(Point::new(-4000.0, 300.0)));
        let dist = t.center.distance(&eye.socket_center);
        assert!(dist > eye.socket_radius, "pupil stayed inside socket: {dist}");
    }

    #[test]
    fn test_radius_follows_scale() {
        let small = Scene::new(Size::new(400.0, 300.0), Size::new(400.0, 300.0));
        let t = compute_target(&small, radii(), LEFT, Some(Point::new(10.0, 10.0)));
        assert!((t.radius - 30.0).abs() < EPS);
    }

    #[test]
    fn test_tall_canvas_uses_width_scale() {
        // Image is wider than the canvas ratio → width-limited, scale 0.5.
        let scene = Scene::new(Size::new(200.0, 600.0), Size::new(400.0, 300.0));
        assert!((scene.scale() - 0.5).abs() < EPS);
        let t = compute_target(&scene, radii(), LEFT, None);
        assert_point(t.center, 100.0 - 82.5, 300.0 - 67.5);
        assert!((t.radius - 15.0).abs() < EPS);
    }
}
