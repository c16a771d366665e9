//! Eye motion controller: fixed-speed steering toward the target.

use crate::target::EyeLocation;

/// Default pupil travel per frame, in canvas pixels.
pub const DEFAULT_STEP: f64 = 1.0;

/// Move `position` one step of length `speed` along the straight line to
/// `target`.
///
/// The step length does not depend on frame time. A pupil sitting exactly on
/// its target still moves: `atan2(0, 0)` is zero, so it steps along +X and
/// then back, which gives the resting jitter. The radius is left alone.
pub fn step(position: &mut EyeLocation, target: &EyeLocation, speed: f64) {
    let dx = target.center.x - position.center.x;
    let dy = target.center.y - position.center.y;
    let angle = dy.atan2(dx);
    position.center.x += speed * angle.cos();
    position.center.y += speed * angle.sin();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn loc(x: f64, y: f64, radius: f64) -> EyeLocation {
        EyeLocation { center: Point::new(x, y), radius }
    }

    #[test]
    fn test_step_moves_one_unit_toward_target() {
        let mut pos = loc(0.0, 0.0, 10.0);
        step(&mut pos, &loc(30.0, 40.0, 10.0), DEFAULT_STEP);
        assert!((pos.center.x - 0.6).abs() < 1e-9);
        assert!((pos.center.y - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_distance_shrinks_by_speed_until_close() {
        let target = loc(100.0, -50.0, 10.0);
        let mut pos = loc(0.0, 0.0, 10.0);
        let mut prev = pos.center.distance(&target.center);
        while prev > 1.0 {
            step(&mut pos, &target, DEFAULT_STEP);
            let d = pos.center.distance(&target.center);
            assert!((prev - d - 1.0).abs() < 1e-9, "prev {prev}, now {d}");
            prev = d;
        }
    }

    #[test]
    fn test_at_target_oscillates_along_x() {
        let target = loc(50.0, 50.0, 10.0);
        let mut pos = target;

        step(&mut pos, &target, DEFAULT_STEP);
        assert!((pos.center.x - 51.0).abs() < 1e-9);
        assert!((pos.center.y - 50.0).abs() < 1e-9);

        step(&mut pos, &target, DEFAULT_STEP);
        assert!((pos.center.x - 50.0).abs() < 1e-9);
        assert!((pos.center.y - 50.0).abs() < 1e-9);

        step(&mut pos, &target, DEFAULT_STEP);
        assert!((pos.center.x - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_radius_not_interpolated() {
        let mut pos = loc(0.0, 0.0, 10.0);
        step(&mut pos, &loc(10.0, 0.0, 99.0), DEFAULT_STEP);
        assert_eq!(pos.radius, 10.0);
    }

    #[test]
    fn test_speed_scales_step() {
        let mut pos = loc(0.0, 0.0, 1.0);
        step(&mut pos, &loc(0.0, 100.0, 1.0), 3.0);
        assert!(pos.center.x.abs() < 1e-9);
        assert!((pos.center.y - 3.0).abs() < 1e-9);
    }
}
