//! Tracking recency: the last tracked point and when it was seen.

use crate::geometry::Point;
use std::time::{Duration, Instant};

/// Default alert window after an observation.
pub const DEFAULT_ALERT_WINDOW: Duration = Duration::from_millis(1000);

/// Most recent observation. Each report overwrites the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackingState {
    last: Option<Observation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    point: Point,
    at: Instant,
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `point` as observed at `now`.
    pub fn report_observation(&mut self, point: Point, now: Instant) {
        self.last = Some(Observation { point, at: now });
    }

    /// The last tracked point, if any was ever observed.
    pub fn tracked_point(&self) -> Option<Point> {
        self.last.map(|o| o.point)
    }

    pub fn last_observed(&self) -> Option<Instant> {
        self.last.map(|o| o.at)
    }

    /// True while less than `window` has elapsed since the last observation.
    /// False before the first observation.
    pub fn is_alert(&self, now: Instant, window: Duration) -> bool {
        match self.last {
            Some(o) => now.saturating_duration_since(o.at) < window,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_alert_before_any_observation() {
        let state = TrackingState::new();
        assert!(!state.is_alert(Instant::now(), DEFAULT_ALERT_WINDOW));
        assert_eq!(state.tracked_point(), None);
    }

    #[test]
    fn test_alert_inside_window() {
        let t0 = Instant::now();
        let mut state = TrackingState::new();
        state.report_observation(Point::new(1.0, 2.0), t0);
        assert!(state.is_alert(t0, DEFAULT_ALERT_WINDOW));
        assert!(state.is_alert(t0 + Duration::from_millis(999), DEFAULT_ALERT_WINDOW));
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let t0 = Instant::now();
        let mut state = TrackingState::new();
        state.report_observation(Point::new(1.0, 2.0), t0);
        assert!(!state.is_alert(t0 + DEFAULT_ALERT_WINDOW, DEFAULT_ALERT_WINDOW));
        assert!(!state.is_alert(
            t0 + DEFAULT_ALERT_WINDOW + Duration::from_millis(1),
            DEFAULT_ALERT_WINDOW
        ));
    }

    #[test]
    fn test_new_observation_overwrites() {
        let t0 = Instant::now();
        let mut state = TrackingState::new();
        state.report_observation(Point::new(1.0, 2.0), t0);
        let t1 = t0 + Duration::from_secs(5);
        state.report_observation(Point::new(7.0, 8.0), t1);
        assert_eq!(state.tracked_point(), Some(Point::new(7.0, 8.0)));
        assert_eq!(state.last_observed(), Some(t1));
        assert!(state.is_alert(t1, DEFAULT_ALERT_WINDOW));
    }

    #[test]
    fn test_point_persists_after_window() {
        let t0 = Instant::now();
        let mut state = TrackingState::new();
        state.report_observation(Point::new(3.0, 4.0), t0);
        let later = t0 + Duration::from_secs(60);
        assert!(!state.is_alert(later, DEFAULT_ALERT_WINDOW));
        assert_eq!(state.tracked_point(), Some(Point::new(3.0, 4.0)));
    }
}
