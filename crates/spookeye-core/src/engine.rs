//! The eye-tracking animation engine.
//!
//! One [`Engine`] owns the canvas, the decorative image, the tracking state
//! and both eyes. Everything happens through four entry points: face reports,
//! image readiness, resizes, and [`Engine::frame`] once per display refresh.

use crate::asset::DecorativeImage;
use crate::face::{ExpressionScores, FaceLandmarks, FaceReport};
use crate::geometry::{letterbox_rect, Point, Rect};
use crate::layout::{EyeLayout, Side};
use crate::motion::{self, DEFAULT_STEP};
use crate::surface::{CanvasSurface, ContentBox, RasterSurface, ResizeSource, Surface};
use crate::target::{compute_target, eye_geometry, EyeLocation, Scene};
use crate::tracking::{TrackingState, DEFAULT_ALERT_WINDOW};
use image::Rgba;
use std::time::{Duration, Instant};

/// Pupil color when nothing has been seen recently.
pub const CALM_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Pupil color inside the alert window.
pub const ALERT_COLOR: Rgba<u8> = Rgba([139, 0, 0, 255]);
/// Debug overlay: eye socket disc.
pub const DEBUG_SOCKET_COLOR: Rgba<u8> = Rgba([255, 0, 0, 204]);
/// Debug overlay: canvas background.
pub const DEBUG_BACKGROUND: Rgba<u8> = Rgba([0, 255, 0, 51]);

/// Tunables that are not part of the eye layout.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub alert_window: Duration,
    pub calm_color: Rgba<u8>,
    pub alert_color: Rgba<u8>,
    /// Pupil travel per frame, in canvas pixels.
    pub step_speed: f64,
    /// Tint the background and draw the eye sockets.
    pub debug: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            alert_window: DEFAULT_ALERT_WINDOW,
            calm_color: CALM_COLOR,
            alert_color: ALERT_COLOR,
            step_speed: DEFAULT_STEP,
            debug: false,
        }
    }
}

/// One value per eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePair {
    pub left: EyeLocation,
    pub right: EyeLocation,
}

impl EyePair {
    fn from_fn(mut f: impl FnMut(Side) -> EyeLocation) -> Self {
        Self {
            left: f(Side::Left),
            right: f(Side::Right),
        }
    }

    pub fn get(&self, side: Side) -> &EyeLocation {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut EyeLocation {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

pub struct Engine<S: Surface = RasterSurface> {
    layout: EyeLayout,
    options: EngineOptions,
    canvas: CanvasSurface<S>,
    image: Option<DecorativeImage>,
    tracking: TrackingState,
    /// Rendered pupils. `None` until the image is ready.
    eyes: Option<EyePair>,
    /// Where the pupils are heading on the next frame.
    targets: Option<EyePair>,
    frames: u64,
}

impl<S: Surface> Engine<S> {
    /// Build an engine drawing on `surface`, sized to `sibling`.
    pub fn new(
        layout: EyeLayout,
        options: EngineOptions,
        surface: S,
        sibling: &impl ContentBox,
    ) -> Self {
        let mut canvas = CanvasSurface::new(surface);
        canvas.resize(ResizeSource::Initial, sibling);
        Self {
            layout,
            options,
            canvas,
            image: None,
            tracking: TrackingState::new(),
            eyes: None,
            targets: None,
            frames: 0,
        }
    }

    /// Consume one detected face. Only the nose landmarks are used; the
    /// bounding box and expression scores are accepted for future behavior.
    ///
    /// Returns the new tracked point.
    pub fn report_face(
        &mut self,
        _bounds: &Rect,
        landmarks: &FaceLandmarks,
        _expressions: &ExpressionScores,
        now: Instant,
    ) -> Point {
        let nose = landmarks.nose_center();
        self.tracking.report_observation(nose, now);
        tracing::debug!(x = nose.x, y = nose.y, "tracked point updated");
        nose
    }

    /// [`report_face`](Self::report_face) for a wire report.
    pub fn report(&mut self, report: &FaceReport, now: Instant) -> Point {
        self.report_face(&report.bounds, &report.landmarks, &report.expressions, now)
    }

    /// The decorative image finished loading: snap both eyes to rest and
    /// repaint.
    pub fn set_image(&mut self, image: DecorativeImage, now: Instant) {
        let size = image.size();
        tracing::info!(width = size.width, height = size.height, "decorative image ready");
        self.image = Some(image);
        self.reinitialize();
        self.draw(now);
    }

    /// Match the canvas to `sibling`, snap both eyes to rest, repaint.
    pub fn resize(&mut self, source: ResizeSource, sibling: &impl ContentBox, now: Instant) {
        self.canvas.resize(source, sibling);
        self.reinitialize();
        self.draw(now);
    }

    /// One display refresh: move the pupils, redraw, then aim for the next
    /// frame using the latest tracked point.
    ///
    /// `elapsed` is the time since the previous frame. Motion does not use it;
    /// pupils move a fixed distance per frame.
    pub fn frame(&mut self, now: Instant, elapsed: Duration) {
        tracing::trace!(
            frame = self.frames,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "frame"
        );

        if let (Some(eyes), Some(targets)) = (self.eyes.as_mut(), self.targets.as_ref()) {
            for side in Side::BOTH {
                motion::step(eyes.get_mut(side), targets.get(side), self.options.step_speed);
            }
        }

        self.draw(now);
        self.retarget();
        self.frames += 1;
    }

    pub fn is_alert(&self, now: Instant) -> bool {
        self.tracking.is_alert(now, self.options.alert_window)
    }

    pub fn pupil_color(&self, now: Instant) -> Rgba<u8> {
        if self.is_alert(now) {
            self.options.alert_color
        } else {
            self.options.calm_color
        }
    }

    /// Canvas and image geometry, once the image is ready and the canvas has
    /// a size.
    pub fn scene(&self) -> Option<Scene> {
        let image = self.image.as_ref()?;
        let canvas = self.canvas.size();
        if canvas.is_empty() {
            return None;
        }
        Some(Scene::new(canvas, image.size()))
    }

    pub fn eyes(&self) -> Option<&EyePair> {
        self.eyes.as_ref()
    }

    pub fn targets(&self) -> Option<&EyePair> {
        self.targets.as_ref()
    }

    pub fn tracked_point(&self) -> Option<Point> {
        self.tracking.tracked_point()
    }

    pub fn image_ready(&self) -> bool {
        self.image.is_some()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn layout(&self) -> &EyeLayout {
        &self.layout
    }

    pub fn canvas(&self) -> &CanvasSurface<S> {
        &self.canvas
    }

    fn targets_for(&self, scene: &Scene, tracked: Option<Point>) -> EyePair {
        let radii = self.layout.radii();
        EyePair::from_fn(|side| compute_target(scene, radii, self.layout.offset(side), tracked))
    }

    /// Snap both eyes (and their targets) to the rest position. In-flight
    /// motion is discarded.
    fn reinitialize(&mut self) {
        let Some(scene) = self.scene() else {
            tracing::debug!(image_ready = self.image_ready(), "eyes not placed yet");
            return;
        };
        let rest = self.targets_for(&scene, None);
        self.eyes = Some(rest);
        self.targets = Some(rest);
    }

    fn retarget(&mut self) {
        if self.eyes.is_none() {
            return;
        }
        if let Some(scene) = self.scene() {
            self.targets = Some(self.targets_for(&scene, self.tracking.tracked_point()));
        }
    }

    /// Clear and repaint. Without the image only the clear happens.
    fn draw(&mut self, now: Instant) {
        let color = self.pupil_color(now);
        let scene = self.scene();
        let debug = self.options.debug;

        let surface = self.canvas.surface_mut();
        surface.clear();
        if debug {
            surface.fill(DEBUG_BACKGROUND);
        }

        let (Some(scene), Some(image)) = (scene, self.image.as_mut()) else {
            return;
        };

        let dest = letterbox_rect(scene.canvas, scene.image);
        let scaled = image.scaled_to(dest.width.round() as u32, dest.height.round() as u32);
        surface.draw_image(scaled, dest.x.round() as i64, dest.y.round() as i64);

        let Some(eyes) = self.eyes.as_ref() else {
            return;
        };
        let radii = self.layout.radii();
        for side in Side::BOTH {
            if debug {
                let socket = eye_geometry(&scene, radii, self.layout.offset(side));
                surface.fill_circle(socket.socket_center, socket.socket_radius, DEBUG_SOCKET_COLOR);
            }
            let eye = eyes.get(side);
            surface.fill_circle(eye.center, eye.radius, color);
        }
    }
}

impl Engine<RasterSurface> {
    /// Engine on an in-memory raster canvas.
    pub fn raster(layout: EyeLayout, options: EngineOptions, sibling: &impl ContentBox) -> Self {
        Self::new(layout, options, RasterSurface::default(), sibling)
    }
}
