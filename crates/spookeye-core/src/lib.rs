//! spookeye-core — Eye-tracking animation engine.
//!
//! Turns a tracked nose point (or its absence) into smoothly moving pupils
//! drawn over a decorative image, with a time-windowed alert color.

pub mod asset;
pub mod engine;
pub mod face;
pub mod geometry;
pub mod layout;
pub mod motion;
pub mod surface;
pub mod target;
pub mod tracking;

pub use asset::{AssetError, DecorativeImage};
pub use engine::{Engine, EngineOptions, EyePair};
pub use face::{ExpressionScores, FaceLandmarks, FaceReport, ReportError};
pub use geometry::{Point, Rect, Size};
pub use layout::{EyeLayout, EyeOffset, LayoutError, Side};
pub use surface::{
    CanvasSurface, ContentBox, ContentSize, RasterSurface, ResizeSource, Surface, SurfaceError,
};
pub use target::{compute_target, EyeLocation, Scene};
pub use tracking::TrackingState;
