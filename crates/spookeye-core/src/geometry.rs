//! Plane geometry in canvas pixel space: points, sizes, rectangles and
//! the letterbox fit used to place the decorative image.

use serde::{Deserialize, Serialize};

/// A 2-D coordinate in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Width and height of a canvas or image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// True when either side is zero (or negative).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Height over width.
    pub fn aspect(&self) -> f64 {
        self.height / self.width
    }
}

/// Axis-aligned rectangle; also the face bounding box on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Arithmetic mean of `points`, or `None` for an empty set.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Uniform scale that fits `image` inside `canvas` preserving aspect ratio.
///
/// An image that is taller relative to the canvas is limited by height,
/// otherwise (including equal ratios) by width.
pub fn letterbox_scale(canvas: Size, image: Size) -> f64 {
    if image.aspect() > canvas.aspect() {
        canvas.height / image.height
    } else {
        canvas.width / image.width
    }
}

/// Destination rectangle of `image` letterboxed and centered in `canvas`.
pub fn letterbox_rect(canvas: Size, image: Size) -> Rect {
    let scale = letterbox_scale(canvas, image);
    let width = image.width * scale;
    let height = image.height * scale;
    Rect::new(
        (canvas.width - width) / 2.0,
        (canvas.height - height) / 2.0,
        width,
        height,
    )
}
