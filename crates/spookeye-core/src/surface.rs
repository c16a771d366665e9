//! Drawing surfaces and the canvas surface manager.
//!
//! [`Surface`] is the small set of drawing calls the engine needs.
//! [`RasterSurface`] implements it over an in-memory RGBA buffer, which is
//! the renderer's only observable output. [`CanvasSurface`] keeps the surface
//! sized to the content box of the element it overlays.

use crate::geometry::{Point, Size};
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: image::ImageError,
    },
}

/// Drawing calls used by the engine.
pub trait Surface {
    /// Current pixel size.
    fn size(&self) -> (u32, u32);
    /// Resize the surface. Contents are discarded.
    fn set_size(&mut self, width: u32, height: u32);
    /// Make every pixel fully transparent.
    fn clear(&mut self);
    /// Overwrite every pixel with `color`.
    fn fill(&mut self, color: Rgba<u8>);
    /// Alpha-composite `image` with its top-left corner at (`x`, `y`).
    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64);
    /// Alpha-composite a filled disc.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba<u8>);
}

/// In-memory RGBA canvas.
#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Pixel at (`x`, `y`), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Encode the current contents as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SurfaceError> {
        let path = path.as_ref();
        self.pixels
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| SurfaceError::Write {
                path: path.display().to_string(),
                source,
            })
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        self.fill(Rgba([0, 0, 0, 0]));
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for p in self.pixels.pixels_mut() {
            *p = color;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        image::imageops::overlay(&mut self.pixels, image, x, y);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba<u8>) {
        let r = radius.round() as i32;
        if r < 0 || color[3] == 0 {
            return;
        }
        // Rasterize coverage first: the disc's scanlines overlap, and a
        // translucent color must be composited once per pixel.
        let side = (2 * r + 1) as u32;
        let mut mask = GrayImage::new(side, side);
        draw_filled_circle_mut(&mut mask, (r, r), r, Luma([255]));

        let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);
        let (width, height) = self.pixels.dimensions();
        for (mx, my, m) in mask.enumerate_pixels() {
            if m[0] == 0 {
                continue;
            }
            let x = cx - r as i64 + mx as i64;
            let y = cy - r as i64 + my as i64;
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                continue;
            }
            source_over(self.pixels.get_pixel_mut(x as u32, y as u32), color);
        }
    }
}

/// Porter-Duff "source over" with rounding, so an opaque destination stays
/// opaque.
fn source_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Anything with a measurable content box, such as the video element the
/// canvas overlays.
pub trait ContentBox {
    fn client_width(&self) -> u32;
    fn client_height(&self) -> u32;
}

/// A fixed content box size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContentSize {
    pub width: u32,
    pub height: u32,
}

impl ContentSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ContentBox for ContentSize {
    fn client_width(&self) -> u32 {
        self.width
    }

    fn client_height(&self) -> u32 {
        self.height
    }
}

/// What triggered a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeSource {
    /// Construction.
    Initial,
    /// The overlaid element resized itself (e.g. video playback started).
    Sibling,
    /// The host window resized.
    Window,
}

impl ResizeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Sibling => "sibling",
            Self::Window => "window",
        }
    }
}

/// Owns the drawing surface and keeps it matched to a sibling's content box.
#[derive(Debug, Clone)]
pub struct CanvasSurface<S = RasterSurface> {
    surface: S,
}

impl<S: Surface> CanvasSurface<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// Re-read the sibling's client size and apply it to the surface.
    pub fn resize(&mut self, source: ResizeSource, sibling: &impl ContentBox) -> Size {
        let (width, height) = (sibling.client_width(), sibling.client_height());
        self.surface.set_size(width, height);
        tracing::info!(source = source.as_str(), width, height, "canvas resized");
        Size::from_pixels(width, height)
    }

    pub fn size(&self) -> Size {
        let (w, h) = self.surface.size();
        Size::from_pixels(w, h)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
