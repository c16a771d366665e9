//! Decorative image asset.

use crate::geometry::Size;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// The picture the eyes are drawn on, plus a cached copy scaled to the
/// last requested canvas size.
pub struct DecorativeImage {
    pixels: RgbaImage,
    scaled: Option<RgbaImage>,
}

impl DecorativeImage {
    pub fn new(pixels: RgbaImage) -> Result<Self, AssetError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Empty { width, height });
        }
        Ok(Self {
            pixels,
            scaled: None,
        })
    }

    /// Decode an image file (any format the `image` features enable).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let pixels = image::open(path)?.to_rgba8();
        tracing::debug!(
            path = %path.display(),
            width = pixels.width(),
            height = pixels.height(),
            "decoded decorative image"
        );
        Self::new(pixels)
    }

    /// Natural pixel size.
    pub fn size(&self) -> Size {
        let (w, h) = self.pixels.dimensions();
        Size::from_pixels(w, h)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The image resized to `width`x`height`. Resampling only happens when the
    /// requested size differs from the cached one.
    pub fn scaled_to(&mut self, width: u32, height: u32) -> &RgbaImage {
        let (width, height) = (width.max(1), height.max(1));
        if self
            .scaled
            .as_ref()
            .is_some_and(|s| s.dimensions() != (width, height))
        {
            self.scaled = None;
        }
        let pixels = &self.pixels;
        self.scaled
            .get_or_insert_with(|| imageops::resize(pixels, width, height, FilterType::Triangle))
    }
}
