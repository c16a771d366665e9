//! Eye layout: where the eye sockets sit on the decorative image and how
//! big the pupils and sockets are.
//!
//! The default layout is embedded at compile time from
//! `contrib/layouts/spooky.toml`; a replacement can be loaded from disk.

use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Compile-time embedded layout for the spooky house artwork.
const SPOOKY_LAYOUT: &str = include_str!("../../../contrib/layouts/spooky.toml");

static DEFAULT_LAYOUT: OnceLock<EyeLayout> = OnceLock::new();

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("bad layout TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("radii must be positive (pupil {pupil}, socket {socket})")]
    NonPositiveRadius { pupil: f64, socket: f64 },
    #[error("pupil radius {pupil} must be smaller than socket radius {socket}")]
    PupilTooLarge { pupil: f64, socket: f64 },
}

/// Fixed offset of one eye socket from the image center, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EyeOffset {
    pub x_offset: f64,
    pub y_offset: f64,
}

/// Unscaled pupil and socket radii, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeRadii {
    pub pupil: f64,
    pub socket: f64,
}

/// Which of the two eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Complete eye layout, constant for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EyeLayout {
    pub pupil_radius: f64,
    pub socket_radius: f64,
    pub left: EyeOffset,
    pub right: EyeOffset,
}

impl EyeLayout {
    /// Parse and validate a layout from TOML source.
    pub fn from_toml(src: &str) -> Result<Self, LayoutError> {
        let layout: EyeLayout = toml::from_str(src)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read, parse and validate a layout file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let layout = Self::from_toml(&src)?;
        tracing::info!(path = %path.display(), "loaded eye layout");
        Ok(layout)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let (pupil, socket) = (self.pupil_radius, self.socket_radius);
        if !(pupil > 0.0 && socket > 0.0) {
            return Err(LayoutError::NonPositiveRadius { pupil, socket });
        }
        if pupil >= socket {
            return Err(LayoutError::PupilTooLarge { pupil, socket });
        }
        Ok(())
    }

    pub fn radii(&self) -> EyeRadii {
        EyeRadii {
            pupil: self.pupil_radius,
            socket: self.socket_radius,
        }
    }

    pub fn offset(&self, side: Side) -> EyeOffset {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

impl Default for EyeLayout {
    fn default() -> Self {
        default_layout().clone()
    }
}

/// The embedded layout. Parsed once.
pub fn default_layout() -> &'static EyeLayout {
    DEFAULT_LAYOUT.get_or_init(|| {
        // Same numbers as the embedded file.
        EyeLayout::from_toml(SPOOKY_LAYOUT).unwrap_or_else(|e| {
            tracing::error!(error = %e, "bad embedded layout; using built-in values");
            EyeLayout {
                pupil_radius: 30.0,
                socket_radius: 80.0,
                left: EyeOffset { x_offset: -165.0, y_offset: -135.0 },
                right: EyeOffset { x_offset: 140.0, y_offset: -100.0 },
            }
        })
    })
}
