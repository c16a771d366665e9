//! Face reports from the detection collaborator and the tracked nose point.

use crate::geometry::{centroid, Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of points in the 68-point landmark layout.
pub const LANDMARK_COUNT: usize = 68;

/// Index range of the nose (bridge and base) in the 68-point layout.
const NOSE_RANGE: std::ops::Range<usize> = 27..36;

#[derive(Error, Debug, PartialEq)]
pub enum ReportError {
    #[error("expected 68 landmarks, got {0}")]
    LandmarkCount(usize),
}

/// A 68-point facial landmark set in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, ReportError> {
        if points.len() != LANDMARK_COUNT {
            return Err(ReportError::LandmarkCount(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Nose bridge and base points.
    pub fn nose(&self) -> &[Point] {
        &self.points[NOSE_RANGE]
    }

    /// Centroid of the nose subset: the tracked point.
    pub fn nose_center(&self) -> Point {
        // The nose subset is never empty for a validated landmark set.
        centroid(self.nose()).unwrap_or_default()
    }
}

impl TryFrom<Vec<Point>> for FaceLandmarks {
    type Error = ReportError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<FaceLandmarks> for Vec<Point> {
    fn from(landmarks: FaceLandmarks) -> Self {
        landmarks.points
    }
}

/// Per-expression probabilities from the classifier.
///
/// Accepted with every report and kept for future behavior; nothing in the
/// engine reads them yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionScores {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl ExpressionScores {
    /// Name and score of the most probable expression.
    pub fn dominant(&self) -> (&'static str, f32) {
        [
            ("neutral", self.neutral),
            ("happy", self.happy),
            ("sad", self.sad),
            ("angry", self.angry),
            ("fearful", self.fearful),
            ("disgusted", self.disgusted),
            ("surprised", self.surprised),
        ]
        .into_iter()
        .fold(("neutral", f32::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        })
    }
}

/// One detected face as delivered by the detection collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceReport {
    /// Reserved: not used for tracking.
    pub bounds: Rect,
    pub landmarks: FaceLandmarks,
    /// Reserved: not used for tracking.
    #[serde(default)]
    pub expressions: ExpressionScores,
}
