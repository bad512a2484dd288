//! Horizontal gaze classification from the position of the eye center
//! between the two eye corners.

use crate::{
    constants::{DEFAULT_GAZE_LEFT_RATIO, DEFAULT_GAZE_RIGHT_RATIO},
    landmarks::EyeLandmarks,
    Error, Result,
};
use std::fmt;

/// Coarse gaze direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeDirection {
    Left,
    Right,
    Straight,
}

impl GazeDirection {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Left => "Looking Left",
            Self::Right => "Looking Right",
            Self::Straight => "Looking Straight",
        }
    }
}

impl fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ratio bounds separating left, straight and right gaze
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeThresholds {
    /// Ratios strictly below this are `Left`
    pub left: f32,
    /// Ratios strictly above this are `Right`
    pub right: f32,
}

impl Default for GazeThresholds {
    fn default() -> Self {
        Self {
            left: DEFAULT_GAZE_LEFT_RATIO,
            right: DEFAULT_GAZE_RIGHT_RATIO,
        }
    }
}

/// Result of gaze estimation for one eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeEstimate {
    pub direction: GazeDirection,
    /// Position of the eye center between outer (0.0) and inner (1.0) corner
    pub ratio: f32,
}

/// Horizontal position of the eye center relative to the eye corners.
///
/// # Errors
///
/// Returns `DegenerateGeometry` when both corners share the same x coordinate
/// or the ratio is not finite.
pub fn horizontal_ratio(eye: &EyeLandmarks) -> Result<f32> {
    let outer = eye.outer_corner();
    let inner = eye.inner_corner();
    let width = inner.x - outer.x;

    if width == 0.0 {
        return Err(Error::DegenerateGeometry(format!(
            "zero-width eye: both corners at x = {}",
            outer.x
        )));
    }

    let ratio = (eye.center().x - outer.x) / width;
    if !ratio.is_finite() {
        return Err(Error::DegenerateGeometry(format!("non-finite gaze ratio {ratio}")));
    }

    Ok(ratio)
}

/// Classify a ratio; both bounds fall into `Straight`
#[must_use]
pub fn classify_ratio(ratio: f32, thresholds: &GazeThresholds) -> GazeDirection {
    if ratio < thresholds.left {
        GazeDirection::Left
    } else if ratio > thresholds.right {
        GazeDirection::Right
    } else {
        GazeDirection::Straight
    }
}

/// Estimate gaze direction from a six-point eye subset
///
/// # Errors
///
/// Propagates `DegenerateGeometry` from [`horizontal_ratio`]
pub fn estimate_gaze(eye: &EyeLandmarks, thresholds: &GazeThresholds) -> Result<GazeEstimate> {
    let ratio = horizontal_ratio(eye)?;
    Ok(GazeEstimate {
        direction: classify_ratio(ratio, thresholds),
        ratio,
    })
}
