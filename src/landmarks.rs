//! Landmark geometry types shared by the detector, estimators and renderer.
//!
//! Points follow the iBUG 68-point annotation:
//!
//! - 0-16: Jaw line
//! - 17-26: Eyebrows
//! - 27-35: Nose (30 is the tip, 33 the base)
//! - 36-47: Eyes, six points each
//! - 48-67: Lips

use crate::{
    constants::{LEFT_EYE_RANGE, NOSE_BASE_INDEX, NOSE_TIP_INDEX, NUM_EYE_LANDMARKS, NUM_FACIAL_LANDMARKS, RIGHT_EYE_RANGE},
    Error, Result,
};

/// A 2D point in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned face rectangle in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Region {
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True when the region encloses no pixels
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// The six points outlining one eye.
///
/// Index 0 is the outer corner and index 3 the inner corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeLandmarks(pub [Point; NUM_EYE_LANDMARKS]);

impl EyeLandmarks {
    /// Build an eye subset from exactly six points
    ///
    /// # Errors
    ///
    /// Returns `InvalidLandmarks` if `points` does not hold six entries
    pub fn from_slice(points: &[Point]) -> Result<Self> {
        let array: [Point; NUM_EYE_LANDMARKS] = points.try_into().map_err(|_| Error::InvalidLandmarks {
            expected: NUM_EYE_LANDMARKS,
            actual: points.len(),
        })?;
        Ok(Self(array))
    }

    #[must_use]
    pub const fn outer_corner(&self) -> Point {
        self.0[0]
    }

    #[must_use]
    pub const fn inner_corner(&self) -> Point {
        self.0[3]
    }

    /// Arithmetic mean of all six points
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> Point {
        let (sum_x, sum_y) = self.0.iter().fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        let n = NUM_EYE_LANDMARKS as f32;
        Point::new(sum_x / n, sum_y / n)
    }
}

/// Full 68-point landmark set for one detected face
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Point; NUM_FACIAL_LANDMARKS],
}

impl LandmarkSet {
    /// Build a landmark set from exactly 68 points
    ///
    /// # Errors
    ///
    /// Returns `InvalidLandmarks` if the point count is not 68
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let actual = points.len();
        let points: [Point; NUM_FACIAL_LANDMARKS] = points.try_into().map_err(|_| Error::InvalidLandmarks {
            expected: NUM_FACIAL_LANDMARKS,
            actual,
        })?;
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn left_eye(&self) -> EyeLandmarks {
        self.eye(LEFT_EYE_RANGE.start)
    }

    #[must_use]
    pub fn right_eye(&self) -> EyeLandmarks {
        self.eye(RIGHT_EYE_RANGE.start)
    }

    fn eye(&self, start: usize) -> EyeLandmarks {
        let mut eye = [Point::default(); NUM_EYE_LANDMARKS];
        eye.copy_from_slice(&self.points[start..start + NUM_EYE_LANDMARKS]);
        EyeLandmarks(eye)
    }

    #[must_use]
    pub const fn nose_tip(&self) -> Point {
        self.points[NOSE_TIP_INDEX]
    }

    /// Base of the nose. Not used by the pose heuristic.
    #[must_use]
    pub const fn nose_base(&self) -> Point {
        self.points[NOSE_BASE_INDEX]
    }
}
