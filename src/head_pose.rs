//! Head pose heuristic based on the nose tip offset from the frame center.
//!
//! Yaw is checked before pitch: a head that is both turned and tilted
//! reports as turned.

use crate::{
    constants::{DEFAULT_PITCH_THRESHOLD, DEFAULT_YAW_THRESHOLD},
    landmarks::LandmarkSet,
};
use std::fmt;

/// Coarse head orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadPose {
    TurnedLeft,
    TurnedRight,
    LookingUp,
    LookingDown,
    Neutral,
}

impl HeadPose {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TurnedLeft => "Head Turned Left",
            Self::TurnedRight => "Head Turned Right",
            Self::LookingUp => "Looking Up",
            Self::LookingDown => "Looking Down",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for HeadPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pixel offsets beyond which the head counts as turned or tilted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseThresholds {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for PoseThresholds {
    fn default() -> Self {
        Self {
            yaw: DEFAULT_YAW_THRESHOLD,
            pitch: DEFAULT_PITCH_THRESHOLD,
        }
    }
}

/// Pose label with the raw offsets it was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseEstimate {
    pub pose: HeadPose,
    /// Horizontal nose offset from frame center, negative is left
    pub dx: f32,
    /// Vertical nose offset from frame center, negative is up
    pub dy: f32,
}

/// Classify offsets against the thresholds. Both comparisons are strict.
#[must_use]
pub fn classify_offsets(dx: f32, dy: f32, thresholds: &PoseThresholds) -> HeadPose {
    if dx.abs() > thresholds.yaw {
        if dx < 0.0 {
            HeadPose::TurnedLeft
        } else {
            HeadPose::TurnedRight
        }
    } else if dy.abs() > thresholds.pitch {
        if dy < 0.0 {
            HeadPose::LookingUp
        } else {
            HeadPose::LookingDown
        }
    } else {
        HeadPose::Neutral
    }
}

/// Estimate head pose from the nose tip position in a frame of the given size
#[must_use]
#[allow(clippy::cast_precision_loss)] // Frame dimensions fit comfortably in f32
pub fn estimate_head_pose(
    landmarks: &LandmarkSet,
    frame_width: i32,
    frame_height: i32,
    thresholds: &PoseThresholds,
) -> PoseEstimate {
    let center_x = (frame_width / 2) as f32;
    let center_y = (frame_height / 2) as f32;

    let nose_tip = landmarks.nose_tip();
    let dx = nose_tip.x - center_x;
    let dy = nose_tip.y - center_y;

    PoseEstimate {
        pose: classify_offsets(dx, dy, thresholds),
        dx,
        dy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Point;
    use proptest::prelude::*;

    fn landmarks_with_nose(x: f32, y: f32) -> LandmarkSet {
        let mut points = vec![Point::new(0.0, 0.0); 68];
        points[30] = Point::new(x, y);
        points[33] = Point::new(-500.0, -500.0);
        LandmarkSet::new(points).unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(HeadPose::TurnedLeft.to_string(), "Head Turned Left");
        assert_eq!(HeadPose::TurnedRight.to_string(), "Head Turned Right");
        assert_eq!(HeadPose::LookingUp.to_string(), "Looking Up");
        assert_eq!(HeadPose::LookingDown.to_string(), "Looking Down");
        assert_eq!(HeadPose::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn test_turned_left() {
        let estimate = estimate_head_pose(&landmarks_with_nose(300.0, 240.0), 640, 480, &PoseThresholds::default());
        assert_eq!(estimate.pose, HeadPose::TurnedLeft);
        assert_eq!(estimate.dx, -20.0);
        assert_eq!(estimate.dy, 0.0);
    }

    #[test]
    fn test_looking_down() {
        let estimate = estimate_head_pose(&landmarks_with_nose(320.0, 260.0), 640, 480, &PoseThresholds::default());
        assert_eq!(estimate.pose, HeadPose::LookingDown);
    }

    #[test]
    fn test_yaw_takes_priority() {
        let estimate = estimate_head_pose(&landmarks_with_nose(400.0, 100.0), 640, 480, &PoseThresholds::default());
        assert_eq!(estimate.pose, HeadPose::TurnedRight);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let thresholds = PoseThresholds::default();
        assert_eq!(classify_offsets(15.0, 0.0, &thresholds), HeadPose::Neutral);
        assert_eq!(classify_offsets(-15.0, 15.0, &thresholds), HeadPose::Neutral);
        assert_eq!(classify_offsets(15.5, 0.0, &thresholds), HeadPose::TurnedRight);
    }

    #[test]
    fn test_odd_frame_size_uses_integer_center() {
        // 641 / 2 == 320, 481 / 2 == 240
        let estimate = estimate_head_pose(&landmarks_with_nose(320.0, 240.0), 641, 481, &PoseThresholds::default());
        assert_eq!(estimate.dx, 0.0);
        assert_eq!(estimate.dy, 0.0);
    }

    #[test]
    fn test_nose_base_does_not_affect_pose() {
        let mut points = vec![Point::new(0.0, 0.0); 68];
        points[30] = Point::new(320.0, 240.0);
        let a = LandmarkSet::new(points.clone()).unwrap();
        points[33] = Point::new(1000.0, 1000.0);
        let b = LandmarkSet::new(points).unwrap();

        let thresholds = PoseThresholds::default();
        assert_eq!(
            estimate_head_pose(&a, 640, 480, &thresholds),
            estimate_head_pose(&b, 640, 480, &thresholds)
        );
    }

    proptest! {
        #[test]
        fn prop_large_yaw_depends_only_on_dx_sign(
            dx in prop_oneof![-500.0f32..-15.01, 15.01f32..500.0],
            dy in -500.0f32..500.0,
        ) {
            let pose = classify_offsets(dx, dy, &PoseThresholds::default());
            let expected = if dx < 0.0 { HeadPose::TurnedLeft } else { HeadPose::TurnedRight };
            prop_assert_eq!(pose, expected);
        }

        #[test]
        fn prop_large_pitch_depends_only_on_dy_sign(
            dx in -15.0f32..=15.0,
            dy in prop_oneof![-500.0f32..-15.01, 15.01f32..500.0],
        ) {
            let pose = classify_offsets(dx, dy, &PoseThresholds::default());
            let expected = if dy < 0.0 { HeadPose::LookingUp } else { HeadPose::LookingDown };
            prop_assert_eq!(pose, expected);
        }

        #[test]
        fn prop_small_offsets_are_neutral(dx in -15.0f32..=15.0, dy in -15.0f32..=15.0) {
            prop_assert_eq!(classify_offsets(dx, dy, &PoseThresholds::default()), HeadPose::Neutral);
        }

        #[test]
        fn prop_estimate_is_idempotent(x in 0.0f32..1280.0, y in 0.0f32..720.0) {
            let landmarks = landmarks_with_nose(x, y);
            let thresholds = PoseThresholds::default();
            prop_assert_eq!(
                estimate_head_pose(&landmarks, 1280, 720, &thresholds),
                estimate_head_pose(&landmarks, 1280, 720, &thresholds)
            );
        }
    }
}
