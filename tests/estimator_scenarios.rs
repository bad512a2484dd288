//! End-to-end checks of the gaze and head pose heuristics on hand-built landmarks


use focus_monitor::{
    gaze::{estimate_gaze, horizontal_ratio, GazeDirection, GazeThresholds},
    head_pose::{estimate_head_pose, HeadPose, PoseThresholds},
    landmarks::Point,
    overlay::{angle_text, info_text},
    Error,
};
use test_helpers::{collapsed_eye, eye, eye_with_center, landmarks_with, FRAME_HEIGHT, FRAME_WIDTH};

fn pose_for_nose(x: f32, y: f32) -> HeadPose {
    let landmarks = landmarks_with(eye_with_center(120.0), Point::new(x, y));
    estimate_head_pose(&landmarks, FRAME_WIDTH, FRAME_HEIGHT, &PoseThresholds::default()).pose
}

#[test]
fn test_gaze_left_scenario() {
    let estimate = estimate_gaze(&eye(eye_with_center(112.0)), &GazeThresholds::default()).unwrap();
    assert!((estimate.ratio - 0.3).abs() < 1e-5);
    assert_eq!(estimate.direction, GazeDirection::Left);
    assert_eq!(estimate.direction.to_string(), "Looking Left");
}

#[test]
fn test_gaze_right_scenario() {
    let estimate = estimate_gaze(&eye(eye_with_center(128.0)), &GazeThresholds::default()).unwrap();
    assert!((estimate.ratio - 0.7).abs() < 1e-5);
    assert_eq!(estimate.direction, GazeDirection::Right);
}

#[test]
fn test_gaze_straight_between_bounds() {
    let estimate = estimate_gaze(&eye(eye_with_center(120.0)), &GazeThresholds::default()).unwrap();
    assert_eq!(estimate.direction, GazeDirection::Straight);
}

#[test]
fn test_gaze_boundaries_are_straight() {
    // 116 -> 0.4 and 124 -> 0.6
    for center in [116.0, 124.0] {
        let ratio = horizontal_ratio(&eye(eye_with_center(center))).unwrap();
        let direction = estimate_gaze(&eye(eye_with_center(center)), &GazeThresholds::default())
            .unwrap()
            .direction;
        assert_eq!(direction, GazeDirection::Straight, "ratio {ratio}");
    }
}

#[test]
fn test_collapsed_eye_is_degenerate() {
    assert!(matches!(
        estimate_gaze(&eye(collapsed_eye()), &GazeThresholds::default()),
        Err(Error::DegenerateGeometry(_))
    ));
}

#[test]
fn test_head_turned_right_scenario() {
    assert_eq!(pose_for_nose(340.0, 240.0), HeadPose::TurnedRight);
}

#[test]
fn test_looking_up_scenario() {
    assert_eq!(pose_for_nose(320.0, 220.0), HeadPose::LookingUp);
}

#[test]
fn test_neutral_scenario() {
    assert_eq!(pose_for_nose(322.0, 242.0), HeadPose::Neutral);
}

#[test]
fn test_remaining_poses() {
    assert_eq!(pose_for_nose(300.0, 240.0), HeadPose::TurnedLeft);
    assert_eq!(pose_for_nose(320.0, 260.0), HeadPose::LookingDown);
}

#[test]
fn test_yaw_takes_priority_over_pitch() {
    assert_eq!(pose_for_nose(350.0, 200.0), HeadPose::TurnedRight);
    assert_eq!(pose_for_nose(290.0, 280.0), HeadPose::TurnedLeft);
}

#[test]
fn test_threshold_is_strict() {
    assert_eq!(pose_for_nose(335.0, 255.0), HeadPose::Neutral);
    assert_eq!(pose_for_nose(305.0, 225.0), HeadPose::Neutral);
}

#[test]
fn test_odd_frame_dimensions_use_integer_center() {
    let landmarks = landmarks_with(eye_with_center(120.0), Point::new(336.0, 240.0));
    // 641 / 2 == 320, so dx is 16
    let estimate = estimate_head_pose(&landmarks, 641, 481, &PoseThresholds::default());
    assert_eq!(estimate.dx, 16.0);
    assert_eq!(estimate.dy, 0.0);
    assert_eq!(estimate.pose, HeadPose::TurnedRight);
}

#[test]
fn test_estimates_are_idempotent() {
    let landmarks = landmarks_with(eye_with_center(113.0), Point::new(331.5, 207.25));
    let thresholds = PoseThresholds::default();

    let first_pose = estimate_head_pose(&landmarks, FRAME_WIDTH, FRAME_HEIGHT, &thresholds);
    let second_pose = estimate_head_pose(&landmarks, FRAME_WIDTH, FRAME_HEIGHT, &thresholds);
    assert_eq!(first_pose, second_pose);

    let first_gaze = estimate_gaze(&landmarks.left_eye(), &GazeThresholds::default()).unwrap();
    let second_gaze = estimate_gaze(&landmarks.left_eye(), &GazeThresholds::default()).unwrap();
    assert_eq!(first_gaze, second_gaze);
}

#[test]
fn test_overlay_text_for_scenario() {
    let landmarks = landmarks_with(eye_with_center(112.0), Point::new(340.0, 240.0));
    let pose = estimate_head_pose(&landmarks, FRAME_WIDTH, FRAME_HEIGHT, &PoseThresholds::default());
    let gaze = estimate_gaze(&landmarks.left_eye(), &GazeThresholds::default()).unwrap();

    assert_eq!(info_text(&pose, gaze.direction), "Pose: Head Turned Right | Gaze: Looking Left");
    assert_eq!(angle_text(&pose), "Yaw: 20.00 | Pitch: 0.00");
}

#[test]
fn test_custom_thresholds() {
    let landmarks = landmarks_with(eye_with_center(112.0), Point::new(340.0, 240.0));
    let loose = PoseThresholds { yaw: 25.0, pitch: 25.0 };
    assert_eq!(
        estimate_head_pose(&landmarks, FRAME_WIDTH, FRAME_HEIGHT, &loose).pose,
        HeadPose::Neutral
    );

    let wide = GazeThresholds { left: 0.2, right: 0.8 };
    assert_eq!(
        estimate_gaze(&landmarks.left_eye(), &wide).unwrap().direction,
        GazeDirection::Straight
    );
}
