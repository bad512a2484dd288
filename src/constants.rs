//! Constants used throughout the application

use std::ops::Range;

/// Number of facial landmarks for full face
pub const NUM_FACIAL_LANDMARKS: usize = 68;

/// Number of landmarks outlining one eye
pub const NUM_EYE_LANDMARKS: usize = 6;

/// Landmark indices of the eye used for gaze estimation
pub const LEFT_EYE_RANGE: Range<usize> = 36..42;

/// Landmark indices of the other eye
pub const RIGHT_EYE_RANGE: Range<usize> = 42..48;

/// Nose tip landmark index
pub const NOSE_TIP_INDEX: usize = 30;

/// Nose base landmark index
pub const NOSE_BASE_INDEX: usize = 33;

/// Eye aspect ratio below which an eye counts as closed
pub const DEFAULT_EAR_THRESHOLD: f32 = 0.2;

/// Vertical nose offset (pixels) beyond which the head is tilted
pub const DEFAULT_PITCH_THRESHOLD: f32 = 15.0;

/// Horizontal nose offset (pixels) beyond which the head is turned
pub const DEFAULT_YAW_THRESHOLD: f32 = 15.0;

/// Eye ratio below which gaze is classified as left
pub const DEFAULT_GAZE_LEFT_RATIO: f32 = 0.4;

/// Eye ratio above which gaze is classified as right
pub const DEFAULT_GAZE_RIGHT_RATIO: f32 = 0.6;

/// Default capture device index
pub const DEFAULT_CAMERA_INDEX: i32 = 0;

/// Default face detector model path
pub const DEFAULT_FACE_DETECTOR_MODEL: &str = "assets/face_detector.onnx";

/// Default landmark model path
pub const DEFAULT_FACE_LANDMARKS_MODEL: &str = "assets/face_landmarks.onnx";

/// Display window title
pub const WINDOW_NAME: &str = "Focus Monitoring";

/// Key that ends the session
pub const QUIT_KEY: char = 'q';

/// Key poll timeout per frame in milliseconds
pub const KEY_POLL_DELAY_MS: i32 = 1;

/// Image normalization constants for face detection
pub const IMAGE_NORMALIZATION_OFFSET: f32 = 127.5;
pub const IMAGE_NORMALIZATION_SCALE: f32 = 128.0;

/// Default face detection thresholds
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.4;

/// Fraction of the face box added on each side before landmark detection
pub const DEFAULT_REGION_EXPANSION: f32 = 0.2;
