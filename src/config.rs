//! Configuration management for the focus monitor

use crate::{
    constants::{
        DEFAULT_CAMERA_INDEX, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_EAR_THRESHOLD, DEFAULT_FACE_DETECTOR_MODEL,
        DEFAULT_FACE_LANDMARKS_MODEL, DEFAULT_GAZE_LEFT_RATIO, DEFAULT_GAZE_RIGHT_RATIO, DEFAULT_NMS_THRESHOLD,
        DEFAULT_PITCH_THRESHOLD, DEFAULT_REGION_EXPANSION, DEFAULT_YAW_THRESHOLD, KEY_POLL_DELAY_MS, QUIT_KEY,
        WINDOW_NAME,
    },
    gaze::GazeThresholds,
    head_pose::PoseThresholds,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Capture device configuration
    pub capture: CaptureConfig,

    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Classification thresholds
    pub thresholds: ThresholdConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to face detection ONNX model
    pub face_detector: PathBuf,

    /// Path to facial landmarks ONNX model
    pub face_landmarks: PathBuf,
}

/// Capture device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera index used when no video file is given
    pub camera_index: i32,
}

/// Face detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Confidence threshold for face detection (0.0-1.0)
    pub confidence_threshold: f32,

    /// IOU threshold for non-maximum suppression (0.0-1.0)
    pub nms_threshold: f32,

    /// Face region expansion factor before landmark detection
    pub region_expansion: f32,
}

/// Gaze, pose and blink thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Eye aspect ratio for blink detection. Not consulted; no blink detection runs.
    pub ear: f32,

    /// Vertical nose offset in pixels
    pub pitch: f32,

    /// Horizontal nose offset in pixels
    pub yaw: f32,

    /// Eye ratio below which gaze is left
    pub gaze_left: f32,

    /// Eye ratio above which gaze is right
    pub gaze_right: f32,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window title
    pub window_name: String,

    /// Key that ends the session
    pub quit_key: char,

    /// Key poll timeout per frame in milliseconds
    pub key_poll_ms: i32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from(DEFAULT_FACE_DETECTOR_MODEL),
            face_landmarks: PathBuf::from(DEFAULT_FACE_LANDMARKS_MODEL),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            region_expansion: DEFAULT_REGION_EXPANSION,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ear: DEFAULT_EAR_THRESHOLD,
            pitch: DEFAULT_PITCH_THRESHOLD,
            yaw: DEFAULT_YAW_THRESHOLD,
            gaze_left: DEFAULT_GAZE_LEFT_RATIO,
            gaze_right: DEFAULT_GAZE_RIGHT_RATIO,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_name: WINDOW_NAME.to_string(),
            quit_key: QUIT_KEY,
            key_poll_ms: KEY_POLL_DELAY_MS,
        }
    }
}

impl ThresholdConfig {
    /// Gaze ratio bounds for the estimator
    #[must_use]
    pub fn gaze(&self) -> GazeThresholds {
        GazeThresholds {
            left: self.gaze_left,
            right: self.gaze_right,
        }
    }

    /// Nose offset bounds for the estimator
    #[must_use]
    pub fn pose(&self) -> PoseThresholds {
        PoseThresholds {
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Check value ranges without touching the filesystem
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid value
    pub fn validate_values(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.confidence_threshold) {
            return Err(Error::ConfigError(
                "Confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.nms_threshold) {
            return Err(Error::ConfigError("NMS threshold must be between 0.0 and 1.0".to_string()));
        }
        if !self.detection.region_expansion.is_finite() || self.detection.region_expansion < 0.0 {
            return Err(Error::ConfigError(
                "Region expansion must be a non-negative number".to_string(),
            ));
        }

        let t = &self.thresholds;
        for (name, value) in [("ear", t.ear), ("pitch", t.pitch), ("yaw", t.yaw)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "Threshold '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&t.gaze_left) || !(0.0..=1.0).contains(&t.gaze_right) || t.gaze_left > t.gaze_right {
            return Err(Error::ConfigError(
                "Gaze ratios must satisfy 0.0 <= gaze_left <= gaze_right <= 1.0".to_string(),
            ));
        }

        if !self.display.quit_key.is_ascii() {
            return Err(Error::ConfigError("Quit key must be an ASCII character".to_string()));
        }
        if self.display.key_poll_ms <= 0 {
            return Err(Error::ConfigError("Key poll delay must be greater than 0".to_string()));
        }
        if self.capture.camera_index < 0 {
            return Err(Error::ConfigError("Camera index must not be negative".to_string()));
        }

        Ok(())
    }

    /// Validate configuration, including model file presence
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for out-of-range values and `ModelNotFound`
    /// for missing model files
    pub fn validate(&self) -> Result<()> {
        self.validate_values()?;

        for model in [&self.models.face_detector, &self.models.face_landmarks] {
            if !model.exists() {
                return Err(Error::ModelNotFound(model.clone()));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Focus Monitoring Configuration

# Model paths
models:
  face_detector: "assets/face_detector.onnx"
  face_landmarks: "assets/face_landmarks.onnx"

# Capture device
capture:
  camera_index: 0

# Face detection parameters
detection:
  confidence_threshold: 0.5
  nms_threshold: 0.4
  region_expansion: 0.2

# Classification thresholds
thresholds:
  ear: 0.2
  pitch: 15.0
  yaw: 15.0
  gaze_left: 0.4
  gaze_right: 0.6

# Display settings
display:
  window_name: "Focus Monitoring"
  quit_key: "q"
  key_poll_ms: 1
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.models.face_detector, defaults.models.face_detector);
        assert_eq!(parsed.capture.camera_index, defaults.capture.camera_index);
        assert_eq!(parsed.thresholds.pitch, defaults.thresholds.pitch);
        assert_eq!(parsed.thresholds.gaze_right, defaults.thresholds.gaze_right);
        assert_eq!(parsed.display.window_name, defaults.display.window_name);
        assert_eq!(parsed.display.quit_key, 'q');
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("thresholds:\n  yaw: 25.0\n").unwrap();
        assert_eq!(config.thresholds.yaw, 25.0);
        assert_eq!(config.thresholds.pitch, 15.0);
        assert_eq!(config.display.key_poll_ms, 1);
    }

    #[test]
    fn test_threshold_conversion() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(thresholds.gaze(), GazeThresholds::default());
        assert_eq!(thresholds.pose(), PoseThresholds::default());
    }

    #[test]
    fn test_default_values_validate() {
        assert!(Config::default().validate_values().is_ok());
    }

    #[test]
    fn test_inverted_gaze_bounds_rejected() {
        let mut config = Config::default();
        config.thresholds.gaze_left = 0.7;
        config.thresholds.gaze_right = 0.3;
        assert!(matches!(config.validate_values(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = Config::default();
        config.thresholds.yaw = -1.0;
        assert!(config.validate_values().is_err());

        config.thresholds.yaw = f32::NAN;
        assert!(config.validate_values().is_err());
    }

    #[test]
    fn test_missing_model_reported() {
        let mut config = Config::default();
        config.models.face_detector = PathBuf::from("does/not/exist.onnx");
        match config.validate() {
            Err(Error::ModelNotFound(path)) => assert_eq!(path, PathBuf::from("does/not/exist.onnx")),
            other => panic!("Expected ModelNotFound, got {other:?}"),
        }
    }
}
