//! Focus monitoring library for real-time attention tracking from a camera.
//!
//! This library provides:
//! - ONNX Runtime face detection and 68-point landmark prediction
//! - `OpenCV` capture, drawing and display
//! - Geometric gaze and head pose classification from landmarks
//!
//! The per-frame pipeline consists of:
//! 1. Face detection to locate faces in the frame
//! 2. Facial landmark detection to find 68 key points per face
//! 3. Gaze classification from the left eye's iris-free geometry
//! 4. Head pose classification from the nose tip offset to the frame center
//! 5. Annotation of the frame with the results
//!
//! # Examples
//!
//! ## Classifying landmarks
//!
//! ```no_run
//! use focus_monitor::{
//!     gaze::{estimate_gaze, GazeThresholds},
//!     head_pose::{estimate_head_pose, PoseThresholds},
//!     landmarks::{LandmarkSet, Point},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let points: Vec<Point> = vec![Point::new(0.0, 0.0); 68];
//! let landmarks = LandmarkSet::new(points)?;
//!
//! let gaze = estimate_gaze(&landmarks.left_eye(), &GazeThresholds::default())?;
//! let pose = estimate_head_pose(&landmarks, 640, 480, &PoseThresholds::default());
//! println!("Pose: {} | Gaze: {}", pose.pose, gaze.direction);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the monitor
//!
//! ```no_run
//! use focus_monitor::{app::{AppConfig, FocusMonitor}, capture::VideoSource, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig {
//!     video_source: VideoSource::Camera(0),
//!     settings: Config::default(),
//! };
//!
//! let summary = FocusMonitor::new(&config)?.run()?;
//! println!("Total Blinks: {}", summary.total_blinks);
//! # Ok(())
//! # }
//! ```

/// Main application module
pub mod app;

/// Frame sources and display sinks
pub mod capture;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Face and landmark detection capability
pub mod detector;

/// Error types and result handling
pub mod error;

/// Face detection module for finding faces in images
pub mod face_detection;

/// Horizontal gaze classification
pub mod gaze;

/// Head pose classification from nose position
pub mod head_pose;

/// Landmark geometry types
pub mod landmarks;

/// Facial landmark detection module for finding 68 key points
pub mod mark_detection;

/// Frame annotations
pub mod overlay;

/// Utility functions for image processing and coordinate transformations
pub mod utils;

pub use error::{Error, Result};
