//! Error types for the focus monitor library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A landmark set did not have the expected number of points
    #[error("Invalid landmarks: expected {expected} points, got {actual}")]
    InvalidLandmarks {
        /// Number of points the 68-point convention requires
        expected: usize,
        /// Number of points actually supplied
        actual: usize,
    },

    /// Geometry that cannot be classified, e.g. a zero-width eye
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A model file is missing from disk
    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// The capture device could not be opened
    #[error("Video source unavailable: {0}")]
    CameraUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
