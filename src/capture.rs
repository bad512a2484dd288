//! Frame acquisition and presentation.
//!
//! Both the capture device and the display window release their native
//! resources on drop, so every exit path of the frame loop cleans up.

use crate::{Error, Result};
use opencv::{
    core::Mat,
    highgui::{self, WINDOW_AUTOSIZE},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Produces successive frames
pub trait FrameSource {
    /// Read the next frame. `Ok(None)` means the stream has ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying device fails
    fn read_frame(&mut self) -> Result<Option<Mat>>;
}

/// Presents frames and reports key presses
pub trait FrameSink {
    /// Show a frame
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be displayed
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Wait up to `delay_ms` for a key press; `None` if no key was pressed
    ///
    /// # Errors
    ///
    /// Returns an error if the window system fails
    fn poll_key(&mut self, delay_ms: i32) -> Result<Option<i32>>;
}

/// `OpenCV` capture device or video file
pub struct CaptureSource {
    capture: VideoCapture,
    source: VideoSource,
}

impl CaptureSource {
    /// Open a camera or video file
    ///
    /// # Errors
    ///
    /// Returns `CameraUnavailable` if the source cannot be opened
    pub fn open(source: &VideoSource) -> Result<Self> {
        let capture = match source {
            VideoSource::Camera(index) => {
                log::info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                if cap.is_opened()? {
                    // Reduce buffer size for lower latency (webcam only)
                    if !cap.set(CAP_PROP_BUFFERSIZE, 1.0)? {
                        log::debug!("Camera ignored buffer size request");
                    }
                }
                cap
            }
            VideoSource::File(path) => {
                log::info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !capture.is_opened()? {
            return Err(Error::CameraUnavailable(match source {
                VideoSource::Camera(index) => format!("camera {index} could not be opened"),
                VideoSource::File(path) => format!("video file '{path}' could not be opened"),
            }));
        }

        Ok(Self {
            capture,
            source: source.clone(),
        })
    }

    #[must_use]
    pub fn source(&self) -> &VideoSource {
        &self.source
    }
}

impl FrameSource for CaptureSource {
    fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("Failed to release video source: {}", e);
        } else {
            log::info!("Released video source {:?}", self.source);
        }
    }
}

/// Single named `highgui` window
pub struct DisplayWindow {
    name: String,
}

impl DisplayWindow {
    /// Create the window
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created
    pub fn new(name: &str) -> Result<Self> {
        highgui::named_window(name, WINDOW_AUTOSIZE)?;
        Ok(Self { name: name.to_string() })
    }
}

impl FrameSink for DisplayWindow {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.name, frame)?;
        Ok(())
    }

    fn poll_key(&mut self, delay_ms: i32) -> Result<Option<i32>> {
        let key = highgui::wait_key(delay_ms)?;
        Ok((key >= 0).then_some(key))
    }
}

impl Drop for DisplayWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            log::warn!("Failed to close window '{}': {}", self.name, e);
        }
    }
}
