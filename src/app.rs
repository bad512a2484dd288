//! Main application module: the per-frame monitoring loop.

use crate::{
    capture::{CaptureSource, DisplayWindow, FrameSink, FrameSource, VideoSource},
    config::Config,
    detector::{FaceLandmarker, OnnxLandmarker},
    error::{Error, Result},
    gaze::{estimate_gaze, GazeEstimate, GazeThresholds},
    head_pose::{estimate_head_pose, PoseEstimate, PoseThresholds},
    landmarks::Region,
    overlay,
};
use log::{debug, info, warn};
use opencv::{core::Mat, prelude::*};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Models, thresholds and display settings
    pub settings: Config,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The frame source returned no frame
    EndOfStream,
    /// The operator pressed the quit key
    QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Stopped(StopReason),
}

/// Signals derived for one detected face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceReport {
    pub region: Region,
    /// `None` when landmarks or gaze could not be computed for this face
    pub signals: Option<FaceSignals>,
}

/// Pose and gaze for one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceSignals {
    pub pose: PoseEstimate,
    pub gaze: GazeEstimate,
}

/// Totals reported when the session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub stop_reason: StopReason,
    pub total_blinks: u32,
}

/// Owns the frame source, landmarker and display for one session
pub struct FocusMonitor {
    source: Box<dyn FrameSource>,
    landmarker: Box<dyn FaceLandmarker>,
    sink: Box<dyn FrameSink>,
    gaze_thresholds: GazeThresholds,
    pose_thresholds: PoseThresholds,
    quit_key: i32,
    key_poll_ms: i32,
    frames_processed: u64,
    // No blink detection exists; the count is reported but never incremented
    total_blinks: u32,
}

impl FocusMonitor {
    /// Load models, open the video source and create the window.
    ///
    /// Models are loaded first so a missing model file is reported before
    /// the camera is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a model cannot be
    /// loaded, the video source cannot be opened or the window cannot be
    /// created
    pub fn new(config: &AppConfig) -> Result<Self> {
        info!("Initializing Focus Monitoring application");
        config.settings.validate()?;

        let landmarker = OnnxLandmarker::new(&config.settings.models, &config.settings.detection)?;
        let source = CaptureSource::open(&config.video_source)?;
        let window = DisplayWindow::new(&config.settings.display.window_name)?;

        Ok(Self::with_components(
            Box::new(source),
            Box::new(landmarker),
            Box::new(window),
            &config.settings,
        ))
    }

    /// Assemble a monitor from already constructed parts
    #[must_use]
    pub fn with_components(
        source: Box<dyn FrameSource>,
        landmarker: Box<dyn FaceLandmarker>,
        sink: Box<dyn FrameSink>,
        settings: &Config,
    ) -> Self {
        Self {
            source,
            landmarker,
            sink,
            gaze_thresholds: settings.thresholds.gaze(),
            pose_thresholds: settings.thresholds.pose(),
            quit_key: settings.display.quit_key as i32,
            key_poll_ms: settings.display.key_poll_ms,
            frames_processed: 0,
            total_blinks: 0,
        }
    }

    /// Run until end of stream or the quit key
    ///
    /// # Errors
    ///
    /// Returns an error if inference, drawing or display fails
    pub fn run(&mut self) -> Result<SessionSummary> {
        info!("Starting main application loop");

        let stop_reason = loop {
            if let LoopState::Stopped(reason) = self.step()? {
                break reason;
            }
        };
        info!(
            "Loop stopped after {} frame(s): {:?}",
            self.frames_processed, stop_reason
        );

        Ok(SessionSummary {
            frames_processed: self.frames_processed,
            stop_reason,
            total_blinks: self.total_blinks,
        })
    }

    /// One RUNNING iteration
    fn step(&mut self) -> Result<LoopState> {
        let mut frame = match self.source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("End of video stream reached");
                return Ok(LoopState::Stopped(StopReason::EndOfStream));
            }
            Err(e) => {
                warn!("Failed to read frame, stopping: {}", e);
                return Ok(LoopState::Stopped(StopReason::EndOfStream));
            }
        };

        self.process_frame(&mut frame)?;
        self.frames_processed += 1;

        self.sink.show(&frame)?;

        if let Some(key) = self.sink.poll_key(self.key_poll_ms)? {
            if key & 0xFF == self.quit_key {
                info!("Exit requested by user");
                return Ok(LoopState::Stopped(StopReason::QuitRequested));
            }
        }

        Ok(LoopState::Running)
    }

    /// Detect faces, estimate signals and annotate `frame` in place
    ///
    /// # Errors
    ///
    /// Returns an error if detection, landmark prediction or drawing fails
    pub fn process_frame(&mut self, frame: &mut Mat) -> Result<Vec<FaceReport>> {
        let prepared = self.landmarker.prepare_frame(frame)?;
        let faces = self.landmarker.detect_faces(&prepared)?;

        let (width, height) = (frame.cols(), frame.rows());
        let mut reports = Vec::with_capacity(faces.len());

        for region in faces {
            let signals = self.analyze_face(&prepared, &region, width, height)?;

            overlay::draw_face_box(frame, &region)?;
            if let Some(signals) = &signals {
                overlay::draw_annotations(frame, &signals.pose, signals.gaze.direction)?;
            }

            reports.push(FaceReport { region, signals });
        }

        Ok(reports)
    }

    fn analyze_face(&mut self, prepared: &Mat, region: &Region, width: i32, height: i32) -> Result<Option<FaceSignals>> {
        let landmarks = match self.landmarker.predict_landmarks(prepared, region) {
            Ok(landmarks) => landmarks,
            Err(Error::InvalidLandmarks { expected, actual }) => {
                debug!("Skipping face {region:?}: {actual} landmarks instead of {expected}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let gaze = match estimate_gaze(&landmarks.left_eye(), &self.gaze_thresholds) {
            Ok(gaze) => gaze,
            Err(Error::DegenerateGeometry(reason)) => {
                debug!("Skipping annotations for face {region:?}: {reason}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let pose = estimate_head_pose(&landmarks, width, height, &self.pose_thresholds);

        Ok(Some(FaceSignals { pose, gaze }))
    }
}
