//! Face and landmark detection capability.
//!
//! The frame loop only talks to [`FaceLandmarker`], so estimators and the
//! loop itself can be exercised without model files.

use crate::{
    config::{DetectionConfig, ModelConfig},
    face_detection::FaceDetector,
    landmarks::{LandmarkSet, Point, Region},
    mark_detection::MarkDetector,
    utils::refine_region,
    Error, Result,
};
use opencv::core::{Mat, Rect};
use opencv::imgproc;
use opencv::prelude::*;

/// Locates faces and their 68 landmarks in a frame
pub trait FaceLandmarker {
    /// Convert a captured BGR frame into the color space the models consume
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails
    fn prepare_frame(&self, frame: &Mat) -> Result<Mat>;

    /// Find face regions in a prepared frame
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails
    fn detect_faces(&mut self, frame: &Mat) -> Result<Vec<Region>>;

    /// Predict landmarks for one face, in frame coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the result is not 68 points
    fn predict_landmarks(&mut self, frame: &Mat, region: &Region) -> Result<LandmarkSet>;
}

impl From<Region> for Rect {
    fn from(region: Region) -> Self {
        Rect::new(region.left, region.top, region.width(), region.height())
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::new(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height)
    }
}

/// [`FaceLandmarker`] backed by the SCRFD face detector and the 68-point
/// landmark model
pub struct OnnxLandmarker {
    face_detector: FaceDetector,
    mark_detector: MarkDetector,
    region_expansion: f32,
}

impl OnnxLandmarker {
    /// Load both models
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` if a model file is missing, or the loader's
    /// error if a model cannot be parsed
    pub fn new(models: &ModelConfig, detection: &DetectionConfig) -> Result<Self> {
        let face_detector = FaceDetector::new(
            &models.face_detector,
            detection.confidence_threshold,
            detection.nms_threshold,
        )?;
        let mark_detector = MarkDetector::new(&models.face_landmarks)?;

        Ok(Self {
            face_detector,
            mark_detector,
            region_expansion: detection.region_expansion,
        })
    }
}

impl FaceLandmarker for OnnxLandmarker {
    fn prepare_frame(&self, frame: &Mat) -> Result<Mat> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        Ok(rgb)
    }

    fn detect_faces(&mut self, frame: &Mat) -> Result<Vec<Region>> {
        let detections = self.face_detector.detect(frame)?;
        log::debug!("Detected {} face(s)", detections.len());
        Ok(detections.into_iter().map(|d| d.region).collect())
    }

    fn predict_landmarks(&mut self, frame: &Mat, region: &Region) -> Result<LandmarkSet> {
        let crop_region = refine_region(*region, frame.cols(), frame.rows(), self.region_expansion);
        if crop_region.is_empty() {
            return Err(Error::InvalidInput(format!("Empty crop for face region {region:?}")));
        }

        let roi = Mat::roi(frame, Rect::from(crop_region))?;
        let crop = roi.try_clone()?;
        let marks = self.mark_detector.detect(&crop)?;

        let offset = Point::new(crop_region.left as f32, crop_region.top as f32);
        LandmarkSet::new(
            marks
                .into_iter()
                .map(|p| Point::new(p.x + offset.x, p.y + offset.y))
                .collect(),
        )
    }
}
