use crate::{
    constants::NUM_FACIAL_LANDMARKS,
    landmarks::Point,
    utils::image_conversion::{mat_to_tensor, Normalization, TensorLayout},
    Error, Result,
};
use ndarray::CowArray;
use opencv::core::{Mat, Size};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Default landmark detector input size
const DEFAULT_LANDMARK_INPUT_SIZE: i32 = 128;

/// Facial landmark detector using `ONNX` Runtime
pub struct MarkDetector {
    session: Session,
    input_size: i32,
}

impl MarkDetector {
    /// Create a new landmark detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model file does not exist
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs or outputs
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(Error::ModelNotFound(model_path.to_path_buf()));
        }
        log::info!("Initializing MarkDetector with model: {}", model_path.display());

        let environment = Arc::new(
            Environment::builder()
                .with_name("mark_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelError("Landmark model has no inputs".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Landmark model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            input_size: DEFAULT_LANDMARK_INPUT_SIZE,
        })
    }

    /// Detect facial landmarks in an RGB face crop.
    ///
    /// Points are returned in crop pixel coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails, or the model
    /// yields fewer values than 68 points need
    pub fn detect(&self, face_image: &Mat) -> Result<Vec<Point>> {
        let mut resized = Mat::default();
        imgproc::resize(
            face_image,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        // Model takes NHWC input in [0, 1]
        let tensor = mat_to_tensor(&resized, TensorLayout::Nhwc, Normalization::UNIT)?;
        let marks = self.forward(tensor)?;

        scale_marks(&marks, self.input_size, face_image.cols(), face_image.rows())
    }

    /// Run forward pass through the model
    fn forward(&self, inputs: ndarray::Array4<f32>) -> Result<Vec<f32>> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let marks_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let marks_tensor = marks_output.try_extract::<f32>()?;
        let marks_view = marks_tensor.view();
        let marks_data = marks_view
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get output data".to_string()))?;

        Ok(marks_data.to_vec())
    }
}

/// Convert flat `[x0, y0, x1, y1, ...]` model output, expressed in model
/// input pixels, into points scaled to a `width` x `height` crop
///
/// # Errors
///
/// Returns `ModelOutputError` if fewer than 136 values are present
#[allow(clippy::cast_precision_loss)] // Precision loss acceptable for pixel coordinates
pub fn scale_marks(marks: &[f32], input_size: i32, width: i32, height: i32) -> Result<Vec<Point>> {
    let needed = NUM_FACIAL_LANDMARKS * 2;
    if marks.len() < needed {
        return Err(Error::ModelOutputError(format!(
            "Landmark model produced {} values, expected {needed}",
            marks.len()
        )));
    }

    let sx = width as f32 / input_size as f32;
    let sy = height as f32 / input_size as f32;

    Ok(marks[..needed]
        .chunks_exact(2)
        .map(|xy| Point::new(xy[0] * sx, xy[1] * sy))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_size() {
        assert_eq!(DEFAULT_LANDMARK_INPUT_SIZE, 128);
    }

    #[test]
    fn test_scale_marks() {
        let mut marks = vec![0.0f32; 136];
        marks[0] = 64.0;
        marks[1] = 32.0;
        marks[135] = 128.0;

        let points = scale_marks(&marks, 128, 256, 64).unwrap();
        assert_eq!(points.len(), 68);
        assert_eq!(points[0], Point::new(128.0, 16.0));
        assert_eq!(points[67].y, 64.0);
    }

    #[test]
    fn test_scale_marks_ignores_extra_values() {
        let marks = vec![1.0f32; 140];
        assert_eq!(scale_marks(&marks, 128, 128, 128).unwrap().len(), 68);
    }

    #[test]
    fn test_scale_marks_too_short() {
        let marks = vec![0.0f32; 100];
        assert!(matches!(
            scale_marks(&marks, 128, 128, 128),
            Err(Error::ModelOutputError(_))
        ));
    }

    #[test]
    fn test_missing_model_file() {
        assert!(matches!(
            MarkDetector::new("does/not/exist.onnx"),
            Err(Error::ModelNotFound(_))
        ));
    }
}
