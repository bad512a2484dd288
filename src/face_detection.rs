use crate::{
    constants::{IMAGE_NORMALIZATION_OFFSET, IMAGE_NORMALIZATION_SCALE},
    landmarks::Region,
    utils::{
        image_conversion::{mat_to_tensor, Normalization, TensorLayout},
        safe_cast::f32_to_i32_clamp,
    },
    Error, Result,
};
use ndarray::CowArray;
use opencv::core::{Mat, Rect, Scalar, Size, CV_8UC3};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// SCRFD input size used when the model leaves it dynamic
const DEFAULT_DETECTOR_INPUT_SIZE: i32 = 640;

/// A face found by the detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Face rectangle in frame coordinates
    pub region: Region,
    /// Confidence score of the detection
    pub score: f32,
}

/// Decoded box in `[x1, y1, x2, y2]` form before conversion to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub bbox: [f32; 4],
    pub score: f32,
}

/// Output arrangement of a SCRFD export, derived from its output count
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputLayout {
    /// Index distance between score and bbox outputs of the same stride
    offset: usize,
    strides: Vec<i32>,
    num_anchors: usize,
}

impl OutputLayout {
    fn from_output_count(count: usize) -> Self {
        match count {
            6 | 9 => Self {
                offset: 3,
                strides: vec![8, 16, 32],
                num_anchors: 2,
            },
            10 | 15 => Self {
                offset: 5,
                strides: vec![8, 16, 32, 64, 128],
                num_anchors: 1,
            },
            _ => {
                log::warn!("Unknown detector configuration with {count} outputs, using defaults");
                Self::from_output_count(6)
            }
        }
    }
}

/// SCRFD Face Detector using ONNX Runtime
pub struct FaceDetector {
    session: Session,
    input_size: (i32, i32),
    conf_threshold: f32,
    nms_threshold: f32,
    layout: OutputLayout,
    center_cache: HashMap<(i32, i32, i32), Vec<[f32; 2]>>,
}

impl FaceDetector {
    /// Create a new face detector from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P, conf_threshold: f32, nms_threshold: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(Error::ModelNotFound(model_path.to_path_buf()));
        }
        log::info!("Initializing FaceDetector with model: {}", model_path.display());

        let environment = Arc::new(
            Environment::builder()
                .with_name("face_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelError("Face detector has no inputs".to_string()))?;

        // [batch, channels, height, width], possibly dynamic
        let dims = &input_meta.dimensions;
        let input_size = if dims.len() >= 4 {
            let height = dims[2].and_then(|d| i32::try_from(d).ok()).unwrap_or(DEFAULT_DETECTOR_INPUT_SIZE);
            let width = dims[3].and_then(|d| i32::try_from(d).ok()).unwrap_or(DEFAULT_DETECTOR_INPUT_SIZE);
            (width, height)
        } else {
            (DEFAULT_DETECTOR_INPUT_SIZE, DEFAULT_DETECTOR_INPUT_SIZE)
        };

        let layout = OutputLayout::from_output_count(session.outputs.len());
        log::debug!("Face detector input {:?}, layout {:?}", input_size, layout);

        Ok(Self {
            session,
            input_size,
            conf_threshold,
            nms_threshold,
            layout,
            center_cache: HashMap::new(),
        })
    }

    /// Detect faces in an RGB image
    ///
    /// # Errors
    ///
    /// Returns an error if resizing, tensor conversion or inference fails
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn detect(&mut self, image: &Mat) -> Result<Vec<Detection>> {
        let img_height = image.rows();
        let img_width = image.cols();
        if img_height <= 0 || img_width <= 0 {
            return Ok(Vec::new());
        }

        // Letterbox into the model input, keeping aspect ratio
        let (input_width, input_height) = self.input_size;
        let ratio_img = img_height as f32 / img_width as f32;
        let ratio_model = input_height as f32 / input_width as f32;

        let (new_width, new_height) = if ratio_img > ratio_model {
            ((input_height as f32 / ratio_img) as i32, input_height)
        } else {
            (input_width, (input_width as f32 * ratio_img) as i32)
        };
        let det_scale = new_height as f32 / img_height as f32;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(new_width, new_height),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut det_img = Mat::new_rows_cols_with_default(input_height, input_width, CV_8UC3, Scalar::all(0.0))?;
        {
            let mut roi = det_img.roi_mut(Rect::new(0, 0, new_width, new_height))?;
            resized.copy_to(&mut roi)?;
        }

        let norm = Normalization {
            offset: IMAGE_NORMALIZATION_OFFSET,
            scale: IMAGE_NORMALIZATION_SCALE,
        };
        let tensor = mat_to_tensor(&det_img, TensorLayout::Nchw, norm)?;

        let mut candidates = self.forward(tensor)?;
        for candidate in &mut candidates {
            for v in &mut candidate.bbox {
                *v /= det_scale;
            }
        }

        let kept = non_max_suppression(candidates, self.nms_threshold);

        Ok(kept
            .into_iter()
            .map(|c| Detection {
                region: Region::new(
                    f32_to_i32_clamp(c.bbox[0], 0, img_width),
                    f32_to_i32_clamp(c.bbox[1], 0, img_height),
                    f32_to_i32_clamp(c.bbox[2], 0, img_width),
                    f32_to_i32_clamp(c.bbox[3], 0, img_height),
                ),
                score: c.score,
            })
            .filter(|d| !d.region.is_empty())
            .collect())
    }

    /// Run the model and decode every above-threshold anchor
    #[allow(clippy::cast_precision_loss)]
    fn forward(&mut self, inputs: ndarray::Array4<f32>) -> Result<Vec<Candidate>> {
        let input_height = i32::try_from(inputs.shape()[2]).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let input_width = i32::try_from(inputs.shape()[3]).map_err(|e| Error::InvalidInput(e.to_string()))?;

        let strides = self.layout.strides.clone();
        let anchor_sets: Vec<Vec<[f32; 2]>> = strides
            .iter()
            .map(|&stride| self.anchor_centers(input_height / stride, input_width / stride, stride))
            .collect();

        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;
        let outputs = self.session.run(vec![input_tensor])?;

        let needed = self.layout.strides.len() + self.layout.offset;
        if outputs.len() < needed {
            return Err(Error::ModelOutputError(format!(
                "Face detector returned {} outputs, expected at least {needed}",
                outputs.len()
            )));
        }

        let mut candidates = Vec::new();

        for (idx, (&stride, centers)) in strides.iter().zip(&anchor_sets).enumerate() {
            let scores_tensor = outputs[idx].try_extract::<f32>()?;
            let scores_view = scores_tensor.view();
            let scores = scores_view
                .as_slice()
                .ok_or_else(|| Error::ModelOutputError("Non-contiguous score output".to_string()))?;

            let bbox_tensor = outputs[idx + self.layout.offset].try_extract::<f32>()?;
            let bbox_view = bbox_tensor.view();
            let distances = bbox_view
                .as_slice()
                .ok_or_else(|| Error::ModelOutputError("Non-contiguous bbox output".to_string()))?;

            if scores.len() != centers.len() || distances.len() != centers.len() * 4 {
                return Err(Error::ModelOutputError(format!(
                    "Stride {stride}: {} scores and {} distances for {} anchors",
                    scores.len(),
                    distances.len(),
                    centers.len()
                )));
            }

            for (i, &score) in scores.iter().enumerate() {
                if score < self.conf_threshold {
                    continue;
                }
                let d = &distances[i * 4..i * 4 + 4];
                let scaled = [d[0], d[1], d[2], d[3]].map(|v| v * stride as f32);
                candidates.push(Candidate {
                    bbox: distance_to_bbox(centers[i], scaled),
                    score,
                });
            }
        }

        Ok(candidates)
    }

    fn anchor_centers(&mut self, height: i32, width: i32, stride: i32) -> Vec<[f32; 2]> {
        let num_anchors = self.layout.num_anchors;
        self.center_cache
            .entry((height, width, stride))
            .or_insert_with(|| generate_anchor_centers(height, width, stride, num_anchors))
            .clone()
    }
}

/// Anchor centers for one stride, row-major, repeated `num_anchors` times per cell
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn generate_anchor_centers(height: i32, width: i32, stride: i32, num_anchors: usize) -> Vec<[f32; 2]> {
    let mut centers = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let center = [(x * stride) as f32, (y * stride) as f32];
            for _ in 0..num_anchors.max(1) {
                centers.push(center);
            }
        }
    }
    centers
}

/// Convert left/top/right/bottom distances from an anchor center into a box
#[must_use]
pub fn distance_to_bbox(center: [f32; 2], distances: [f32; 4]) -> [f32; 4] {
    [
        center[0] - distances[0],
        center[1] - distances[1],
        center[0] + distances[2],
        center[1] + distances[3],
    ]
}

/// Intersection over union with the +1 pixel convention of the reference decoder
#[must_use]
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let area_a = (a[2] - a[0] + 1.0) * (a[3] - a[1] + 1.0);
    let area_b = (b[2] - b[0] + 1.0) * (b[3] - b[1] + 1.0);

    let w = (a[2].min(b[2]) - a[0].max(b[0]) + 1.0).max(0.0);
    let h = (a[3].min(b[3]) - a[1].max(b[1]) + 1.0).max(0.0);
    let inter = w * h;

    inter / (area_a + area_b - inter)
}

/// Greedy non-maximum suppression, highest score first
#[must_use]
pub fn non_max_suppression(mut candidates: Vec<Candidate>, threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if keep.iter().all(|k| iou(&k.bbox, &candidate.bbox) <= threshold) {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_bbox() {
        let bbox = distance_to_bbox([100.0, 100.0], [10.0, 10.0, 20.0, 20.0]);
        assert_eq!(bbox, [90.0, 90.0, 120.0, 120.0]);
    }

    #[test]
    fn test_anchor_centers() {
        let centers = generate_anchor_centers(2, 3, 8, 2);
        assert_eq!(centers.len(), 2 * 3 * 2);
        assert_eq!(centers[0], [0.0, 0.0]);
        assert_eq!(centers[1], [0.0, 0.0]);
        assert_eq!(centers[2], [8.0, 0.0]);
        assert_eq!(centers[6], [0.0, 8.0]);
    }

    #[test]
    fn test_output_layout() {
        assert_eq!(OutputLayout::from_output_count(9).strides, vec![8, 16, 32]);
        assert_eq!(OutputLayout::from_output_count(15).num_anchors, 1);
        assert_eq!(OutputLayout::from_output_count(7).offset, 3);
    }

    #[test]
    fn test_iou() {
        let a = [0.0, 0.0, 9.0, 9.0];
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(iou(&a, &[20.0, 20.0, 29.0, 29.0]), 0.0);

        // Half overlap: 50 / (100 + 100 - 50)
        let half = iou(&a, &[5.0, 0.0, 14.0, 9.0]);
        assert!((half - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_nms_keeps_best_of_overlapping() {
        let candidates = vec![
            Candidate { bbox: [0.0, 0.0, 99.0, 99.0], score: 0.7 },
            Candidate { bbox: [2.0, 2.0, 101.0, 101.0], score: 0.9 },
            Candidate { bbox: [300.0, 300.0, 399.0, 399.0], score: 0.6 },
        ];

        let kept = non_max_suppression(candidates, 0.4);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.6);
    }

    #[test]
    fn test_nms_empty() {
        assert!(non_max_suppression(Vec::new(), 0.4).is_empty());
    }
}
