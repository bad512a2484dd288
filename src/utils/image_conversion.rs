//! Conversion of OpenCV images into ONNX input tensors.

use crate::{utils::safe_cast::i32_to_usize, Error, Result};
use ndarray::Array4;
use opencv::core::{Mat, Vec3b};
use opencv::prelude::*;

/// Memory layout expected by a model input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// batch, channels, height, width
    Nchw,
    /// batch, height, width, channels
    Nhwc,
}

/// Per-channel normalization `(pixel - offset) / scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub offset: f32,
    pub scale: f32,
}

impl Normalization {
    /// Map `0..=255` onto `0.0..=1.0`
    pub const UNIT: Self = Self { offset: 0.0, scale: 255.0 };

    #[must_use]
    pub fn apply(&self, pixel: u8) -> f32 {
        (f32::from(pixel) - self.offset) / self.scale
    }
}

/// Convert a 3-channel 8-bit image into a single-image batch tensor.
///
/// Channel order is preserved; callers convert color space beforehand.
///
/// # Errors
///
/// Returns an error if the image is not a non-empty 3-channel image or
/// pixel access fails
pub fn mat_to_tensor(image: &Mat, layout: TensorLayout, norm: Normalization) -> Result<Array4<f32>> {
    let channels = image.channels();
    if image.empty() || channels != 3 {
        return Err(Error::InvalidInput(format!(
            "Expected a non-empty 3-channel image, got {}x{}x{}",
            image.cols(),
            image.rows(),
            channels
        )));
    }

    let height = i32_to_usize(image.rows())?;
    let width = i32_to_usize(image.cols())?;

    let mut tensor = match layout {
        TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, height, width)),
        TensorLayout::Nhwc => Array4::<f32>::zeros((1, height, width, 3)),
    };

    for (row, row_idx) in (0..image.rows()).zip(0..height) {
        for (col, col_idx) in (0..image.cols()).zip(0..width) {
            let pixel = image.at_2d::<Vec3b>(row, col)?;
            for ch in 0..3 {
                let value = norm.apply(pixel[ch]);
                match layout {
                    TensorLayout::Nchw => tensor[[0, ch, row_idx, col_idx]] = value,
                    TensorLayout::Nhwc => tensor[[0, row_idx, col_idx, ch]] = value,
                }
            }
        }
    }

    Ok(tensor)
}
