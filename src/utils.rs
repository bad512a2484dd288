//! Utility functions for image processing and coordinate transformations.

pub mod image_conversion;
pub mod safe_cast;

use crate::landmarks::Region;
use safe_cast::f32_to_i32_clamp;

/// Grow a face region by `shift` of its size on every side, make it square
/// and keep it inside a `max_width` x `max_height` image.
///
/// The landmark model expects a square crop with some margin around the face.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss acceptable for box dimensions
pub fn refine_region(region: Region, max_width: i32, max_height: i32, shift: f32) -> Region {
    let x_shift = f32_to_i32_clamp(region.width() as f32 * shift, 0, max_width);
    let y_shift = f32_to_i32_clamp(region.height() as f32 * shift, 0, max_height);

    let left = (region.left - x_shift).max(0);
    let top = (region.top - y_shift).max(0);
    let width = (region.width() + 2 * x_shift).min(max_width - left);
    let height = (region.height() + 2 * y_shift).min(max_height - top);

    // Square, but never larger than the image itself
    let side = width.max(height).min(max_width).min(max_height);

    let left = if left + side > max_width { max_width - side } else { left };
    let top = if top + side > max_height { max_height - side } else { top };

    Region::new(left, top, left + side, top + side)
}
