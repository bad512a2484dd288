//! Text and box annotations drawn onto displayed frames.

use crate::{gaze::GazeDirection, head_pose::PoseEstimate, landmarks::Region, Result};
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

const FACE_BOX_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const INFO_TEXT_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);
const ANGLE_TEXT_COLOR: (f64, f64, f64) = (255.0, 0.0, 0.0);

const INFO_TEXT_ORIGIN: (i32, i32) = (10, 30);
const ANGLE_TEXT_ORIGIN: (i32, i32) = (10, 60);
const FONT_SCALE: f64 = 0.7;
const LINE_THICKNESS: i32 = 2;

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// First overlay line, e.g. `Pose: Neutral | Gaze: Looking Left`
#[must_use]
pub fn info_text(pose: &PoseEstimate, gaze: GazeDirection) -> String {
    format!("Pose: {} | Gaze: {}", pose.pose, gaze)
}

/// Second overlay line with raw offsets to two decimals
#[must_use]
pub fn angle_text(pose: &PoseEstimate) -> String {
    format!("Yaw: {:.2} | Pitch: {:.2}", pose.dx, pose.dy)
}

/// Opposite corners of the face box; `right` and `bottom` are drawn inclusive
fn box_corners(region: &Region) -> (Point, Point) {
    (
        Point::new(region.left, region.top),
        Point::new(region.right, region.bottom),
    )
}

/// Draw the face rectangle
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_face_box(frame: &mut Mat, region: &Region) -> Result<()> {
    let (top_left, bottom_right) = box_corners(region);
    imgproc::rectangle_points(
        frame,
        top_left,
        bottom_right,
        bgr(FACE_BOX_COLOR),
        LINE_THICKNESS,
        LINE_8,
        0,
    )?;
    Ok(())
}

/// Draw both text lines in the top-left corner.
///
/// Every face writes to the same position; with several faces the last one
/// drawn is the one readable.
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_annotations(frame: &mut Mat, pose: &PoseEstimate, gaze: GazeDirection) -> Result<()> {
    let lines = [
        (info_text(pose, gaze), INFO_TEXT_ORIGIN, INFO_TEXT_COLOR),
        (angle_text(pose), ANGLE_TEXT_ORIGIN, ANGLE_TEXT_COLOR),
    ];

    for (text, (x, y), color) in lines {
        imgproc::put_text(
            frame,
            &text,
            Point::new(x, y),
            FONT_HERSHEY_SIMPLEX,
            FONT_SCALE,
            bgr(color),
            LINE_THICKNESS,
            LINE_8,
            false,
        )?;
    }

    Ok(())
}
