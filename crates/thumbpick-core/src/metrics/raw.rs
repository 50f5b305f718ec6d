//! Raw per-frame metric computations (§4.4).
//!
//! Pure-math metrics (`face_score`, `centrality`, `time_prior`) take plain
//! numbers so they're unit-testable without a `Mat`; the rest operate
//! directly on OpenCV matrices.

use opencv::core::{Mat, Scalar, CV_8UC1};
use opencv::prelude::*;
use thumbpick_models::BoundingBox;

use crate::error::ThumbResult;

const CANNY_LOW: f64 = 100.0;
const CANNY_HIGH: f64 = 200.0;
const CLUTTER_FACE_PAD_PX: i32 = 5;
const OVERLAY_BUSY_SCALE: f64 = 100.0;
const OVERLAY_FACE_IOU_THRESHOLD: f64 = 0.1;

/// Laplacian-variance sharpness (§4.4 `Sharpness`). `gray` must be 8-bit
/// single-channel.
pub fn sharpness(gray: &Mat) -> ThumbResult<f64> {
    use opencv::core::CV_64F;

    let mut lap = Mat::default();
    opencv::imgproc::laplacian(gray, &mut lap, CV_64F, 1, 1.0, 0.0, opencv::core::BORDER_DEFAULT)?;

    let mut mean = Scalar::default();
    let mut stddev = Scalar::default();
    opencv::core::mean_std_dev(&lap, &mut mean, &mut stddev, &opencv::core::no_array())?;

    Ok(stddev[0] * stddev[0])
}

/// Mean and standard deviation of the L channel of a BGR analysis image
/// (§4.4 `Exposure`, `Contrast`).
pub fn exposure_and_contrast(bgr: &Mat) -> ThumbResult<(f64, f64)> {
    let mut lab = Mat::default();
    opencv::imgproc::cvt_color(bgr, &mut lab, opencv::imgproc::COLOR_BGR2Lab, 0)?;

    let mut channels = opencv::core::Vector::<Mat>::new();
    opencv::core::split(&lab, &mut channels)?;
    let l_channel = channels.get(0)?;

    let mut mean = Scalar::default();
    let mut stddev = Scalar::default();
    opencv::core::mean_std_dev(&l_channel, &mut mean, &mut stddev, &opencv::core::no_array())?;

    Ok((mean[0], stddev[0]))
}

/// Hasler-Süsstrunk colorfulness (§4.4 `Colorfulness`).
pub fn colorfulness(bgr: &Mat) -> ThumbResult<f64> {
    let mut channels = opencv::core::Vector::<Mat>::new();
    opencv::core::split(bgr, &mut channels)?;
    let b = channels.get(0)?;
    let g = channels.get(1)?;
    let r = channels.get(2)?;

    let mut b32 = Mat::default();
    let mut g32 = Mat::default();
    let mut r32 = Mat::default();
    b.convert_to(&mut b32, opencv::core::CV_32F, 1.0, 0.0)?;
    g.convert_to(&mut g32, opencv::core::CV_32F, 1.0, 0.0)?;
    r.convert_to(&mut r32, opencv::core::CV_32F, 1.0, 0.0)?;

    let mut rg = Mat::default();
    opencv::core::absdiff(&r32, &g32, &mut rg)?;

    let mut rg_sum = Mat::default();
    opencv::core::add(&r32, &g32, &mut rg_sum, &opencv::core::no_array(), -1)?;
    let mut rg_half = Mat::default();
    opencv::core::multiply(&rg_sum, &Scalar::all(0.5), &mut rg_half, 1.0, -1)?;
    let mut yb = Mat::default();
    opencv::core::absdiff(&rg_half, &b32, &mut yb)?;

    let mut rg_mean = Scalar::default();
    let mut rg_std = Scalar::default();
    opencv::core::mean_std_dev(&rg, &mut rg_mean, &mut rg_std, &opencv::core::no_array())?;

    let mut yb_mean = Scalar::default();
    let mut yb_std = Scalar::default();
    opencv::core::mean_std_dev(&yb, &mut yb_mean, &mut yb_std, &opencv::core::no_array())?;

    Ok(rg_std[0] + 0.3 * yb_std[0])
}

/// Largest-face-area fraction of the image (§4.4 `FaceScore`).
pub fn face_score(faces: &[BoundingBox], image_width: u32, image_height: u32) -> f64 {
    let Some(largest) = faces.iter().max_by(|a, b| a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal)) else {
        return 0.0;
    };

    let image_area = image_width as f64 * image_height as f64;
    if image_area <= 0.0 {
        return 0.0;
    }

    (largest.area() / image_area).clamp(0.0, 1.0)
}

/// Distance of the largest face's center to the nearest rule-of-thirds
/// intersection, inverted so higher is better (§4.4 `Centrality`).
pub fn centrality(faces: &[BoundingBox], image_width: u32, image_height: u32) -> f64 {
    let Some(largest) = faces.iter().max_by(|a, b| a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal)) else {
        return 0.5;
    };

    let w = image_width as f64;
    let h = image_height as f64;
    let cx = largest.cx();
    let cy = largest.cy();

    let thirds_points = [
        (w / 3.0, h / 3.0),
        (2.0 * w / 3.0, h / 3.0),
        (w / 3.0, 2.0 * h / 3.0),
        (2.0 * w / 3.0, 2.0 * h / 3.0),
    ];

    let min_dist = thirds_points
        .iter()
        .map(|(px, py)| ((cx - px).powi(2) + (cy - py).powi(2)).sqrt())
        .fold(f64::INFINITY, f64::min);

    let diagonal = ((w / 2.0).powi(2) + (h / 2.0).powi(2)).sqrt();
    if diagonal <= 0.0 {
        return 0.5;
    }

    let ratio = (min_dist / diagonal).clamp(0.0, 1.0);
    1.0 - ratio
}

/// Canny-edge density outside detected faces (§4.4 `Clutter`).
///
/// Operates on the downscaled BGR analysis image (§4.4 — only `Sharpness`
/// and `Motion` use the grayscale conversion); the grayscale pass needed by
/// `Canny` is an internal implementation detail of this function.
/// Higher means more clutter; the final score uses `1 - Clutter`.
pub fn clutter(analysis_image: &Mat, faces: &[BoundingBox]) -> ThumbResult<f64> {
    let width = analysis_image.cols();
    let height = analysis_image.rows();

    let mut gray = Mat::default();
    opencv::imgproc::cvt_color(analysis_image, &mut gray, opencv::imgproc::COLOR_BGR2GRAY, 0)?;

    let mut edges = Mat::default();
    opencv::imgproc::canny(&gray, &mut edges, CANNY_LOW, CANNY_HIGH, 3, false)?;

    for face in faces {
        let expanded = face.expand_clamped(CLUTTER_FACE_PAD_PX as f64, width as u32, height as u32);
        let rect_width = expanded.width.round() as i32;
        let rect_height = expanded.height.round() as i32;
        if rect_width <= 0 || rect_height <= 0 {
            continue;
        }
        let roi = opencv::core::Rect::new(expanded.x.round() as i32, expanded.y.round() as i32, rect_width, rect_height);
        let mut sub = Mat::roi_mut(&mut edges, roi)?;
        sub.set_to(&Scalar::all(0.0), &opencv::core::no_array())?;
    }

    let nonzero = opencv::core::count_non_zero(&edges)?;
    let area = (width as f64) * (height as f64);
    if area <= 0.0 {
        return Ok(0.0);
    }
    Ok(nonzero as f64 / area)
}

/// Overlay-zone safety (§4.4 `OverlaySafe`). `zones` are already in pixel
/// coordinates. Returns 1.0 when there are no zones.
///
/// Operates on the downscaled BGR analysis image (§4.4); the grayscale
/// pass needed by `Sobel` is an internal implementation detail.
pub fn overlay_safe(analysis_image: &Mat, zones_px: &[thumbpick_models::PixelRect], faces: &[BoundingBox], overlay_penalty_power: f64) -> ThumbResult<f64> {
    if zones_px.is_empty() {
        return Ok(1.0);
    }

    let mut gray = Mat::default();
    opencv::imgproc::cvt_color(analysis_image, &mut gray, opencv::imgproc::COLOR_BGR2GRAY, 0)?;

    let mut total_penalty = 0.0;
    for zone in zones_px {
        if zone.width <= 0 || zone.height <= 0 {
            total_penalty += 0.0;
            continue;
        }

        let roi = opencv::core::Rect::new(zone.x, zone.y, zone.width, zone.height);
        let sub = Mat::roi(&gray, roi)?;

        let mut sobel = Mat::default();
        opencv::imgproc::sobel(&sub, &mut sobel, opencv::core::CV_64F, 1, 1, 3, 1.0, 0.0, opencv::core::BORDER_DEFAULT)?;

        let mut mean = Scalar::default();
        let mut stddev = Scalar::default();
        opencv::core::mean_std_dev(&sobel, &mut mean, &mut stddev, &opencv::core::no_array())?;
        let edges_std = stddev[0];

        let busy = (edges_std / OVERLAY_BUSY_SCALE).min(1.0);

        let zone_rect = thumbpick_models::BoundingBox::new(zone.x as f64, zone.y as f64, zone.width as f64, zone.height as f64);
        let face_overlap = if faces.iter().any(|f| f.iou(&zone_rect) > OVERLAY_FACE_IOU_THRESHOLD) {
            1.0
        } else {
            0.0
        };

        total_penalty += (busy + face_overlap) / 2.0;
    }

    let norm = (total_penalty / zones_px.len() as f64).clamp(0.0, 1.0);
    Ok((1.0 - norm).powf(overlay_penalty_power))
}

/// Standard deviation of the absolute frame-to-frame grayscale difference
/// (§4.4 `Motion`). Returns 0.0 for the first frame of a session (no
/// previous frame).
pub fn motion(current_gray: &Mat, previous_gray: Option<&Mat>) -> ThumbResult<f64> {
    let Some(previous) = previous_gray else {
        return Ok(0.0);
    };

    let mut diff = Mat::default();
    opencv::core::absdiff(current_gray, previous, &mut diff)?;

    let mut mean = Scalar::default();
    let mut stddev = Scalar::default();
    opencv::core::mean_std_dev(&diff, &mut mean, &mut stddev, &opencv::core::no_array())?;

    Ok(stddev[0])
}

/// Midpoint-peaking temporal prior (§4.4 `TimePrior`).
pub fn time_prior(t: f64, duration_sec: f64) -> f64 {
    if duration_sec <= 0.0 {
        return 0.5;
    }
    let n = (t / duration_sec).clamp(0.0, 1.0);
    (1.0 - 2.0 * (n - 0.5).abs()).max(0.0)
}

/// Helper: an empty single-channel mask the size of `reference`, used in
/// tests that need a throwaway `Mat` without decoding a real frame.
#[cfg(test)]
pub(crate) fn zeros_like(reference: &Mat) -> ThumbResult<Mat> {
    Ok(Mat::new_rows_cols_with_default(
        reference.rows(),
        reference.cols(),
        CV_8UC1,
        Scalar::all(0.0),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_score_no_faces_is_zero() {
        assert_eq!(face_score(&[], 640, 360), 0.0);
    }

    #[test]
    fn face_score_clamped_to_one() {
        let faces = vec![BoundingBox::new(0.0, 0.0, 1000.0, 1000.0)];
        assert_eq!(face_score(&faces, 640, 360), 1.0);
    }

    #[test]
    fn centrality_no_faces_is_half() {
        assert_eq!(centrality(&[], 640, 360), 0.5);
    }

    #[test]
    fn centrality_at_thirds_point_is_one() {
        let w = 600.0;
        let h = 300.0;
        let size = 10.0;
        let cx = w / 3.0;
        let cy = h / 3.0;
        let faces = vec![BoundingBox::new(cx - size / 2.0, cy - size / 2.0, size, size)];
        let c = centrality(&faces, 600, 300);
        assert!(c > 0.99);
    }

    // S3
    #[test]
    fn time_prior_matches_scenarios() {
        assert!((time_prior(0.5, 1.0) - 1.0).abs() < 1e-9);
        assert!((time_prior(0.0, 1.0) - 0.0).abs() < 1e-9);
        assert!((time_prior(0.25, 1.0) - 0.5).abs() < 1e-9);
        assert_eq!(time_prior(0.5, 0.0), 0.5);
        assert_eq!(time_prior(100.0, 0.0), 0.5);
    }
}
