//! Face Detector Bank (§4.3).
//!
//! Cascade *discovery* (locating `.xml` files on disk) is out of scope
//! (§1); callers load classifiers and inject them here.

use thumbpick_models::BoundingBox;
use tracing::warn;

use crate::error::{ThumbError, ThumbResult};

/// Which cascade combination to run for a frame (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceMode {
    /// Frontal ∪ profile cascades.
    Default,
    /// Eye-with-glasses cascade, expanded to a face-sized box.
    Glasses,
    /// Smile cascade.
    Smile,
}

/// The face-detection capability the pipeline consumes (§4.3).
///
/// A narrow trait so tests can substitute a canned face list (§9).
pub trait FaceDetector: Send {
    /// Detect faces in a grayscale analysis-resolution image.
    ///
    /// Returned rectangles are in the image's own coordinates, clamped to
    /// bounds and deduplicated. Never fails: a missing classifier for the
    /// requested mode yields an empty result plus a queued `DetectorMissing`
    /// warning, retrievable via [`FaceDetector::drain_warnings`].
    fn detect(&mut self, gray: &opencv::core::Mat, mode: FaceMode) -> ThumbResult<Vec<BoundingBox>>;

    /// Drain `DetectorMissing` warnings accumulated since the last call
    /// (§7 propagation policy). Default: no warnings, for detectors (and
    /// test fakes) that never have a missing cascade.
    fn drain_warnings(&mut self) -> Vec<ThumbError> {
        Vec::new()
    }
}

struct CascadeParams {
    scale_factor: f64,
    min_neighbors: i32,
    min_size: i32,
}

const FRONTAL_PARAMS: CascadeParams = CascadeParams {
    scale_factor: 1.1,
    min_neighbors: 5,
    min_size: 60,
};
const PROFILE_PARAMS: CascadeParams = CascadeParams {
    scale_factor: 1.1,
    min_neighbors: 4,
    min_size: 60,
};
const GLASSES_PARAMS: CascadeParams = CascadeParams {
    scale_factor: 1.05,
    min_neighbors: 3,
    min_size: 30,
};
const SMILE_PARAMS: CascadeParams = CascadeParams {
    scale_factor: 1.1,
    min_neighbors: 20,
    min_size: 30,
};

/// Eye-to-face expansion factors (§4.3 `Glasses` mode).
const GLASSES_WIDTH_FACTOR: f64 = 2.2;
const GLASSES_HEIGHT_FACTOR: f64 = 3.2;
const GLASSES_X_SHIFT_FACTOR: f64 = -0.6;
const GLASSES_Y_SHIFT_FACTOR: f64 = -1.2;

/// Haar-cascade-bank implementation of [`FaceDetector`].
///
/// Each cascade is optional: a `None` slot means that classifier was not
/// available to the caller and detections for it are silently skipped
/// (§4.3, §7 `DetectorMissing`).
pub struct CascadeFaceDetector {
    frontal: Option<opencv::objdetect::CascadeClassifier>,
    profile: Option<opencv::objdetect::CascadeClassifier>,
    glasses: Option<opencv::objdetect::CascadeClassifier>,
    smile: Option<opencv::objdetect::CascadeClassifier>,
    warnings: Vec<ThumbError>,
}

impl CascadeFaceDetector {
    pub fn new(
        frontal: Option<opencv::objdetect::CascadeClassifier>,
        profile: Option<opencv::objdetect::CascadeClassifier>,
        glasses: Option<opencv::objdetect::CascadeClassifier>,
        smile: Option<opencv::objdetect::CascadeClassifier>,
    ) -> Self {
        Self {
            frontal,
            profile,
            glasses,
            smile,
            warnings: Vec::new(),
        }
    }

    fn missing(&mut self, cascade: &str) {
        warn!("{cascade} cascade missing, skipping");
        self.warnings.push(ThumbError::detector_missing(format!("{cascade} cascade missing, skipping")));
    }

    fn run_cascade(
        classifier: &mut opencv::objdetect::CascadeClassifier,
        gray: &opencv::core::Mat,
        params: &CascadeParams,
    ) -> ThumbResult<Vec<BoundingBox>> {
        use opencv::core::{Size, Vector};
        use opencv::objdetect::CascadeClassifierTrait;

        let mut rects = Vector::<opencv::core::Rect>::new();
        classifier.detect_multi_scale(
            gray,
            &mut rects,
            params.scale_factor,
            params.min_neighbors,
            0,
            Size::new(params.min_size, params.min_size),
            Size::new(0, 0),
        )?;

        Ok(rects
            .iter()
            .map(|r| BoundingBox::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64))
            .collect())
    }

    fn expand_eye_to_face(eye: &BoundingBox) -> BoundingBox {
        let w = eye.width * GLASSES_WIDTH_FACTOR;
        let h = eye.height * GLASSES_HEIGHT_FACTOR;
        let x = eye.x + eye.width * GLASSES_X_SHIFT_FACTOR;
        let y = eye.y + eye.height * GLASSES_Y_SHIFT_FACTOR;
        BoundingBox::new(x, y, w, h)
    }
}

fn clamp_to_bounds(b: &BoundingBox, width: i32, height: i32) -> BoundingBox {
    let w = width as f64;
    let h = height as f64;
    let x = b.x.max(0.0).min(w);
    let y = b.y.max(0.0).min(h);
    let x2 = b.x2().max(0.0).min(w);
    let y2 = b.y2().max(0.0).min(h);
    BoundingBox::new(x, y, (x2 - x).max(0.0), (y2 - y).max(0.0))
}

fn dedupe(mut rects: Vec<BoundingBox>) -> Vec<BoundingBox> {
    let mut kept: Vec<BoundingBox> = Vec::new();
    rects.retain(|r| r.area() > 0.0);
    for r in rects {
        if kept.iter().any(|k| k.iou(&r) > 0.6) {
            continue;
        }
        kept.push(r);
    }
    kept
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, gray: &opencv::core::Mat, mode: FaceMode) -> ThumbResult<Vec<BoundingBox>> {
        use opencv::prelude::*;

        let width = gray.cols();
        let height = gray.rows();

        let mut raw: Vec<BoundingBox> = Vec::new();

        match mode {
            FaceMode::Default => {
                if let Some(c) = self.frontal.as_mut() {
                    raw.extend(Self::run_cascade(c, gray, &FRONTAL_PARAMS)?);
                } else {
                    self.missing("frontal");
                }
                if let Some(c) = self.profile.as_mut() {
                    raw.extend(Self::run_cascade(c, gray, &PROFILE_PARAMS)?);
                } else {
                    self.missing("profile");
                }
            }
            FaceMode::Glasses => {
                if let Some(c) = self.glasses.as_mut() {
                    let eyes = Self::run_cascade(c, gray, &GLASSES_PARAMS)?;
                    raw.extend(eyes.iter().map(Self::expand_eye_to_face));
                } else {
                    self.missing("glasses");
                }
            }
            FaceMode::Smile => {
                if let Some(c) = self.smile.as_mut() {
                    raw.extend(Self::run_cascade(c, gray, &SMILE_PARAMS)?);
                } else {
                    self.missing("smile");
                }
            }
        }

        let clamped: Vec<BoundingBox> = raw.iter().map(|r| clamp_to_bounds(r, width, height)).collect();
        Ok(dedupe(clamped))
    }

    fn drain_warnings(&mut self) -> Vec<ThumbError> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_eye_to_face_applies_spec_factors() {
        let eye = BoundingBox::new(100.0, 100.0, 20.0, 10.0);
        let face = CascadeFaceDetector::expand_eye_to_face(&eye);
        assert!((face.width - 44.0).abs() < 1e-9);
        assert!((face.height - 32.0).abs() < 1e-9);
        assert!((face.x - (100.0 - 12.0)).abs() < 1e-9);
        assert!((face.y - (100.0 - 12.0)).abs() < 1e-9);
    }

    #[test]
    fn clamp_to_bounds_clips_negative_and_overflow() {
        let b = BoundingBox::new(-10.0, -10.0, 50.0, 50.0);
        let c = clamp_to_bounds(&b, 30, 30);
        assert_eq!(c.x, 0.0);
        assert_eq!(c.y, 0.0);
        assert!(c.width <= 30.0);
        assert!(c.height <= 30.0);
    }

    #[test]
    fn dedupe_merges_overlapping_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(5.0, 5.0, 100.0, 100.0);
        let c = BoundingBox::new(500.0, 500.0, 40.0, 40.0);
        let result = dedupe(vec![a, b, c]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn dedupe_drops_degenerate_boxes() {
        let zero = BoundingBox::new(0.0, 0.0, 0.0, 10.0);
        let real = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        let result = dedupe(vec![zero, real]);
        assert_eq!(result.len(), 1);
    }
}
