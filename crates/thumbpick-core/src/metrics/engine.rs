//! Metrics Engine: evaluation, normalization, combination, hard-reject
//! (§4.4, §4.5, §4.6).

use opencv::core::Mat;
use opencv::prelude::*;
use thumbpick_models::{MetricWeights, PixelRect, Thresholds};
use tracing::debug;

use crate::error::ThumbResult;
use crate::face_detector::{FaceDetector, FaceMode};
use crate::frame::{FrameMetrics, MetricVector};
use crate::metrics::raw;

/// Target analysis-image width; aspect ratio preserved, no upscaling
/// (§4.4, §9 numeric semantics — a design constant, not a preset knob).
pub const ANALYSIS_WIDTH: u32 = 640;

/// Default overlay-penalty exponent (§4.4 `OverlaySafe`, §9).
pub const DEFAULT_OVERLAY_PENALTY_POWER: f64 = 1.0;

/// Downscale a BGR frame to [`ANALYSIS_WIDTH`], preserving aspect ratio.
/// Frames already at or below the target width are returned unchanged.
pub fn downscale(full: &Mat) -> ThumbResult<Mat> {
    let width = full.cols();
    let height = full.rows();

    if width <= ANALYSIS_WIDTH as i32 || width <= 0 {
        return Ok(full.clone());
    }

    let scale = ANALYSIS_WIDTH as f64 / width as f64;
    let target_height = (height as f64 * scale).round() as i32;

    let mut resized = Mat::default();
    opencv::imgproc::resize(
        full,
        &mut resized,
        opencv::core::Size::new(ANALYSIS_WIDTH as i32, target_height.max(1)),
        0.0,
        0.0,
        opencv::imgproc::INTER_AREA,
    )?;
    Ok(resized)
}

fn to_gray(bgr: &Mat) -> ThumbResult<Mat> {
    let mut gray = Mat::default();
    opencv::imgproc::cvt_color(bgr, &mut gray, opencv::imgproc::COLOR_BGR2GRAY, 0)?;
    Ok(gray)
}

/// Stateful per-session evaluator: owns the previous-luma frame used for
/// motion (§4.4, §9 — the only process-wide state besides the classifier
/// bank, scoped to one session).
pub struct MetricsEngine {
    previous_gray: Option<Mat>,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self { previous_gray: None }
    }

    /// Evaluate a single decoded frame: downscale, run all ten raw metrics,
    /// detect faces, and advance the previous-luma state.
    ///
    /// Used for both the main sampling pass and the neighbor pass (§4.8) —
    /// the neighbor pass intentionally shares (and perturbs) this engine's
    /// previous-frame state, per §9's accepted trade-off.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        &mut self,
        t: f64,
        full_image: Mat,
        duration_sec: f64,
        face_detector: &mut dyn FaceDetector,
        face_mode: FaceMode,
        overlay_zones_px: &[PixelRect],
        overlay_penalty_power: f64,
    ) -> ThumbResult<FrameMetrics> {
        let analysis_image = downscale(&full_image)?;
        let gray = to_gray(&analysis_image)?;

        let faces = face_detector.detect(&gray, face_mode)?;

        let sharp = raw::sharpness(&gray)?;
        let (exposure, contrast) = raw::exposure_and_contrast(&analysis_image)?;
        let color = raw::colorfulness(&analysis_image)?;
        let width = analysis_image.cols() as u32;
        let height = analysis_image.rows() as u32;
        let face_score = raw::face_score(&faces, width, height);
        let centrality = raw::centrality(&faces, width, height);
        let clutter = raw::clutter(&analysis_image, &faces)?;
        let overlay = raw::overlay_safe(&analysis_image, overlay_zones_px, &faces, overlay_penalty_power)?;
        let motion = raw::motion(&gray, self.previous_gray.as_ref())?;
        let time_prior = raw::time_prior(t, duration_sec);

        self.previous_gray = Some(gray);

        let raw_metrics = MetricVector {
            sharpness: sharp,
            exposure,
            contrast,
            colorfulness: color,
            face: face_score,
            centrality,
            clutter,
            overlay,
            motion,
            time_prior,
        };

        Ok(FrameMetrics::new(t, full_image, analysis_image, faces, raw_metrics))
    }

    /// Independently min-max normalize each of the ten raw metrics across
    /// the whole corpus, overwriting `normalized` on every frame (§4.5).
    pub fn normalize(frames: &mut [FrameMetrics]) {
        if frames.is_empty() {
            return;
        }

        let mut mins = [f64::INFINITY; 10];
        let mut maxs = [f64::NEG_INFINITY; 10];

        for frame in frames.iter() {
            let values = frame.raw.as_array();
            for i in 0..10 {
                mins[i] = mins[i].min(values[i]);
                maxs[i] = maxs[i].max(values[i]);
            }
        }

        let ranges: [f64; 10] = std::array::from_fn(|i| (maxs[i] - mins[i]).max(1e-6));

        for frame in frames.iter_mut() {
            let values = frame.raw.as_array();
            let normalized: [f64; 10] = std::array::from_fn(|i| {
                if maxs[i] == mins[i] {
                    0.0
                } else {
                    ((values[i] - mins[i]) / ranges[i]).clamp(0.0, 1.0)
                }
            });
            frame.normalized = MetricVector::from_array(normalized);
        }

        debug!(frame_count = frames.len(), "normalized metric corpus");
    }

    /// Compute and store the final weighted score for every frame (§4.5).
    /// Must run after `normalize`.
    pub fn combine_scores(frames: &mut [FrameMetrics], weights: &MetricWeights) {
        for frame in frames.iter_mut() {
            let n = &frame.normalized;
            frame.score = weights.sharpness * n.sharpness
                + weights.exposure * n.exposure
                + weights.contrast * n.contrast
                + weights.colorfulness * n.colorfulness
                + weights.face * n.face
                + weights.centrality * n.centrality
                + weights.clutter * (1.0 - n.clutter)
                + weights.overlay * n.overlay
                + weights.motion * (1.0 - n.motion)
                + weights.time_prior * n.time_prior;
        }
    }

    /// Hard-reject predicate, tested against **raw** values only (§4.6).
    pub fn hard_reject(frame: &FrameMetrics, thresholds: &Thresholds, require_face: bool) -> bool {
        let raw = &frame.raw;
        raw.sharpness < thresholds.sharp_min
            || raw.exposure < thresholds.l_min
            || raw.exposure > thresholds.l_max
            || (require_face && raw.face <= 0.0)
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MetricVector;
    use opencv::core::Mat;

    fn frame_with_sharpness(t: f64, sharpness: f64) -> FrameMetrics {
        let raw = MetricVector {
            sharpness,
            exposure: 100.0,
            contrast: 10.0,
            colorfulness: 5.0,
            face: 0.0,
            centrality: 0.5,
            clutter: 0.1,
            overlay: 1.0,
            motion: 0.0,
            time_prior: 0.5,
        };
        FrameMetrics::new(t, Mat::default(), Mat::default(), Vec::new(), raw)
    }

    // S4
    #[test]
    fn normalization_matches_scenario() {
        let mut frames = vec![frame_with_sharpness(0.0, 10.0), frame_with_sharpness(1.0, 30.0), frame_with_sharpness(2.0, 20.0)];
        MetricsEngine::normalize(&mut frames);
        assert!((frames[0].normalized.sharpness - 0.0).abs() < 1e-9);
        assert!((frames[1].normalized.sharpness - 1.0).abs() < 1e-9);
        assert!((frames[2].normalized.sharpness - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalization_all_equal_maps_to_zero() {
        let mut frames = vec![frame_with_sharpness(0.0, 42.0), frame_with_sharpness(1.0, 42.0)];
        MetricsEngine::normalize(&mut frames);
        assert_eq!(frames[0].normalized.sharpness, 0.0);
        assert_eq!(frames[1].normalized.sharpness, 0.0);
    }

    #[test]
    fn hard_reject_checks_raw_not_normalized() {
        let thresholds = Thresholds {
            sharp_min: 50.0,
            l_min: 15.0,
            l_max: 240.0,
            temporal_min_gap_sec: 2.0,
            appearance_min_dist: 0.15,
        };
        let low_sharp = frame_with_sharpness(0.0, 10.0);
        assert!(MetricsEngine::hard_reject(&low_sharp, &thresholds, false));

        let ok = frame_with_sharpness(0.0, 100.0);
        assert!(!MetricsEngine::hard_reject(&ok, &thresholds, false));
    }

    #[test]
    fn hard_reject_require_face() {
        let thresholds = Thresholds::default();
        let no_face = frame_with_sharpness(0.0, 100.0);
        assert!(MetricsEngine::hard_reject(&no_face, &thresholds, true));
    }

    #[test]
    fn score_bounds_within_weight_sum() {
        let mut frames = vec![frame_with_sharpness(0.0, 10.0), frame_with_sharpness(1.0, 30.0)];
        MetricsEngine::normalize(&mut frames);
        let weights = MetricWeights::default();
        MetricsEngine::combine_scores(&mut frames, &weights);
        let sum = weights.sum();
        for f in &frames {
            assert!(f.score >= -1e-9 && f.score <= sum + 1e-9);
        }
    }
}
