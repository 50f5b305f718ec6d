//! Neighbor Fetcher (§4.8).

use thumbpick_models::PixelRect;
use tracing::debug;

use crate::error::ThumbResult;
use crate::face_detector::{FaceDetector, FaceMode};
use crate::frame::FrameMetrics;
use crate::metrics::engine::MetricsEngine;
use crate::video_source::VideoSource;

/// Generate the default signed offsets `{-n, ..., -1, +1, ..., +n}`, ordered
/// by `(|offset|, offset)` (§4.8, §8.7).
pub fn default_offsets(n: i64) -> Vec<i64> {
    if n <= 0 {
        return Vec::new();
    }

    let mut offsets: Vec<i64> = Vec::new();
    for k in 1..=n {
        offsets.push(-k);
        offsets.push(k);
    }
    offsets.sort_by_key(|&o| (o.abs(), o));
    offsets
}

/// A scored neighbor frame, tagged with the offset that produced it.
pub struct NeighborResult {
    pub offset: i64,
    pub frame: FrameMetrics,
}

/// Fetch and score neighbor frames around each selected candidate (§4.8).
///
/// Runs through the **same** [`MetricsEngine`] as the main pass, which
/// deliberately perturbs its previous-luma state (§4.8, §9 — accepted,
/// since neighbors are never ranked against the main corpus).
pub struct NeighborFetcher<'a> {
    pub sample_rate_hz: f64,
    pub duration_sec: f64,
    pub face_mode: FaceMode,
    pub overlay_zones_px: &'a [PixelRect],
    pub overlay_penalty_power: f64,
}

impl<'a> NeighborFetcher<'a> {
    /// Fetch neighbors for one candidate timestamp, sorted by offset
    /// ascending (§4.8). Skips offsets landing before t=0 or at an
    /// unreadable seek, without failing the run.
    pub fn fetch_for_candidate(
        &self,
        candidate_t: f64,
        offsets: &[i64],
        video_source: &mut dyn VideoSource,
        engine: &mut MetricsEngine,
        face_detector: &mut dyn FaceDetector,
    ) -> ThumbResult<Vec<NeighborResult>> {
        let sample_interval = 1.0 / self.sample_rate_hz.max(1e-6);
        let mut sorted_offsets = offsets.to_vec();
        sorted_offsets.sort_by_key(|&o| (o.abs(), o));

        let mut results = Vec::new();

        for offset in sorted_offsets {
            let t = candidate_t + offset as f64 * sample_interval;
            if t < 0.0 {
                continue;
            }

            let decoded = match video_source.seek_and_read(t)? {
                Some(d) => d,
                None => {
                    debug!(t, offset, "neighbor seek produced no frame, skipping");
                    continue;
                }
            };

            let frame = engine.evaluate(
                t,
                decoded.mat,
                self.duration_sec,
                face_detector,
                self.face_mode,
                self.overlay_zones_px,
                self.overlay_penalty_power,
            )?;

            results.push(NeighborResult { offset, frame });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // §8.7
    #[test]
    fn default_offsets_match_expected_ordering() {
        let offsets = default_offsets(3);
        assert_eq!(offsets, vec![-1, 1, -2, 2, -3, 3]);
    }

    #[test]
    fn default_offsets_zero_or_negative_is_empty() {
        assert!(default_offsets(0).is_empty());
        assert!(default_offsets(-5).is_empty());
    }

    #[test]
    fn default_offsets_contain_exactly_plus_minus_n() {
        let offsets = default_offsets(4);
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(sorted, vec![-4, -3, -2, -1, 1, 2, 3, 4]);
    }
}
