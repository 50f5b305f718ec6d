//! Pipeline Session: single-run orchestration of C1–C7 (§4.9).

use std::path::PathBuf;

use thumbpick_models::PresetDefinition;
use tracing::{info, instrument};

use crate::error::{ThumbError, ThumbResult};
use crate::face_detector::{FaceDetector, FaceMode};
use crate::manifest_writer::ManifestWriter;
use crate::metrics::engine::{MetricsEngine, DEFAULT_OVERLAY_PENALTY_POWER};
use crate::neighbors::{default_offsets, NeighborFetcher};
use crate::observability::PipelineMetrics;
use crate::progress::{ProgressEvent, ProgressSender, Stage};
use crate::ranker::select_top_k;
use crate::timestamp;
use crate::video_source::VideoSource;

/// Caller-supplied run parameters (§6).
pub struct SessionOptions {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub top_k: u32,
    pub neighbor_count: u32,
    pub neighbor_offsets: Option<Vec<i64>>,
    pub sample_rate_hz: Option<f64>,
    pub face_mode: FaceMode,
}

impl SessionOptions {
    fn validate(&self) -> ThumbResult<()> {
        if !self.input_path.exists() {
            return Err(ThumbError::config_invalid(format!(
                "input file does not exist: {}",
                self.input_path.display()
            )));
        }
        if self.top_k == 0 {
            return Err(ThumbError::config_invalid("top_k must be > 0"));
        }
        if let Some(rate) = self.sample_rate_hz {
            if rate <= 0.0 {
                return Err(ThumbError::config_invalid("sample_rate_hz must be > 0"));
            }
        }
        Ok(())
    }
}

/// Resolve the effective sampling rate (§6, §9 open question): an explicit
/// override wins; otherwise the preset's own policy (`fps` passthrough,
/// `fpm` divided by 60) is used. `PresetDefinition` always carries a
/// sampling policy, so the bare `min(fps, 2.0)` fallback only ever
/// surfaces through [`PresetDefinition::default_named`], which already
/// encodes it.
fn resolve_sample_rate(options: &SessionOptions, preset: &PresetDefinition) -> f64 {
    options.sample_rate_hz.unwrap_or_else(|| preset.sampling.resolve_hz())
}

/// Orchestrates a single end-to-end run: opens the video, samples and
/// scores frames, ranks candidates, fetches neighbors, and writes the
/// manifest (§4.9).
pub struct PipelineSession;

impl PipelineSession {
    #[instrument(skip(video_source, face_detector, preset, progress))]
    pub fn run(
        options: SessionOptions,
        preset: &PresetDefinition,
        video_source: &mut dyn VideoSource,
        face_detector: &mut dyn FaceDetector,
        progress: &ProgressSender,
    ) -> ThumbResult<(PathBuf, PipelineMetrics)> {
        options.validate()?;

        let mut metrics_stats = PipelineMetrics::new();
        let overlay_zones_px: Vec<_> = preset
            .overlay_zones
            .iter()
            .map(|z| z.to_pixels(video_source.metadata().width, video_source.metadata().height))
            .collect();

        progress.send(ProgressEvent::indeterminate(Stage::OpeningVideo, Some(options.input_path.display().to_string())));
        let metadata = video_source.metadata().clone();

        let resolved_fps = resolve_sample_rate(&options, preset);
        let timestamps = timestamp::generate(metadata.duration_sec, resolved_fps);

        let mut engine = MetricsEngine::new();
        let mut frames = Vec::with_capacity(timestamps.len());

        progress.send(ProgressEvent::new(Stage::SamplingFrames, 0, timestamps.len() as i64, None));
        for (i, &t) in timestamps.iter().enumerate() {
            let decoded = match video_source.seek_and_read(t)? {
                Some(d) => d,
                None => {
                    metrics_stats.record_decode_skip();
                    progress.send(ProgressEvent::new(Stage::SamplingFrames, i as u64 + 1, timestamps.len() as i64, None));
                    continue;
                }
            };

            let frame = engine.evaluate(
                t,
                decoded.mat,
                metadata.duration_sec,
                face_detector,
                options.face_mode,
                &overlay_zones_px,
                DEFAULT_OVERLAY_PENALTY_POWER,
            )?;

            metrics_stats.record_sample_evaluated();
            frames.push(frame);
            progress.send(ProgressEvent::new(Stage::SamplingFrames, i as u64 + 1, timestamps.len() as i64, None));

            for warning in face_detector.drain_warnings() {
                metrics_stats.record_warning();
                progress.warn(warning.to_string());
            }
        }

        progress.send(ProgressEvent::indeterminate(Stage::ScoringFrames, None));
        MetricsEngine::normalize(&mut frames);
        MetricsEngine::combine_scores(&mut frames, &preset.weights);

        let eligible_indices: Vec<usize> = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| !MetricsEngine::hard_reject(f, &preset.thresholds, preset.require_face))
            .map(|(i, _)| i)
            .collect();
        metrics_stats.frames_hard_rejected = (frames.len() - eligible_indices.len()) as u64;

        progress.send(ProgressEvent::indeterminate(Stage::SelectingTopCandidates, None));
        let selected_local = select_top_k(
            &frames,
            &eligible_indices,
            preset.thresholds.temporal_min_gap_sec,
            preset.thresholds.appearance_min_dist,
            options.top_k as usize,
        )?;
        metrics_stats.candidates_selected = selected_local.len() as u64;

        let writer = ManifestWriter::new(&options.output_dir);
        writer.prepare_directories()?;

        writer.write_frames(&mut frames)?;

        let offsets = options.neighbor_offsets.clone().unwrap_or_else(|| default_offsets(options.neighbor_count as i64));

        progress.send(ProgressEvent::indeterminate(Stage::FetchingNeighbors, None));
        let fetcher = NeighborFetcher {
            sample_rate_hz: resolved_fps,
            duration_sec: metadata.duration_sec,
            face_mode: options.face_mode,
            overlay_zones_px: &overlay_zones_px,
            overlay_penalty_power: DEFAULT_OVERLAY_PENALTY_POWER,
        };

        let mut top_entries = Vec::with_capacity(selected_local.len());
        for &frame_idx in &selected_local {
            let candidate_t = frames[frame_idx].t;

            let neighbor_results = fetcher.fetch_for_candidate(candidate_t, &offsets, video_source, &mut engine, face_detector)?;
            metrics_stats.neighbors_fetched += neighbor_results.len() as u64;

            for warning in face_detector.drain_warnings() {
                metrics_stats.record_warning();
                progress.warn(warning.to_string());
            }

            let main_path = writer.write_candidate_main(&frames[frame_idx])?;

            let mut neighbor_entries = Vec::with_capacity(neighbor_results.len());
            for neighbor in &neighbor_results {
                let path = writer.write_candidate_neighbor(candidate_t, neighbor)?;
                neighbor_entries.push(thumbpick_models::NeighborEntry {
                    dt: neighbor.offset as i32,
                    path,
                });
            }

            top_entries.push(ManifestWriter::top_entry(&frames[frame_idx], main_path, neighbor_entries));
        }

        progress.send(ProgressEvent::indeterminate(Stage::WritingManifest, None));
        let score_entries: Vec<_> = frames.iter().map(ManifestWriter::score_entry).collect();

        let manifest_path = writer.write_manifest(
            &metadata,
            &preset.name,
            resolved_fps,
            options.top_k,
            options.neighbor_count,
            frames.len() as u32,
            score_entries,
            top_entries,
        )?;

        progress.send(ProgressEvent::indeterminate(Stage::Completed, Some(manifest_path.display().to_string())));
        info!(path = %manifest_path.display(), frames = frames.len(), "session completed");

        Ok((manifest_path, metrics_stats))
    }
}
