//! Manifest Writer: filesystem layout, PNG persistence, manifest assembly
//! (§4.10, §6).

use std::path::{Path, PathBuf};

use opencv::core::Vector;
use thumbpick_models::{suggested_crop, Manifest, ManifestParameters, ManifestVideo, NeighborEntry, ScoreEntry, TopEntry};

use crate::error::{ThumbError, ThumbResult};
use crate::frame::FrameMetrics;
use crate::neighbors::NeighborResult;
use crate::video_source::VideoMetadata;

/// Format a sample time as the fixed `000000.000` layout used by every
/// filename in the output tree (§4.10).
fn format_time(t: f64) -> String {
    format!("{:010.3}", t)
}

pub fn frame_filename(t: f64) -> String {
    format!("f_{}.png", format_time(t))
}

pub fn candidate_main_filename(t: f64) -> String {
    format!("c_{}_main.png", format_time(t))
}

pub fn candidate_neighbor_filename(t: f64, offset: i64) -> String {
    let suffix = if offset >= 0 { format!("p{offset}") } else { format!("m{}", -offset) };
    format!("c_{}_{}.png", format_time(t), suffix)
}

/// Creates `<out>/frames` and `<out>/candidates`, writes every evaluated
/// frame's full-resolution image plus the selected candidates' and
/// neighbors' images, and assembles the manifest (§4.10, §6).
pub struct ManifestWriter<'a> {
    pub out_dir: &'a Path,
}

impl<'a> ManifestWriter<'a> {
    pub fn new(out_dir: &'a Path) -> Self {
        Self { out_dir }
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.out_dir.join("frames")
    }

    pub fn candidates_dir(&self) -> PathBuf {
        self.out_dir.join("candidates")
    }

    pub fn prepare_directories(&self) -> ThumbResult<()> {
        std::fs::create_dir_all(self.frames_dir())?;
        std::fs::create_dir_all(self.candidates_dir())?;
        Ok(())
    }

    fn write_png(&self, path: &Path, image: &opencv::core::Mat) -> ThumbResult<()> {
        let params = Vector::<i32>::new();
        let path_str = path.to_string_lossy().to_string();
        let ok = opencv::imgcodecs::imwrite(&path_str, image, &params)?;
        if !ok {
            return Err(ThumbError::write_failure(path, "imwrite returned false"));
        }
        Ok(())
    }

    /// Persist every evaluated frame's full-resolution image to
    /// `frames/f_{t}.png`, recording the saved path on each frame.
    pub fn write_frames(&self, frames: &mut [FrameMetrics]) -> ThumbResult<()> {
        for frame in frames.iter_mut() {
            let rel = format!("frames/{}", frame_filename(frame.t));
            let abs = self.out_dir.join(&rel);
            self.write_png(&abs, &frame.full_image)?;
            frame.saved_path = Some(rel);
        }
        Ok(())
    }

    /// Persist a candidate's main image and return its manifest-relative
    /// path.
    pub fn write_candidate_main(&self, frame: &FrameMetrics) -> ThumbResult<String> {
        let rel = format!("candidates/{}", candidate_main_filename(frame.t));
        let abs = self.out_dir.join(&rel);
        self.write_png(&abs, &frame.full_image)?;
        Ok(rel)
    }

    /// Persist a neighbor's image and return its manifest-relative path.
    pub fn write_candidate_neighbor(&self, candidate_t: f64, neighbor: &NeighborResult) -> ThumbResult<String> {
        let rel = format!("candidates/{}", candidate_neighbor_filename(candidate_t, neighbor.offset));
        let abs = self.out_dir.join(&rel);
        self.write_png(&abs, &neighbor.frame.full_image)?;
        Ok(rel)
    }

    /// Build a [`ScoreEntry`] from an evaluated frame. Requires
    /// `frame.saved_path` to already be set (i.e. `write_frames` has run).
    pub fn score_entry(frame: &FrameMetrics) -> ScoreEntry {
        let raw = &frame.raw;
        let n = &frame.normalized;
        ScoreEntry {
            t: frame.t,
            sharp: n.sharpness,
            sharp_raw: raw.sharpness,
            exposure: n.exposure,
            exposure_raw: raw.exposure,
            contrast: n.contrast,
            contrast_raw: raw.contrast,
            color: n.colorfulness,
            color_raw: raw.colorfulness,
            face: n.face,
            face_raw: raw.face,
            centrality: n.centrality,
            centrality_raw: raw.centrality,
            clutter: n.clutter,
            clutter_raw: raw.clutter,
            overlay: n.overlay,
            overlay_raw: raw.overlay,
            motion: n.motion,
            motion_raw: raw.motion,
            time: n.time_prior,
            time_raw: raw.time_prior,
            score: frame.score,
            path: frame.saved_path.clone().unwrap_or_default(),
        }
    }

    /// Build a [`TopEntry`] for a selected candidate, given its already
    /// file-written main path and neighbor entries.
    pub fn top_entry(frame: &FrameMetrics, main_path: String, neighbors: Vec<NeighborEntry>) -> TopEntry {
        let crop = suggested_crop(frame.full_image.cols().max(0) as u32, frame.full_image.rows().max(0) as u32);
        TopEntry {
            t: frame.t,
            score: frame.score,
            path: main_path,
            neighbors,
            suggested_crop: crop,
        }
    }

    /// Assemble the full manifest and write it to `<out>/manifest.json`.
    pub fn write_manifest(
        &self,
        video: &VideoMetadata,
        preset_name: &str,
        resolved_fps: f64,
        top_k: u32,
        neighbor_count: u32,
        frames_analyzed: u32,
        scores: Vec<ScoreEntry>,
        top: Vec<TopEntry>,
    ) -> ThumbResult<PathBuf> {
        let manifest = Manifest {
            video: ManifestVideo {
                path: video.path.clone(),
                duration_sec: video.duration_sec,
                fps: video.fps,
                width: video.width,
                height: video.height,
            },
            preset: preset_name.to_string(),
            parameters: ManifestParameters {
                fps: resolved_fps,
                top: top_k,
                neighbors: neighbor_count,
            },
            frames_analyzed,
            scores,
            top,
        };

        let path = self.out_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(&path, json).map_err(|e| ThumbError::write_failure(&path, e.to_string()))?;
        Ok(path)
    }
}
