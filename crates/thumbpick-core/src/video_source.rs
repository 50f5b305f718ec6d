//! Video source capability (§4.2).
//!
//! `VideoSource` is expressed as a narrow trait rather than a concrete type
//! so tests can substitute an in-memory fake (§9 polymorphism note) instead
//! of decoding a real file.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ThumbError, ThumbResult};

/// Immutable per-run video metadata (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub path: String,
    pub duration_sec: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    /// Build metadata from raw probe values, applying the fps/duration
    /// fallbacks of §3.
    pub fn from_probe(path: impl Into<String>, fps: f64, width: u32, height: u32, frame_count: i64) -> Self {
        let fps = if fps <= 0.0 { 30.0 } else { fps };
        let duration_sec = if frame_count > 0 {
            frame_count as f64 / fps
        } else {
            0.0
        };

        Self {
            path: path.into(),
            duration_sec,
            fps,
            width,
            height,
        }
    }
}

/// A decoded BGR frame, analysis-resolution-agnostic (the Metrics Engine
/// performs its own downscale, §4.4).
pub struct DecodedFrame {
    pub mat: opencv::core::Mat,
}

/// The video decoding/seeking capability the pipeline consumes (§4.2).
///
/// Implementations must only fail on `open`; a failed `seek_and_read`
/// returns `Ok(None)` (local recovery, §7 `DecodeSkip`), never an `Err`.
pub trait VideoSource: Send {
    /// Metadata for the currently open video.
    fn metadata(&self) -> &VideoMetadata;

    /// Seek to an absolute timestamp and decode the frame there.
    ///
    /// Returns `Ok(None)` when the seek lands past end-of-stream or the
    /// decoder otherwise fails to produce a frame; this is not an error.
    fn seek_and_read(&mut self, time_sec: f64) -> ThumbResult<Option<DecodedFrame>>;
}

/// OpenCV-backed [`VideoSource`] (`cv::VideoCapture`).
///
/// Cascade/model discovery is out of scope for this crate (§1); this type
/// only opens the container the caller already located on disk.
pub struct OpenCvVideoSource {
    capture: opencv::videoio::VideoCapture,
    metadata: VideoMetadata,
}

impl OpenCvVideoSource {
    pub fn open(path: impl AsRef<Path>) -> ThumbResult<Self> {
        use opencv::prelude::*;
        use opencv::videoio::{self, VideoCapture};

        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(ThumbError::source_unopenable(format!(
                "file not found: {}",
                path_ref.display()
            )));
        }

        let path_str = path_ref.to_string_lossy().to_string();
        let capture = VideoCapture::from_file(&path_str, videoio::CAP_ANY)
            .map_err(|e| ThumbError::source_unopenable(format!("VideoCapture::from_file failed: {e}")))?;

        if !capture.is_opened().unwrap_or(false) {
            return Err(ThumbError::source_unopenable(format!(
                "failed to open video file: {path_str}"
            )));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0) as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0) as u32;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT).unwrap_or(0.0) as i64;

        let metadata = VideoMetadata::from_probe(path_str, fps, width, height, frame_count);
        debug!(?metadata, "opened video source");

        Ok(Self { capture, metadata })
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.metadata.path)
    }
}

impl VideoSource for OpenCvVideoSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek_and_read(&mut self, time_sec: f64) -> ThumbResult<Option<DecodedFrame>> {
        use opencv::core::Mat;
        use opencv::prelude::*;
        use opencv::videoio::CAP_PROP_POS_MSEC;

        if self.capture.set(CAP_PROP_POS_MSEC, time_sec * 1000.0).is_err() {
            warn!(t = time_sec, "seek failed, skipping frame");
            return Ok(None);
        }

        let mut frame = Mat::default();
        let success = match self.capture.read(&mut frame) {
            Ok(s) => s,
            Err(e) => {
                warn!(t = time_sec, error = %e, "read failed, skipping frame");
                return Ok(None);
            }
        };

        if !success || frame.empty() {
            debug!(t = time_sec, "no frame at timestamp (end of stream?)");
            return Ok(None);
        }

        Ok(Some(DecodedFrame { mat: frame }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_fps_falls_back_to_thirty() {
        let meta = VideoMetadata::from_probe("x.mp4", 0.0, 1920, 1080, 300);
        assert_eq!(meta.fps, 30.0);
        assert!((meta.duration_sec - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_frame_count_gives_zero_duration() {
        let meta = VideoMetadata::from_probe("x.mp4", 30.0, 1920, 1080, 0);
        assert_eq!(meta.duration_sec, 0.0);
    }

    #[test]
    fn negative_fps_falls_back_to_thirty() {
        let meta = VideoMetadata::from_probe("x.mp4", -5.0, 1920, 1080, 60);
        assert_eq!(meta.fps, 30.0);
        assert!((meta.duration_sec - 2.0).abs() < 1e-9);
    }
}
