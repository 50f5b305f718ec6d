//! Error types for the thumbnail candidate selection pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the core crate.
pub type ThumbResult<T> = Result<T, ThumbError>;

/// Errors the core pipeline can surface (§7).
///
/// `DecodeSkip` deliberately has no variant here: a failed per-frame
/// `seek_and_read` is local recovery (§7), represented as `Ok(None)` from
/// [`crate::video_source::VideoSource::seek_and_read`], never as an `Err`.
///
/// `DetectorMissing` is likewise never returned as an `Err`: a missing
/// cascade is a warning, not a failure (§7). The variant exists so a
/// missing-classifier warning carries a typed value through
/// [`crate::face_detector::FaceDetector::drain_warnings`] and the progress
/// channel, rather than being a bare string.
#[derive(Debug, Error)]
pub enum ThumbError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("could not open video source: {0}")]
    SourceUnopenable(String),

    #[error("face detector cascade missing: {0}")]
    DetectorMissing(String),

    #[error("failed to write {path}: {message}")]
    WriteFailure { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ThumbError {
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid(message.into())
    }

    pub fn source_unopenable(message: impl Into<String>) -> Self {
        Self::SourceUnopenable(message.into())
    }

    pub fn detector_missing(message: impl Into<String>) -> Self {
        Self::DetectorMissing(message.into())
    }

    pub fn write_failure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WriteFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
