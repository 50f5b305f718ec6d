//! Offline thumbnail-candidate scoring and selection pipeline.
//!
//! A session samples a video at a fixed rate, scores every sampled frame
//! against ten classical image-quality metrics, normalizes and ranks them
//! under temporal/appearance diversity constraints, fetches neighbor
//! frames around each pick, and emits a JSON manifest plus the PNG files
//! it references. See [`session::PipelineSession`] for the entry point.

pub mod error;
pub mod face_detector;
pub mod frame;
pub mod manifest_writer;
pub mod metrics;
pub mod neighbors;
pub mod observability;
pub mod progress;
pub mod ranker;
pub mod session;
pub mod timestamp;
pub mod video_source;

pub use error::{ThumbError, ThumbResult};
pub use face_detector::{CascadeFaceDetector, FaceDetector, FaceMode};
pub use frame::{FrameMetrics, MetricVector};
pub use manifest_writer::ManifestWriter;
pub use metrics::MetricsEngine;
pub use neighbors::{default_offsets, NeighborFetcher, NeighborResult};
pub use observability::PipelineMetrics;
pub use progress::{ProgressEvent, ProgressSender, Stage};
pub use session::{PipelineSession, SessionOptions};
pub use video_source::{DecodedFrame, OpenCvVideoSource, VideoMetadata, VideoSource};
