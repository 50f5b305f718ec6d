//! Shared data models for the thumbnail candidate selection pipeline.
//!
//! This crate carries plain, serializable types only: no I/O, no OpenCV
//! dependency. The pipeline itself lives in `thumbpick-core`.

pub mod manifest;
pub mod preset;
pub mod rect;

pub use manifest::{Manifest, ManifestParameters, ManifestVideo, NeighborEntry, ScoreEntry, TopEntry};
pub use preset::{MetricWeights, OverlayZone, PresetDefinition, SamplingPolicy, Thresholds};
pub use rect::{suggested_crop, BoundingBox, NormalizedRect, PixelRect, SuggestedCrop};
