//! Preset definitions consumed by the scoring pipeline.
//!
//! Loading, merging, and inline weight overrides for presets are a caller
//! concern (§1 Non-goals); this module only defines the shape a preset
//! must have once it reaches the core.

use serde::{Deserialize, Serialize};

use crate::rect::NormalizedRect;

/// How sample timestamps are derived from a preset when the caller does not
/// pass an explicit sample rate (§6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SamplingPolicy {
    /// `value` is a rate in samples per second.
    Fps { value: f64 },
    /// `value` is a rate in samples per minute; resolves to `value / 60` Hz.
    Fpm { value: f64 },
}

impl SamplingPolicy {
    /// Resolve to a sample rate in Hz.
    pub fn resolve_hz(&self) -> f64 {
        match self {
            SamplingPolicy::Fps { value } => *value,
            SamplingPolicy::Fpm { value } => value / 60.0,
        }
    }
}

/// Hard-reject and diversity thresholds (§4.6, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum raw Laplacian-variance sharpness to avoid hard rejection.
    pub sharp_min: f64,
    /// Minimum raw mean-L exposure to avoid hard rejection.
    pub l_min: f64,
    /// Maximum raw mean-L exposure to avoid hard rejection.
    pub l_max: f64,
    /// Minimum time separation (seconds) between any two ranked picks.
    pub temporal_min_gap_sec: f64,
    /// Minimum appearance distance between any two ranked picks.
    pub appearance_min_dist: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        // Matches the only concrete units given in the spec's open question (§9):
        // these are raw-domain thresholds, never compared against normalized values.
        Self {
            sharp_min: 50.0,
            l_min: 15.0,
            l_max: 240.0,
            temporal_min_gap_sec: 2.0,
            appearance_min_dist: 0.15,
        }
    }
}

/// The ten linear-combination weights of §4.5, in metric order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    pub sharpness: f64,
    pub exposure: f64,
    pub contrast: f64,
    pub colorfulness: f64,
    pub face: f64,
    pub centrality: f64,
    pub clutter: f64,
    pub overlay: f64,
    pub motion: f64,
    pub time_prior: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            sharpness: 0.20,
            exposure: 0.10,
            contrast: 0.10,
            colorfulness: 0.10,
            face: 0.15,
            centrality: 0.10,
            clutter: 0.05,
            overlay: 0.10,
            motion: 0.05,
            time_prior: 0.05,
        }
    }
}

impl MetricWeights {
    /// Sum of all ten weights (used by the score-bounds testable property, §8.3).
    pub fn sum(&self) -> f64 {
        self.sharpness
            + self.exposure
            + self.contrast
            + self.colorfulness
            + self.face
            + self.centrality
            + self.clutter
            + self.overlay
            + self.motion
            + self.time_prior
    }
}

/// A caller-supplied rectangle (normalized coordinates) where a future text
/// overlay is expected; frames whose content collides with it are penalized
/// (§4.4 `OverlaySafe`).
pub type OverlayZone = NormalizedRect;

/// A read-only preset consumed by the metrics engine and ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDefinition {
    pub name: String,
    #[serde(default)]
    pub require_face: bool,
    pub sampling: SamplingPolicy,
    pub weights: MetricWeights,
    pub thresholds: Thresholds,
    #[serde(default)]
    pub overlay_zones: Vec<OverlayZone>,
}

impl PresetDefinition {
    /// A permissive preset with default weights/thresholds and no overlay zones.
    pub fn default_named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            require_face: false,
            sampling: SamplingPolicy::Fps { value: 2.0 },
            weights: MetricWeights::default(),
            thresholds: Thresholds::default(),
            overlay_zones: Vec::new(),
        }
    }
}
