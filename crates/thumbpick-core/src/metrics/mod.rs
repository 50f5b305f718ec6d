//! The Metrics Engine (§4.4–§4.6): per-frame evaluation, corpus-wide
//! normalization, score combination, and hard-reject predicates.

pub mod engine;
pub mod raw;

pub use engine::MetricsEngine;
