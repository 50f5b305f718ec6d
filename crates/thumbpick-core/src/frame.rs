//! Per-frame scoring state (§3 `FrameMetrics`).

use thumbpick_models::BoundingBox;

/// The ten metric slots, in the fixed order used for normalization and
/// score combination (§4.4, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricVector {
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

impl MetricVector {
    /// Visit each of the ten slots by name, for normalization (§4.5).
    pub fn as_array(&self) -> [f64; 10] {
        [
            self.sharpness,
            self.exposure,
            self.contrast,
            self.colorfulness,
            self.face,
            self.centrality,
            self.clutter,
            self.overlay,
            self.motion,
            self.time_prior,
        ]
    }

    pub fn from_array(a: [f64; 10]) -> Self {
        Self {
            sharpness: a[0],
            exposure: a[1],
            contrast: a[2],
            colorfulness: a[3],
            face: a[4],
            centrality: a[5],
            clutter: a[6],
            overlay: a[7],
            motion: a[8],
            time_prior: a[9],
        }
    }
}

/// One evaluated sample: the sample time, its decoded images, detected
/// faces, raw/normalized metrics, and final score (§3).
///
/// Invariants (§3): raw values are set once at evaluation and never
/// overwritten; normalized values are only meaningful after the corpus-wide
/// `normalize` pass has run; `saved_path` is set at most once.
pub struct FrameMetrics {
    pub t: f64,
    pub full_image: opencv::core::Mat,
    pub analysis_image: opencv::core::Mat,
    pub faces: Vec<BoundingBox>,
    pub raw: MetricVector,
    pub normalized: MetricVector,
    pub score: f64,
    pub saved_path: Option<String>,
}

impl FrameMetrics {
    pub fn new(t: f64, full_image: opencv::core::Mat, analysis_image: opencv::core::Mat, faces: Vec<BoundingBox>, raw: MetricVector) -> Self {
        Self {
            t,
            full_image,
            analysis_image,
            faces,
            raw,
            normalized: MetricVector::default(),
            score: 0.0,
            saved_path: None,
        }
    }

    pub fn largest_face(&self) -> Option<&BoundingBox> {
        self.faces
            .iter()
            .max_by(|a, b| a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal))
    }
}
