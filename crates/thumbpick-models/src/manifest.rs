//! Wire shape of `manifest.json` (§6). Field names are bit-exact.

use serde::{Deserialize, Serialize};

use crate::rect::SuggestedCrop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestVideo {
    pub path: String,
    #[serde(rename = "durationSec")]
    pub duration_sec: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestParameters {
    /// Resolved sample rate in Hz, not the preset's raw `value`.
    pub fps: f64,
    pub top: u32,
    pub neighbors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub t: f64,
    pub sharp: f64,
    #[serde(rename = "sharpRaw")]
    pub sharp_raw: f64,
    pub exposure: f64,
    #[serde(rename = "exposureRaw")]
    pub exposure_raw: f64,
    pub contrast: f64,
    #[serde(rename = "contrastRaw")]
    pub contrast_raw: f64,
    pub color: f64,
    #[serde(rename = "colorRaw")]
    pub color_raw: f64,
    pub face: f64,
    #[serde(rename = "faceRaw")]
    pub face_raw: f64,
    pub centrality: f64,
    #[serde(rename = "centralityRaw")]
    pub centrality_raw: f64,
    pub clutter: f64,
    #[serde(rename = "clutterRaw")]
    pub clutter_raw: f64,
    pub overlay: f64,
    #[serde(rename = "overlayRaw")]
    pub overlay_raw: f64,
    pub motion: f64,
    #[serde(rename = "motionRaw")]
    pub motion_raw: f64,
    pub time: f64,
    #[serde(rename = "timeRaw")]
    pub time_raw: f64,
    pub score: f64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEntry {
    /// Signed sample-interval offset from the owning candidate.
    pub dt: i32,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntry {
    pub t: f64,
    pub score: f64,
    pub path: String,
    pub neighbors: Vec<NeighborEntry>,
    #[serde(rename = "suggestedCrop")]
    pub suggested_crop: SuggestedCrop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub video: ManifestVideo,
    pub preset: String,
    pub parameters: ManifestParameters,
    #[serde(rename = "framesAnalyzed")]
    pub frames_analyzed: u32,
    pub scores: Vec<ScoreEntry>,
    pub top: Vec<TopEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> Manifest {
        Manifest {
            video: ManifestVideo {
                path: "in.mp4".into(),
                duration_sec: 10.0,
                fps: 30.0,
                width: 1920,
                height: 1080,
            },
            preset: "default".into(),
            parameters: ManifestParameters {
                fps: 2.0,
                top: 3,
                neighbors: 1,
            },
            frames_analyzed: 21,
            scores: vec![],
            top: vec![TopEntry {
                t: 5.0,
                score: 0.8,
                path: "candidates/c_000005.000_main.png".into(),
                neighbors: vec![NeighborEntry {
                    dt: -1,
                    path: "candidates/c_000005.000_m1.png".into(),
                }],
                suggested_crop: SuggestedCrop::new(0, 0, 1920, 1080),
            }],
        }
    }

    // §8.8 — manifest round-trip is stable under repeated (de)serialization.
    #[test]
    fn manifest_round_trips() {
        let manifest = sample_manifest();
        let json = serde_json::to_string(&manifest).unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        let json2 = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, json2);
    }

    #[test]
    fn field_names_are_bit_exact() {
        let manifest = sample_manifest();
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("durationSec").is_some());
        assert!(json["top"][0].get("suggestedCrop").is_some());
        assert!(json["top"][0]["suggestedCrop"].get("X").is_some());
    }
}
