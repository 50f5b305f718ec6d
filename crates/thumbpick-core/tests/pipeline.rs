//! End-to-end pipeline test against deterministic fakes (§9 design notes:
//! `VideoSource` and `FaceDetector` are narrow capability traits so tests
//! never need a real video file or cascade classifier).

use opencv::core::{Mat, Scalar, CV_8UC3};
use thumbpick_core::{DecodedFrame, FaceDetector, FaceMode, PipelineSession, SessionOptions, VideoMetadata, VideoSource};
use thumbpick_core::error::ThumbResult;
use thumbpick_models::{BoundingBox, PresetDefinition};

struct FakeVideoSource {
    metadata: VideoMetadata,
}

impl FakeVideoSource {
    fn new(duration_sec: f64, fps: f64, width: u32, height: u32) -> Self {
        Self {
            metadata: VideoMetadata {
                path: "fake.mp4".to_string(),
                duration_sec,
                fps,
                width,
                height,
            },
        }
    }
}

impl VideoSource for FakeVideoSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek_and_read(&mut self, time_sec: f64) -> ThumbResult<Option<DecodedFrame>> {
        if time_sec > self.metadata.duration_sec {
            return Ok(None);
        }

        // A deterministic synthetic frame: brightness drifts with time so
        // sharpness/exposure/motion are not all identical across samples.
        let brightness = (120.0 + 40.0 * (time_sec * 3.0).sin()) as u8;
        let mat = Mat::new_rows_cols_with_default(
            self.metadata.height as i32,
            self.metadata.width as i32,
            CV_8UC3,
            Scalar::new(brightness as f64, brightness as f64, brightness as f64, 0.0),
        )?;

        Ok(Some(DecodedFrame { mat }))
    }
}

struct FakeFaceDetector {
    canned: Vec<BoundingBox>,
}

impl FaceDetector for FakeFaceDetector {
    fn detect(&mut self, _gray: &opencv::core::Mat, _mode: FaceMode) -> ThumbResult<Vec<BoundingBox>> {
        Ok(self.canned.clone())
    }
}

#[test]
fn full_session_produces_manifest_and_candidate_files() {
    let tmp = tempfile::tempdir().unwrap();

    let mut video_source = FakeVideoSource::new(10.0, 30.0, 320, 180);
    let mut face_detector = FakeFaceDetector { canned: Vec::new() };
    let preset = PresetDefinition::default_named("default");

    let options = SessionOptions {
        input_path: tmp.path().join("input.mp4"),
        output_dir: tmp.path().join("out"),
        top_k: 2,
        neighbor_count: 1,
        neighbor_offsets: None,
        sample_rate_hz: Some(2.0),
        face_mode: FaceMode::Default,
    };

    // validate() checks the input file exists; the fake source doesn't
    // read it, so create a placeholder.
    std::fs::write(&options.input_path, b"not a real video").unwrap();

    let (tx, _rx) = thumbpick_core::progress::channel();

    let (manifest_path, stats) = PipelineSession::run(options, &preset, &mut video_source, &mut face_detector, &tx).unwrap();

    assert!(manifest_path.exists());
    assert!(stats.frames_sampled > 0);
    assert!(stats.candidates_selected <= 2);

    let manifest_json = std::fs::read_to_string(&manifest_path).unwrap();
    let manifest: thumbpick_models::Manifest = serde_json::from_str(&manifest_json).unwrap();

    assert_eq!(manifest.video.width, 320);
    assert!(manifest.top.len() <= 2);
    for entry in &manifest.top {
        let full_path = manifest_path.parent().unwrap().join(&entry.path);
        assert!(full_path.exists(), "candidate main file missing: {}", entry.path);
        for neighbor in &entry.neighbors {
            let neighbor_path = manifest_path.parent().unwrap().join(&neighbor.path);
            assert!(neighbor_path.exists(), "neighbor file missing: {}", neighbor.path);
        }
    }
}

#[test]
fn require_face_preset_rejects_all_frames_without_faces() {
    let tmp = tempfile::tempdir().unwrap();

    let mut video_source = FakeVideoSource::new(4.0, 30.0, 320, 180);
    let mut face_detector = FakeFaceDetector { canned: Vec::new() };
    let mut preset = PresetDefinition::default_named("faces-only");
    preset.require_face = true;

    let options = SessionOptions {
        input_path: tmp.path().join("input.mp4"),
        output_dir: tmp.path().join("out"),
        top_k: 3,
        neighbor_count: 0,
        neighbor_offsets: None,
        sample_rate_hz: Some(1.0),
        face_mode: FaceMode::Default,
    };
    std::fs::write(&options.input_path, b"placeholder").unwrap();

    let (tx, _rx) = thumbpick_core::progress::channel();
    let (manifest_path, _stats) = PipelineSession::run(options, &preset, &mut video_source, &mut face_detector, &tx).unwrap();

    let manifest_json = std::fs::read_to_string(&manifest_path).unwrap();
    let manifest: thumbpick_models::Manifest = serde_json::from_str(&manifest_json).unwrap();
    assert!(manifest.top.is_empty());
}

#[test]
fn config_invalid_on_missing_input_file() {
    let tmp = tempfile::tempdir().unwrap();
    let mut video_source = FakeVideoSource::new(4.0, 30.0, 320, 180);
    let mut face_detector = FakeFaceDetector { canned: Vec::new() };
    let preset = PresetDefinition::default_named("default");

    let options = SessionOptions {
        input_path: tmp.path().join("does-not-exist.mp4"),
        output_dir: tmp.path().join("out"),
        top_k: 1,
        neighbor_count: 0,
        neighbor_offsets: None,
        sample_rate_hz: Some(1.0),
        face_mode: FaceMode::Default,
    };

    let (tx, _rx) = thumbpick_core::progress::channel();
    let result = PipelineSession::run(options, &preset, &mut video_source, &mut face_detector, &tx);
    assert!(matches!(result, Err(thumbpick_core::ThumbError::ConfigInvalid(_))));
}
