//! FFmpeg frame source integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use framemood::{
    AnalysisOptions, ClassifyError, FrameOutputOptions, FrameSource, ImageClassifier,
    PipelineState, Prediction, VideoAnalyzer, VideoFrameSource, summarize,
};
use image::RgbImage;

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

struct Brightness;

impl ImageClassifier for Brightness {
    fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        let total: u64 = image.as_raw().iter().map(|&value| u64::from(value)).sum();
        let mean = total / image.as_raw().len().max(1) as u64;
        let label = if mean > 127 { "joy" } else { "sadness" };
        Ok(vec![Prediction::new(label, 1.0)])
    }
}

#[test]
fn frames_are_indexed_sequentially() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source =
        VideoFrameSource::open(path, &FrameOutputOptions::default()).expect("Failed to open fixture");
    let (width, height) = source.frame_dimensions();
    assert!(width > 0 && height > 0);

    let mut expected = 0;
    while let Some(frame) = source.next_frame() {
        assert_eq!(frame.index, expected);
        assert_eq!(frame.data.len(), frame.expected_len());
        expected += 1;
        if expected == 30 {
            break;
        }
    }
    assert_eq!(source.frames_decoded(), expected);

    source.close();
    assert!(source.next_frame().is_none(), "A closed source yields nothing");
}

#[test]
fn resized_output() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let options = FrameOutputOptions {
        width: Some(64),
        height: Some(48),
        ..FrameOutputOptions::default()
    };
    let mut source = VideoFrameSource::open(path, &options).expect("Failed to open fixture");
    assert_eq!(source.frame_dimensions(), (64, 48));

    let frame = source.next_frame().expect("Fixture should have frames");
    let image = frame.to_rgb_image().expect("Frame should convert");
    assert_eq!(image.dimensions(), (64, 48));
}

#[test]
fn analyze_fixture_end_to_end() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let options = AnalysisOptions::new().with_resolution(Some(32), None);
    let mut analyzer = VideoAnalyzer::new(&Brightness, options);
    let log = analyzer.run_file(path).expect("Failed to analyze fixture");

    assert!(!log.is_empty());
    assert!(log.indices().iter().all(|&index| index % 10 == 0 && index < 101));
    assert_eq!(log.failure_count(), 0);
    assert_eq!(summarize(&log).total(), log.len() as u64);
    assert_eq!(analyzer.state(), PipelineState::Closed);
}
