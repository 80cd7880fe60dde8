//! Error handling integration tests.
//!
//! These tests verify that fatal failures surface as errors with no partial
//! results, and that the analyzer still ends in a closed state.

use std::path::Path;

use framemood::{
    AnalysisOptions, ClassifyError, Container, FramemoodError, ImageClassifier, MediaKind,
    MediaUpload, PipelineState, Prediction, VideoAnalyzer, classify_image_file,
};
use image::RgbImage;

struct Neutral;

impl ImageClassifier for Neutral {
    fn classify(&self, _image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        Ok(vec![Prediction::new("neutral", 1.0)])
    }
}

struct Empty;

impl ImageClassifier for Empty {
    fn classify(&self, _image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        Ok(Vec::new())
    }
}

#[test]
fn open_nonexistent_file() {
    let mut analyzer = VideoAnalyzer::new(&Neutral, AnalysisOptions::new());
    let result = analyzer.run_file("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
    assert_eq!(analyzer.state(), PipelineState::Closed);
}

#[test]
fn open_invalid_file() {
    // Create a temporary file with garbage content.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let mut analyzer = VideoAnalyzer::new(&Neutral, AnalysisOptions::new());
    let result = analyzer.analyze_file(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
    assert_eq!(analyzer.state(), PipelineState::Closed);
}

#[test]
fn garbage_upload_is_fatal() {
    let upload = MediaUpload::from_bytes(b"not really a quicktime file", Container::Mov)
        .expect("Failed to stage upload");
    assert_eq!(upload.len(), 27);

    let mut analyzer = VideoAnalyzer::new(&Neutral, AnalysisOptions::new());
    assert!(analyzer.analyze_upload(&upload).is_err());
}

#[test]
fn invalid_options_are_rejected_before_opening() {
    let mut analyzer = VideoAnalyzer::new(&Neutral, AnalysisOptions::new().with_stride(0));
    let result = analyzer.run_file("this_file_does_not_exist.mp4");
    assert!(matches!(result, Err(FramemoodError::InvalidStride)));
    assert_eq!(analyzer.state(), PipelineState::Closed);

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Stride"),
        "Error should mention the stride: {error_message}",
    );
}

#[test]
fn unsupported_container_extension() {
    let result = Container::expect_kind("clip.mkv", MediaKind::Video);
    assert!(matches!(result, Err(FramemoodError::UnsupportedContainer(_))));

    let result = Container::expect_kind("face.png", MediaKind::Video);
    assert!(result.is_err(), "An image container is not a video");
}

#[test]
fn image_classification_failures() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");

    let missing = temporary_directory.path().join("missing.png");
    assert!(classify_image_file(&Neutral, &missing).is_err());

    let garbage = temporary_directory.path().join("garbage.png");
    std::fs::write(&garbage, b"not a png").expect("Failed to write file");
    assert!(matches!(
        classify_image_file(&Neutral, &garbage),
        Err(FramemoodError::ImageError(_))
    ));

    let valid = temporary_directory.path().join("face.png");
    RgbImage::new(4, 4).save(&valid).expect("Failed to write image");
    let error = classify_image_file(&Empty, &valid).unwrap_err();
    assert!(matches!(
        error,
        FramemoodError::Classification(ClassifyError::NoPredictions)
    ));
}

#[test]
fn audio_only_file_has_no_video_stream() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut analyzer = VideoAnalyzer::new(&Neutral, AnalysisOptions::new());
    let result = analyzer.run_file(path);
    assert!(matches!(result, Err(FramemoodError::NoVideoStream)));
    assert_eq!(analyzer.state(), PipelineState::Closed);
}
