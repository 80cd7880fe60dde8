//! # framemood
//!
//! Sample frames from a video, classify each one with a pretrained emotion
//! model, and aggregate the labels into a display-ready report.
//!
//! The pipeline decodes a video strictly forward through FFmpeg (via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)), classifies every
//! `stride`-th frame whose index is below a hard cap, records one outcome per
//! sampled frame, and counts outcomes per label. A frame that fails to
//! classify is recorded under the `"error"` label; it never stops the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framemood::{AnalysisOptions, OnnxConfig, OnnxImageClassifier, VideoAnalyzer};
//!
//! let classifier = OnnxImageClassifier::load(OnnxConfig::new("emotion.onnx", "labels.txt"))?;
//! let mut analyzer = VideoAnalyzer::new(&classifier, AnalysisOptions::new());
//! let report = analyzer.analyze_file("input.mp4")?;
//!
//! for row in &report.rows {
//!     println!("frame {} -> {}", row.index, row.label);
//! }
//! # Ok::<(), framemood::FramemoodError>(())
//! ```
//!
//! ## Bring your own frames or model
//!
//! Anything that implements [`ImageClassifier`] can be plugged in, and any
//! [`FrameSource`] can be analyzed with [`VideoAnalyzer::run`]:
//!
//! ```
//! use framemood::{
//!     AnalysisOptions, ClassifyError, Frame, ImageClassifier, InMemorySource, Prediction,
//!     VideoAnalyzer, summarize,
//! };
//! use image::RgbImage;
//!
//! struct Calm;
//!
//! impl ImageClassifier for Calm {
//!     fn classify(&self, _image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
//!         Ok(vec![Prediction::new("neutral", 0.9)])
//!     }
//! }
//!
//! let frames = (0..25).map(|i| Frame::from_rgb_image(i, RgbImage::new(8, 8)));
//! let mut analyzer = VideoAnalyzer::new(&Calm, AnalysisOptions::new());
//! let log = analyzer.run(InMemorySource::new(frames))?;
//!
//! assert_eq!(log.indices(), vec![0, 10, 20]);
//! assert_eq!(summarize(&log).count("neutral"), 3);
//! # Ok::<(), framemood::FramemoodError>(())
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `onnx` | [`OnnxImageClassifier`] inference through ONNX Runtime |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build this crate. The
//! `onnx` feature loads the ONNX Runtime shared library at run time.

pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod onnx;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod sampler;
pub mod source;
pub mod text;
pub mod upload;
pub mod video_source;

pub use aggregator::{Aggregator, ERROR_LABEL, EmotionLog, FrameOutcome, SummaryTable, summarize};
pub use cache::ClassifierCache;
pub use classifier::{
    ClassifyError, FrameClassifier, ImageClassifier, Prediction, classify_image,
    classify_image_file,
};
pub use configuration::{AnalysisOptions, FrameOutputOptions};
pub use error::FramemoodError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::{Frame, PixelLayout};
pub use onnx::{OnnxConfig, OnnxImageClassifier};
pub use pipeline::{PipelineState, VideoAnalyzer};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use report::{FrameRow, LabelCount, Report};
pub use sampler::{DEFAULT_CAP, DEFAULT_STRIDE, SampleDecision, SampleSet, Sampler};
pub use source::{FrameSource, InMemorySource};
pub use text::{Sentiment, TextAnalysis, blend_emotion};
pub use upload::{Container, MediaKind, MediaUpload};
pub use video_source::VideoFrameSource;
