//! Error types for the `framemood` crate.
//!
//! [`FramemoodError`] is the fatal tier: it aborts a run and is returned as a
//! single error with no partial log. Per-frame failures never surface here;
//! they are captured as [`ClassifyError`](crate::ClassifyError) values inside
//! the [`EmotionLog`](crate::EmotionLog).

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for fatal `framemood` failures.
///
/// Every public method that can abort a run returns
/// `Result<T, FramemoodError>`. Variants carry enough context to diagnose
/// the problem without additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramemoodError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the opener.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container opened but holds no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The video stream could not be prepared for decoding.
    #[error("Failed to decode video: {0}")]
    VideoDecodeError(String),

    /// The upload's container type is not one of the accepted formats.
    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    /// A stride of zero was configured.
    #[error("Stride must be greater than zero")]
    InvalidStride,

    /// A cap of zero was configured.
    #[error("Cap must be greater than zero")]
    InvalidCap,

    /// An outcome was recorded for an index not after the previous one.
    #[error("Frame {index} recorded out of order (last recorded frame was {last})")]
    OutOfOrderFrame {
        /// The index that was rejected.
        index: u64,
        /// The most recently recorded index.
        last: u64,
    },

    /// Whole-image classification failed.
    #[error("Image classification failed: {0}")]
    Classification(#[from] crate::classifier::ClassifyError),

    /// The classifier model could not be loaded.
    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad {
        /// Path to the model or labels file.
        path: PathBuf,
        /// Underlying reason the load failed.
        reason: String,
    },

    /// The requested feature was not compiled in.
    #[error("Feature `{0}` is not enabled in this build")]
    FeatureNotEnabled(&'static str),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while loading an image.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FramemoodError {
    fn from(error: FfmpegError) -> Self {
        FramemoodError::FfmpegError(error.to_string())
    }
}
