//! Classifier capability and the per-frame adapter around it.
//!
//! [`ImageClassifier`] is the boundary to whatever model actually does the
//! work: one RGB image in, a ranked list of [`Prediction`]s out.
//! [`FrameClassifier`] adapts it to the video pipeline's contract (top label
//! only, no confidence) and turns every failure it can observe, including a
//! panic inside the model, into a [`ClassifyError`] for that one frame.
//!
//! Whole-image classification ([`classify_image`]) keeps the confidence of the
//! top prediction and reports failure as a single fatal error.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::Arc,
};

use image::{DynamicImage, RgbImage};
use thiserror::Error;

use crate::{error::FramemoodError, frame::Frame};

/// One entry of a classifier's ranked output.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Class label, e.g. `"joy"`.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Prediction {
    /// Create a prediction. `confidence` is clamped to `[0, 1]`.
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
        }
    }
}

/// Why classifying one image failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassifyError {
    /// The frame could not be converted to an RGB image.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The model runtime reported an error.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The classifier returned an empty ranking.
    #[error("Classifier returned no predictions")]
    NoPredictions,

    /// The classifier panicked.
    #[error("Classifier panicked: {0}")]
    Panicked(String),
}

/// An image classification capability.
///
/// Implementations return predictions ranked best-first. Only the first entry
/// is consumed by the video pipeline.
pub trait ImageClassifier {
    /// Classify one RGB image.
    fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError>;
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for Arc<T> {
    fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        (**self).classify(image)
    }
}

/// Adapts an [`ImageClassifier`] to "label for one frame".
pub struct FrameClassifier<'a, C: ?Sized> {
    classifier: &'a C,
}

impl<'a, C: ImageClassifier + ?Sized> FrameClassifier<'a, C> {
    pub fn new(classifier: &'a C) -> Self {
        Self { classifier }
    }

    /// Classify a frame and return its top label.
    ///
    /// # Errors
    ///
    /// Any failure is returned as a [`ClassifyError`]; this method never
    /// panics, even when the wrapped classifier does.
    pub fn classify(&self, frame: &Frame) -> Result<String, ClassifyError> {
        let image = frame.to_rgb_image()?;
        let predictions = self.run_isolated(&image)?;
        top_prediction(predictions).map(|prediction| prediction.label)
    }

    fn run_isolated(&self, image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.classifier.classify(image)))
            .map_err(|payload| ClassifyError::Panicked(panic_message(payload.as_ref())))?
    }
}

/// Return the top-ranked prediction.
pub(crate) fn top_prediction(predictions: Vec<Prediction>) -> Result<Prediction, ClassifyError> {
    predictions
        .into_iter()
        .next()
        .ok_or(ClassifyError::NoPredictions)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Classify a whole image, keeping the confidence of the top prediction.
///
/// # Errors
///
/// Returns [`FramemoodError::Classification`] if the classifier fails or
/// returns nothing.
pub fn classify_image<C>(classifier: &C, image: &DynamicImage) -> Result<Prediction, FramemoodError>
where
    C: ImageClassifier + ?Sized,
{
    let rgb = image.to_rgb8();
    let predictions = classifier.classify(&rgb)?;
    let top = top_prediction(predictions)?;
    log::debug!("Image classified as {} ({:.2})", top.label, top.confidence);
    Ok(top)
}

/// Load an image from disk and classify it.
///
/// # Errors
///
/// Returns [`FramemoodError::ImageError`] if the image cannot be decoded, or
/// any error from [`classify_image`].
pub fn classify_image_file<C, P>(classifier: &C, path: P) -> Result<Prediction, FramemoodError>
where
    C: ImageClassifier + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    log::debug!("Classifying image file: {}", path.display());
    let image = image::open(path)?;
    classify_image(classifier, &image)
}
