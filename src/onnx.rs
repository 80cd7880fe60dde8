//! ONNX Runtime image classifier.
//!
//! [`OnnxImageClassifier`] runs a single-input, single-output image
//! classification model (ViT or CNN style, NCHW `f32` input, one logit per
//! class) and ranks the classes with a softmax. Class names come from a
//! labels file with one label per line, in output order.
//!
//! Inference requires the `onnx` feature. Without it,
//! [`OnnxImageClassifier::load`] returns
//! [`FramemoodError::FeatureNotEnabled`]; label loading, preprocessing and
//! ranking are always available.

use std::path::{Path, PathBuf};

use image::{RgbImage, imageops::FilterType};

#[cfg(feature = "onnx")]
use std::sync::Mutex;

#[cfg(feature = "onnx")]
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::Value,
};

use crate::{
    classifier::{ClassifyError, ImageClassifier, Prediction},
    error::FramemoodError,
};

/// Model input preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub struct OnnxConfig {
    /// Path to the `.onnx` model.
    pub model_path: PathBuf,
    /// Path to the labels file.
    pub labels_path: PathBuf,
    /// Square input edge in pixels.
    pub input_size: u32,
    /// Per-channel mean subtracted after scaling to `[0, 1]`.
    pub mean: [f32; 3],
    /// Per-channel standard deviation divided by after mean subtraction.
    pub std: [f32; 3],
    /// Threads for intra-op parallelism.
    pub intra_threads: usize,
}

impl OnnxConfig {
    /// Defaults for ViT image classifiers: 224×224, mean and std of 0.5.
    pub fn new(model_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels_path: labels_path.into(),
            input_size: 224,
            mean: [0.5; 3],
            std: [0.5; 3],
            intra_threads: 1,
        }
    }

    /// ImageNet normalisation, as used by most CNN classifiers.
    #[must_use]
    pub fn with_imagenet_normalization(mut self) -> Self {
        self.mean = [0.485, 0.456, 0.406];
        self.std = [0.229, 0.224, 0.225];
        self
    }

    #[must_use]
    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size.max(1);
        self
    }
}

/// Read class labels, one per line. Blank lines are ignored.
///
/// # Errors
///
/// Returns [`FramemoodError::ModelLoad`] if the file cannot be read or holds
/// no labels.
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>, FramemoodError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|error| FramemoodError::ModelLoad {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    let labels: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(FramemoodError::ModelLoad {
            path: path.to_path_buf(),
            reason: "labels file is empty".to_string(),
        });
    }
    Ok(labels)
}

/// Resize to `size`×`size` and lay out as normalised planar RGB.
pub fn to_nchw(image: &RgbImage, size: u32, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
    let resized = image::imageops::resize(image, size, size, FilterType::Triangle);
    let plane = (size * size) as usize;
    let mut data = vec![0.0_f32; plane * 3];
    for (position, pixel) in resized.pixels().enumerate() {
        for channel in 0..3 {
            let value = pixel.0[channel] as f32 / 255.0;
            data[channel * plane + position] = (value - mean[channel]) / std[channel];
        }
    }
    data
}

/// Softmax `logits` and pair them with `labels`, best first.
///
/// # Errors
///
/// Returns [`ClassifyError::Inference`] when the counts differ and
/// [`ClassifyError::NoPredictions`] when both are empty.
pub fn rank_logits(labels: &[String], logits: &[f32]) -> Result<Vec<Prediction>, ClassifyError> {
    if labels.len() != logits.len() {
        return Err(ClassifyError::Inference(format!(
            "model produced {} logits for {} labels",
            logits.len(),
            labels.len()
        )));
    }
    if logits.is_empty() {
        return Err(ClassifyError::NoPredictions);
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&logit| (logit - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    let mut predictions: Vec<Prediction> = labels
        .iter()
        .zip(exps)
        .map(|(label, exp)| Prediction::new(label.clone(), exp / sum))
        .collect();
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(predictions)
}

/// Image classifier backed by an ONNX Runtime session.
pub struct OnnxImageClassifier {
    #[cfg(feature = "onnx")]
    session: Mutex<Session>,
    labels: Vec<String>,
    config: OnnxConfig,
}

impl OnnxImageClassifier {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn config(&self) -> &OnnxConfig {
        &self.config
    }
}

#[cfg(feature = "onnx")]
impl OnnxImageClassifier {
    /// Load the model and its labels.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::ModelLoad`] if either file is missing or the
    /// session cannot be built.
    pub fn load(config: OnnxConfig) -> Result<Self, FramemoodError> {
        let model_error = |reason: String| FramemoodError::ModelLoad {
            path: config.model_path.clone(),
            reason,
        };

        if !config.model_path.exists() {
            return Err(model_error("model file not found".to_string()));
        }
        let labels = load_labels(&config.labels_path)?;

        let session = Session::builder()
            .map_err(|e: ort::Error| model_error(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e: ort::Error| model_error(e.to_string()))?
            .with_intra_threads(config.intra_threads.max(1))
            .map_err(|e: ort::Error| model_error(e.to_string()))?
            .commit_from_file(&config.model_path)
            .map_err(|e: ort::Error| model_error(e.to_string()))?;

        log::info!(
            "Loaded image classifier {} ({} labels)",
            config.model_path.display(),
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            config,
        })
    }
}

#[cfg(not(feature = "onnx"))]
impl OnnxImageClassifier {
    pub fn load(_config: OnnxConfig) -> Result<Self, FramemoodError> {
        Err(FramemoodError::FeatureNotEnabled("onnx"))
    }
}

#[cfg(feature = "onnx")]
impl ImageClassifier for OnnxImageClassifier {
    fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        let size = self.config.input_size as usize;
        let data = to_nchw(image, self.config.input_size, self.config.mean, self.config.std);
        let input = Value::from_array(([1_usize, 3, size, size], data))
            .map_err(|e: ort::Error| ClassifyError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e: ort::Error| ClassifyError::Inference(e.to_string()))?;

        let output = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifyError::Inference("model produced no output".to_string()))?;
        let logits = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e: ort::Error| ClassifyError::Inference(e.to_string()))?;

        rank_logits(&self.labels, logits.1)
    }
}

#[cfg(not(feature = "onnx"))]
impl ImageClassifier for OnnxImageClassifier {
    fn classify(&self, _image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        Err(ClassifyError::Inference(
            "built without the `onnx` feature".to_string(),
        ))
    }
}
