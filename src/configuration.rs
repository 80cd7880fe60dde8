//! Analysis configuration.
//!
//! [`AnalysisOptions`] is a builder carrying the sampling policy (stride and
//! cap), the decoded frame size, and an optional progress callback through a
//! run without widening every function signature.
//!
//! # Example
//!
//! ```no_run
//! use framemood::AnalysisOptions;
//!
//! // Every 5th frame among the first 300, scaled to the model's input width.
//! let options = AnalysisOptions::new()
//!     .with_stride(5)
//!     .with_cap(300)
//!     .with_resolution(Some(224), None);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::{
    error::FramemoodError,
    progress::{NoOpProgress, ProgressCallback},
    sampler::{DEFAULT_CAP, DEFAULT_STRIDE, Sampler},
};

/// Size of the frames a video source decodes to.
///
/// When no dimensions are set the source resolution is used. Setting one
/// dimension with [`maintain_aspect_ratio`](FrameOutputOptions::maintain_aspect_ratio)
/// derives the other from the source aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutputOptions {
    /// Target width. `None` keeps the source width.
    pub width: Option<u32>,
    /// Target height. `None` keeps the source height.
    pub height: Option<u32>,
    /// Derive the missing dimension from the source aspect ratio.
    pub maintain_aspect_ratio: bool,
}

impl Default for FrameOutputOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

impl FrameOutputOptions {
    /// Resolve `(width, height)` for a source of the given size.
    pub fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.maintain_aspect_ratio && source_width > 0 => {
                let h = (source_height as f64 * w as f64 / source_width as f64).round() as u32;
                (w, h.max(1))
            }
            (Some(w), None) => (w, source_height),
            (None, Some(h)) if self.maintain_aspect_ratio && source_height > 0 => {
                let w = (source_width as f64 * h as f64 / source_height as f64).round() as u32;
                (w.max(1), h)
            }
            (None, Some(h)) => (source_width, h),
            (None, None) => (source_width, source_height),
        }
    }
}

/// Settings for one analysis run.
///
/// A default-constructed value samples every 10th frame below index 101 at
/// the source resolution, with no progress reporting.
#[derive(Clone)]
pub struct AnalysisOptions {
    pub(crate) stride: u64,
    pub(crate) cap: u64,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
    pub(crate) frame_output: FrameOutputOptions,
}

impl Debug for AnalysisOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnalysisOptions")
            .field("stride", &self.stride)
            .field("cap", &self.cap)
            .field("batch_size", &self.batch_size)
            .field("frame_output", &self.frame_output)
            .finish_non_exhaustive()
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            cap: DEFAULT_CAP,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
            frame_output: FrameOutputOptions::default(),
        }
    }

    /// Classify every `stride`-th frame. Zero is rejected by
    /// [`validate`](AnalysisOptions::validate).
    #[must_use]
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride;
        self
    }

    /// Stop reading once the frame index reaches `cap` (exclusive).
    #[must_use]
    pub fn with_cap(mut self, cap: u64) -> Self {
        self.cap = cap;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `size` classified frames (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Decode frames at a custom resolution. `None` keeps the source value.
    #[must_use]
    pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.frame_output.width = width;
        self.frame_output.height = height;
        self
    }

    #[must_use]
    pub fn with_frame_output(mut self, options: FrameOutputOptions) -> Self {
        self.frame_output = options;
        self
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    pub fn frame_output(&self) -> &FrameOutputOptions {
        &self.frame_output
    }

    /// Build the sampler these options describe.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::InvalidStride`] or
    /// [`FramemoodError::InvalidCap`] for zero values.
    pub fn validate(&self) -> Result<Sampler, FramemoodError> {
        Sampler::new(self.stride, self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_source_by_default() {
        assert_eq!(FrameOutputOptions::default().resolve_dimensions(640, 480), (640, 480));
    }

    #[test]
    fn resolve_preserves_aspect_ratio() {
        let options = FrameOutputOptions {
            width: Some(320),
            ..FrameOutputOptions::default()
        };
        assert_eq!(options.resolve_dimensions(640, 480), (320, 240));

        let options = FrameOutputOptions {
            height: Some(120),
            ..FrameOutputOptions::default()
        };
        assert_eq!(options.resolve_dimensions(640, 480), (160, 120));
    }

    #[test]
    fn resolve_without_aspect_ratio() {
        let options = FrameOutputOptions {
            width: Some(224),
            height: None,
            maintain_aspect_ratio: false,
        };
        assert_eq!(options.resolve_dimensions(640, 480), (224, 480));
    }

    #[test]
    fn validate_rejects_zero_stride() {
        let options = AnalysisOptions::new().with_stride(0);
        assert!(matches!(options.validate(), Err(FramemoodError::InvalidStride)));
    }

    #[test]
    fn batch_size_is_clamped() {
        assert_eq!(AnalysisOptions::new().with_batch_size(0).batch_size, 1);
    }
}
