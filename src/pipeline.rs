//! The sampling pipeline.
//!
//! [`VideoAnalyzer`] drives one run: it reads frames from a
//! [`FrameSource`] in order, asks the [`Sampler`] what to do with each,
//! classifies the selected frames through a [`FrameClassifier`], and records
//! every outcome in an [`Aggregator`]. The run moves through
//! [`PipelineState`]s:
//!
//! ```text
//! Idle → Opened → Sampling ⟲ → Finalized → Closed
//!   └──────(invalid options or open failure)──────→ Closed
//! ```
//!
//! The source is closed exactly once on every exit path.
//!
//! # Example
//!
//! ```no_run
//! use framemood::{AnalysisOptions, ClassifyError, ImageClassifier, Prediction, VideoAnalyzer};
//! use image::RgbImage;
//!
//! struct AlwaysJoy;
//!
//! impl ImageClassifier for AlwaysJoy {
//!     fn classify(&self, _image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
//!         Ok(vec![Prediction::new("joy", 1.0)])
//!     }
//! }
//!
//! let mut analyzer = VideoAnalyzer::new(&AlwaysJoy, AnalysisOptions::new());
//! let report = analyzer.analyze_file("input.mp4")?;
//! println!("{report}");
//! # Ok::<(), framemood::FramemoodError>(())
//! ```

use std::path::Path;

use crate::{
    aggregator::{Aggregator, EmotionLog, FrameOutcome},
    classifier::{FrameClassifier, ImageClassifier},
    configuration::AnalysisOptions,
    error::FramemoodError,
    progress::{OperationType, ProgressTracker},
    report::Report,
    sampler::{SampleDecision, Sampler},
    source::{FrameSource, SourceGuard},
    upload::MediaUpload,
    video_source::VideoFrameSource,
};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No run started.
    #[default]
    Idle,
    /// The source is open; nothing has been read.
    Opened,
    /// Frames are being read and classified.
    Sampling,
    /// Sampling ended and the log is complete.
    Finalized,
    /// The source has been released.
    Closed,
}

/// Runs the sampling pipeline against a classifier.
pub struct VideoAnalyzer<'a, C: ?Sized> {
    classifier: &'a C,
    options: AnalysisOptions,
    state: PipelineState,
}

impl<'a, C: ImageClassifier + ?Sized> VideoAnalyzer<'a, C> {
    pub fn new(classifier: &'a C, options: AnalysisOptions) -> Self {
        Self {
            classifier,
            options,
            state: PipelineState::Idle,
        }
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Decode a video file and analyze it.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the options are invalid or the file cannot be
    /// opened or prepared for decoding. No partial log is produced in that
    /// case. Per-frame classification failures are not errors.
    pub fn analyze_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Report, FramemoodError> {
        let log = self.run_file(path)?;
        Ok(Report::from_log(&log))
    }

    /// Analyze a video held in a temporary upload.
    pub fn analyze_upload(&mut self, upload: &MediaUpload) -> Result<Report, FramemoodError> {
        self.analyze_file(upload.path())
    }

    /// Decode a video file and return the raw log.
    ///
    /// Invalid options, or a file that cannot be opened or has no decodable
    /// video stream, move the analyzer straight to [`PipelineState::Closed`].
    pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result<EmotionLog, FramemoodError> {
        self.transition(PipelineState::Idle);
        let sampler = match self.options.validate() {
            Ok(sampler) => sampler,
            Err(error) => {
                self.transition(PipelineState::Closed);
                return Err(error);
            }
        };

        let source = match VideoFrameSource::open(path, self.options.frame_output()) {
            Ok(source) => source,
            Err(error) => {
                log::debug!("Open failed: {error}");
                self.transition(PipelineState::Closed);
                return Err(error);
            }
        };

        self.sample(SourceGuard::new(source), sampler)
    }

    /// Run the pipeline over an already opened source.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::InvalidStride`] or
    /// [`FramemoodError::InvalidCap`] for invalid options, and
    /// [`FramemoodError::OutOfOrderFrame`] if the source yields an index that
    /// does not increase. The source is closed on every path.
    pub fn run<S: FrameSource>(&mut self, source: S) -> Result<EmotionLog, FramemoodError> {
        self.transition(PipelineState::Idle);
        let source = SourceGuard::new(source);
        let sampler = match self.options.validate() {
            Ok(sampler) => sampler,
            Err(error) => {
                drop(source);
                self.transition(PipelineState::Closed);
                return Err(error);
            }
        };
        self.sample(source, sampler)
    }

    fn sample<S: FrameSource>(
        &mut self,
        mut source: SourceGuard<S>,
        sampler: Sampler,
    ) -> Result<EmotionLog, FramemoodError> {
        self.transition(PipelineState::Opened);
        let result = self.sample_frames(&mut source, sampler);
        if result.is_ok() {
            self.transition(PipelineState::Finalized);
        }

        drop(source);
        self.transition(PipelineState::Closed);
        result
    }

    fn sample_frames<S: FrameSource>(
        &mut self,
        source: &mut SourceGuard<S>,
        sampler: Sampler,
    ) -> Result<EmotionLog, FramemoodError> {
        let adapter = FrameClassifier::new(self.classifier);
        let mut aggregator = Aggregator::new();
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::FrameSampling,
            Some(sampler.sample_set().len()),
            self.options.batch_size,
        );

        self.transition(PipelineState::Sampling);
        let mut frames_read = 0_u64;
        while let Some(frame) = source.next_frame() {
            let index = frame.index;
            match sampler.decide(index) {
                SampleDecision::Stop => break,
                SampleDecision::Skip => {}
                SampleDecision::Classify => {
                    let outcome = FrameOutcome::from(adapter.classify(&frame));
                    aggregator.record(index, outcome)?;
                    tracker.advance(index);
                }
            }
            frames_read += 1;
        }
        tracker.finish();

        let log = aggregator.finalize();
        log::debug!(
            "Sampling finished: {} frame(s) read, {} classified, {} failed",
            frames_read,
            log.len(),
            log.failure_count()
        );
        Ok(log)
    }

    fn transition(&mut self, next: PipelineState) {
        log::debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
