//! Stride sampling under a hard cap.
//!
//! A [`Sampler`] decides, for each frame index read from a source, whether
//! the frame is classified and whether reading should stop. The cap is an
//! exclusive bound on the frame index: with the default cap of 101, indices
//! `0..=100` are examined and reading stops at index 101.

use crate::error::FramemoodError;

/// Default distance between sampled frame indices.
pub const DEFAULT_STRIDE: u64 = 10;

/// Default exclusive upper bound on examined frame indices.
pub const DEFAULT_CAP: u64 = 101;

/// What the pipeline should do with a frame at a given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDecision {
    /// Classify this frame.
    Classify,
    /// Read past this frame without classifying it.
    Skip,
    /// The cap has been reached; stop reading.
    Stop,
}

/// Stride/cap sampling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    stride: u64,
    cap: u64,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            cap: DEFAULT_CAP,
        }
    }
}

impl Sampler {
    /// Create a sampler.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::InvalidStride`] or
    /// [`FramemoodError::InvalidCap`] when either value is zero.
    pub fn new(stride: u64, cap: u64) -> Result<Self, FramemoodError> {
        if stride == 0 {
            return Err(FramemoodError::InvalidStride);
        }
        if cap == 0 {
            return Err(FramemoodError::InvalidCap);
        }
        Ok(Self { stride, cap })
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    pub fn decide(&self, index: u64) -> SampleDecision {
        if index >= self.cap {
            SampleDecision::Stop
        } else if index % self.stride == 0 {
            SampleDecision::Classify
        } else {
            SampleDecision::Skip
        }
    }

    /// The indices this sampler would classify given an unbounded source.
    pub fn sample_set(&self) -> SampleSet {
        SampleSet {
            stride: self.stride,
            cap: self.cap,
        }
    }
}

/// The set `{0, S, 2S, ...} ∩ [0, C)` for stride `S` and cap `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSet {
    stride: u64,
    cap: u64,
}

impl SampleSet {
    pub fn contains(&self, index: u64) -> bool {
        index < self.cap && index % self.stride == 0
    }

    /// `⌈C / S⌉`.
    pub fn len(&self) -> u64 {
        self.cap.div_ceil(self.stride)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of indices a source of `source_len` frames would contribute.
    pub fn len_for_source(&self, source_len: u64) -> u64 {
        self.cap.min(source_len).div_ceil(self.stride)
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + use<> {
        (0..self.cap).step_by(usize::try_from(self.stride).unwrap_or(usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let sampler = Sampler::default();
        assert_eq!((sampler.stride(), sampler.cap()), (10, 101));
        assert_eq!(sampler.sample_set().len(), 11);
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(matches!(Sampler::new(0, 10), Err(FramemoodError::InvalidStride)));
        assert!(matches!(Sampler::new(10, 0), Err(FramemoodError::InvalidCap)));
    }

    #[test]
    fn decisions_follow_stride_and_cap() {
        let sampler = Sampler::new(10, 101).unwrap();
        assert_eq!(sampler.decide(0), SampleDecision::Classify);
        assert_eq!(sampler.decide(5), SampleDecision::Skip);
        assert_eq!(sampler.decide(100), SampleDecision::Classify);
        assert_eq!(sampler.decide(101), SampleDecision::Stop);
    }

    #[test]
    fn cap_is_exclusive() {
        let sampler = Sampler::new(10, 100).unwrap();
        assert_eq!(sampler.decide(100), SampleDecision::Stop);
        assert_eq!(sampler.sample_set().iter().last(), Some(90));
    }

    #[test]
    fn sample_set_is_multiples_below_cap() {
        for stride in 1..=7 {
            for cap in 1..=40 {
                let set = Sampler::new(stride, cap).unwrap().sample_set();
                let indices: Vec<u64> = set.iter().collect();
                assert_eq!(indices.len() as u64, set.len());
                assert!(indices.iter().all(|&i| i % stride == 0 && i < cap));
                assert!((0..cap + stride).all(|i| set.contains(i) == indices.contains(&i)));
            }
        }
    }

    #[test]
    fn source_length_bounds_the_count() {
        let set = Sampler::new(10, 101).unwrap().sample_set();
        assert_eq!(set.len_for_source(25), 3);
        assert_eq!(set.len_for_source(0), 0);
        assert_eq!(set.len_for_source(10_000), 11);
    }

    #[test]
    fn huge_stride_keeps_only_frame_zero() {
        let set = Sampler::new(u64::MAX, 101).unwrap().sample_set();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(set.len(), 1);
    }
}
