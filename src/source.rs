//! Sequential frame sources.
//!
//! A [`FrameSource`] hands out decoded frames one at a time in increasing
//! index order until it is exhausted. Sources are read strictly forward; no
//! seeking is required of an implementation.

use std::collections::VecDeque;

use crate::frame::Frame;

/// An ordered, finite sequence of decoded frames.
pub trait FrameSource {
    /// Return the next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Release the underlying media handle.
    ///
    /// Called exactly once by the pipeline on every exit path. The default
    /// does nothing; sources owning OS resources should release them here
    /// (or in `Drop`).
    fn close(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// A frame source backed by frames already held in memory.
///
/// Frames are re-indexed sequentially from 0 in the order given, so callers
/// that decode elsewhere do not have to keep indices consistent.
#[derive(Debug, Default)]
pub struct InMemorySource {
    frames: VecDeque<Frame>,
    next_index: u64,
    closed: bool,
}

impl InMemorySource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            next_index: 0,
            closed: false,
        }
    }

    /// Whether [`close`](FrameSource::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSource for InMemorySource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.closed {
            return None;
        }
        let mut frame = self.frames.pop_front()?;
        frame.index = self.next_index;
        self.next_index += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.closed = true;
        self.frames.clear();
    }
}

/// Calls [`FrameSource::close`] exactly once when dropped.
pub(crate) struct SourceGuard<S: FrameSource> {
    source: S,
}

impl<S: FrameSource> SourceGuard<S> {
    pub(crate) fn new(source: S) -> Self {
        Self { source }
    }

    pub(crate) fn next_frame(&mut self) -> Option<Frame> {
        self.source.next_frame()
    }
}

impl<S: FrameSource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        self.source.close();
    }
}
