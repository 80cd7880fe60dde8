//! FFmpeg-backed frame source.
//!
//! [`VideoFrameSource`] decodes the best video stream of a container strictly
//! forward, numbering frames sequentially from 0 in decode order, and converts
//! each to packed RGB24 through a swscale context. It never seeks.

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::{
    configuration::FrameOutputOptions,
    error::FramemoodError,
    frame::{Frame, PixelLayout},
    source::FrameSource,
};

/// Consecutive unreadable packets tolerated before the stream is treated as ended.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// Sequential decoder over one video file.
pub struct VideoFrameSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    target_width: u32,
    target_height: u32,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    next_index: u64,
    read_errors: u32,
    eof_sent: bool,
    done: bool,
    file_path: PathBuf,
}

impl VideoFrameSource {
    /// Open a container and prepare its best video stream for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::FileOpen`] if the container cannot be
    /// opened, [`FramemoodError::NoVideoStream`] if it has no video stream,
    /// and [`FramemoodError::VideoDecodeError`] if no decoder or scaler can be
    /// set up for it.
    pub fn open<P: AsRef<Path>>(
        path: P,
        output: &FrameOutputOptions,
    ) -> Result<Self, FramemoodError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        log::debug!("Opening video: {}", path.display());

        ffmpeg_next::init().map_err(|error| FramemoodError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FramemoodError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let (video_stream_index, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(FramemoodError::NoVideoStream)?;
            let decoder = CodecContext::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|error| {
                    FramemoodError::VideoDecodeError(format!(
                        "failed to create decoder for {}: {error}",
                        path.display()
                    ))
                })?;
            (stream.index(), decoder)
        };

        let (target_width, target_height) =
            output.resolve_dimensions(decoder.width(), decoder.height());
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            target_width,
            target_height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| {
            FramemoodError::VideoDecodeError(format!(
                "failed to create {}x{} RGB scaler: {error}",
                target_width, target_height
            ))
        })?;

        log::debug!(
            "Decoding stream {} of {} ({}x{} -> {}x{})",
            video_stream_index,
            path.display(),
            decoder.width(),
            decoder.height(),
            target_width,
            target_height
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            target_width,
            target_height,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            next_index: 0,
            read_errors: 0,
            eof_sent: false,
            done: false,
            file_path,
        })
    }

    /// Dimensions of the frames this source yields.
    pub fn frame_dimensions(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Number of frames yielded so far.
    pub fn frames_decoded(&self) -> u64 {
        self.next_index
    }

    /// Convert `decoded_frame` to an RGB frame.
    ///
    /// A frame the scaler rejects (for instance after a mid-stream resolution
    /// change) is still returned, with an empty buffer, so its index is kept
    /// and its classification fails on its own.
    fn convert_current_frame(&mut self, index: u64) -> Frame {
        let (width, height) = (self.target_width, self.target_height);
        let data = match self.scaler.run(&self.decoded_frame, &mut self.scaled_frame) {
            Ok(()) => packed_rows(&self.scaled_frame, width, height, 3),
            Err(error) => {
                log::warn!("Frame {index} could not be converted to RGB: {error}");
                Vec::new()
            }
        };
        Frame::new(index, width, height, PixelLayout::Rgb24, data)
    }

    fn end_stream(&mut self, reason: &str) -> Option<Frame> {
        log::warn!("{} ended early: {reason}", self.file_path.display());
        self.done = true;
        None
    }
}

impl FrameSource for VideoFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let index = self.next_index;
                self.next_index += 1;
                return Some(self.convert_current_frame(index));
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    self.read_errors = 0;
                    if packet.stream() == self.video_stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            return self.end_stream(&format!("decoder rejected packet: {error}"));
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.end_stream(&format!("decoder flush failed: {error}"));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    self.read_errors += 1;
                    log::debug!("Skipping unreadable packet: {error}");
                    if self.read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        return self.end_stream("too many unreadable packets");
                    }
                }
            }
        }
    }

    fn close(&mut self) {
        log::debug!(
            "Closing {} after {} frame(s)",
            self.file_path.display(),
            self.next_index
        );
        self.done = true;
    }
}

/// Copy the first plane of `video_frame` into a buffer without row padding.
///
/// Returns an empty buffer if the plane is smaller than the dimensions imply.
fn packed_rows(video_frame: &VideoFrame, width: u32, height: u32, bytes_per_pixel: usize) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_len = width as usize * bytes_per_pixel;
    let rows = height as usize;
    let data = video_frame.data(0);

    if rows == 0 || stride < row_len || data.len() < stride * (rows - 1) + row_len {
        return Vec::new();
    }

    if stride == row_len {
        data[..row_len * rows].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_len * rows);
        for row in 0..rows {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_len]);
        }
        buffer
    }
}
