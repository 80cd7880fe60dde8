//! Decoded video frames.
//!
//! A [`Frame`] is one still image pulled from a [`FrameSource`](crate::FrameSource),
//! tagged with its sequential index. Pixel data is kept in whatever packed
//! layout the source produced and converted to RGB only when the frame is
//! classified, so a malformed buffer fails that one frame and nothing else.

use image::RgbImage;

use crate::classifier::ClassifyError;

/// Packed pixel layout of a frame's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelLayout {
    /// 8-bit RGB (24 bpp). This is what the FFmpeg source produces.
    #[default]
    Rgb24,
    /// 8-bit BGR (24 bpp), as produced by capture APIs such as OpenCV.
    Bgr24,
    /// 8-bit RGBA (32 bpp). Alpha is dropped on conversion.
    Rgba32,
    /// 8-bit grayscale (8 bpp). Replicated across channels on conversion.
    Gray8,
}

impl PixelLayout {
    /// Number of bytes one pixel occupies in this layout.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgb24 | PixelLayout::Bgr24 => 3,
            PixelLayout::Rgba32 => 4,
            PixelLayout::Gray8 => 1,
        }
    }
}

/// A single decoded image at a given sequential index.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the frame in the source, starting at 0.
    pub index: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layout of `data`.
    pub layout: PixelLayout,
    /// Tightly packed pixel rows (no stride padding).
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(index: u64, width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Self {
        Self {
            index,
            width,
            height,
            layout,
            data,
        }
    }

    /// Wrap an already-decoded RGB image.
    pub fn from_rgb_image(index: u64, image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(index, width, height, PixelLayout::Rgb24, image.into_raw())
    }

    /// Number of bytes a well-formed buffer for this frame must hold.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.bytes_per_pixel()
    }

    /// Convert the frame to an RGB image.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidFrame`] when the frame has zero area or
    /// its buffer length does not match its dimensions and layout.
    pub fn to_rgb_image(&self) -> Result<RgbImage, ClassifyError> {
        if self.width == 0 || self.height == 0 {
            return Err(ClassifyError::InvalidFrame(format!(
                "frame {} has zero area ({}x{})",
                self.index, self.width, self.height
            )));
        }

        let expected = self.expected_len();
        if self.data.len() != expected {
            return Err(ClassifyError::InvalidFrame(format!(
                "frame {} holds {} bytes, expected {expected} for {}x{} {:?}",
                self.index,
                self.data.len(),
                self.width,
                self.height,
                self.layout
            )));
        }

        let rgb = match self.layout {
            PixelLayout::Rgb24 => self.data.clone(),
            PixelLayout::Bgr24 => self
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
            PixelLayout::Rgba32 => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
            PixelLayout::Gray8 => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
        };

        RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(|| {
            ClassifyError::InvalidFrame(format!(
                "failed to construct RGB image for frame {}",
                self.index
            ))
        })
    }
}
