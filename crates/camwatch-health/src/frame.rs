//! Frames and the frame source capability.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{OpenError, ReadError};

/// Memory layout of a decoded frame, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Bgr8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// A decoded image, alive for the duration of one read.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Bytes,
}

impl Frame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<Bytes>) -> Self {
        Self {
            width,
            height,
            format,
            data: data.into(),
        }
    }

    /// Whether the frame holds no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Convert to one 8-bit intensity value per pixel.
    ///
    /// Colour formats use the BT.601 luma weights. Returns `None` when the
    /// buffer length does not match the declared geometry.
    pub fn to_luma(&self) -> Option<Vec<u8>> {
        let pixels = (self.width as usize).checked_mul(self.height as usize)?;
        let expected = pixels.checked_mul(self.format.channels())?;
        if self.data.len() != expected {
            return None;
        }

        let luma = match self.format {
            PixelFormat::Gray8 => self.data.to_vec(),
            PixelFormat::Rgb8 => self
                .data
                .chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect(),
            PixelFormat::Bgr8 => self
                .data
                .chunks_exact(3)
                .map(|px| luma(px[2], px[1], px[0]))
                .collect(),
            PixelFormat::Rgba8 => self
                .data
                .chunks_exact(4)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect(),
        };
        Some(luma)
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

/// Opens connections to camera endpoints.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Connect to `endpoint` and prepare to decode frames.
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, OpenError>;
}

/// An open connection yielding decoded frames on demand.
#[async_trait]
pub trait FrameStream: Send {
    /// Read the next frame.
    async fn read(&mut self) -> Result<Frame, ReadError>;

    /// Release the connection. Further reads fail.
    async fn close(&mut self) {}
}
