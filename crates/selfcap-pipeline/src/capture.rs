//! Still image extraction.
//!
//! When the classifier reaches `Capturing`, the driver encodes the current
//! raw frame into a still, synchronously, before the next frame is pulled.
//! Encoding sits behind the [`StillEncoder`] seam so hosts can swap the
//! output format; the default produces PNG.

use chrono::{DateTime, Utc};
use image::RgbImage;
use std::io::Cursor;
use thiserror::Error;
use uuid::Uuid;

use crate::frame::VideoFrame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("frame buffer does not form a {width}x{height} RGB image")]
    InvalidFrame { width: u32, height: u32 },
    #[error("still encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Encodes a raw video frame into a still image.
pub trait StillEncoder: Send {
    fn encode(&self, frame: &VideoFrame) -> Result<Vec<u8>, CaptureError>;
}

/// Default encoder: lossless PNG via the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngStillEncoder;

impl StillEncoder for PngStillEncoder {
    fn encode(&self, frame: &VideoFrame) -> Result<Vec<u8>, CaptureError> {
        let img: RgbImage = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or(CaptureError::InvalidFrame {
                width: frame.width,
                height: frame.height,
            })?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// The captured still plus its session provenance.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Encoded image bytes (PNG with the default encoder).
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub session_id: Uuid,
    pub captured_at: DateTime<Utc>,
}
