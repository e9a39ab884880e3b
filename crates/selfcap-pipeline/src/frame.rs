//! Video frame handling.
//!
//! Frames arrive from the host on a channel; the camera is a shared
//! resource the session never owns, it only reads frames made available to
//! it. [`FrameRegionSampler`] adapts a frame to the core's `PixelSampler`
//! seam by cropping normalized regions out of the raw RGB buffer.

use image::RgbImage;
use thiserror::Error;

use selfcap_core::{BoundingBox, FrameGeometry, PixelSampler, SampleError};

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame buffer has {got} bytes, expected {expected} for {width}x{height} RGB24")]
    BufferSizeMismatch {
        got: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// One raw video frame: tightly packed RGB24, row-major, top-left origin.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Presentation time in milliseconds on the host's monotonic clock.
    pub timestamp_ms: f64,
}

impl VideoFrame {
    /// Wrap a raw buffer, rejecting size mismatches at the boundary.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ms: f64,
    ) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::BufferSizeMismatch {
                got: data.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ms,
        })
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry {
            width: self.width,
            height: self.height,
        }
    }
}

/// Borrowing pixel sampler over one frame. Regions are clamped to the frame;
/// a region that clamps to nothing is an error, which the photometric checks
/// translate into their configured skip/fail-open behavior.
pub struct FrameRegionSampler<'a> {
    frame: &'a VideoFrame,
}

impl<'a> FrameRegionSampler<'a> {
    pub fn new(frame: &'a VideoFrame) -> Self {
        Self { frame }
    }
}

impl PixelSampler for FrameRegionSampler<'_> {
    fn sample_region(&self, region: &BoundingBox) -> Result<RgbImage, SampleError> {
        let fw = self.frame.width as f32;
        let fh = self.frame.height as f32;

        let x0 = (region.x_min.clamp(0.0, 1.0) * fw).floor() as u32;
        let y0 = (region.y_min.clamp(0.0, 1.0) * fh).floor() as u32;
        let x1 = ((region.x_max().clamp(0.0, 1.0) * fw).ceil() as u32).min(self.frame.width);
        let y1 = ((region.y_max().clamp(0.0, 1.0) * fh).ceil() as u32).min(self.frame.height);

        if x1 <= x0 || y1 <= y0 {
            return Err(SampleError::OutOfBounds);
        }

        let (w, h) = (x1 - x0, y1 - y0);
        let mut crop = RgbImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let src = ((y0 + y) as usize * self.frame.width as usize + (x0 + x) as usize) * 3;
                let px = image::Rgb([
                    self.frame.data[src],
                    self.frame.data[src + 1],
                    self.frame.data[src + 2],
                ]);
                crop.put_pixel(x, y, px);
            }
        }
        Ok(crop)
    }
}
