//! Photometric predicates: brightness and dark-glasses detection.
//!
//! Pixel access goes through the [`PixelSampler`] seam: the host owns the
//! frame buffer and hands out crops of normalized regions. Everything here
//! operates on the returned raster; nothing reads the camera directly.

use image::RgbImage;
use thiserror::Error;

use crate::landmarks::{face_index, BoundingBox, FaceLandmarks};

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("sample region lies outside the frame")]
    OutOfBounds,
    #[error("pixel source unavailable: {0}")]
    Unavailable(String),
}

/// Crop provider over the current video frame. Regions are normalized
/// `[0,1]` boxes; implementations clamp or reject out-of-frame requests.
pub trait PixelSampler {
    fn sample_region(&self, region: &BoundingBox) -> Result<RgbImage, SampleError>;
}

/// ITU-R BT.709 relative luminance over 0–255 channels.
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b)
}

/// Mean BT.709 luma of an image. An empty raster yields 0.0.
pub fn average_brightness(pixels: &RgbImage) -> f32 {
    let count = pixels.width() as u64 * pixels.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = pixels
        .pixels()
        .map(|p| f64::from(relative_luminance(p.0[0], p.0[1], p.0[2])))
        .sum();
    (sum / count as f64) as f32
}

/// Normalized crop region around one eye: the box spanned by the outer
/// corner and both lids, inflated to take in the surrounding lens area.
fn eye_region(landmarks: &FaceLandmarks, corner: usize, top: usize, bottom: usize) -> BoundingBox {
    let points = [
        landmarks.point(corner),
        landmarks.point(top),
        landmarks.point(bottom),
    ];
    let tight = BoundingBox::around(&points);
    let pad = (tight.width * 0.25).max(0.01);
    BoundingBox {
        x_min: (tight.x_min - pad).max(0.0),
        y_min: (tight.y_min - pad).max(0.0),
        width: tight.width + 2.0 * pad,
        height: tight.height + 2.0 * pad,
    }
}

/// Dark-glasses heuristic: mean luminance of both eye regions below the
/// threshold. Fails open: any sampling error reports no glasses, because a
/// missing crop must not block an otherwise compliant capture.
pub fn has_dark_glasses(
    sampler: &dyn PixelSampler,
    landmarks: &FaceLandmarks,
    luminance_threshold: f32,
) -> bool {
    let left = eye_region(
        landmarks,
        face_index::LEFT_EYE_OUTER,
        face_index::LEFT_EYE_TOP,
        face_index::LEFT_EYE_BOTTOM,
    );
    let right = eye_region(
        landmarks,
        face_index::RIGHT_EYE_OUTER,
        face_index::RIGHT_EYE_TOP,
        face_index::RIGHT_EYE_BOTTOM,
    );

    let (left_crop, right_crop) = match (sampler.sample_region(&left), sampler.sample_region(&right))
    {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "eye region sampling failed; skipping dark-glasses check");
            return false;
        }
    };

    let mean = (average_brightness(&left_crop) + average_brightness(&right_crop)) / 2.0;
    tracing::trace!(mean, luminance_threshold, "eye region luminance");
    mean < luminance_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{compliant_face, FaceSpec};
    use image::Rgb;

    struct FlatSampler(u8);

    impl PixelSampler for FlatSampler {
        fn sample_region(&self, _region: &BoundingBox) -> Result<RgbImage, SampleError> {
            Ok(RgbImage::from_pixel(8, 8, Rgb([self.0, self.0, self.0])))
        }
    }

    struct FailingSampler;

    impl PixelSampler for FailingSampler {
        fn sample_region(&self, _region: &BoundingBox) -> Result<RgbImage, SampleError> {
            Err(SampleError::OutOfBounds)
        }
    }

    #[test]
    fn luminance_extremes() {
        assert_eq!(relative_luminance(0, 0, 0), 0.0);
        assert!((relative_luminance(255, 255, 255) - 255.0).abs() < 0.01);
    }

    #[test]
    fn luminance_weights_green_highest() {
        let red = relative_luminance(255, 0, 0);
        let green = relative_luminance(0, 255, 0);
        let blue = relative_luminance(0, 0, 255);
        assert!(green > red && red > blue);
        assert!((red - 54.213).abs() < 0.01);
    }

    #[test]
    fn average_brightness_of_flat_image() {
        let img = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        assert!((average_brightness(&img) - 100.0).abs() < 0.01);
    }

    #[test]
    fn average_brightness_of_empty_image_is_zero() {
        let img = RgbImage::new(0, 0);
        assert_eq!(average_brightness(&img), 0.0);
    }

    #[test]
    fn average_brightness_mixes_regions() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        assert!((average_brightness(&img) - 127.5).abs() < 0.1);
    }

    #[test]
    fn dark_eye_regions_flag_glasses() {
        let face = compliant_face(&FaceSpec::default());
        assert!(has_dark_glasses(&FlatSampler(20), &face, 45.0));
    }

    #[test]
    fn bright_eye_regions_pass() {
        let face = compliant_face(&FaceSpec::default());
        assert!(!has_dark_glasses(&FlatSampler(120), &face, 45.0));
    }

    #[test]
    fn sampling_failure_fails_open() {
        let face = compliant_face(&FaceSpec::default());
        assert!(!has_dark_glasses(&FailingSampler, &face, 45.0));
    }
}
