//! Landmark data model and boundary validation.
//!
//! The detector contract fixes the anatomical meaning of every index: a face
//! is always 478 points, a hand always 21, and e.g. index 4 is always the
//! nose tip. Everything downstream relies on that, so landmark sets are only
//! constructible through validating constructors; a detector result with
//! the wrong point count never enters the pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of points in a face landmark set (face-mesh convention).
pub const FACE_POINT_COUNT: usize = 478;
/// Number of points in a hand landmark set.
pub const HAND_POINT_COUNT: usize = 21;

/// Named indices into a [`FaceLandmarks`] set.
///
/// Only the points the validation predicates actually consult are named.
pub mod face_index {
    pub const NOSE_TIP: usize = 4;
    pub const FOREHEAD: usize = 10;
    pub const CHIN: usize = 152;
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const RIGHT_EYE_OUTER: usize = 263;
    pub const LEFT_EYE_TOP: usize = 159;
    pub const LEFT_EYE_BOTTOM: usize = 145;
    pub const RIGHT_EYE_TOP: usize = 386;
    pub const RIGHT_EYE_BOTTOM: usize = 374;
    pub const UPPER_LIP: usize = 13;
    pub const LOWER_LIP: usize = 14;
    pub const MOUTH_LEFT: usize = 61;
    pub const MOUTH_RIGHT: usize = 291;
}

#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("wrong landmark count: {got} (expected {expected})")]
    WrongPointCount { got: usize, expected: usize },
}

/// A single detected point, normalized to `[0,1]` against the frame that
/// produced it. `z` is detector-relative depth; it is carried through but no
/// predicate consults it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance to another landmark in the normalized plane.
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A validated face landmark set: exactly [`FACE_POINT_COUNT`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    points: Vec<Landmark>,
}

impl FaceLandmarks {
    /// Validate and wrap a raw detector result.
    pub fn from_points(points: Vec<Landmark>) -> Result<Self, LandmarkError> {
        if points.len() != FACE_POINT_COUNT {
            return Err(LandmarkError::WrongPointCount {
                got: points.len(),
                expected: FACE_POINT_COUNT,
            });
        }
        Ok(Self { points })
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn nose_tip(&self) -> Landmark {
        self.points[face_index::NOSE_TIP]
    }
}

/// A validated hand landmark set: exactly [`HAND_POINT_COUNT`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn from_points(points: Vec<Landmark>) -> Result<Self, LandmarkError> {
        if points.len() != HAND_POINT_COUNT {
            return Err(LandmarkError::WrongPointCount {
                got: points.len(),
                expected: HAND_POINT_COUNT,
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

/// Which hand a [`HandLandmarks`] set belongs to, as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    pub landmarks: HandLandmarks,
    pub handedness: Handedness,
}

/// Axis-aligned box in normalized coordinates, derived from landmark extrema
/// (the detector reports points, not boxes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Tight box around a set of landmarks. Empty input yields a zero box.
    pub fn around(points: &[Landmark]) -> Self {
        let mut x_min = f32::INFINITY;
        let mut y_min = f32::INFINITY;
        let mut x_max = f32::NEG_INFINITY;
        let mut y_max = f32::NEG_INFINITY;
        for p in points {
            x_min = x_min.min(p.x);
            y_min = y_min.min(p.y);
            x_max = x_max.max(p.x);
            y_max = y_max.max(p.y);
        }
        if points.is_empty() {
            return Self {
                x_min: 0.0,
                y_min: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }
        Self {
            x_min,
            y_min,
            width: x_max - x_min,
            height: y_max - y_min,
        }
    }

    pub fn x_max(&self) -> f32 {
        self.x_min + self.width
    }

    pub fn y_max(&self) -> f32 {
        self.y_min + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x_min + self.width / 2.0, self.y_min + self.height / 2.0)
    }
}

/// One validated face detection for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounding_box: BoundingBox,
    pub landmarks: FaceLandmarks,
    /// Frame presentation time in milliseconds (host clock, monotonic).
    pub timestamp_ms: f64,
}

impl DetectedFace {
    pub fn new(landmarks: FaceLandmarks, timestamp_ms: f64) -> Self {
        let bounding_box = BoundingBox::around(landmarks.points());
        Self {
            bounding_box,
            landmarks,
            timestamp_ms,
        }
    }
}

/// Pixel dimensions of the video frame the landmarks were normalized against.
/// Needed wherever a normalized delta must be compared to a pixel tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_rejects_wrong_count() {
        let err = FaceLandmarks::from_points(vec![Landmark::default(); 100]).unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::WrongPointCount { got: 100, expected: FACE_POINT_COUNT }
        ));
    }

    #[test]
    fn face_accepts_exact_count() {
        let lm = FaceLandmarks::from_points(vec![Landmark::default(); FACE_POINT_COUNT]).unwrap();
        assert_eq!(lm.points().len(), FACE_POINT_COUNT);
    }

    #[test]
    fn hand_rejects_wrong_count() {
        let err = HandLandmarks::from_points(vec![Landmark::default(); 20]).unwrap_err();
        assert!(matches!(err, LandmarkError::WrongPointCount { got: 20, .. }));
    }

    #[test]
    fn bounding_box_from_extrema() {
        let points = vec![
            Landmark::new(0.2, 0.3),
            Landmark::new(0.6, 0.4),
            Landmark::new(0.4, 0.8),
        ];
        let bbox = BoundingBox::around(&points);
        assert!((bbox.x_min - 0.2).abs() < 1e-6);
        assert!((bbox.y_min - 0.3).abs() < 1e-6);
        assert!((bbox.width - 0.4).abs() < 1e-6);
        assert!((bbox.height - 0.5).abs() < 1e-6);
        let (cx, cy) = bbox.center();
        assert!((cx - 0.4).abs() < 1e-6);
        assert!((cy - 0.55).abs() < 1e-6);
    }

    #[test]
    fn bounding_box_of_empty_set_is_zero() {
        let bbox = BoundingBox::around(&[]);
        assert_eq!(bbox.width, 0.0);
        assert_eq!(bbox.height, 0.0);
    }

    #[test]
    fn detected_face_derives_its_box() {
        let mut points = vec![Landmark::new(0.5, 0.5); FACE_POINT_COUNT];
        points[0] = Landmark::new(0.3, 0.2);
        points[1] = Landmark::new(0.7, 0.9);
        let face = DetectedFace::new(FaceLandmarks::from_points(points).unwrap(), 123.0);
        assert!((face.bounding_box.width - 0.4).abs() < 1e-6);
        assert!((face.bounding_box.height - 0.7).abs() < 1e-6);
        assert_eq!(face.timestamp_ms, 123.0);
    }

    #[test]
    fn landmark_distance() {
        let a = Landmark::new(0.0, 0.0);
        let b = Landmark::new(0.3, 0.4);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-6);
    }
}
