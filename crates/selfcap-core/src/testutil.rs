//! Synthetic landmark builders shared by the crate's unit tests.

use crate::landmarks::{
    face_index, DetectedHand, FaceLandmarks, HandLandmarks, Handedness, Landmark,
    FACE_POINT_COUNT, HAND_POINT_COUNT,
};

/// Parametric description of a synthetic face. The default is a centered,
/// straight, neutral face with a 0.4-wide and 0.5-tall bounding box, so it
/// passes every predicate at default thresholds. Individual fields knock
/// out one predicate at a time.
#[derive(Debug, Clone)]
pub struct FaceSpec {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical drop of the right eye relative to the left (roll).
    pub eye_line_roll: f32,
    /// Horizontal nose displacement from the face centerline (yaw).
    pub nose_x_offset: f32,
    /// Vertical nose displacement from its default height (pitch).
    pub nose_y_offset: f32,
    /// Vertical displacement of the whole mouth (occlusion scenarios).
    pub lip_y_offset: f32,
    /// Total eyelid gap as a fraction of face height.
    pub eye_openness: f32,
    /// Total lip gap as a fraction of face height.
    pub mouth_openness: f32,
    /// Upward mouth-corner displacement as a fraction of face height (smile).
    pub corner_lift: f32,
}

impl Default for FaceSpec {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.5,
            width: 0.4,
            height: 0.5,
            eye_line_roll: 0.0,
            nose_x_offset: 0.0,
            nose_y_offset: 0.0,
            lip_y_offset: 0.0,
            eye_openness: 0.028,
            mouth_openness: 0.02,
            corner_lift: 0.0,
        }
    }
}

/// Build a full 478-point face from a [`FaceSpec`]. Named anatomical points
/// are placed from the spec's proportions; every other point sits at the
/// face center so the bounding box is controlled entirely by forehead, chin
/// and eye corners.
pub fn compliant_face(spec: &FaceSpec) -> FaceLandmarks {
    let (cx, cy, w, h) = (spec.center_x, spec.center_y, spec.width, spec.height);
    let mut points = vec![Landmark::new(cx, cy); FACE_POINT_COUNT];

    let eye_y = cy - 0.2 * h;
    let lip_y = cy + 0.24 * h + spec.lip_y_offset;

    points[face_index::FOREHEAD] = Landmark::new(cx, cy - 0.5 * h);
    points[face_index::CHIN] = Landmark::new(cx, cy + 0.5 * h);
    points[face_index::LEFT_EYE_OUTER] = Landmark::new(cx - 0.5 * w, eye_y);
    points[face_index::RIGHT_EYE_OUTER] = Landmark::new(cx + 0.5 * w, eye_y + spec.eye_line_roll);
    points[face_index::NOSE_TIP] =
        Landmark::new(cx + spec.nose_x_offset, cy + 0.04 * h + spec.nose_y_offset);
    points[face_index::UPPER_LIP] = Landmark::new(cx, lip_y - spec.mouth_openness * h / 2.0);
    points[face_index::LOWER_LIP] = Landmark::new(cx, lip_y + spec.mouth_openness * h / 2.0);
    points[face_index::MOUTH_LEFT] =
        Landmark::new(cx - 0.2 * w, lip_y - spec.corner_lift * h);
    points[face_index::MOUTH_RIGHT] =
        Landmark::new(cx + 0.2 * w, lip_y - spec.corner_lift * h);
    points[face_index::LEFT_EYE_TOP] =
        Landmark::new(cx - 0.2 * w, eye_y - spec.eye_openness * h / 2.0);
    points[face_index::LEFT_EYE_BOTTOM] =
        Landmark::new(cx - 0.2 * w, eye_y + spec.eye_openness * h / 2.0);
    points[face_index::RIGHT_EYE_TOP] =
        Landmark::new(cx + 0.2 * w, eye_y - spec.eye_openness * h / 2.0);
    points[face_index::RIGHT_EYE_BOTTOM] =
        Landmark::new(cx + 0.2 * w, eye_y + spec.eye_openness * h / 2.0);

    FaceLandmarks::from_points(points).unwrap()
}

/// A right hand with all 21 points clustered at the given position.
pub fn hand_at(x: f32, y: f32) -> DetectedHand {
    DetectedHand {
        landmarks: HandLandmarks::from_points(vec![Landmark::new(x, y); HAND_POINT_COUNT]).unwrap(),
        handedness: Handedness::Right,
    }
}
