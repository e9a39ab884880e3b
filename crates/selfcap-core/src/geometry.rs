//! Geometric validation predicates.
//!
//! Pure functions over landmark and bounding-box data. Coordinates are
//! normalized `[0,1]`; angles are `atan(ratio)` in degrees. Every ratio
//! guards its denominator: a near-degenerate landmark configuration rejects
//! instead of dividing, since it means the detector output cannot be
//! trusted for that frame.

use crate::config::ValidatorConfig;
use crate::landmarks::{face_index, BoundingBox, DetectedHand, FaceLandmarks};

/// Smallest normalized span a ratio denominator may have. Below this the
/// landmark configuration is degenerate and the predicate rejects.
const MIN_SPAN: f32 = 1e-4;

/// Outcome of the face distance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceCheck {
    InRange,
    TooFar,
    TooClose,
}

/// Compare the face width ratio (bbox width over frame width, which is already the
/// normalized bbox width) against the configured bounds. Both bounds are
/// inclusive: a ratio exactly at either limit is in range.
pub fn check_face_distance(
    bbox: &BoundingBox,
    min_size_factor: f32,
    max_size_factor: f32,
) -> DistanceCheck {
    let ratio = bbox.width;
    if ratio < min_size_factor {
        DistanceCheck::TooFar
    } else if ratio > max_size_factor {
        DistanceCheck::TooClose
    } else {
        DistanceCheck::InRange
    }
}

/// The elliptical target region a face must be centered in. Derived once
/// from config; all containment tests run against it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OvalGuide {
    pub center_x: f32,
    pub center_y: f32,
    pub radius_x: f32,
    pub radius_y: f32,
    /// Ellipse-equation bound; 1.0 is the exact oval.
    pub containment_threshold: f32,
    /// Extra radius fraction granted to bbox corners.
    pub corner_margin: f32,
}

impl OvalGuide {
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.5,
            radius_x: config.oval_radius_x_factor,
            radius_y: config.oval_radius_y_factor,
            containment_threshold: config.oval_containment_threshold,
            corner_margin: config.oval_corner_margin,
        }
    }

    fn ellipse_value(&self, x: f32, y: f32, radius_scale: f32) -> f32 {
        let nx = (x - self.center_x) / (self.radius_x * radius_scale);
        let ny = (y - self.center_y) / (self.radius_y * radius_scale);
        nx * nx + ny * ny
    }

    /// Normalized ellipse-containment test for a single point.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.ellipse_value(x, y, 1.0) <= self.containment_threshold
    }

    /// Containment test for a face bounding box. The center must be inside
    /// the oval proper; each corner may spill outside by the corner margin.
    pub fn contains_face_bbox(&self, bbox: &BoundingBox) -> bool {
        let (cx, cy) = bbox.center();
        if !self.contains_point(cx, cy) {
            return false;
        }
        let corner_scale = 1.0 + self.corner_margin;
        let corners = [
            (bbox.x_min, bbox.y_min),
            (bbox.x_max(), bbox.y_min),
            (bbox.x_min, bbox.y_max()),
            (bbox.x_max(), bbox.y_max()),
        ];
        corners
            .iter()
            .all(|&(x, y)| self.ellipse_value(x, y, corner_scale) <= self.containment_threshold)
    }
}

/// Head pose: roll from the eye-corner slope, yaw from the nose offset
/// against the inter-eye midpoint, pitch from the vertical ordering and
/// proportion of forehead / eye line / nose / mouth / chin. All three must
/// pass. Degenerate spans and implausible proportions reject; that guards
/// against landmark noise and partial occlusion, not just tilt.
pub fn is_head_straight(
    landmarks: &FaceLandmarks,
    max_tilt_degrees: f32,
    pitch_proportion_range: (f32, f32),
) -> bool {
    let left_eye = landmarks.point(face_index::LEFT_EYE_OUTER);
    let right_eye = landmarks.point(face_index::RIGHT_EYE_OUTER);
    let nose = landmarks.nose_tip();

    // Roll: slope of the eye-to-eye line
    let eye_dx = right_eye.x - left_eye.x;
    if eye_dx.abs() < MIN_SPAN {
        return false;
    }
    let roll = ((right_eye.y - left_eye.y) / eye_dx).atan().to_degrees();
    if roll.abs() > max_tilt_degrees {
        return false;
    }

    // Yaw: horizontal nose offset from the inter-eye midpoint, normalized by
    // the inter-eye distance
    let eye_distance = left_eye.distance_to(&right_eye);
    if eye_distance < MIN_SPAN {
        return false;
    }
    let mid_x = (left_eye.x + right_eye.x) / 2.0;
    let yaw = ((nose.x - mid_x) / eye_distance).atan().to_degrees();
    if yaw.abs() > max_tilt_degrees {
        return false;
    }

    // Pitch: vertical ordering forehead < eyes < nose < mouth < chin, and
    // the nose sitting at a plausible height between eye line and chin
    let forehead = landmarks.point(face_index::FOREHEAD);
    let chin = landmarks.point(face_index::CHIN);
    let upper_lip = landmarks.point(face_index::UPPER_LIP);
    let eye_y = (left_eye.y + right_eye.y) / 2.0;
    if !(forehead.y < eye_y && eye_y < nose.y && nose.y < upper_lip.y && upper_lip.y < chin.y) {
        return false;
    }
    let span = chin.y - eye_y;
    if span < MIN_SPAN {
        return false;
    }
    let proportion = (nose.y - eye_y) / span;
    let (lo, hi) = pitch_proportion_range;
    proportion >= lo && proportion <= hi
}

/// Sanity check that the mouth is visible where a mouth should be: the lip
/// center below the nose tip by a minimum fraction of face height, and a
/// minimum forehead-to-chin spread. A hand or object over the lower face
/// collapses either margin.
pub fn is_face_geometry_plausible(
    landmarks: &FaceLandmarks,
    bbox: &BoundingBox,
    min_mouth_nose_gap_factor: f32,
    min_vertical_spread_factor: f32,
) -> bool {
    let face_height = bbox.height;
    if face_height < MIN_SPAN {
        return false;
    }
    let nose = landmarks.nose_tip();
    let upper_lip = landmarks.point(face_index::UPPER_LIP);
    let lower_lip = landmarks.point(face_index::LOWER_LIP);
    let lip_center_y = (upper_lip.y + lower_lip.y) / 2.0;
    if lip_center_y - nose.y < min_mouth_nose_gap_factor * face_height {
        return false;
    }
    let forehead = landmarks.point(face_index::FOREHEAD);
    let chin = landmarks.point(face_index::CHIN);
    chin.y - forehead.y >= min_vertical_spread_factor * face_height
}

/// True when any of the hand's landmarks comes within `max_distance`
/// (normalized Euclidean) of the face bounding-box center.
pub fn is_hand_near_face(hand: &DetectedHand, face_bbox: &BoundingBox, max_distance: f32) -> bool {
    let (cx, cy) = face_bbox.center();
    hand.landmarks.points().iter().any(|p| {
        let dx = p.x - cx;
        let dy = p.y - cy;
        (dx * dx + dy * dy).sqrt() <= max_distance
    })
}

/// Neutral expression: both eyes open, mouth closed, no smile. Smiling lifts
/// the mouth corners toward nose level, so each corner must keep a minimum
/// vertical gap below the nose tip.
pub fn is_neutral_expression(
    landmarks: &FaceLandmarks,
    bbox: &BoundingBox,
    min_eye_openness_factor: f32,
    max_mouth_openness_factor: f32,
    min_corner_nose_gap_factor: f32,
) -> bool {
    let face_height = bbox.height;
    if face_height < MIN_SPAN {
        return false;
    }

    let left_gap = landmarks.point(face_index::LEFT_EYE_BOTTOM).y
        - landmarks.point(face_index::LEFT_EYE_TOP).y;
    let right_gap = landmarks.point(face_index::RIGHT_EYE_BOTTOM).y
        - landmarks.point(face_index::RIGHT_EYE_TOP).y;
    let min_eye_gap = min_eye_openness_factor * face_height;
    if left_gap < min_eye_gap || right_gap < min_eye_gap {
        return false;
    }

    let lip_gap =
        landmarks.point(face_index::LOWER_LIP).y - landmarks.point(face_index::UPPER_LIP).y;
    if lip_gap > max_mouth_openness_factor * face_height {
        return false;
    }

    let nose_y = landmarks.nose_tip().y;
    let min_corner_gap = min_corner_nose_gap_factor * face_height;
    let left_corner = landmarks.point(face_index::MOUTH_LEFT);
    let right_corner = landmarks.point(face_index::MOUTH_RIGHT);
    left_corner.y - nose_y >= min_corner_gap && right_corner.y - nose_y >= min_corner_gap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use crate::testutil::{compliant_face, hand_at, FaceSpec};

    fn bbox(width: f32) -> BoundingBox {
        BoundingBox {
            x_min: 0.5 - width / 2.0,
            y_min: 0.25,
            width,
            height: 0.5,
        }
    }

    #[test]
    fn distance_in_range() {
        assert_eq!(check_face_distance(&bbox(0.4), 0.18, 0.70), DistanceCheck::InRange);
    }

    #[test]
    fn distance_too_far_and_too_close() {
        assert_eq!(check_face_distance(&bbox(0.10), 0.18, 0.70), DistanceCheck::TooFar);
        assert_eq!(check_face_distance(&bbox(0.85), 0.18, 0.70), DistanceCheck::TooClose);
    }

    #[test]
    fn distance_boundaries_are_inclusive() {
        assert_eq!(check_face_distance(&bbox(0.18), 0.18, 0.70), DistanceCheck::InRange);
        assert_eq!(check_face_distance(&bbox(0.70), 0.18, 0.70), DistanceCheck::InRange);
    }

    fn default_oval() -> OvalGuide {
        OvalGuide::from_config(&crate::config::ValidatorConfig::default())
    }

    #[test]
    fn oval_contains_center_and_rejects_edge() {
        let oval = default_oval();
        assert!(oval.contains_point(0.5, 0.5));
        assert!(oval.contains_point(0.5, 0.9)); // on the vertical radius, 0.4/0.44 < 1
        assert!(!oval.contains_point(0.02, 0.5));
        assert!(!oval.contains_point(0.5, 0.98));
    }

    #[test]
    fn oval_threshold_loosens_containment() {
        let mut oval = default_oval();
        // Just outside the exact ellipse
        assert!(!oval.contains_point(0.87, 0.5));
        oval.containment_threshold = 1.2;
        assert!(oval.contains_point(0.87, 0.5));
    }

    #[test]
    fn bbox_containment_requires_center_inside() {
        let oval = default_oval();
        let off_center = BoundingBox {
            x_min: 0.70,
            y_min: 0.4,
            width: 0.2,
            height: 0.2,
        };
        assert!(!oval.contains_face_bbox(&off_center));
    }

    #[test]
    fn bbox_corner_margin_allows_slight_spill() {
        let oval = default_oval();
        // Corners land just outside the exact oval but inside the margin
        let snug = BoundingBox {
            x_min: 0.5 - 0.27,
            y_min: 0.5 - 0.33,
            width: 0.54,
            height: 0.66,
        };
        let corner = oval.ellipse_value(snug.x_min, snug.y_min, 1.0);
        assert!(corner > oval.containment_threshold, "corner should start outside");
        assert!(oval.contains_face_bbox(&snug));
    }

    #[test]
    fn straight_head_passes() {
        let face = compliant_face(&FaceSpec::default());
        assert!(is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn rolled_head_rejected() {
        let mut spec = FaceSpec::default();
        spec.eye_line_roll = 0.06; // right eye 0.06 lower over a 0.4 span, about 8.5 degrees: passes
        let face = compliant_face(&spec);
        assert!(is_head_straight(&face, 10.0, (0.25, 0.70)));
        spec.eye_line_roll = 0.10; // about 14 degrees: rejected
        let face = compliant_face(&spec);
        assert!(!is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn turned_head_rejected_by_yaw() {
        let mut spec = FaceSpec::default();
        spec.nose_x_offset = 0.09; // atan(0.09/0.4) ≈ 12.7°
        let face = compliant_face(&spec);
        assert!(!is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn pitched_head_rejected_by_proportion() {
        let mut spec = FaceSpec::default();
        spec.nose_y_offset = -0.06; // nose rides high: proportion drops below 0.25
        let face = compliant_face(&spec);
        assert!(!is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn dropped_nose_breaks_ordering() {
        let mut spec = FaceSpec::default();
        spec.nose_y_offset = 0.12; // nose reported below the upper lip
        let face = compliant_face(&spec);
        assert!(!is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn broken_vertical_ordering_rejected() {
        let mut spec = FaceSpec::default();
        spec.nose_y_offset = -0.16; // nose above the eye line
        let face = compliant_face(&spec);
        assert!(!is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn coincident_eyes_rejected() {
        let spec = FaceSpec {
            width: 0.0,
            ..FaceSpec::default()
        };
        let face = compliant_face(&spec);
        assert!(!is_head_straight(&face, 10.0, (0.25, 0.70)));
    }

    #[test]
    fn plausible_geometry_passes() {
        let spec = FaceSpec::default();
        let face = compliant_face(&spec);
        let bbox = BoundingBox::around(face.points());
        assert!(is_face_geometry_plausible(&face, &bbox, 0.10, 0.40));
    }

    #[test]
    fn covered_mouth_is_implausible() {
        // Lips reported at nose height: the gap collapses
        let mut spec = FaceSpec::default();
        spec.lip_y_offset = -0.19;
        let face = compliant_face(&spec);
        let bbox = BoundingBox::around(face.points());
        assert!(!is_face_geometry_plausible(&face, &bbox, 0.10, 0.40));
    }

    #[test]
    fn hand_near_face_center() {
        let face_bbox = bbox(0.4);
        let near = hand_at(0.55, 0.55);
        let far = hand_at(0.05, 0.05);
        assert!(is_hand_near_face(&near, &face_bbox, 0.15));
        assert!(!is_hand_near_face(&far, &face_bbox, 0.15));
    }

    #[test]
    fn hand_single_stray_point_counts() {
        let face_bbox = bbox(0.4);
        let mut hand = hand_at(0.05, 0.05);
        // Fingertip reaches toward the face
        let mut points: Vec<Landmark> = hand.landmarks.points().to_vec();
        points[8] = Landmark::new(0.52, 0.48);
        hand.landmarks = crate::landmarks::HandLandmarks::from_points(points).unwrap();
        assert!(is_hand_near_face(&hand, &face_bbox, 0.15));
    }

    #[test]
    fn neutral_expression_passes() {
        let face = compliant_face(&FaceSpec::default());
        let bbox = BoundingBox::around(face.points());
        assert!(is_neutral_expression(&face, &bbox, 0.022, 0.06, 0.06));
    }

    #[test]
    fn closed_eyes_rejected() {
        let mut spec = FaceSpec::default();
        spec.eye_openness = 0.004;
        let face = compliant_face(&spec);
        let bbox = BoundingBox::around(face.points());
        assert!(!is_neutral_expression(&face, &bbox, 0.022, 0.06, 0.06));
    }

    #[test]
    fn open_mouth_rejected() {
        let mut spec = FaceSpec::default();
        spec.mouth_openness = 0.08;
        let face = compliant_face(&spec);
        let bbox = BoundingBox::around(face.points());
        assert!(!is_neutral_expression(&face, &bbox, 0.022, 0.06, 0.06));
    }

    #[test]
    fn smile_rejected_by_corner_elevation() {
        let mut spec = FaceSpec::default();
        spec.corner_lift = 0.16; // corners rise to just below the nose
        let face = compliant_face(&spec);
        let bbox = BoundingBox::around(face.points());
        assert!(!is_neutral_expression(&face, &bbox, 0.022, 0.06, 0.06));
    }
}
