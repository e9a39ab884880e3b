//! Per-frame validation: one status per frame, strict precedence.
//!
//! The classifier applies the configured checks in order and stops at the
//! first failure, so the user always sees the single most relevant
//! corrective action. Every rejecting branch clears the stability state;
//! only an unbroken run of fully compliant frames reaches capture.
//!
//! Classification is a pure function of the frame input, the previous
//! stability state and the session configuration: the same inputs always
//! produce the same status and successor state.

use serde::{Deserialize, Serialize};

use crate::config::ValidatorConfig;
use crate::geometry::{
    check_face_distance, is_face_geometry_plausible, is_hand_near_face, is_head_straight,
    is_neutral_expression, DistanceCheck, OvalGuide,
};
use crate::illumination::{average_brightness, has_dark_glasses, PixelSampler};
use crate::landmarks::{DetectedFace, DetectedHand, FaceLandmarks, FrameGeometry};
use crate::stability::{is_face_stable, StabilityState};

/// The single status describing the current frame. Recomputed every frame,
/// never accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Initializing,
    NoFaceDetected,
    FaceDetected,
    TooClose,
    TooFar,
    OffCenter,
    FaceObstructed,
    HeadNotStraight,
    MultipleFaces,
    PoorIllumination,
    NotNeutralExpression,
    DarkGlasses,
    StayStill,
    Capturing,
    Success,
    Error,
}

impl ValidationStatus {
    /// Stable string form, used as the message-catalog key.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Initializing => "INITIALIZING",
            Self::NoFaceDetected => "NO_FACE_DETECTED",
            Self::FaceDetected => "FACE_DETECTED",
            Self::TooClose => "TOO_CLOSE",
            Self::TooFar => "TOO_FAR",
            Self::OffCenter => "OFF_CENTER",
            Self::FaceObstructed => "FACE_OBSTRUCTED",
            Self::HeadNotStraight => "HEAD_NOT_STRAIGHT",
            Self::MultipleFaces => "MULTIPLE_FACES",
            Self::PoorIllumination => "POOR_ILLUMINATION",
            Self::NotNeutralExpression => "NOT_NEUTRAL_EXPRESSION",
            Self::DarkGlasses => "DARK_GLASSES",
            Self::StayStill => "STAY_STILL",
            Self::Capturing => "CAPTURING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

/// One configurable check in the validation pipeline. The face-count gate
/// and the stability step bracket the pipeline and always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Distance,
    Centering,
    MouthVisibility,
    HeadPose,
    HandProximity,
    NeutralExpression,
    DarkGlasses,
    Illumination,
}

impl CheckKind {
    /// The full pipeline in its default evaluation order.
    pub fn default_pipeline() -> Vec<CheckKind> {
        vec![
            CheckKind::Distance,
            CheckKind::Centering,
            CheckKind::MouthVisibility,
            CheckKind::HeadPose,
            CheckKind::HandProximity,
            CheckKind::NeutralExpression,
            CheckKind::DarkGlasses,
            CheckKind::Illumination,
        ]
    }
}

/// Everything the classifier may consult for one frame.
pub struct FrameInput<'a> {
    /// Validated face landmark sets found in the frame.
    pub faces: &'a [FaceLandmarks],
    /// Validated hands found in the frame.
    pub hands: &'a [DetectedHand],
    /// Pixel dimensions of the frame.
    pub frame: FrameGeometry,
    /// Frame presentation time in milliseconds.
    pub timestamp_ms: f64,
    /// Crop provider for the photometric checks. `None` skips them.
    pub sampler: Option<&'a dyn PixelSampler>,
}

/// Result of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: ValidationStatus,
    pub state: StabilityState,
}

/// The per-frame state machine. Holds the immutable session configuration
/// and the oval guide derived from it.
pub struct FrameClassifier {
    config: ValidatorConfig,
    oval: OvalGuide,
}

impl FrameClassifier {
    pub fn new(config: ValidatorConfig) -> Self {
        let oval = OvalGuide::from_config(&config);
        Self { config, oval }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn oval(&self) -> &OvalGuide {
        &self.oval
    }

    /// Classify one frame. Exactly one status comes out; any rejecting
    /// status carries a cleared stability state.
    pub fn classify(&self, input: &FrameInput<'_>, previous: &StabilityState) -> Classification {
        let status = self.evaluate(input, previous);
        tracing::trace!(status = status.0.as_key(), "frame classified");
        Classification {
            status: status.0,
            state: status.1,
        }
    }

    fn evaluate(
        &self,
        input: &FrameInput<'_>,
        previous: &StabilityState,
    ) -> (ValidationStatus, StabilityState) {
        let face = match input.faces {
            [] => return (ValidationStatus::NoFaceDetected, StabilityState::reset()),
            [only] => DetectedFace::new(only.clone(), input.timestamp_ms),
            _ => return (ValidationStatus::MultipleFaces, StabilityState::reset()),
        };

        for check in &self.config.checks {
            if let Some(rejection) = self.run_check(*check, &face, input) {
                return (rejection, StabilityState::reset());
            }
        }

        self.track_stability(face, input, previous)
    }

    /// Run one configured check. `Some` is the rejecting status.
    fn run_check(
        &self,
        check: CheckKind,
        face: &DetectedFace,
        input: &FrameInput<'_>,
    ) -> Option<ValidationStatus> {
        let config = &self.config;
        match check {
            CheckKind::Distance => match check_face_distance(
                &face.bounding_box,
                config.min_face_size_factor,
                config.max_face_size_factor,
            ) {
                DistanceCheck::InRange => None,
                DistanceCheck::TooFar => Some(ValidationStatus::TooFar),
                DistanceCheck::TooClose => Some(ValidationStatus::TooClose),
            },
            CheckKind::Centering => {
                let nose = face.landmarks.nose_tip();
                let centered = self.oval.contains_point(nose.x, nose.y)
                    && self.oval.contains_face_bbox(&face.bounding_box);
                (!centered).then_some(ValidationStatus::OffCenter)
            }
            CheckKind::MouthVisibility => {
                let plausible = is_face_geometry_plausible(
                    &face.landmarks,
                    &face.bounding_box,
                    config.min_mouth_nose_gap_factor,
                    config.min_vertical_spread_factor,
                );
                (!plausible).then_some(ValidationStatus::FaceObstructed)
            }
            CheckKind::HeadPose => {
                let straight = is_head_straight(
                    &face.landmarks,
                    config.max_head_tilt_degrees,
                    config.pitch_proportion_range,
                );
                (!straight).then_some(ValidationStatus::HeadNotStraight)
            }
            CheckKind::HandProximity => {
                let obstructed = input.hands.iter().any(|hand| {
                    is_hand_near_face(hand, &face.bounding_box, config.max_hand_face_distance)
                });
                obstructed.then_some(ValidationStatus::FaceObstructed)
            }
            CheckKind::NeutralExpression => {
                let neutral = is_neutral_expression(
                    &face.landmarks,
                    &face.bounding_box,
                    config.min_eye_openness_factor,
                    config.max_mouth_openness_factor,
                    config.min_corner_nose_gap_factor,
                );
                (!neutral).then_some(ValidationStatus::NotNeutralExpression)
            }
            CheckKind::DarkGlasses => {
                let sampler = input.sampler?;
                has_dark_glasses(
                    sampler,
                    &face.landmarks,
                    config.dark_glasses_luminance_threshold,
                )
                .then_some(ValidationStatus::DarkGlasses)
            }
            CheckKind::Illumination => {
                let sampler = input.sampler?;
                match sampler.sample_region(&face.bounding_box) {
                    Ok(crop) => {
                        let brightness = average_brightness(&crop);
                        (brightness < config.min_illumination_threshold)
                            .then_some(ValidationStatus::PoorIllumination)
                    }
                    Err(e) => {
                        // Fall through: a failed crop must not reject the frame
                        tracing::warn!(error = %e, "face region sampling failed; skipping illumination check");
                        None
                    }
                }
            }
        }
    }

    /// The stability step: acknowledge a newly valid face, then require
    /// continuous stillness for the configured window before capture.
    fn track_stability(
        &self,
        face: DetectedFace,
        input: &FrameInput<'_>,
        previous: &StabilityState,
    ) -> (ValidationStatus, StabilityState) {
        let Some(reference) = &previous.last_detection else {
            // First fully valid frame since the last reset
            return (
                ValidationStatus::FaceDetected,
                StabilityState {
                    last_detection: Some(face),
                    stable_since_ms: None,
                },
            );
        };

        if is_face_stable(
            &face,
            reference,
            self.config.stability_movement_threshold_px,
            &input.frame,
        ) {
            let since = previous.stable_since_ms.unwrap_or(input.timestamp_ms);
            let elapsed = input.timestamp_ms - since;
            let status = if elapsed >= self.config.stabilization_time_ms as f64 {
                ValidationStatus::Capturing
            } else {
                ValidationStatus::StayStill
            };
            (
                status,
                StabilityState {
                    last_detection: Some(face),
                    stable_since_ms: Some(since),
                },
            )
        } else {
            tracing::debug!("face moved; stability window restarted");
            (
                ValidationStatus::StayStill,
                StabilityState {
                    last_detection: Some(face),
                    stable_since_ms: None,
                },
            )
        }
    }
}
