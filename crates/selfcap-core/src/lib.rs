//! Selfcap validation core.
//!
//! Frame-by-frame validation of a selfie video stream: geometric and
//! photometric predicates over detected landmarks, a strict-precedence
//! frame classifier producing exactly one [`ValidationStatus`] per frame,
//! and the temporal stability tracking that gates automatic capture.
//!
//! This crate is pure and host-agnostic: no camera, no detector, no clock.
//! The host feeds validated landmark sets and frame timestamps in;
//! classification comes out. Pixel access for the photometric checks is
//! injected through the [`PixelSampler`] seam. Session orchestration lives
//! in `selfcap-pipeline`.

/// Landmark data model and boundary validation.
pub mod landmarks;

/// Geometric validation predicates.
pub mod geometry;

/// Photometric predicates: brightness and dark-glasses detection.
pub mod illumination;

/// Temporal stability tracking.
pub mod stability;

/// The per-frame classifier state machine.
pub mod classifier;

/// Session configuration.
pub mod config;

#[cfg(test)]
pub(crate) mod testutil;

pub use classifier::{CheckKind, Classification, FrameClassifier, FrameInput, ValidationStatus};
pub use config::{ConfigError, ValidatorConfig};
pub use geometry::{DistanceCheck, OvalGuide};
pub use illumination::{PixelSampler, SampleError};
pub use landmarks::{
    BoundingBox, DetectedFace, DetectedHand, FaceLandmarks, FrameGeometry, HandLandmarks,
    Handedness, Landmark, LandmarkError, FACE_POINT_COUNT, HAND_POINT_COUNT,
};
pub use stability::{is_face_stable, StabilityState};
