//! The landmark detector seam.
//!
//! Detection is a black box: given a frame it returns raw landmark vectors
//! for zero or more faces and hands, normalized against that frame's own
//! dimensions. How the landmarks are computed is none of this crate's
//! business. What IS this crate's business is the boundary: raw vectors are
//! validated into typed sets on ingestion, and anything with the wrong
//! point count is dropped as if it had not been detected at all.

use thiserror::Error;

use crate::frame::VideoFrame;
use selfcap_core::{DetectedHand, FaceLandmarks, HandLandmarks, Handedness, Landmark};

#[derive(Error, Debug)]
pub enum DetectorError {
    /// The detector has not produced a result for this frame time yet
    /// (model warm-up, first frames). The driver skips the iteration.
    #[error("detector not ready")]
    NotReady,
    /// A single detection call failed; the next frame may succeed.
    #[error("detection failed: {0}")]
    Failed(String),
    /// The detector is gone (model unloaded, backend died). Fatal to the
    /// session.
    #[error("detector unavailable: {0}")]
    Unavailable(String),
}

/// Unvalidated detector output for one frame.
#[derive(Debug, Clone, Default)]
pub struct RawDetection {
    /// Zero or more faces, each a raw landmark vector.
    pub faces: Vec<Vec<Landmark>>,
    /// Zero or more hands.
    pub hands: Vec<RawHand>,
}

#[derive(Debug, Clone)]
pub struct RawHand {
    pub points: Vec<Landmark>,
    pub handedness: Handedness,
}

/// The external face/hand landmark detector.
pub trait LandmarkDetector: Send {
    /// Detect faces and hands in the given frame. Called once per frame,
    /// synchronously, from the single driver task.
    fn detect(&mut self, frame: &VideoFrame) -> Result<RawDetection, DetectorError>;
}

/// Validated detection ready for classification.
#[derive(Debug, Clone, Default)]
pub struct IngestedDetection {
    pub faces: Vec<FaceLandmarks>,
    pub hands: Vec<DetectedHand>,
}

/// Validate raw detector output. Sets with the wrong point count never make
/// it past this point; for every downstream purpose they were not detected.
pub fn ingest(raw: RawDetection) -> IngestedDetection {
    let faces = raw
        .faces
        .into_iter()
        .filter_map(|points| match FaceLandmarks::from_points(points) {
            Ok(face) => Some(face),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed face landmark set");
                None
            }
        })
        .collect();

    let hands = raw
        .hands
        .into_iter()
        .filter_map(|hand| match HandLandmarks::from_points(hand.points) {
            Ok(landmarks) => Some(DetectedHand {
                landmarks,
                handedness: hand.handedness,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed hand landmark set");
                None
            }
        })
        .collect();

    IngestedDetection { faces, hands }
}
