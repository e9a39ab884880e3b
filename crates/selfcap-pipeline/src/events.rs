//! Observer events.
//!
//! The host consumes a queue of events rather than registering callbacks:
//! one `Status` event per classified frame, delivered in frame order over
//! the session's mpsc channel, plus at most one `Captured` and any number
//! of per-frame `Fault`s.

use serde::Serialize;

use crate::capture::CapturedImage;
use selfcap_core::{BoundingBox, DetectedHand, FaceLandmarks, OvalGuide, ValidationStatus};

/// Drawing parameters for the host's overlay, refreshed with every status.
/// Serializable so hosts can forward it to an out-of-process UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayFrame {
    pub status: ValidationStatus,
    /// The target region to render as the on-screen guide.
    pub oval: OvalGuide,
    /// Bounding box of the face under validation, if any.
    pub face_bbox: Option<BoundingBox>,
    /// Hands visible this frame.
    pub hands: Vec<DetectedHand>,
    /// Raw face landmarks, populated only in debug mode, for diagnostics.
    pub face_landmarks: Option<FaceLandmarks>,
}

/// Everything a session reports to its observer.
#[derive(Debug)]
pub enum ValidationEvent {
    /// One per classified frame, in frame order.
    Status {
        status: ValidationStatus,
        message: String,
        overlay: OverlayFrame,
    },
    /// The captured still. Emitted exactly once per successful session.
    Captured(CapturedImage),
    /// A per-frame or fatal fault. The status is always `Error`; whether
    /// the session continues depends on the fault (see `DetectorError`).
    Fault {
        status: ValidationStatus,
        error: String,
    },
}
