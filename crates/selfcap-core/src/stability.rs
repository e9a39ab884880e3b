//! Temporal stability tracking.
//!
//! The classifier only permits capture after the face has been still for a
//! continuous window. Stillness is judged per frame pair in pixel space:
//! normalized deltas mean nothing to a user holding a phone, pixel deltas
//! do. Size gets twice the positional tolerance, since breathing and small
//! distance shifts change apparent size faster than they move the center.

use serde::{Deserialize, Serialize};

use crate::landmarks::{DetectedFace, FrameGeometry};

/// Rolling stability record owned by the running session. Any rejecting
/// status clears it entirely; the user re-earns the full window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityState {
    /// The detection the next frame is compared against. Replaced on every
    /// compliant frame.
    pub last_detection: Option<DetectedFace>,
    /// When the current uninterrupted stillness window began.
    pub stable_since_ms: Option<f64>,
}

impl StabilityState {
    pub fn reset() -> Self {
        Self::default()
    }

    /// Milliseconds of continuous stillness as of `now_ms`.
    pub fn stable_elapsed_ms(&self, now_ms: f64) -> f64 {
        self.stable_since_ms.map_or(0.0, |since| now_ms - since)
    }
}

/// Whether the face stayed still between two consecutive detections.
/// Centers and sizes are converted to pixels; the center may move up to
/// `movement_threshold_px` per axis and the box size up to twice that.
pub fn is_face_stable(
    current: &DetectedFace,
    previous: &DetectedFace,
    movement_threshold_px: f32,
    frame: &FrameGeometry,
) -> bool {
    let fw = frame.width as f32;
    let fh = frame.height as f32;

    let (cx, cy) = current.bounding_box.center();
    let (px, py) = previous.bounding_box.center();
    let center_dx = (cx - px).abs() * fw;
    let center_dy = (cy - py).abs() * fh;

    let size_dw = (current.bounding_box.width - previous.bounding_box.width).abs() * fw;
    let size_dh = (current.bounding_box.height - previous.bounding_box.height).abs() * fh;

    let size_tolerance = movement_threshold_px * 2.0;
    center_dx <= movement_threshold_px
        && center_dy <= movement_threshold_px
        && size_dw <= size_tolerance
        && size_dh <= size_tolerance
}
