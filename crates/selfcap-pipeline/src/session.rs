//! The validator session and its detection loop driver.
//!
//! A session is one cooperative task: pull a frame, detect, classify, emit,
//! maybe capture, repeat. All mutable state (the stability record and the
//! capture latch) is touched only by this task, so there is no locking.
//! Suspension points exist only at the loop boundary: a frame is processed
//! to completion before the next one is looked at.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::capture::{CapturedImage, PngStillEncoder, StillEncoder};
use crate::detector::{ingest, DetectorError, IngestedDetection, LandmarkDetector};
use crate::events::{OverlayFrame, ValidationEvent};
use crate::frame::{FrameRegionSampler, VideoFrame};
use crate::messages::{JsonCatalog, MessageCatalog};
use selfcap_core::{
    BoundingBox, ConfigError, FrameClassifier, FrameInput, StabilityState, ValidationStatus,
    ValidatorConfig,
};

/// Events the session can buffer before the driver awaits the observer.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Handle to a running validation session.
///
/// Dropping the handle stops the session: the driver notices the closed
/// stop signal (or the closed event channel) at the next loop boundary.
pub struct SessionHandle {
    id: Uuid,
    events: mpsc::Receiver<ValidationEvent>,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next observer event, in frame order. `None` once the session has
    /// ended (captured, stopped, fatal fault, or frame source closed).
    pub async fn next_event(&mut self) -> Option<ValidationEvent> {
        self.events.recv().await
    }

    /// Stop the session. No further status or capture events are emitted
    /// after this returns; the driver exits at the next loop boundary.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Wait for the driver task to finish.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

/// Entry point: spawns the detection loop for one capture attempt.
pub struct ValidatorSession;

impl ValidatorSession {
    /// Spawn a session with the default PNG encoder and built-in messages.
    pub fn spawn<D>(
        detector: D,
        frames: mpsc::Receiver<VideoFrame>,
        config: ValidatorConfig,
    ) -> Result<SessionHandle, ConfigError>
    where
        D: LandmarkDetector + Sync + 'static,
    {
        Self::spawn_with(detector, frames, PngStillEncoder, JsonCatalog::builtin(), config)
    }

    /// Spawn a session with every seam supplied by the host.
    pub fn spawn_with<D, E, C>(
        detector: D,
        frames: mpsc::Receiver<VideoFrame>,
        encoder: E,
        catalog: C,
        config: ValidatorConfig,
    ) -> Result<SessionHandle, ConfigError>
    where
        D: LandmarkDetector + Sync + 'static,
        E: StillEncoder + Sync + 'static,
        C: MessageCatalog + Sync + 'static,
    {
        config.validate()?;
        let id = Uuid::new_v4();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = watch::channel(false);

        let driver = Driver {
            id,
            classifier: FrameClassifier::new(config),
            detector,
            encoder,
            catalog,
            frames,
            events: events_tx,
            stop: stop_rx,
            state: StabilityState::reset(),
            is_capturing: false,
        };
        let task = tokio::spawn(driver.run());

        Ok(SessionHandle {
            id,
            events: events_rx,
            stop: stop_tx,
            task,
        })
    }
}

/// The detection loop. Owns every piece of mutable session state.
struct Driver<D, E, C> {
    id: Uuid,
    classifier: FrameClassifier,
    detector: D,
    encoder: E,
    catalog: C,
    frames: mpsc::Receiver<VideoFrame>,
    events: mpsc::Sender<ValidationEvent>,
    stop: watch::Receiver<bool>,
    state: StabilityState,
    /// Latch: set when capture begins, released only if encoding fails.
    is_capturing: bool,
}

impl<D, E, C> Driver<D, E, C>
where
    D: LandmarkDetector,
    E: StillEncoder,
    C: MessageCatalog,
{
    async fn run(mut self) {
        tracing::info!(session = %self.id, "validation session started");

        let initial = self.status_event(ValidationStatus::Initializing, None);
        if !self.emit(initial).await {
            return;
        }

        loop {
            tokio::select! {
                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        tracing::info!(session = %self.id, "session stopped");
                        break;
                    }
                }
                frame = self.frames.recv() => {
                    let Some(frame) = frame else {
                        tracing::info!(session = %self.id, "frame source closed; session ending");
                        break;
                    };
                    if !self.step(&frame).await {
                        break;
                    }
                }
            }
        }
    }

    /// One full iteration. Returns `false` when the loop must halt.
    async fn step(&mut self, frame: &VideoFrame) -> bool {
        let raw = match self.detector.detect(frame) {
            Ok(raw) => raw,
            Err(DetectorError::NotReady) => {
                // Warm-up: keep looping, classify nothing this iteration
                tracing::trace!(session = %self.id, "detector not ready; skipping frame");
                return true;
            }
            Err(e @ DetectorError::Failed(_)) => {
                tracing::warn!(session = %self.id, error = %e, "detection failed for this frame");
                return self
                    .emit(ValidationEvent::Fault {
                        status: ValidationStatus::Error,
                        error: e.to_string(),
                    })
                    .await;
            }
            Err(e @ DetectorError::Unavailable(_)) => {
                tracing::error!(session = %self.id, error = %e, "detector unavailable; halting session");
                let _ = self
                    .emit(ValidationEvent::Fault {
                        status: ValidationStatus::Error,
                        error: e.to_string(),
                    })
                    .await;
                return false;
            }
        };

        let detection = ingest(raw);
        // Scoped so the frame borrow ends before the first suspension point
        let result = {
            let sampler = FrameRegionSampler::new(frame);
            let input = FrameInput {
                faces: &detection.faces,
                hands: &detection.hands,
                frame: frame.geometry(),
                timestamp_ms: frame.timestamp_ms,
                sampler: Some(&sampler),
            };
            self.classifier.classify(&input, &self.state)
        };
        self.state = result.state;

        let event = self.status_event(result.status, Some(&detection));
        if !self.emit(event).await {
            return false;
        }

        if result.status == ValidationStatus::Capturing && !self.is_capturing {
            self.is_capturing = true;
            return self.capture(frame).await;
        }
        true
    }

    /// Extract the still from the current frame. On success the session is
    /// complete; on failure the latch is released and the loop continues so
    /// a later compliant window can retry.
    async fn capture(&mut self, frame: &VideoFrame) -> bool {
        match self.encoder.encode(frame) {
            Ok(bytes) => {
                tracing::info!(session = %self.id, bytes = bytes.len(), "still captured");
                let image = CapturedImage {
                    bytes,
                    width: frame.width,
                    height: frame.height,
                    session_id: self.id,
                    captured_at: chrono::Utc::now(),
                };
                if !self.emit(ValidationEvent::Captured(image)).await {
                    return false;
                }
                let success = self.status_event(ValidationStatus::Success, None);
                let _ = self.emit(success).await;
                false
            }
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "still encoding failed; releasing capture latch");
                self.is_capturing = false;
                self.emit(ValidationEvent::Fault {
                    status: ValidationStatus::Error,
                    error: e.to_string(),
                })
                .await
            }
        }
    }

    fn status_event(
        &self,
        status: ValidationStatus,
        detection: Option<&IngestedDetection>,
    ) -> ValidationEvent {
        let config = self.classifier.config();
        let message = self.catalog.message(&config.locale, status);
        let face = detection.and_then(|d| d.faces.first());
        let overlay = OverlayFrame {
            status,
            oval: *self.classifier.oval(),
            face_bbox: face.map(|f| BoundingBox::around(f.points())),
            hands: detection.map(|d| d.hands.clone()).unwrap_or_default(),
            face_landmarks: if config.debug_mode { face.cloned() } else { None },
        };
        ValidationEvent::Status {
            status,
            message,
            overlay,
        }
    }

    /// Send an event to the observer. A stopped session emits nothing; a
    /// gone observer ends the session.
    async fn emit(&self, event: ValidationEvent) -> bool {
        if *self.stop.borrow() {
            return false;
        }
        if self.events.send(event).await.is_err() {
            tracing::debug!(session = %self.id, "observer gone; ending session");
            return false;
        }
        true
    }
}
