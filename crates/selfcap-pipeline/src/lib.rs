//! Selfcap session orchestration.
//!
//! Wires the pure validation core to a host application: frames come in on
//! a channel, the single-task detection loop classifies each one, and the
//! observer consumes a channel of status events, the captured still, and
//! faults. The landmark detector, still encoder and message catalog are
//! injected seams; see [`LandmarkDetector`], [`StillEncoder`] and
//! [`MessageCatalog`].
//!
//! ```no_run
//! use selfcap_core::ValidatorConfig;
//! use selfcap_pipeline::{ValidationEvent, ValidatorSession};
//! # use selfcap_pipeline::{DetectorError, LandmarkDetector, RawDetection, VideoFrame};
//! # struct MyDetector;
//! # impl LandmarkDetector for MyDetector {
//! #     fn detect(&mut self, _: &VideoFrame) -> Result<RawDetection, DetectorError> {
//! #         Ok(RawDetection::default())
//! #     }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (frames_tx, frames_rx) = tokio::sync::mpsc::channel(8);
//! let mut session = ValidatorSession::spawn(MyDetector, frames_rx, ValidatorConfig::from_env())?;
//!
//! // Host: push frames as the camera produces them...
//! # let frame = VideoFrame::new(vec![0; 12], 2, 2, 0.0)?;
//! frames_tx.send(frame).await?;
//!
//! while let Some(event) = session.next_event().await {
//!     match event {
//!         ValidationEvent::Status { status, message, .. } => {
//!             println!("{status:?}: {message}");
//!         }
//!         ValidationEvent::Captured(image) => {
//!             std::fs::write("selfie.png", &image.bytes)?;
//!         }
//!         ValidationEvent::Fault { error, .. } => eprintln!("fault: {error}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Video frame handling and the per-frame pixel sampler.
pub mod frame;

/// The landmark detector seam and ingestion boundary.
pub mod detector;

/// Still image extraction.
pub mod capture;

/// User-facing status messages.
pub mod messages;

/// Observer events.
pub mod events;

/// The validator session and its detection loop driver.
pub mod session;

pub use capture::{CaptureError, CapturedImage, PngStillEncoder, StillEncoder};
pub use detector::{
    ingest, DetectorError, IngestedDetection, LandmarkDetector, RawDetection, RawHand,
};
pub use events::{OverlayFrame, ValidationEvent};
pub use frame::{FrameError, FrameRegionSampler, VideoFrame};
pub use messages::{CatalogError, JsonCatalog, MessageCatalog};
pub use session::{SessionHandle, ValidatorSession};
