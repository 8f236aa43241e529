//! Thermal Motion Recording Library
//!
//! Detects warm moving objects in a stream of low-resolution thermal
//! camera frames and records short clips spanning each motion event,
//! including pre-trigger context. Built for unattended wildlife
//! monitoring on a single-board computer.
//!
//! # Architecture
//!
//! One thread drives the pipeline in lock-step with the camera:
//!
//! ```text
//! camera → MotionProcessor::process → MotionDetector::detect
//!               │                            │
//!               │ pre-roll FrameLoop         │ floored + diff FrameLoops
//!               ▼                            ▼
//!           Recorder::write_frame      motion verdict
//! ```
//!
//! # Design Principles
//!
//! - **Allocation-free hot path**: every frame buffer is sized at
//!   startup and reused for the life of the process
//! - **Retroactive recording**: a ring of pre-roll frames is replayed
//!   into each clip so the motion onset has context
//! - **Recalibration aware**: whole-frame steps from the sensor's
//!   flat-field correction are re-baselined, not reported as motion
//! - **Best-effort recording**: recorder failures are logged and the
//!   state machine moves on; only invalid configuration is fatal
//!
//! # Example
//!
//! ```no_run
//! use thermal_sentry::{
//!     capture::{Camera, MockCamera, RawFrame},
//!     config::{MotionConfig, RecorderConfig},
//!     motion::MotionProcessor,
//!     recorder::NullRecorder,
//! };
//!
//! let mut camera = MockCamera::with_blob(30);
//! camera.open().unwrap();
//!
//! let mut processor = MotionProcessor::new(
//!     &MotionConfig::default(),
//!     &RecorderConfig::default(),
//!     Box::new(NullRecorder),
//!     None,
//! );
//!
//! let mut raw = RawFrame::default();
//! for _ in 0..100 {
//!     camera.capture(&mut raw).unwrap();
//!     processor.process(&raw);
//! }
//! processor.stop();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod metrics;
pub mod motion;
pub mod recorder;
pub mod snapshot;
pub mod window;

// Re-export commonly used types at crate root
pub use capture::{Camera, Frame, MockCamera, RawFrame, COLS, FPS, ROWS};
pub use config::{FileConfig, MotionConfig, RecorderConfig};
pub use motion::{DetectionState, MotionDetector, MotionProcessor, MotionState};
pub use recorder::{NullRecorder, Recorder, RecorderError};
pub use snapshot::Snapshotter;
pub use window::RecordingWindow;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
