//! Prometheus metrics exporter for the recording pipeline.
//!
//! Provides observability into a deployed unit: frames processed, motion
//! verdicts, recordings, and whether a clip is open right now.
//!
//! # Metrics Exposed
//!
//! - `thermal_sentry_frames_total` - Total camera frames processed
//! - `thermal_sentry_motion_frames_total` - Frames with a positive motion verdict
//! - `thermal_sentry_recordings_total` - Recordings started
//! - `thermal_sentry_frames_written_total` - Frames handed to the recorder
//! - `thermal_sentry_recording_active` - Whether a recording is open (1=yes)

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
