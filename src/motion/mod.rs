//! Motion detection and recording pipeline.
//!
//! Three pieces, smallest first: [`FrameLoop`] keeps a sliding window of
//! frames over fixed storage, [`MotionDetector`] turns each frame into a
//! motion verdict, and [`MotionProcessor`] drives a recorder from those
//! verdicts. The whole pipeline runs on one thread in lock-step with the
//! camera.

mod detector;
mod frame_loop;
mod processor;

pub use detector::{DetectionState, MotionDetector, MotionState};
pub use frame_loop::FrameLoop;
pub use processor::{MotionProcessor, ProcessorStatus, RecordingListener};
