//! Recording sink interface.
//!
//! The clip encoder is an external collaborator; the pipeline only
//! depends on this trait. Implementations must either write each frame
//! within the per-frame budget or buffer internally with backpressure.
//! Blocking the caller is acceptable; silently dropping frames is not.

use crate::capture::Frame;
use thiserror::Error;

/// Errors surfaced by a recorder.
///
/// The processor logs these and carries on; a failing recorder never
/// takes down the detection loop.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("insufficient disk space: {available} bytes free, {required} required")]
    InsufficientDisk { available: u64, required: u64 },
    #[error("recording is disabled")]
    Disabled,
    #[error("{0}")]
    Other(String),
}

/// A sink for recorded thermal footage.
///
/// Frames arrive strictly in capture order. `check_can_record` is a
/// pre-flight gate called before each recording starts; typical
/// implementations check disk space and duty cycle there.
pub trait Recorder {
    /// Opens a new clip.
    fn start_recording(&mut self) -> Result<(), RecorderError>;

    /// Finalizes the current clip, flushing and closing the file.
    fn stop_recording(&mut self) -> Result<(), RecorderError>;

    /// Appends one frame to the current clip.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), RecorderError>;

    /// Checks whether a recording could start right now.
    fn check_can_record(&self) -> Result<(), RecorderError>;
}

/// Recorder that accepts and discards everything.
///
/// Used for dry runs and as a stand-in when no clip encoder is wired up.
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn start_recording(&mut self) -> Result<(), RecorderError> {
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), RecorderError> {
        Ok(())
    }

    fn write_frame(&mut self, _frame: &Frame) -> Result<(), RecorderError> {
        Ok(())
    }

    fn check_can_record(&self) -> Result<(), RecorderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_recorder_accepts_everything() {
        let mut recorder = NullRecorder;
        assert!(recorder.check_can_record().is_ok());
        assert!(recorder.start_recording().is_ok());
        assert!(recorder.write_frame(&Frame::default()).is_ok());
        assert!(recorder.stop_recording().is_ok());
    }
}
