//! Recording orchestration.
//!
//! The processor consumes raw frames in lock-step with the camera, asks
//! the detector for a verdict, and drives the recorder through a
//! trigger/hold state machine: recording starts only after a run of
//! consecutive motion frames, reaches back through a pre-roll of context
//! frames, stays open while motion persists, and is clamped to a hard
//! maximum length.
//!
//! The whole `process` path must finish well inside one frame period and
//! performs no allocation; every buffer is sized at construction.

use super::{FrameLoop, MotionDetector, MotionState};
use crate::capture::{Frame, RawFrame, FPS};
use crate::config::{MotionConfig, RecorderConfig};
use crate::recorder::{Recorder, RecorderError};
use crate::window::RecordingWindow;
use thiserror::Error;

/// Observer notified of detection and recording events.
///
/// Callbacks run on the frame-processing thread and must not block.
pub trait RecordingListener {
    /// A frame produced a positive motion verdict.
    fn motion_detected(&mut self);
    /// A recording has started; pre-roll frames are about to be written.
    fn recording_started(&mut self);
    /// Called immediately before the recorder is stopped.
    fn recording_ended(&mut self);
}

/// Counters exposed for logging and metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessorStatus {
    /// Frames processed since startup.
    pub total_frames: u64,
    /// Frames with a positive motion verdict.
    pub motion_frames: u64,
    /// Recordings started.
    pub recordings: u64,
    /// Frames handed to the recorder since startup, pre-roll included.
    pub frames_written: u64,
    /// Whether a recording is open right now.
    pub is_recording: bool,
}

/// Gate conditions that keep a recording from starting.
#[derive(Debug, Error)]
enum GateError {
    #[error("motion detected but outside of recording window")]
    OutsideWindow,
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

// Suppress repeated gate-failure logs within a burst for this long.
const GATE_LOG_SUPPRESS_SECS: usize = 10;

/// Consumes raw frames and drives a [`Recorder`] from motion verdicts.
pub struct MotionProcessor {
    detector: MotionDetector,
    motion_state: Box<MotionState>,
    frame_loop: FrameLoop,
    window: RecordingWindow,
    recorder: Box<dyn Recorder>,
    listener: Option<Box<dyn RecordingListener>>,

    min_frames: usize,
    max_frames: usize,
    trigger_frames: usize,

    is_recording: bool,
    frames_written: usize,
    write_until: usize,
    triggered: usize,
    total_frames: u64,
    motion_frames: u64,
    recordings: u64,
    total_written: u64,
    last_gate_log: Option<u64>,
}

impl MotionProcessor {
    /// Creates a processor from validated configuration.
    ///
    /// The frame loop is sized to hold the pre-roll plus the trigger
    /// run, so the entire lead-up to a trigger is still on hand when the
    /// recording starts.
    pub fn new(
        motion: &MotionConfig,
        recorder_conf: &RecorderConfig,
        recorder: Box<dyn Recorder>,
        listener: Option<Box<dyn RecordingListener>>,
    ) -> Self {
        let pre_roll = recorder_conf.preview_secs * FPS;
        Self {
            detector: MotionDetector::new(motion),
            motion_state: Box::new(MotionState::default()),
            frame_loop: FrameLoop::new(pre_roll + motion.trigger_frames),
            window: RecordingWindow::new(recorder_conf.window_start, recorder_conf.window_end),
            recorder,
            listener,
            min_frames: recorder_conf.min_secs * FPS,
            max_frames: recorder_conf.max_secs * FPS,
            trigger_frames: motion.trigger_frames,
            is_recording: false,
            frames_written: 0,
            write_until: 0,
            triggered: 0,
            total_frames: 0,
            motion_frames: 0,
            recordings: 0,
            total_written: 0,
            last_gate_log: None,
        }
    }

    /// Processes one raw camera frame.
    ///
    /// The readout is decoded straight into the loop's current slot;
    /// nothing is copied or allocated on this path.
    pub fn process(&mut self, raw: &RawFrame) {
        raw.to_frame(self.frame_loop.current_mut());
        self.process_current();
    }

    /// Processes an already-decoded frame by copying it in.
    pub fn process_frame(&mut self, src: &Frame) {
        self.frame_loop.current_mut().copy_from(src);
        self.process_current();
    }

    fn process_current(&mut self) {
        self.total_frames += 1;

        let motion = self
            .detector
            .detect(self.frame_loop.current(), &mut self.motion_state);

        if motion {
            self.motion_frames += 1;
            if let Some(listener) = &mut self.listener {
                listener.motion_detected();
            }
            self.triggered += 1;

            if self.is_recording {
                // Motion keeps the clip open, up to the hard maximum.
                self.write_until = (self.frames_written + self.min_frames).min(self.max_frames);
            } else if self.triggered < self.trigger_frames {
                // Not enough consecutive motion frames yet.
            } else {
                match self.can_start_writing() {
                    Err(err) => self.log_gated("recording not started", &err),
                    Ok(()) => match self.start_recording() {
                        Err(err) => {
                            self.log_gated("can't start recording", &GateError::Recorder(err))
                        }
                        Ok(()) => {
                            self.write_until = self.min_frames;
                            self.last_gate_log = None;
                        }
                    },
                }
            }
        } else {
            self.triggered = 0;
            // The motion burst is over; the next failure logs again.
            self.last_gate_log = None;
        }

        if self.is_recording {
            if let Err(err) = self.recorder.write_frame(self.frame_loop.current()) {
                tracing::error!(error = %err, "failed to write frame");
            }
            self.frames_written += 1;
            self.total_written += 1;
        }

        self.frame_loop.advance();

        if self.is_recording && self.frames_written >= self.write_until {
            if let Err(err) = self.stop_recording() {
                tracing::error!(error = %err, "failed to stop recording");
            }
        }
    }

    /// Copies the most recently completed frame into `dst`.
    ///
    /// This is the snapshot export seam; the copy stays valid however
    /// far processing advances afterwards.
    pub fn recent_frame(&self, dst: &mut Frame) {
        self.frame_loop.copy_recent(dst);
    }

    /// Frames processed since startup.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Whether a recording is currently open.
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Returns a copy of the processor's counters.
    pub fn status(&self) -> ProcessorStatus {
        ProcessorStatus {
            total_frames: self.total_frames,
            motion_frames: self.motion_frames,
            recordings: self.recordings,
            frames_written: self.total_written,
            is_recording: self.is_recording,
        }
    }

    /// Shuts the processor down, finalizing any open recording.
    pub fn stop(&mut self) {
        if self.is_recording {
            if let Err(err) = self.stop_recording() {
                tracing::error!(error = %err, "failed to stop recording");
            }
        }
    }

    fn can_start_writing(&self) -> Result<(), GateError> {
        if !self.window.active() {
            return Err(GateError::OutsideWindow);
        }
        self.recorder.check_can_record().map_err(GateError::from)
    }

    fn log_gated(&mut self, task: &str, err: &GateError) {
        let suppress = (GATE_LOG_SUPPRESS_SECS * FPS) as u64;
        let should_log = match self.last_gate_log {
            None => true,
            Some(at) => self.total_frames >= at + suppress,
        };
        if should_log {
            tracing::warn!(frame = self.total_frames, error = %err, "{}", task);
            self.last_gate_log = Some(self.total_frames);
        }
    }

    fn start_recording(&mut self) -> Result<(), RecorderError> {
        self.recorder.start_recording()?;

        self.is_recording = true;
        self.recordings += 1;
        tracing::info!(frame = self.total_frames, "recording started");
        if let Some(listener) = &mut self.listener {
            listener.recording_started();
        }

        self.write_pre_trigger_frames();
        Ok(())
    }

    fn write_pre_trigger_frames(&mut self) {
        // Everything but the current frame; the regular per-frame path
        // writes that one, so the trigger frame lands exactly once.
        let count = self.frame_loop.history_len() - 1;
        for frame in self.frame_loop.history().take(count) {
            if let Err(err) = self.recorder.write_frame(frame) {
                tracing::error!(error = %err, "failed to write pre-trigger frame");
            }
            self.total_written += 1;
        }
    }

    fn stop_recording(&mut self) -> Result<(), RecorderError> {
        tracing::info!(
            frames_written = self.frames_written,
            "recording stopped"
        );
        if let Some(listener) = &mut self.listener {
            listener.recording_ended();
        }

        let result = self.recorder.stop_recording();

        self.frames_written = 0;
        self.write_until = 0;
        self.is_recording = false;
        self.triggered = 0;
        // A new event straight after must not re-emit frames that are
        // already in the finished clip.
        self.frame_loop.set_as_oldest();

        result
    }
}
