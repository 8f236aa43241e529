//! Camera abstraction for thermal frame capture.
//!
//! This module provides a trait-based abstraction over the thermal camera,
//! allowing for both a real sensor driver and mock implementations for
//! testing. The real driver lives outside this crate; it only needs to
//! implement [`Camera`].

use super::{RawFrame, COLS, ROWS};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for thermal camera implementations.
///
/// `capture` writes into a caller-provided [`RawFrame`] so the capture
/// loop stays allocation-free at the sensor's frame cadence.
pub trait Camera {
    /// Opens and initializes the camera.
    fn open(&mut self) -> Result<(), CameraError>;

    /// Captures a single frame into `out`.
    fn capture(&mut self, out: &mut RawFrame) -> Result<(), CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// Mock camera producing deterministic synthetic thermal scenes.
///
/// Generates a uniform ambient field with low-amplitude ripple and,
/// optionally, a square warm blob that enters the scene at a configured
/// frame and drifts one pixel per frame. Useful for dry runs and tests.
#[derive(Debug)]
pub struct MockCamera {
    open: bool,
    sequence: u64,
    ambient: u16,
    blob_temp: u16,
    blob_size: usize,
    blob_enters_at: u64,
}

impl MockCamera {
    /// Creates a mock camera producing only the ambient field.
    pub fn new() -> Self {
        Self {
            open: false,
            sequence: 0,
            ambient: 3000,
            blob_temp: 3600,
            blob_size: 6,
            blob_enters_at: u64::MAX,
        }
    }

    /// Creates a mock camera whose warm blob enters at frame `enters_at`.
    pub fn with_blob(enters_at: u64) -> Self {
        Self {
            blob_enters_at: enters_at,
            ..Self::new()
        }
    }

    /// Number of frames captured so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for MockCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        self.open = true;
        self.sequence = 0;
        tracing::info!(ambient = self.ambient, "MockCamera opened");
        Ok(())
    }

    fn capture(&mut self, out: &mut RawFrame) -> Result<(), CameraError> {
        if !self.open {
            return Err(CameraError::NotInitialized);
        }

        let seq = self.sequence;
        for y in 0..ROWS {
            for x in 0..COLS {
                // Fixed-pattern ripple, constant across frames so it
                // cancels out of frame differences.
                let ripple = ((x * 7 + y * 13) % 5) as u16;
                out.pix[y][x] = self.ambient + ripple;
            }
        }

        if seq >= self.blob_enters_at {
            let travel = (seq - self.blob_enters_at) as usize;
            let x0 = travel % (COLS - self.blob_size);
            let y0 = ROWS / 2;
            for y in y0..y0 + self.blob_size {
                for x in x0..x0 + self.blob_size {
                    out.pix[y][x] = self.blob_temp;
                }
            }
        }

        self.sequence += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
        tracing::info!("MockCamera closed");
    }
}
