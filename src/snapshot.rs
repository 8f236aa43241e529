//! Still-frame export for debugging camera aim and focus.
//!
//! Writes the most recent frame as a contrast-stretched 16-bit greyscale
//! PNG. The file is replaced atomically so a concurrent reader never
//! sees a half-written image, and identical frames are deduplicated by
//! pixel-sum fingerprint so repeated requests while the camera is idle
//! cost nothing.

use crate::capture::{Frame, COLS, ROWS};
use crate::motion::MotionProcessor;
use image::{ImageBuffer, ImageFormat, Luma};
use std::path::PathBuf;
use thiserror::Error;

/// Name of the snapshot file inside the output directory.
pub const STILL_NAME: &str = "still.png";

/// Errors that can occur while exporting a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no frames have been captured yet")]
    NoFrames,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// What a snapshot request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// A new `still.png` was written.
    Written,
    /// The frame matched the previous snapshot; nothing was written.
    Unchanged,
}

/// Writes contrast-normalised stills into a directory.
///
/// One instance tracks the fingerprint of the last exported frame.
/// Requests may come from another thread; wrap the snapshotter (and the
/// processor it reads from) in a `Mutex` at that seam.
pub struct Snapshotter {
    dir: PathBuf,
    last_fingerprint: Option<u64>,
}

impl Snapshotter {
    /// Creates a snapshotter writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_fingerprint: None,
        }
    }

    /// Exports the processor's most recent frame.
    ///
    /// `scratch` receives the defensive copy; it is reused across calls
    /// so the export path does not allocate frames.
    pub fn snapshot(
        &mut self,
        processor: &MotionProcessor,
        scratch: &mut Frame,
    ) -> Result<SnapshotOutcome, SnapshotError> {
        if processor.total_frames() == 0 {
            return Err(SnapshotError::NoFrames);
        }
        processor.recent_frame(scratch);
        self.write_still(scratch)
    }

    /// Writes `frame` as `still.png`, unless it matches the last export.
    pub fn write_still(&mut self, frame: &Frame) -> Result<SnapshotOutcome, SnapshotError> {
        let mut sum = 0u64;
        let mut min = u16::MAX;
        let mut max = 0u16;
        for row in &frame.pix {
            for &v in row {
                sum += u64::from(v);
                min = min.min(v);
                max = max.max(v);
            }
        }

        if self.last_fingerprint == Some(sum) {
            return Ok(SnapshotOutcome::Unchanged);
        }
        self.last_fingerprint = Some(sum);

        let range = u32::from(max - min);
        let mut pixels = Vec::with_capacity(ROWS * COLS);
        for row in &frame.pix {
            for &v in row {
                // A flat frame has no contrast to stretch; emit black.
                let out = if range == 0 {
                    0
                } else {
                    (u32::from(v - min) * u32::from(u16::MAX) / range) as u16
                };
                pixels.push(out);
            }
        }

        let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(COLS as u32, ROWS as u32, pixels)
            .expect("buffer size matches dimensions");

        let tmp = self.dir.join(format!("{STILL_NAME}.tmp"));
        img.save_with_format(&tmp, ImageFormat::Png)?;
        std::fs::rename(&tmp, self.dir.join(STILL_NAME))?;
        Ok(SnapshotOutcome::Written)
    }
}
