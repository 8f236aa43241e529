//! Pixel-domain motion detection.
//!
//! The detector compares each incoming frame against a floored baseline
//! from `frame_compare_gap` captures earlier. A pixel counts as motion
//! when its difference exceeds `delta_thresh` in two successive
//! difference frames; requiring two keeps single-frame sensor glitches
//! from reading as movement while still reacting within two frames.
//!
//! Uncooled sensors periodically run a flat-field recalibration that
//! shifts the whole frame at once. A frame where more than
//! `nonzero_max_percent` of pixels changed is treated as such an event:
//! the detector re-baselines on the post-recalibration frame and repeats
//! its two-difference warmup instead of reporting motion.

use super::FrameLoop;
use crate::capture::{Frame, COLS, ROWS};
use crate::config::MotionConfig;

/// Outcome classification for a single detection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    /// The frame was compared normally.
    Ok,
    /// Not enough history yet for a verdict.
    NoData,
    /// Too many pixels changed; treated as a sensor recalibration.
    TooManyPoints,
}

/// Per-frame detector output: a motion mask plus a state code.
///
/// Owned by the caller and zeroed in place at the start of every
/// detection call, so the steady state stays allocation-free.
pub struct MotionState {
    /// True for every pixel that counted towards the motion verdict.
    pub mask: [[bool; COLS]; ROWS],
    /// How the frame was classified.
    pub state: DetectionState,
}

impl MotionState {
    /// Clears the mask and resets the state code.
    pub fn zero(&mut self) {
        self.mask = [[false; COLS]; ROWS];
        self.state = DetectionState::Ok;
    }

    /// Number of set mask pixels.
    pub fn count(&self) -> usize {
        self.mask.iter().flatten().filter(|&&set| set).count()
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            mask: [[false; COLS]; ROWS],
            state: DetectionState::Ok,
        }
    }
}

/// Stateful frame-differencing motion detector.
pub struct MotionDetector {
    floored: FrameLoop,
    diffs: FrameLoop,
    first_diff: bool,
    use_one_diff: bool,
    warmer_only: bool,
    temp_thresh: u16,
    delta_thresh: u16,
    count_thresh: usize,
    nonzero_limit: usize,
    verbose: bool,
}

impl MotionDetector {
    /// Creates a detector from validated configuration.
    pub fn new(config: &MotionConfig) -> Self {
        let total_pixels = ROWS * COLS;
        Self {
            floored: FrameLoop::new(config.frame_compare_gap + 1),
            diffs: FrameLoop::new(2),
            first_diff: false,
            use_one_diff: config.use_one_diff_only,
            warmer_only: config.warmer_only,
            temp_thresh: config.temp_thresh,
            delta_thresh: config.delta_thresh,
            count_thresh: config.count_thresh,
            nonzero_limit: total_pixels * config.nonzero_max_percent / 100,
            verbose: config.verbose,
        }
    }

    /// Consumes one frame and returns the motion verdict.
    ///
    /// `out` is zeroed first; on return its mask marks the pixels that
    /// counted and its state code says how the frame was classified.
    pub fn detect(&mut self, frame: &Frame, out: &mut MotionState) -> bool {
        let verdict = self.pixels_changed(frame, out);
        // The just-floored frame becomes the newest history entry on exit.
        self.floored.advance();
        verdict
    }

    fn pixels_changed(&mut self, frame: &Frame, out: &mut MotionState) -> bool {
        out.zero();

        floor_frame(frame, self.temp_thresh, self.floored.current_mut());

        {
            let current = self.floored.current();
            let baseline = self.floored.oldest();
            let diff = self.diffs.current_mut();
            if self.warmer_only {
                warmer_diff_frames(current, baseline, diff);
            } else {
                abs_diff_frames(current, baseline, diff);
            }
        }
        self.diffs.advance();

        if !self.first_diff {
            self.first_diff = true;
            out.state = DetectionState::NoData;
            return false;
        }

        let diff = self.diffs.recent();
        let prev_diff = self.diffs.current();
        let (nonzero, deltas) = if self.use_one_diff {
            count_pixels(diff, self.delta_thresh, out)
        } else {
            count_pixels_two(diff, prev_diff, self.delta_thresh, out)
        };

        // A whole-frame jump means the sensor recalibrated, not that an
        // animal filled the scene. Re-baseline and warm up again.
        if nonzero > self.nonzero_limit {
            tracing::info!(
                nonzero,
                limit = self.nonzero_limit,
                "too many pixels changed, treating as recalibration"
            );
            self.floored.set_as_oldest();
            self.first_diff = false;
            out.state = DetectionState::TooManyPoints;
            return false;
        }

        if self.verbose && deltas > 0 {
            tracing::debug!(deltas, nonzero, "changed pixels");
        }

        deltas >= self.count_thresh
    }
}

/// Copies `src` into `out`, clamping every pixel below `floor` up to it.
fn floor_frame(src: &Frame, floor: u16, out: &mut Frame) {
    for y in 0..ROWS {
        for x in 0..COLS {
            out.pix[y][x] = src.pix[y][x].max(floor);
        }
    }
}

fn abs_diff_frames(a: &Frame, b: &Frame, out: &mut Frame) {
    for y in 0..ROWS {
        for x in 0..COLS {
            out.pix[y][x] = a.pix[y][x].abs_diff(b.pix[y][x]);
        }
    }
}

/// Like `abs_diff_frames` but pixels that got cooler map to zero.
fn warmer_diff_frames(a: &Frame, b: &Frame, out: &mut Frame) {
    for y in 0..ROWS {
        for x in 0..COLS {
            out.pix[y][x] = a.pix[y][x].saturating_sub(b.pix[y][x]);
        }
    }
}

/// Counts changed and significant pixels across two difference frames.
///
/// A pixel is significant only when it exceeds `delta_thresh` in both
/// diffs; significant pixels are marked in the mask.
fn count_pixels_two(
    d1: &Frame,
    d2: &Frame,
    delta_thresh: u16,
    out: &mut MotionState,
) -> (usize, usize) {
    let mut nonzero = 0;
    let mut deltas = 0;
    for y in 0..ROWS {
        for x in 0..COLS {
            let v1 = d1.pix[y][x];
            let v2 = d2.pix[y][x];
            if v1 > 0 || v2 > 0 {
                nonzero += 1;
                if v1 > delta_thresh && v2 > delta_thresh {
                    out.mask[y][x] = true;
                    deltas += 1;
                }
            }
        }
    }
    (nonzero, deltas)
}

/// Single-diff variant of `count_pixels_two`.
fn count_pixels(d: &Frame, delta_thresh: u16, out: &mut MotionState) -> (usize, usize) {
    let mut nonzero = 0;
    let mut deltas = 0;
    for y in 0..ROWS {
        for x in 0..COLS {
            let v = d.pix[y][x];
            if v > 0 {
                nonzero += 1;
                if v > delta_thresh {
                    out.mask[y][x] = true;
                    deltas += 1;
                }
            }
        }
    }
    (nonzero, deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MotionConfig {
        MotionConfig {
            delta_thresh: 100,
            count_thresh: 20,
            temp_thresh: 2800,
            frame_compare_gap: 45,
            use_one_diff_only: false,
            warmer_only: false,
            nonzero_max_percent: 50,
            trigger_frames: 2,
            verbose: false,
        }
    }

    /// Uniform frame with a square warm patch in the middle.
    fn patch_frame(base: u16, patch: u16, side: usize) -> Frame {
        let mut frame = Frame::filled(base);
        for y in 40..40 + side {
            for x in 60..60 + side {
                frame.pix[y][x] = patch;
            }
        }
        frame
    }

    fn run(detector: &mut MotionDetector, frame: &Frame, out: &mut MotionState) -> bool {
        detector.detect(frame, out)
    }

    #[test]
    fn test_bootstrap_sequence() {
        let mut d = MotionDetector::new(&config());
        let mut out = MotionState::default();
        let ambient = Frame::filled(3000);

        // First frame: nothing to compare against yet.
        assert!(!run(&mut d, &ambient, &mut out));
        assert_eq!(out.state, DetectionState::NoData);

        // Second frame still compares against a zeroed slot; the
        // whole-frame jump reads as a recalibration and re-baselines.
        assert!(!run(&mut d, &ambient, &mut out));
        assert_eq!(out.state, DetectionState::TooManyPoints);

        // Warmup repeats once after the re-baseline.
        assert!(!run(&mut d, &ambient, &mut out));
        assert_eq!(out.state, DetectionState::NoData);

        // From here on the scene is static and compares clean.
        for _ in 0..20 {
            assert!(!run(&mut d, &ambient, &mut out));
            assert_eq!(out.state, DetectionState::Ok);
            assert_eq!(out.count(), 0);
        }
    }

    #[test]
    fn test_cold_scene_is_floored_to_silence() {
        let mut d = MotionDetector::new(&config());
        let mut out = MotionState::default();
        // Everything below the floor clamps to the same value, so even a
        // varying cold scene produces no differences after warmup.
        let cold_a = Frame::filled(2799);
        let cold_b = Frame::filled(1500);

        for i in 0..50 {
            let frame = if i % 2 == 0 { &cold_a } else { &cold_b };
            assert!(!run(&mut d, frame, &mut out));
        }
        assert_eq!(out.state, DetectionState::Ok);
    }

    #[test]
    fn test_warm_patch_detected_on_second_diff() {
        let mut d = MotionDetector::new(&config());
        let mut out = MotionState::default();
        let ambient = Frame::filled(3000);
        let with_patch = patch_frame(3000, 3500, 5);

        for _ in 0..10 {
            run(&mut d, &ambient, &mut out);
        }

        // First patch frame: only one diff shows it, so the two-diff
        // rule withholds the verdict.
        assert!(!run(&mut d, &with_patch, &mut out));
        assert_eq!(out.state, DetectionState::Ok);

        // Second patch frame: both diffs agree.
        assert!(run(&mut d, &with_patch, &mut out));
        assert_eq!(out.state, DetectionState::Ok);
        assert_eq!(out.count(), 25);
        assert!(out.mask[42][62]);
        assert!(!out.mask[0][0]);
    }

    #[test]
    fn test_patch_below_count_thresh_ignored() {
        let mut d = MotionDetector::new(&config());
        let mut out = MotionState::default();
        let ambient = Frame::filled(3000);
        // 4x4 patch yields 16 changed pixels, below count_thresh 20.
        let with_patch = patch_frame(3000, 3500, 4);

        for _ in 0..10 {
            run(&mut d, &ambient, &mut out);
        }
        assert!(!run(&mut d, &with_patch, &mut out));
        assert!(!run(&mut d, &with_patch, &mut out));
        assert_eq!(out.count(), 16);
    }

    #[test]
    fn test_one_diff_mode_reacts_on_first_diff() {
        let mut cfg = config();
        cfg.use_one_diff_only = true;
        let mut d = MotionDetector::new(&cfg);
        let mut out = MotionState::default();
        let ambient = Frame::filled(3000);
        let with_patch = patch_frame(3000, 3500, 5);

        for _ in 0..10 {
            run(&mut d, &ambient, &mut out);
        }
        assert!(run(&mut d, &with_patch, &mut out));
        assert_eq!(out.count(), 25);
    }

    #[test]
    fn test_recalibration_suppression_and_rewarmup() {
        let mut d = MotionDetector::new(&config());
        let mut out = MotionState::default();
        let ambient = Frame::filled(3000);
        let recalibrated = Frame::filled(5000);

        for _ in 0..20 {
            run(&mut d, &ambient, &mut out);
        }

        // Whole frame jumps by 2000: recalibration, not motion.
        assert!(!run(&mut d, &recalibrated, &mut out));
        assert_eq!(out.state, DetectionState::TooManyPoints);

        // Warmup repeats against the new baseline, then settles.
        assert!(!run(&mut d, &recalibrated, &mut out));
        assert_eq!(out.state, DetectionState::NoData);
        assert!(!run(&mut d, &recalibrated, &mut out));
        assert_eq!(out.state, DetectionState::Ok);
    }

    #[test]
    fn test_warmer_only_ignores_cooling() {
        let mut cfg = config();
        cfg.warmer_only = true;
        cfg.frame_compare_gap = 1;
        let mut d = MotionDetector::new(&cfg);
        let mut out = MotionState::default();
        let warm = Frame::filled(4000);
        let cooler = Frame::filled(3500);

        for _ in 0..4 {
            run(&mut d, &warm, &mut out);
        }

        // The whole scene cooling by 500 produces an all-zero diff.
        assert!(!run(&mut d, &cooler, &mut out));
        assert_eq!(out.state, DetectionState::Ok);
        assert_eq!(out.count(), 0);
    }

    #[test]
    fn test_absolute_mode_sees_cooling_as_recalibration() {
        let mut cfg = config();
        cfg.warmer_only = false;
        cfg.frame_compare_gap = 1;
        let mut d = MotionDetector::new(&cfg);
        let mut out = MotionState::default();
        let warm = Frame::filled(4000);
        let cooler = Frame::filled(3500);

        for _ in 0..4 {
            run(&mut d, &warm, &mut out);
        }

        // Every pixel changes by 500, tripping the nonzero limit.
        assert!(!run(&mut d, &cooler, &mut out));
        assert_eq!(out.state, DetectionState::TooManyPoints);
    }

    #[test]
    fn test_verdicts_are_deterministic() {
        let frames: Vec<Frame> = (0..30)
            .map(|i| {
                if i >= 12 {
                    patch_frame(3000, 3450, 6)
                } else {
                    Frame::filled(3000)
                }
            })
            .collect();

        let mut d1 = MotionDetector::new(&config());
        let mut d2 = MotionDetector::new(&config());
        let mut out1 = MotionState::default();
        let mut out2 = MotionState::default();

        for frame in &frames {
            let v1 = d1.detect(frame, &mut out1);
            let v2 = d2.detect(frame, &mut out2);
            assert_eq!(v1, v2);
            assert_eq!(out1.state, out2.state);
            assert_eq!(out1.mask, out2.mask);
        }
    }
}
