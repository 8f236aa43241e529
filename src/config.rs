//! Runtime configuration.
//!
//! All tuning knobs are fixed at startup. Validation failures are fatal
//! before the capture loop starts; nothing revalidates on the hot path.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Motion detector configuration.
///
/// The defaults are tuned for a Lepton-class sensor watching a bush
/// scene at night. `temp_thresh` is in raw radiometric units, not
/// degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Per-pixel difference required for a pixel to count as changed.
    pub delta_thresh: u16,
    /// Number of changed pixels required for a motion verdict.
    pub count_thresh: usize,
    /// Noise floor; pixels below this are clamped to it before comparing.
    pub temp_thresh: u16,
    /// How many frames back the comparison baseline sits.
    pub frame_compare_gap: usize,
    /// Compare against a single difference frame instead of two.
    pub use_one_diff_only: bool,
    /// Ignore pixels that got cooler; animals are warmer than background.
    pub warmer_only: bool,
    /// Percentage of changed pixels above which the frame is treated as a
    /// sensor recalibration rather than motion.
    pub nonzero_max_percent: usize,
    /// Consecutive motion-positive frames required before recording starts.
    pub trigger_frames: usize,
    /// Log per-frame detection details.
    pub verbose: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            delta_thresh: 50,
            count_thresh: 3,
            temp_thresh: 2900,
            frame_compare_gap: 45,
            use_one_diff_only: true,
            warmer_only: true,
            nonzero_max_percent: 50,
            trigger_frames: 2,
            verbose: false,
        }
    }
}

impl MotionConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_compare_gap < 1 {
            return Err(ConfigError::InvalidCompareGap);
        }
        if self.trigger_frames < 1 {
            return Err(ConfigError::InvalidTriggerFrames);
        }
        if self.nonzero_max_percent > 100 {
            return Err(ConfigError::InvalidNonzeroPercent);
        }
        if self.count_thresh < 1 {
            return Err(ConfigError::InvalidCountThresh);
        }
        Ok(())
    }
}

/// Recording length and time-of-day window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Minimum recording length in seconds; also the hold-open extension
    /// granted by each further motion frame.
    pub min_secs: usize,
    /// Hard upper bound on recording length in seconds.
    pub max_secs: usize,
    /// Seconds of pre-trigger context prepended to each recording.
    pub preview_secs: usize,
    /// Start of the time-of-day window in which recording is permitted.
    pub window_start: NaiveTime,
    /// End of the recording window. Equal start and end leaves the
    /// window always open; end before start wraps past midnight.
    pub window_end: NaiveTime,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_secs: 10,
            max_secs: 600,
            preview_secs: 3,
            window_start: NaiveTime::MIN,
            window_end: NaiveTime::MIN,
        }
    }
}

impl RecorderConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_secs < 1 || self.max_secs < self.min_secs {
            return Err(ConfigError::InvalidRecordingBounds {
                min_secs: self.min_secs,
                max_secs: self.max_secs,
            });
        }
        Ok(())
    }
}

/// Output locations and observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for snapshots and recordings.
    pub output_dir: PathBuf,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            metrics_port: 9090,
        }
    }
}

/// Configuration validation and loading errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("frame_compare_gap must be at least 1")]
    InvalidCompareGap,
    #[error("trigger_frames must be at least 1")]
    InvalidTriggerFrames,
    #[error("nonzero_max_percent must be in 0..=100")]
    InvalidNonzeroPercent,
    #[error("count_thresh must be at least 1")]
    InvalidCountThresh,
    #[error("invalid recording bounds: min_secs={min_secs}, max_secs={max_secs}")]
    InvalidRecordingBounds { min_secs: usize, max_secs: usize },
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.recorder.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_compare_gap_invalid() {
        let mut config = MotionConfig::default();
        config.frame_compare_gap = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCompareGap)
        ));
    }

    #[test]
    fn test_max_below_min_invalid() {
        let mut config = RecorderConfig::default();
        config.min_secs = 20;
        config.max_secs = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRecordingBounds { .. })
        ));
    }

    #[test]
    fn test_nonzero_percent_out_of_range() {
        let mut config = MotionConfig::default();
        config.nonzero_max_percent = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonzeroPercent)
        ));
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[motion]
delta_thresh = 40
count_thresh = 5
temp_thresh = 2750
frame_compare_gap = 30
use_one_diff_only = false
warmer_only = true
nonzero_max_percent = 60
trigger_frames = 3
verbose = true

[recorder]
min_secs = 5
max_secs = 120
preview_secs = 2
window_start = "21:00:00"
window_end = "05:30:00"

[output]
output_dir = "/var/spool/thermal"
metrics_port = 0
"#
        )
        .unwrap();

        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.motion.delta_thresh, 40);
        assert_eq!(config.motion.frame_compare_gap, 30);
        assert!(!config.motion.use_one_diff_only);
        assert_eq!(config.recorder.max_secs, 120);
        assert_eq!(
            config.recorder.window_start,
            NaiveTime::from_hms_opt(21, 0, 0).unwrap()
        );
        assert_eq!(config.output.metrics_port, 0);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[motion]
frame_compare_gap = 0
"#
        )
        .unwrap();

        assert!(matches!(
            FileConfig::from_file(file.path()),
            Err(ConfigError::InvalidCompareGap)
        ));
    }
}
