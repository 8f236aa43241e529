//! Metrics collection and registry.

use crate::motion::ProcessorStatus;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for the recording pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    frames_total: IntCounter,
    motion_frames_total: IntCounter,
    recordings_total: IntCounter,
    frames_written_total: IntCounter,
    recording_active: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new(
            "thermal_sentry_frames_total",
            "Total camera frames processed",
        )?;
        let motion_frames_total = IntCounter::new(
            "thermal_sentry_motion_frames_total",
            "Frames with a positive motion verdict",
        )?;
        let recordings_total = IntCounter::new(
            "thermal_sentry_recordings_total",
            "Recordings started",
        )?;
        let frames_written_total = IntCounter::new(
            "thermal_sentry_frames_written_total",
            "Frames handed to the recorder, pre-roll included",
        )?;
        let recording_active = IntGauge::new(
            "thermal_sentry_recording_active",
            "Whether a recording is open right now (1=yes)",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(motion_frames_total.clone()))?;
        registry.register(Box::new(recordings_total.clone()))?;
        registry.register(Box::new(frames_written_total.clone()))?;
        registry.register(Box::new(recording_active.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            motion_frames_total,
            recordings_total,
            frames_written_total,
            recording_active,
        })
    }

    /// Updates all metrics from the processor's counters.
    ///
    /// Counters advance by the difference against their last value, so
    /// repeated updates from the same status are harmless.
    pub fn update(&self, status: &ProcessorStatus) {
        let inc = |counter: &IntCounter, value: u64| {
            let current = counter.get();
            if value > current {
                counter.inc_by(value - current);
            }
        };

        inc(&self.frames_total, status.total_frames);
        inc(&self.motion_frames_total, status.motion_frames);
        inc(&self.recordings_total, status.recordings);
        inc(&self.frames_written_total, status.frames_written);
        self.recording_active
            .set(if status.is_recording { 1 } else { 0 });
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let status = ProcessorStatus {
            total_frames: 100,
            motion_frames: 7,
            recordings: 2,
            frames_written: 56,
            is_recording: true,
        };

        registry.update(&status);
        // A second update from the same status must not double-count.
        registry.update(&status);

        let output = registry.encode().unwrap();
        assert!(output.contains("thermal_sentry_frames_total 100"));
        assert!(output.contains("thermal_sentry_motion_frames_total 7"));
        assert!(output.contains("thermal_sentry_recordings_total 2"));
        assert!(output.contains("thermal_sentry_recording_active 1"));
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("thermal_sentry_frames_total"));
        assert!(output.contains("thermal_sentry_frames_written_total"));
    }
}
