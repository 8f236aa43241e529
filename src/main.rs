//! Thermal Sentry CLI
//!
//! Runs the motion-detection and recording pipeline against a frame
//! source. Without a real camera driver wired in, frames come from the
//! deterministic mock source; the detection pipeline and recording
//! state machine are the real thing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thermal_sentry::{
    capture::{Camera, MockCamera, RawFrame, FPS},
    config::FileConfig,
    metrics::MetricsRegistry,
    motion::{MotionProcessor, RecordingListener},
    recorder::NullRecorder,
    snapshot::{SnapshotError, Snapshotter},
    Frame,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "thermal-sentry")]
#[command(about = "Record thermal video clips of warm moving objects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run continuously until interrupted
    #[arg(long)]
    continuous: bool,

    /// Number of frames to process (ignored if --continuous)
    #[arg(short = 'n', long, default_value = "300")]
    frames: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run against the mock camera with a synthetic warm blob
    Mock {
        /// Number of frames to process
        #[arg(short = 'n', long, default_value = "120")]
        frames: u64,
    },
}

/// Logs pipeline events as they happen.
struct LogListener;

impl RecordingListener for LogListener {
    fn motion_detected(&mut self) {
        tracing::debug!("motion detected");
    }

    fn recording_started(&mut self) {
        info!("recording started");
    }

    fn recording_ended(&mut self) {
        info!("recording ended");
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    match cli.command {
        Some(Commands::Mock { frames }) => run(&config, frames, false),
        None => {
            let frames = if cli.continuous { u64::MAX } else { cli.frames };
            run(&config, frames, cli.continuous);
        }
    }
}

fn run(config: &FileConfig, frame_count: u64, continuous: bool) {
    info!("Thermal Sentry v{}", thermal_sentry::VERSION);

    // The warm blob wanders into the synthetic scene after ~5 seconds.
    let mut camera = MockCamera::with_blob(5 * FPS as u64);
    if let Err(e) = camera.open() {
        eprintln!("Failed to open camera: {}", e);
        std::process::exit(1);
    }

    let mut processor = MotionProcessor::new(
        &config.motion,
        &config.recorder,
        Box::new(NullRecorder),
        Some(Box::new(LogListener)),
    );

    let registry = match MetricsRegistry::new() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(feature = "metrics")]
    {
        if config.output.metrics_port != 0 {
            serve_metrics(registry.clone(), config.output.metrics_port);
        }
    }

    let mut snapshotter = Snapshotter::new(&config.output.output_dir);

    // Stop cleanly on Ctrl+C in continuous mode.
    let running = Arc::new(AtomicBool::new(true));
    if continuous {
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .ok();
    }

    info!("Processing frames...");

    let frame_budget = Duration::from_millis(1000 / FPS as u64);
    let mut raw = RawFrame::default();
    let mut scratch = Frame::default();

    let mut i = 0u64;
    while (continuous && running.load(Ordering::SeqCst)) || (!continuous && i < frame_count) {
        let cycle_start = Instant::now();

        match camera.capture(&mut raw) {
            Ok(()) => processor.process(&raw),
            Err(e) => {
                warn!("Frame capture failed: {}", e);
                continue;
            }
        }

        registry.update(&processor.status());

        i = i.saturating_add(1);

        // Periodic status update
        if i % (100 * FPS as u64) == 0 && continuous {
            let status = processor.status();
            info!(
                "Status: {} frames, {} motion, {} recordings, {} frames written",
                status.total_frames,
                status.motion_frames,
                status.recordings,
                status.frames_written
            );
        }

        // Hold the sensor cadence in continuous mode; batch runs as
        // fast as they can.
        if continuous {
            let elapsed = cycle_start.elapsed();
            if elapsed < frame_budget {
                std::thread::sleep(frame_budget - elapsed);
            }
        }
    }

    processor.stop();
    camera.close();

    match snapshotter.snapshot(&processor, &mut scratch) {
        Ok(outcome) => info!(?outcome, "snapshot exported"),
        Err(SnapshotError::NoFrames) => {}
        Err(e) => warn!("Snapshot failed: {}", e),
    }

    let status = processor.status();
    info!(
        "Finished: {} frames processed, {} motion, {} recordings, {} frames written",
        status.total_frames, status.motion_frames, status.recordings, status.frames_written
    );
}

/// Runs the metrics HTTP server on its own thread.
#[cfg(feature = "metrics")]
fn serve_metrics(registry: Arc<MetricsRegistry>, port: u16) {
    use thermal_sentry::metrics::{MetricsServer, MetricsServerConfig};

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Failed to start metrics runtime: {}", e);
                return;
            }
        };

        let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server failed: {}", e);
        }
    });
}
