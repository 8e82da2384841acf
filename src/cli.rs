// SPDX-License-Identifier: GPL-3.0-only

//! Command-line surface
//!
//! Flags override values from the optional JSON config file, which in turn
//! override the built-in defaults.
//!
//! The post-capture command goes last, after `--`, so its own flags are not
//! taken for ours:
//!
//! ```text
//! snapcam -t 10 -w -- rsync -a --remove-source-files /srv/cam/
//! ```

use clap::Parser;
use snapcam::backends::camera::{
    CaptureMode, FrameSource, PixelFormat, V4l2FrameSource, apply_startup_controls,
};
use snapcam::config::SnapshotConfig;
use snapcam::errors::{AppResult, ConfigError};
use snapcam::pipelines::snapshot::{DhtPolicy, RunSummary, SnapshotScheduler, SystemClock};
use snapcam::process::ProcessSpawner;
use snapcam::signals::{CancellationToken, SignalController};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug, Default)]
#[command(name = "snapcam")]
#[command(about = "Save still images from a V4L2 camera at a fixed interval")]
#[command(version = env!("GIT_VERSION"))]
pub struct Cli {
    /// Video device node
    #[arg(short, long)]
    pub device: Option<String>,

    /// Directory snapshots are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Image width
    #[arg(short = 'x', long)]
    pub width: Option<u32>,

    /// Image height
    #[arg(short = 'y', long)]
    pub height: Option<u32>,

    /// Seconds between snapshots (0 saves every frame)
    #[arg(short = 't', long)]
    pub interval: Option<u64>,

    /// Frames to discard before the first snapshot
    #[arg(short, long)]
    pub skip: Option<u32>,

    /// JPEG quality for YUYV capture
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Capture device-compressed MJPEG frames instead of YUYV
    #[arg(short, long)]
    pub mjpeg: bool,

    /// Stream through user-pointer buffers instead of mmap
    #[arg(short, long)]
    pub userptr: bool,

    /// Command run after each snapshot; the image path is appended
    #[arg(last = true, allow_hyphen_values = true, value_name = "PROGRAM [ARGS]")]
    pub command: Vec<String>,

    /// Wait for the command to finish before capturing again
    #[arg(short, long)]
    pub wait: bool,

    /// Brightness control value
    #[arg(short = 'B', long, allow_negative_numbers = true)]
    pub brightness: Option<i32>,

    /// Contrast control value
    #[arg(short = 'C', long, allow_negative_numbers = true)]
    pub contrast: Option<i32>,

    /// Saturation control value
    #[arg(short = 'S', long, allow_negative_numbers = true)]
    pub saturation: Option<i32>,

    /// Gain control value
    #[arg(short = 'G', long, allow_negative_numbers = true)]
    pub gain: Option<i32>,

    /// Huffman table handling for MJPEG frames
    #[arg(long, value_enum)]
    pub dht_policy: Option<DhtPolicy>,

    /// Delete snapshots older than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub max_age: Option<u64>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the effective configuration
    pub fn resolve(&self) -> Result<SnapshotConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SnapshotConfig::load(path)?,
            None => SnapshotConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut SnapshotConfig) {
        let device = &mut config.device;
        if let Some(path) = &self.device {
            device.path = path.clone();
        }
        if let Some(width) = self.width {
            device.width = width;
        }
        if let Some(height) = self.height {
            device.height = height;
        }
        if self.mjpeg {
            device.pixel_format = PixelFormat::Mjpeg;
        }
        if self.userptr {
            device.capture_mode = CaptureMode::Userptr;
        }

        let controls = &mut device.controls;
        controls.brightness = self.brightness.or(controls.brightness);
        controls.contrast = self.contrast.or(controls.contrast);
        controls.saturation = self.saturation.or(controls.saturation);
        controls.gain = self.gain.or(controls.gain);

        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(skip) = self.skip {
            config.skip_frames = skip;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if !self.command.is_empty() {
            config.command = self.command.clone();
        }
        config.wait_for_command |= self.wait;
        if let Some(policy) = self.dht_policy {
            config.dht_policy = policy;
        }
        if self.max_age.is_some() {
            config.max_age_secs = self.max_age;
        }
        config.verbose |= self.verbose;
    }
}

/// Open the device and capture until cancelled
///
/// Exits with success on cancellation and failure when the device cannot be
/// opened or stops delivering frames.
pub fn run(config: SnapshotConfig) -> ExitCode {
    match capture(&config) {
        Ok(summary) => {
            info!(
                saved = summary.saved,
                dropped = summary.dropped,
                duplicates = summary.duplicates,
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Capture failed");
            ExitCode::FAILURE
        }
    }
}

fn capture(config: &SnapshotConfig) -> AppResult<RunSummary> {
    let token = CancellationToken::new();
    let signals = SignalController::install(token)?;

    info!(device = %config.device.path, "Using videodevice");
    let mut source = V4l2FrameSource::open(&config.device)?;
    info!(
        width = source.width(),
        height = source.height(),
        format = %source.pixel_format(),
        interval = config.interval_secs,
        skip = config.skip_frames,
        output_dir = %config.output_dir.display(),
        "Capture started"
    );

    apply_startup_controls(&mut source, &config.device.controls);

    let mut scheduler = SnapshotScheduler::new(config.session_settings(), SystemClock)
        .with_dht_policy(config.dht_policy)
        .with_post_command(config.post_command())
        .with_spawner(ProcessSpawner::new(config.verbose))
        .with_retention(config.max_age_secs);

    // Release the device before reporting a grab failure
    let result = scheduler.run(&mut source, signals.token());
    source.close();

    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("snapcam").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "-d", "/dev/video2", "-x", "640", "-y", "480", "-t", "0", "-s", "3", "-q", "40", "-m",
        ])
        .resolve()
        .unwrap();

        assert_eq!(config.device.path, "/dev/video2");
        assert_eq!((config.device.width, config.device.height), (640, 480));
        assert_eq!(config.device.pixel_format, PixelFormat::Mjpeg);
        assert_eq!(config.interval_secs, 0);
        assert_eq!(config.skip_frames, 3);
        assert_eq!(config.quality, 40);
    }

    #[test]
    fn test_quality_above_range_rejected() {
        let args = ["snapcam", "-q", "101"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_command_collects_arguments() {
        let cli = parse(&["-w", "--", "scp", "host:/srv"]);
        assert_eq!(cli.command, vec!["scp", "host:/srv"]);

        let command = cli.resolve().unwrap().post_command().unwrap();
        assert_eq!(command.program, "scp");
        assert_eq!(command.args, vec!["host:/srv"]);
    }

    #[test]
    fn test_command_arguments_may_start_with_hyphen() {
        let cli = parse(&["-t", "5", "--", "rsync", "-a", "--delete", "-v", "dst/"]);
        assert_eq!(cli.command, vec!["rsync", "-a", "--delete", "-v", "dst/"]);
        // Flags after `--` belong to the command
        assert!(!cli.verbose);
        assert_eq!(cli.interval, Some(5));
    }

    #[test]
    fn test_command_needs_separator() {
        assert!(Cli::try_parse_from(["snapcam", "rsync", "dst/"]).is_err());
    }

    #[test]
    fn test_negative_control_values() {
        let config = parse(&["-B", "-10", "-G", "5"]).resolve().unwrap();
        assert_eq!(config.device.controls.brightness, Some(-10));
        assert_eq!(config.device.controls.gain, Some(5));
        assert_eq!(config.device.controls.contrast, None);
    }

    #[test]
    fn test_dht_policy_flag() {
        let config = parse(&["--dht-policy", "insert-if-missing"]).resolve().unwrap();
        assert_eq!(config.dht_policy, DhtPolicy::InsertIfMissing);
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapcam.json");
        std::fs::write(&path, r#"{"interval_secs": 30, "quality": 60}"#).unwrap();

        let config = parse(&["--config", path.to_str().unwrap(), "-q", "80"])
            .resolve()
            .unwrap();
        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.quality, 80);
    }

    #[test]
    fn test_odd_width_rejected() {
        assert!(parse(&["-x", "321"]).resolve().is_err());
    }
}
