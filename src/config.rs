// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{DeviceConfig, PixelFormat};
use crate::constants::{
    DEFAULT_INTERVAL_SECS, DEFAULT_QUALITY, DEFAULT_SKIP_FRAMES, MAX_DIMENSION, MAX_QUALITY,
    default_output_dir,
};
use crate::errors::ConfigError;
use crate::pipelines::snapshot::{DhtPolicy, PostCaptureCommand, SessionSettings};
use crate::process::WaitMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete run configuration
///
/// Loaded from an optional JSON file, then overridden by command-line flags.
/// Fields missing from the file keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Capture device settings
    pub device: DeviceConfig,
    /// Directory snapshots are written to
    pub output_dir: PathBuf,
    /// Seconds between snapshots (0 saves every frame)
    pub interval_secs: u64,
    /// Frames discarded before the first snapshot
    pub skip_frames: u32,
    /// JPEG quality 0-100
    pub quality: u8,
    /// Program and arguments run after each save; the saved path is appended
    pub command: Vec<String>,
    /// Wait for the post-capture command to exit before grabbing again
    pub wait_for_command: bool,
    /// Huffman table handling for device-compressed frames
    pub dht_policy: DhtPolicy,
    /// Delete snapshots older than this many seconds after each save
    pub max_age_secs: Option<u64>,
    /// Debug logging and command progress messages
    pub verbose: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            output_dir: default_output_dir(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            skip_frames: DEFAULT_SKIP_FRAMES,
            quality: DEFAULT_QUALITY,
            command: Vec::new(),
            wait_for_command: false,
            dht_policy: DhtPolicy::default(),
            max_age_secs: None,
            verbose: false,
        }
    }
}

impl SnapshotConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reject values the device or encoder cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality > MAX_QUALITY {
            return Err(ConfigError::Invalid {
                field: "quality",
                reason: format!("{} is above {MAX_QUALITY}", self.quality),
            });
        }

        let (width, height) = (self.device.width, self.device.height);
        if width == 0 || height == 0 {
            return Err(ConfigError::Invalid {
                field: "resolution",
                reason: format!("{width}x{height} has a zero dimension"),
            });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ConfigError::Invalid {
                field: "resolution",
                reason: format!("{width}x{height} exceeds {MAX_DIMENSION}"),
            });
        }
        if self.device.pixel_format == PixelFormat::Yuyv && width % 2 != 0 {
            return Err(ConfigError::Invalid {
                field: "width",
                reason: format!("{width} must be even for YUYV capture"),
            });
        }

        if self.device.path.is_empty() {
            return Err(ConfigError::Invalid {
                field: "device",
                reason: "path is empty".to_string(),
            });
        }

        Ok(())
    }

    /// Scheduling settings for a capture session
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            interval_secs: self.interval_secs,
            skip_frames: self.skip_frames,
            quality: self.quality,
            output_dir: self.output_dir.clone(),
        }
    }

    /// Post-capture command, if one is configured
    pub fn post_command(&self) -> Option<PostCaptureCommand> {
        let (program, args) = self.command.split_first()?;
        Some(PostCaptureCommand {
            program: program.clone(),
            args: args.to_vec(),
            wait: if self.wait_for_command {
                WaitMode::Blocking
            } else {
                WaitMode::Detached
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SnapshotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_post_command_splits_program() {
        let config = SnapshotConfig {
            command: vec!["upload".into(), "--fast".into()],
            wait_for_command: true,
            ..Default::default()
        };
        let command = config.post_command().unwrap();
        assert_eq!(command.program, "upload");
        assert_eq!(command.args, vec!["--fast".to_string()]);
        assert_eq!(command.wait, WaitMode::Blocking);

        assert!(SnapshotConfig::default().post_command().is_none());
    }

    #[test]
    fn test_odd_width_only_rejected_for_yuyv() {
        let mut config = SnapshotConfig::default();
        config.device.width = 321;
        assert!(config.validate().is_err());

        config.device.pixel_format = PixelFormat::Mjpeg;
        assert!(config.validate().is_ok());
    }
}
