// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use snapcam::SnapshotConfig;
use snapcam::backends::camera::{CaptureMode, PixelFormat};
use snapcam::constants::{DEFAULT_DEVICE, DEFAULT_HEIGHT, DEFAULT_QUALITY, DEFAULT_WIDTH};
use snapcam::errors::ConfigError;
use snapcam::pipelines::snapshot::DhtPolicy;
use snapcam::process::WaitMode;

#[test]
fn test_config_default() {
    let config = SnapshotConfig::default();

    assert_eq!(config.device.path, DEFAULT_DEVICE);
    assert_eq!(config.device.width, DEFAULT_WIDTH);
    assert_eq!(config.device.height, DEFAULT_HEIGHT);
    assert_eq!(config.device.pixel_format, PixelFormat::Yuyv);
    assert_eq!(config.device.capture_mode, CaptureMode::Mmap);
    assert_eq!(config.interval_secs, 2, "Default interval should be 2 seconds");
    assert_eq!(config.skip_frames, 0);
    assert_eq!(config.quality, DEFAULT_QUALITY);
    assert_eq!(config.dht_policy, DhtPolicy::Append);
    assert!(config.command.is_empty());
    assert!(config.max_age_secs.is_none());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = SnapshotConfig::from_json(
        r#"{
            "device": { "path": "/dev/video3", "pixel_format": "mjpeg", "capture_mode": "userptr" },
            "interval_secs": 0,
            "dht_policy": "insert-if-missing",
            "command": ["logger", "-t", "snapcam"],
            "wait_for_command": true
        }"#,
    )
    .unwrap();

    assert_eq!(config.device.path, "/dev/video3");
    assert_eq!(config.device.width, DEFAULT_WIDTH);
    assert_eq!(config.device.pixel_format, PixelFormat::Mjpeg);
    assert_eq!(config.device.capture_mode, CaptureMode::Userptr);
    assert_eq!(config.interval_secs, 0);
    assert_eq!(config.quality, DEFAULT_QUALITY);
    assert_eq!(config.dht_policy, DhtPolicy::InsertIfMissing);

    let command = config.post_command().unwrap();
    assert_eq!(command.program, "logger");
    assert_eq!(command.args, vec!["-t", "snapcam"]);
    assert_eq!(command.wait, WaitMode::Blocking);
}

#[test]
fn test_load_reports_missing_file() {
    let err = SnapshotConfig::load(std::path::Path::new("/nonexistent/snapcam.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_load_reports_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = SnapshotConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = SnapshotConfig::default();
    config.quality = 101;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "quality", .. })
    ));

    let mut config = SnapshotConfig::default();
    config.device.height = 0;
    assert!(config.validate().is_err());

    let mut config = SnapshotConfig::default();
    config.device.width = 70_000;
    assert!(config.validate().is_err());

    let mut config = SnapshotConfig::default();
    config.quality = 0;
    assert!(config.validate().is_ok(), "Quality 0 is within range");
}

#[test]
fn test_session_settings_follow_config() {
    let config = SnapshotConfig {
        interval_secs: 7,
        skip_frames: 4,
        quality: 33,
        output_dir: "/srv/cam".into(),
        ..Default::default()
    };
    let settings = config.session_settings();

    assert_eq!(settings.interval_secs, 7);
    assert_eq!(settings.skip_frames, 4);
    assert_eq!(settings.quality, 33);
    assert_eq!(settings.output_dir, std::path::PathBuf::from("/srv/cam"));
}
