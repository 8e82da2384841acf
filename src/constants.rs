// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Capture device opened when none is configured
pub const DEFAULT_DEVICE: &str = "/dev/video0";

/// Default capture resolution
pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 240;

/// Seconds between snapshots (0 saves every frame)
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

/// Frames discarded after startup while exposure settles
pub const DEFAULT_SKIP_FRAMES: u32 = 0;

/// JPEG quality used for uncompressed frames
pub const DEFAULT_QUALITY: u8 = 95;

/// Upper bound of the quality scale
pub const MAX_QUALITY: u8 = 100;

/// Largest dimension a baseline JPEG frame header can carry
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Number of driver buffers queued for streaming
pub const STREAM_BUFFER_COUNT: u32 = 4;

/// How long an interrupted frame wait gives signal delivery to cancel the loop
///
/// `ctrlc` runs its handler on a separate thread, so the token can flip
/// slightly after the wait returns.
pub const SIGNAL_GRACE: std::time::Duration = std::time::Duration::from_millis(500);

/// Default output directory: the user's picture directory, else home, else `.`
pub fn default_output_dir() -> std::path::PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}
