// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the snapshot tool
//!
//! Only [`DeviceError`] is fatal: it crosses the capture loop boundary and
//! ends the process after the device is released. Every other error is
//! handled where it happens.

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Capture device errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Signal handler installation errors
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Capture device errors
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device node could not be opened
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Driver refused the requested pixel format
    #[error("Device does not support {requested} (driver offered {offered})")]
    FormatRejected { requested: String, offered: String },
    /// Buffer queue could not be set up
    #[error("Failed to start streaming: {0}")]
    Stream(std::io::Error),
    /// Dequeueing a frame failed
    #[error("Failed to grab frame: {0}")]
    Grab(std::io::Error),
    /// Driver delivered a frame that does not match the negotiated format
    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
    /// Control query or update failed
    #[error("Control 0x{id:08x}: {source}")]
    Control {
        id: u32,
        #[source]
        source: std::io::Error,
    },
    /// Operation on a source that has already been closed
    #[error("Device is closed")]
    Closed,
}

impl DeviceError {
    /// A signal cut the wait for a frame short
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Grab(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}

/// Frame validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Frame dimensions {width}x{height} are empty")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("Packed 4:2:2 frames need an even width, got {0}")]
    OddWidth(u32),
    #[error("Frame holds {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Rows are padded to {stride} bytes, expected {expected}")]
    PaddedStride { stride: u32, expected: u32 },
}

/// JPEG encoding errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Image dimensions {width}x{height} are outside 1..=65535")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Scanline holds {actual} bytes, expected {expected}")]
    ScanlineLength { expected: usize, actual: usize },
    #[error("All {height} scanlines have already been written")]
    TooManyScanlines { height: u32 },
    #[error("Image incomplete: {written} of {height} scanlines written")]
    Incomplete { written: u32, height: u32 },
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Signal handler installation errors
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Failed to install interrupt handler: {0}")]
    Ctrlc(#[from] ctrlc::Error),
    #[error("Failed to install handler for signal {signal}: {source}")]
    Sigaction {
        signal: i32,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_converts_to_app_error() {
        let err: AppError = DeviceError::Closed.into();
        assert!(matches!(err, AppError::Device(DeviceError::Closed)));
        assert_eq!(err.to_string(), "Device error: Device is closed");
    }

    #[test]
    fn test_only_interrupted_grab_counts_as_interrupted() {
        let interrupted = DeviceError::Grab(std::io::Error::from(std::io::ErrorKind::Interrupted));
        assert!(interrupted.is_interrupted());
        assert!(!DeviceError::Grab(std::io::Error::other("unplugged")).is_interrupted());
        assert!(!DeviceError::Stream(std::io::Error::from_raw_os_error(libc::EINTR)).is_interrupted());
    }

    #[test]
    fn test_frame_error_message() {
        let err = FrameError::LengthMismatch {
            expected: 16,
            actual: 12,
        };
        assert_eq!(err.to_string(), "Frame holds 12 bytes, expected 16");
    }

    #[test]
    fn test_control_error_formats_hex_id() {
        let err = DeviceError::Control {
            id: 0x0098_0900,
            source: std::io::Error::from_raw_os_error(libc::EINVAL),
        };
        assert!(err.to_string().starts_with("Control 0x00980900"));
    }
}
