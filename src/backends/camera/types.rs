// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the capture device abstraction

//! Shared types for camera backends

use crate::errors::FrameError;
use serde::{Deserialize, Serialize};

/// Pixel format negotiated with the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    /// Raw sensor output, converted to RGB and JPEG-encoded before saving
    #[default]
    Yuyv,
    /// MJPEG - Device-compressed frames
    /// Written to disk as-is, plus the Huffman table block
    Mjpeg,
}

impl PixelFormat {
    /// V4L2 FourCC code for this format
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            Self::Yuyv => *b"YUYV",
            Self::Mjpeg => *b"MJPG",
        }
    }

    /// Parse format from a V4L2 FourCC code
    pub fn from_fourcc(code: &[u8; 4]) -> Option<Self> {
        match code {
            b"YUYV" | b"YUY2" => Some(Self::Yuyv),
            b"MJPG" | b"JPEG" => Some(Self::Mjpeg),
            _ => None,
        }
    }

    /// Bytes per pixel for uncompressed formats, `None` for compressed ones
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            Self::Yuyv => Some(2),
            Self::Mjpeg => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.fourcc()))
    }
}

/// How driver buffers are shared with the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Driver-allocated buffers mapped into the process
    #[default]
    Mmap,
    /// Process-allocated buffers handed to the driver
    Userptr,
}

/// Explicit values for the image controls reset at startup
///
/// A `None` control is reset to its driver default instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub brightness: Option<i32>,
    pub contrast: Option<i32>,
    pub saturation: Option<i32>,
    pub gain: Option<i32>,
}

/// Everything needed to open a capture device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device node (e.g., /dev/video0)
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub capture_mode: CaptureMode,
    pub controls: ControlSettings,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: crate::constants::DEFAULT_DEVICE.to_string(),
            width: crate::constants::DEFAULT_WIDTH,
            height: crate::constants::DEFAULT_HEIGHT,
            pixel_format: PixelFormat::default(),
            capture_mode: CaptureMode::default(),
            controls: ControlSettings::default(),
        }
    }
}

/// A raw frame borrowed from the frame source for one processing cycle
///
/// The lifetime ties the pixel data to the driver buffer it came from, so a
/// frame cannot outlive the next call to `grab`.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    sequence: u32,
}

impl<'a> Frame<'a> {
    /// Wrap a driver buffer, checking it against the declared format
    ///
    /// Packed 4:2:2 frames must have an even width and exactly
    /// `width * height * 2` bytes. Compressed frames only need to be non-empty.
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        sequence: u32,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }

        match format.bytes_per_pixel() {
            Some(bpp) => {
                if width % 2 != 0 {
                    return Err(FrameError::OddWidth(width));
                }
                let expected = width as usize * height as usize * bpp;
                if data.len() != expected {
                    return Err(FrameError::LengthMismatch {
                        expected,
                        actual: data.len(),
                    });
                }
            }
            None => {
                if data.is_empty() {
                    return Err(FrameError::LengthMismatch {
                        expected: 1,
                        actual: 0,
                    });
                }
            }
        }

        Ok(Self {
            data,
            width,
            height,
            format,
            sequence,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Driver sequence number of this capture
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}
