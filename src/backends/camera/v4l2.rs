// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 frame source
//!
//! Opens a video capture node with the `v4l` crate, negotiates the pixel
//! format and streams through memory-mapped or user-pointer buffers.

use super::types::{CaptureMode, DeviceConfig, Frame, PixelFormat};
use super::{FrameSource, v4l2_controls};
use crate::constants::STREAM_BUFFER_COUNT;
use crate::errors::{DeviceError, FrameError};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

enum ActiveStream {
    Mmap(MmapStream<'static>),
    Userptr(UserptrStream),
}

/// Capture device backed by the V4L2 kernel API
pub struct V4l2FrameSource {
    path: String,
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
    // Dropped before the device so streaming stops first
    stream: Option<ActiveStream>,
    device: Option<Device>,
}

impl V4l2FrameSource {
    /// Negotiated frame width (the driver may adjust the requested one)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Negotiated frame height
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn negotiate(device: &Device, config: &DeviceConfig) -> Result<Format, DeviceError> {
        let requested = FourCC::new(&config.pixel_format.fourcc());
        let wanted = Format::new(config.width, config.height, requested);

        let actual = device
            .set_format(&wanted)
            .map_err(DeviceError::Stream)?;

        // Drivers may answer with an alias such as YUY2 or JPEG
        if PixelFormat::from_fourcc(&actual.fourcc.repr) != Some(config.pixel_format) {
            return Err(DeviceError::FormatRejected {
                requested: requested.to_string(),
                offered: actual.fourcc.to_string(),
            });
        }

        if actual.width != config.width || actual.height != config.height {
            warn!(
                requested_width = config.width,
                requested_height = config.height,
                width = actual.width,
                height = actual.height,
                "Requested size unavailable, using driver size"
            );
        }

        Ok(actual)
    }
}

impl FrameSource for V4l2FrameSource {
    fn open(config: &DeviceConfig) -> Result<Self, DeviceError> {
        info!(device = %config.path, "Opening V4L2 device");

        let device = Device::with_path(&config.path).map_err(|source| DeviceError::Open {
            path: config.path.clone(),
            source,
        })?;

        let format = Self::negotiate(&device, config)?;
        info!(
            width = format.width,
            height = format.height,
            fourcc = %format.fourcc,
            stride = format.stride,
            "Set V4L2 format"
        );

        let stream = match config.capture_mode {
            CaptureMode::Mmap => {
                MmapStream::with_buffers(&device, Type::VideoCapture, STREAM_BUFFER_COUNT)
                    .map(ActiveStream::Mmap)
            }
            CaptureMode::Userptr => {
                UserptrStream::with_buffers(&device, Type::VideoCapture, STREAM_BUFFER_COUNT)
                    .map(ActiveStream::Userptr)
            }
        }
        .map_err(DeviceError::Stream)?;

        debug!(mode = ?config.capture_mode, buffers = STREAM_BUFFER_COUNT, "Capture stream ready");

        Ok(Self {
            path: config.path.clone(),
            width: format.width,
            height: format.height,
            stride: format.stride,
            format: config.pixel_format,
            stream: Some(stream),
            device: Some(device),
        })
    }

    fn reset_control(&mut self, control_id: u32) -> Result<(), DeviceError> {
        if self.device.is_none() {
            return Err(DeviceError::Closed);
        }
        v4l2_controls::reset_control(&self.path, control_id)
    }

    fn set_control(&mut self, control_id: u32, value: i32) -> Result<(), DeviceError> {
        if self.device.is_none() {
            return Err(DeviceError::Closed);
        }
        v4l2_controls::set_control(&self.path, control_id, value)
    }

    fn grab(&mut self) -> Result<Frame<'_>, DeviceError> {
        let (width, height, stride, format) = (self.width, self.height, self.stride, self.format);
        let stream = self.stream.as_mut().ok_or(DeviceError::Closed)?;

        let (buf, meta): (&[u8], _) = match stream {
            ActiveStream::Mmap(stream) => stream.next().map_err(DeviceError::Grab)?,
            ActiveStream::Userptr(stream) => {
                let (buf, meta) = stream.next().map_err(DeviceError::Grab)?;
                (buf.as_slice(), meta)
            }
        };

        let data = frame_payload(buf, meta.bytesused, width, height, stride, format)?;
        Ok(Frame::new(data, width, height, format, meta.sequence)?)
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!(device = %self.path, "Capture stream stopped");
        }
        if self.device.take().is_some() {
            info!(device = %self.path, "V4L2 device closed");
        }
    }
}

impl Drop for V4l2FrameSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// The part of a dequeued buffer that holds the frame
///
/// Drivers hand back the whole buffer. Packed frames must be tightly packed
/// (no row padding) and fully filled; a short frame would otherwise pick up
/// stale bytes from an earlier capture.
fn frame_payload(
    buf: &[u8],
    bytesused: u32,
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
) -> Result<&[u8], FrameError> {
    let used = (bytesused as usize).min(buf.len());

    let Some(bpp) = format.bytes_per_pixel() else {
        return Ok(&buf[..used]);
    };

    let row = width * bpp as u32;
    if stride != 0 && stride != row {
        return Err(FrameError::PaddedStride {
            stride,
            expected: row,
        });
    }

    let expected = row as usize * height as usize;
    if used < expected {
        return Err(FrameError::LengthMismatch {
            expected,
            actual: used,
        });
    }
    Ok(&buf[..expected])
}
