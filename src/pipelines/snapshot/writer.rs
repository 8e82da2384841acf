// SPDX-License-Identifier: GPL-3.0-only

//! Frame to JPEG file writer
//!
//! Uncompressed frames go through the scanline converter into the streaming
//! encoder one RGB row at a time. Compressed frames are copied through with
//! Huffman tables added per [`DhtPolicy`].
//!
//! Snapshots are never overwritten: a target that already exists is
//! reported as [`SaveError::Exists`] and left untouched.

use super::passthrough::{DhtPolicy, write_passthrough};
use crate::backends::camera::format_converters::YuyvScanlines;
use crate::backends::camera::{Frame, PixelFormat};
use crate::errors::EncodeError;
use crate::media::JpegEncoder;
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::debug;

/// Encode a YUYV frame as JPEG into `sink`
pub fn encode_yuyv<W: Write>(frame: &Frame<'_>, quality: u8, sink: W) -> Result<W, EncodeError> {
    let mut scanlines = YuyvScanlines::new(frame.data(), frame.width(), frame.height());
    let mut encoder = JpegEncoder::new(sink, frame.width(), frame.height(), quality)?;

    while let Some(rgb) = scanlines.next_scanline() {
        encoder.write_scanline(rgb)?;
    }

    encoder.finish()
}

/// Write `frame` as a JPEG image into `sink`
pub fn write_frame<W: Write>(
    frame: &Frame<'_>,
    quality: u8,
    dht_policy: DhtPolicy,
    mut sink: W,
) -> Result<W, EncodeError> {
    match frame.format() {
        PixelFormat::Yuyv => encode_yuyv(frame, quality, sink),
        PixelFormat::Mjpeg => {
            write_passthrough(frame.data(), dht_policy, &mut sink)?;
            sink.flush()?;
            Ok(sink)
        }
    }
}

/// Why a snapshot did not reach disk
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// A snapshot for this second is already on disk
    #[error("{path} already exists")]
    Exists { path: String },

    #[error("could not open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: EncodeError,
    },
}

/// Create `path` and write `frame` into it
///
/// Fails with [`SaveError::Exists`] rather than truncating an existing file.
/// A file left incomplete by an encode failure is removed again.
pub fn save_frame(
    frame: &Frame<'_>,
    path: &Path,
    quality: u8,
    dht_policy: DhtPolicy,
) -> Result<(), SaveError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            ErrorKind::AlreadyExists => SaveError::Exists {
                path: path.display().to_string(),
            },
            _ => SaveError::Open {
                path: path.display().to_string(),
                source,
            },
        })?;

    let result = write_frame(frame, quality, dht_policy, BufWriter::new(file)).and_then(|mut w| {
        w.flush()?;
        Ok(())
    });

    if let Err(source) = result {
        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "Could not remove partial snapshot");
        }
        return Err(SaveError::Write {
            path: path.display().to_string(),
            source,
        });
    }

    debug!(
        path = %path.display(),
        format = %frame.format(),
        width = frame.width(),
        height = frame.height(),
        "Snapshot written"
    );
    Ok(())
}
