// SPDX-License-Identifier: GPL-3.0-only

//! Passthrough for device-compressed frames
//!
//! Many UVC cameras emit MJPEG frames without a DHT segment, relying on the
//! decoder to assume the standard tables. Saving such a frame as a still
//! image needs those tables supplied.

use crate::media::encoders::dht_segment;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use tracing::debug;

/// How the standard Huffman table block is added to compressed frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DhtPolicy {
    /// Write the frame, then the 420-byte DHT block, unconditionally
    ///
    /// Frames that already carry tables end up with a trailing duplicate.
    #[default]
    Append,
    /// Insert the block before the first SOS marker when the frame has no DHT
    InsertIfMissing,
    /// Write the frame bytes unchanged
    Omit,
}

/// Where the header of a compressed frame ends and whether it has tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeaderScan {
    sos_offset: usize,
    has_dht: bool,
}

/// Walk marker segments from SOI up to the first SOS
///
/// Returns `None` for anything that does not parse as a JPEG header.
fn scan_header(data: &[u8]) -> Option<HeaderScan> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    let mut has_dht = false;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            0xDA => {
                return Some(HeaderScan {
                    sos_offset: pos,
                    has_dht,
                });
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            0xC4 => has_dht = true,
            _ => {}
        }

        let length = u16::from_be_bytes([*data.get(pos + 2)?, *data.get(pos + 3)?]) as usize;
        if length < 2 {
            return None;
        }
        pos += 2 + length;
    }

    None
}

/// Write a compressed frame to `sink` according to `policy`
pub fn write_passthrough<W: Write>(data: &[u8], policy: DhtPolicy, sink: &mut W) -> io::Result<()> {
    match policy {
        DhtPolicy::Append => {
            sink.write_all(data)?;
            sink.write_all(&dht_segment())
        }
        DhtPolicy::InsertIfMissing => match scan_header(data) {
            Some(HeaderScan {
                sos_offset,
                has_dht: false,
            }) => {
                sink.write_all(&data[..sos_offset])?;
                sink.write_all(&dht_segment())?;
                sink.write_all(&data[sos_offset..])
            }
            scan => {
                debug!(?scan, "Frame left unchanged");
                sink.write_all(data)
            }
        },
        DhtPolicy::Omit => sink.write_all(data),
    }
}
