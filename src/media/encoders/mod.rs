// SPDX-License-Identifier: MPL-2.0

//! Image encoders

pub mod jpeg;

// Re-export commonly used types
pub use jpeg::JpegEncoder;
pub use jpeg::huffman::{DHT_SEGMENT_LEN, dht_segment};
