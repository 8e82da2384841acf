// SPDX-License-Identifier: GPL-3.0-only

//! Scanline-fed JPEG encoder
//!
//! A thin wrapper over libjpeg's compress cycle (via `mozjpeg`):
//!
//! ```text
//! new() → start_compress(sink) → write_scanline() × height → finish()
//! ```
//!
//! Only a few scanlines are held by libjpeg at any time; compressed data
//! reaches the sink as MCU rows complete. The baseline profile with the
//! standard Huffman tables keeps output deterministic for a given raster and
//! quality.

pub mod huffman;

use crate::constants::MAX_DIMENSION;
use crate::errors::EncodeError;
use mozjpeg::{ColorSpace, Compress, CompressStarted};
use std::io::Write;

/// Streaming RGB to JPEG encoder
///
/// Construct (writes headers), feed every scanline with
/// [`write_scanline`](Self::write_scanline), then [`finish`](Self::finish)
/// to write the end-of-image marker.
pub struct JpegEncoder<W: Write> {
    compress: CompressStarted<W>,
    width: u32,
    height: u32,
    next_scanline: u32,
}

impl<W: Write> JpegEncoder<W> {
    /// Start a new image and write its headers to `sink`
    ///
    /// `quality` follows the 0-100 scale; 0 behaves like 1.
    pub fn new(sink: W, width: u32, height: u32, quality: u8) -> Result<Self, EncodeError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EncodeError::InvalidDimensions { width, height });
        }

        let mut compress = Compress::new(ColorSpace::JCS_RGB);
        // Baseline sequential with fixed tables, no progressive scans
        compress.set_fastest_defaults();
        compress.set_optimize_coding(false);
        compress.set_size(width as usize, height as usize);
        compress.set_quality(f32::from(quality.clamp(1, 100)));

        Ok(Self {
            compress: compress.start_compress(sink)?,
            width,
            height,
            next_scanline: 0,
        })
    }

    /// Index of the next scanline to be written
    pub fn next_scanline(&self) -> u32 {
        self.next_scanline
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Supply the next RGB scanline (`width * 3` bytes)
    pub fn write_scanline(&mut self, rgb: &[u8]) -> Result<(), EncodeError> {
        if self.next_scanline >= self.height {
            return Err(EncodeError::TooManyScanlines {
                height: self.height,
            });
        }

        let stride = self.width as usize * 3;
        if rgb.len() != stride {
            return Err(EncodeError::ScanlineLength {
                expected: stride,
                actual: rgb.len(),
            });
        }

        self.compress.write_scanlines(rgb)?;
        self.next_scanline += 1;
        Ok(())
    }

    /// Write the end-of-image marker and hand back the sink
    pub fn finish(self) -> Result<W, EncodeError> {
        if self.next_scanline < self.height {
            return Err(EncodeError::Incomplete {
                written: self.next_scanline,
                height: self.height,
            });
        }

        let mut sink = self.compress.finish()?;
        sink.flush()?;
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(width: u32, height: u32, quality: u8, pixel: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
        let mut encoder = JpegEncoder::new(Vec::new(), width, height, quality).unwrap();
        for y in 0..height {
            let row: Vec<u8> = (0..width).flat_map(|x| pixel(x, y)).collect();
            encoder.write_scanline(&row).unwrap();
        }
        encoder.finish().unwrap()
    }

    #[test]
    fn test_stream_markers() {
        let data = encode(4, 2, 90, |_, _| [200, 100, 50]);
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        assert_eq!(&data[data.len() - 2..], &[0xFF, 0xD9]);
        assert_eq!(&data[6..11], b"JFIF\0");
    }

    #[test]
    fn test_baseline_frame_carries_dimensions() {
        let data = encode(40, 18, 75, |x, y| [x as u8, y as u8, 0]);
        let sof = data
            .windows(2)
            .position(|w| w == [0xFF, 0xC0])
            .expect("SOF0 marker");
        assert_eq!(&data[sof + 5..sof + 9], &[0, 18, 0, 40]);
        assert!(!data.windows(2).any(|w| w == [0xFF, 0xC2]), "progressive output");
    }

    #[test]
    fn test_rejects_wrong_scanline_length() {
        let mut encoder = JpegEncoder::new(Vec::new(), 4, 2, 90).unwrap();
        let err = encoder.write_scanline(&[0; 9]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ScanlineLength {
                expected: 12,
                actual: 9
            }
        ));
        assert_eq!(encoder.next_scanline(), 0);
    }

    #[test]
    fn test_rejects_extra_scanlines() {
        let mut encoder = JpegEncoder::new(Vec::new(), 2, 1, 90).unwrap();
        encoder.write_scanline(&[0; 6]).unwrap();
        assert!(matches!(
            encoder.write_scanline(&[0; 6]),
            Err(EncodeError::TooManyScanlines { height: 1 })
        ));
    }

    #[test]
    fn test_finish_requires_every_scanline() {
        let mut encoder = JpegEncoder::new(Vec::new(), 2, 3, 90).unwrap();
        encoder.write_scanline(&[0; 6]).unwrap();
        assert!(matches!(
            encoder.finish(),
            Err(EncodeError::Incomplete {
                written: 1,
                height: 3
            })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_dimensions() {
        assert!(JpegEncoder::new(Vec::new(), 0, 10, 90).is_err());
        assert!(JpegEncoder::new(Vec::new(), 10, 70_000, 90).is_err());
    }
}
