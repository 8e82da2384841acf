// SPDX-License-Identifier: GPL-3.0-only
//! Packed 4:2:2 to RGB conversion
//!
//! Integer fixed-point BT.601 conversion, one scanline at a time. Only a
//! single RGB row is ever held in memory.

/// Convert one YUYV pixel pair to two RGB pixels
///
/// YUYV: Y0 U Y1 V - each 4-byte group encodes 2 pixels sharing U and V.
/// Luma is scaled by 256 and the result shifted back down, then clamped.
#[inline]
pub fn yuyv_pair_to_rgb(pair: [u8; 4]) -> [[u8; 3]; 2] {
    let u = pair[1] as i32 - 128;
    let v = pair[3] as i32 - 128;

    [pair[0], pair[2]].map(|luma| {
        let y = (luma as i32) << 8;
        let r = (y + 359 * v) >> 8;
        let g = (y - 88 * u - 183 * v) >> 8;
        let b = (y + 454 * u) >> 8;
        [clamp_channel(r), clamp_channel(g), clamp_channel(b)]
    })
}

#[inline]
fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Convert one packed YUYV row into an RGB row
///
/// `rgb` must hold `yuyv.len() / 2 * 3` bytes.
pub fn yuyv_row_to_rgb(yuyv: &[u8], rgb: &mut [u8]) {
    debug_assert_eq!(yuyv.len() % 4, 0);
    debug_assert_eq!(rgb.len(), yuyv.len() / 2 * 3);

    for (pair, out) in yuyv.chunks_exact(4).zip(rgb.chunks_exact_mut(6)) {
        let [first, second] = yuyv_pair_to_rgb([pair[0], pair[1], pair[2], pair[3]]);
        out[..3].copy_from_slice(&first);
        out[3..].copy_from_slice(&second);
    }
}

/// Row-by-row YUYV to RGB converter over a whole frame
///
/// Each call to [`next_scanline`](Self::next_scanline) refills the same
/// internal row buffer, so the returned slice is only valid until the next call.
pub struct YuyvScanlines<'a> {
    src: &'a [u8],
    stride: usize,
    height: usize,
    row: usize,
    buffer: Vec<u8>,
}

impl<'a> YuyvScanlines<'a> {
    /// # Panics
    ///
    /// Panics if `width` is odd or `src` is not exactly `width * height * 2`
    /// bytes. Frames are validated before they reach the converter.
    pub fn new(src: &'a [u8], width: u32, height: u32) -> Self {
        let width = width as usize;
        let height = height as usize;
        assert!(width % 2 == 0, "packed 4:2:2 rows need an even width");
        assert_eq!(src.len(), width * height * 2, "YUYV buffer length mismatch");

        Self {
            src,
            stride: width * 2,
            height,
            row: 0,
            buffer: vec![0; width * 3],
        }
    }

    /// Convert and return the next RGB scanline, top to bottom
    pub fn next_scanline(&mut self) -> Option<&[u8]> {
        if self.row >= self.height {
            return None;
        }

        let start = self.row * self.stride;
        yuyv_row_to_rgb(&self.src[start..start + self.stride], &mut self.buffer);
        self.row += 1;
        Some(&self.buffer)
    }

    /// Number of rows not yet converted
    pub fn remaining(&self) -> usize {
        self.height - self.row
    }
}
