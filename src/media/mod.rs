// SPDX-License-Identifier: MPL-2.0

//! Media processing utilities
//!
//! # Still Image Encoding
//!
//! Raw frames are compressed scanline by scanline through libjpeg (the
//! `mozjpeg` crate) in [`encoders::jpeg`]. Color conversion from the
//! camera's packed 4:2:2 output lives with the camera backend in
//! [`crate::backends::camera::format_converters`].

pub mod encoders;

// Re-export commonly used types
pub use encoders::JpegEncoder;
