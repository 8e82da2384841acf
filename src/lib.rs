// SPDX-License-Identifier: MPL-2.0

//! snapcam - periodic still capture from V4L2 cameras
//!
//! Grabs frames from a video device, keeps one every few seconds and writes
//! it as a timestamped JPEG file.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Capture device abstraction and the V4L2 implementation
//! - [`media`]: Streaming JPEG encoder
//! - [`pipelines`]: Snapshot scheduling and file writing
//! - [`config`]: Run configuration
//! - [`signals`]: Cancellation on termination signals
//! - [`process`]: Post-capture command execution
//! - [`storage`]: Snapshot naming and retention
//!
//! # Example
//!
//! ```ignore
//! let config = SnapshotConfig::default();
//! let mut source = V4l2FrameSource::open(&config.device)?;
//! let token = CancellationToken::new();
//! SnapshotScheduler::new(config.session_settings(), SystemClock).run(&mut source, &token)?;
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod process;
pub mod signals;
pub mod storage;

// Re-export commonly used types
pub use backends::camera::{DeviceConfig, Frame, FrameSource, PixelFormat, V4l2FrameSource};
pub use config::SnapshotConfig;
pub use errors::{AppError, AppResult};
pub use pipelines::snapshot::{FrameOutcome, RunSummary, SnapshotScheduler, SystemClock};
pub use signals::CancellationToken;
