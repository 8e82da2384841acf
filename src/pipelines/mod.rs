// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │ Snapshot Pipeline │ ──▶ │  JPEG File   │
//! │ (YUYV/MJPEG) │     │  - skip / gate    │     │ snap_<t>.jpg │
//! │              │     │  - YUYV→RGB       │     │              │
//! │              │     │  - encode / copy  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! - [`snapshot`]: Interval-gated still capture

pub mod snapshot;
