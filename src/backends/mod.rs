// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for frame capture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Snapshot Pipeline               │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │            ┌──────────────────┐             │
//! │            │     Camera       │             │
//! │            │      (V4L2)      │             │
//! │            └──────────────────┘             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Frame source trait, V4L2 capture and pixel conversion

pub mod camera;
