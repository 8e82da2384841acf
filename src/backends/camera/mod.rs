// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The snapshot loop only sees a [`FrameSource`]: something that hands out one
//! raw frame at a time and owns every device resource behind it.
//!
//! ```text
//! ┌──────────────────────┐
//! │  SnapshotScheduler   │
//! └──────────┬───────────┘
//!            │ grab()
//!            ▼
//! ┌──────────────────────┐
//! │  FrameSource trait   │  ← open / reset_control / grab / close
//! └──────────┬───────────┘
//!            ▼
//!     ┌─────────────┐
//!     │ V4L2 (v4l)  │  ← Concrete implementation
//!     └─────────────┘
//! ```

pub mod format_converters;
pub mod types;
pub mod v4l2;
pub mod v4l2_controls;

pub use types::*;
pub use v4l2::V4l2FrameSource;

use crate::errors::DeviceError;
use tracing::{info, warn};
use v4l2_controls::{
    V4L2_CID_BRIGHTNESS, V4L2_CID_CONTRAST, V4L2_CID_GAIN, V4L2_CID_SATURATION, control_name,
};

/// Supplier of raw frames
///
/// Implementations own their buffers exclusively. A [`Frame`] borrows from
/// the source, so it is released before the next `grab`.
pub trait FrameSource {
    /// Open the device and negotiate format, resolution and buffer mode
    fn open(config: &DeviceConfig) -> Result<Self, DeviceError>
    where
        Self: Sized;

    /// Restore a control to its driver default
    fn reset_control(&mut self, control_id: u32) -> Result<(), DeviceError>;

    /// Apply an explicit control value
    fn set_control(&mut self, control_id: u32, value: i32) -> Result<(), DeviceError>;

    /// Block until the next frame is available
    fn grab(&mut self) -> Result<Frame<'_>, DeviceError>;

    /// Release the device. Calling it again is a no-op.
    fn close(&mut self);
}

/// Bring the standard image controls to a known state
///
/// Each control is set to its configured value, or reset to the driver
/// default when none is configured. Failures are logged and skipped.
pub fn apply_startup_controls<S: FrameSource + ?Sized>(source: &mut S, controls: &ControlSettings) {
    info!("Resetting camera settings");

    let wanted = [
        (V4L2_CID_BRIGHTNESS, controls.brightness),
        (V4L2_CID_CONTRAST, controls.contrast),
        (V4L2_CID_SATURATION, controls.saturation),
        (V4L2_CID_GAIN, controls.gain),
    ];

    for (id, value) in wanted {
        let result = match value {
            Some(value) => source.set_control(id, value),
            None => source.reset_control(id),
        };
        if let Err(e) = result {
            warn!(control = control_name(id), error = %e, "Could not apply camera control");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSource {
        resets: Vec<u32>,
        sets: Vec<(u32, i32)>,
    }

    impl FrameSource for RecordingSource {
        fn open(_config: &DeviceConfig) -> Result<Self, DeviceError> {
            Ok(Self::default())
        }

        fn reset_control(&mut self, control_id: u32) -> Result<(), DeviceError> {
            self.resets.push(control_id);
            if control_id == V4L2_CID_GAIN {
                return Err(DeviceError::Closed);
            }
            Ok(())
        }

        fn set_control(&mut self, control_id: u32, value: i32) -> Result<(), DeviceError> {
            self.sets.push((control_id, value));
            Ok(())
        }

        fn grab(&mut self) -> Result<Frame<'_>, DeviceError> {
            Err(DeviceError::Closed)
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_startup_controls_reset_unless_configured() {
        let mut source = RecordingSource::default();
        let controls = ControlSettings {
            contrast: Some(40),
            ..Default::default()
        };

        // The failing gain reset must not stop the others
        apply_startup_controls(&mut source, &controls);

        assert_eq!(
            source.resets,
            vec![V4L2_CID_BRIGHTNESS, V4L2_CID_SATURATION, V4L2_CID_GAIN]
        );
        assert_eq!(source.sets, vec![(V4L2_CID_CONTRAST, 40)]);
    }
}
