// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera control interface
//!
//! Query, set and reset the user-class image controls through raw ioctls.

use crate::errors::DeviceError;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use tracing::debug;

// ===== V4L2 Control Class Bases =====
const V4L2_CTRL_CLASS_USER: u32 = 0x00980000;
const V4L2_CID_BASE: u32 = V4L2_CTRL_CLASS_USER | 0x900;

// ===== V4L2 Control IDs (User Class) =====

/// Brightness control
pub const V4L2_CID_BRIGHTNESS: u32 = V4L2_CID_BASE;
/// Contrast control
pub const V4L2_CID_CONTRAST: u32 = V4L2_CID_BASE + 1;
/// Saturation control
pub const V4L2_CID_SATURATION: u32 = V4L2_CID_BASE + 2;
/// Gain control
pub const V4L2_CID_GAIN: u32 = V4L2_CID_BASE + 19;

// ===== V4L2 Control Flags =====
const V4L2_CTRL_FLAG_DISABLED: u32 = 0x0001;

// ===== V4L2 ioctl Numbers =====
// (dir << 30) | (size << 16) | ('V' << 8) | nr, dir 3 = READ|WRITE

/// Set control value (v4l2_control: 8 bytes)
const VIDIOC_S_CTRL: libc::c_ulong = 0xC008561C;
/// Query control info (v4l2_queryctrl: 68 bytes)
const VIDIOC_QUERYCTRL: libc::c_ulong = 0xC0445624;

#[repr(C)]
struct V4l2Control {
    id: u32,
    value: i32,
}

#[repr(C)]
struct V4l2Queryctrl {
    id: u32,
    ctrl_type: u32,
    name: [u8; 32],
    minimum: i32,
    maximum: i32,
    step: i32,
    default_value: i32,
    flags: u32,
    reserved: [u32; 2],
}

/// Information about a V4L2 control
#[derive(Debug, Clone)]
pub struct ControlInfo {
    pub id: u32,
    pub name: String,
    pub minimum: i32,
    pub maximum: i32,
    pub default_value: i32,
    pub flags: u32,
}

impl ControlInfo {
    pub fn is_disabled(&self) -> bool {
        self.flags & V4L2_CTRL_FLAG_DISABLED != 0
    }
}

/// Human-readable name for the controls reset at startup
pub fn control_name(id: u32) -> &'static str {
    match id {
        V4L2_CID_BRIGHTNESS => "brightness",
        V4L2_CID_CONTRAST => "contrast",
        V4L2_CID_SATURATION => "saturation",
        V4L2_CID_GAIN => "gain",
        _ => "control",
    }
}

fn extract_name(bytes: &[u8; 32]) -> String {
    let name_len = bytes.iter().position(|&c| c == 0).unwrap_or(32);
    String::from_utf8_lossy(&bytes[..name_len]).to_string()
}

fn open_device(device_path: &str) -> Result<File, DeviceError> {
    File::open(device_path).map_err(|source| DeviceError::Open {
        path: device_path.to_string(),
        source,
    })
}

/// Query a control's range and default value
pub fn query_control(device_path: &str, control_id: u32) -> Result<ControlInfo, DeviceError> {
    let file = open_device(device_path)?;

    let mut qctrl = V4l2Queryctrl {
        id: control_id,
        ctrl_type: 0,
        name: [0; 32],
        minimum: 0,
        maximum: 0,
        step: 0,
        default_value: 0,
        flags: 0,
        reserved: [0; 2],
    };

    let result = unsafe {
        libc::ioctl(
            file.as_raw_fd(),
            VIDIOC_QUERYCTRL as _,
            &mut qctrl as *mut V4l2Queryctrl,
        )
    };
    if result < 0 {
        return Err(DeviceError::Control {
            id: control_id,
            source: std::io::Error::last_os_error(),
        });
    }

    Ok(ControlInfo {
        id: qctrl.id,
        name: extract_name(&qctrl.name),
        minimum: qctrl.minimum,
        maximum: qctrl.maximum,
        default_value: qctrl.default_value,
        flags: qctrl.flags,
    })
}

/// Set the value of a control
pub fn set_control(device_path: &str, control_id: u32, value: i32) -> Result<(), DeviceError> {
    let file = open_device(device_path)?;

    let mut ctrl = V4l2Control {
        id: control_id,
        value,
    };

    let result = unsafe {
        libc::ioctl(
            file.as_raw_fd(),
            VIDIOC_S_CTRL as _,
            &mut ctrl as *mut V4l2Control,
        )
    };
    if result < 0 {
        return Err(DeviceError::Control {
            id: control_id,
            source: std::io::Error::last_os_error(),
        });
    }

    if ctrl.value != value {
        debug!(
            device_path,
            control_id,
            requested = value,
            actual = ctrl.value,
            "V4L2 control value was clamped"
        );
    }

    Ok(())
}

/// Restore a control to its driver default
pub fn reset_control(device_path: &str, control_id: u32) -> Result<(), DeviceError> {
    let info = query_control(device_path, control_id)?;
    if info.is_disabled() {
        debug!(device_path, control = %info.name, "Control disabled, not resetting");
        return Ok(());
    }

    set_control(device_path, control_id, info.default_value)?;
    debug!(
        device_path,
        control = %info.name,
        value = info.default_value,
        "Control reset to default"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_id_values() {
        assert_eq!(V4L2_CID_BRIGHTNESS, 0x00980900);
        assert_eq!(V4L2_CID_CONTRAST, 0x00980901);
        assert_eq!(V4L2_CID_SATURATION, 0x00980902);
        assert_eq!(V4L2_CID_GAIN, 0x00980913);
    }

    #[test]
    fn test_query_struct_matches_ioctl_size() {
        assert_eq!(std::mem::size_of::<V4l2Queryctrl>(), 68);
        assert_eq!(std::mem::size_of::<V4l2Control>(), 8);
    }

    #[test]
    fn test_missing_device_is_an_open_error() {
        let err = reset_control("/nonexistent/video99", V4L2_CID_GAIN).unwrap_err();
        assert!(matches!(err, DeviceError::Open { .. }));
    }

    #[test]
    fn test_control_names() {
        assert_eq!(control_name(V4L2_CID_GAIN), "gain");
        assert_eq!(control_name(0), "control");
    }
}
