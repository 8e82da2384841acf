// SPDX-License-Identifier: GPL-3.0-only

//! A termination signal that arrives while the loop is blocked waiting for a
//! frame must end the run cleanly
//!
//! Handlers are process-wide, so this scenario lives in its own binary.

use snapcam::backends::camera::{DeviceConfig, Frame, FrameSource};
use snapcam::errors::DeviceError;
use snapcam::pipelines::snapshot::{SessionSettings, SnapshotScheduler, SystemClock};
use snapcam::signals::{CancellationToken, SignalController};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Blocks in `poll` with no timeout, the way a V4L2 dequeue waits for a frame
struct StalledSource {
    read_fd: libc::c_int,
    write_fd: libc::c_int,
}

impl StalledSource {
    fn new() -> Self {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        Self {
            read_fd: fds[0],
            write_fd: fds[1],
        }
    }
}

impl FrameSource for StalledSource {
    fn open(_config: &DeviceConfig) -> Result<Self, DeviceError> {
        Ok(Self::new())
    }

    fn reset_control(&mut self, _control_id: u32) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_control(&mut self, _control_id: u32, _value: i32) -> Result<(), DeviceError> {
        Ok(())
    }

    fn grab(&mut self) -> Result<Frame<'_>, DeviceError> {
        let mut pollfd = libc::pollfd {
            fd: self.read_fd,
            events: libc::POLLIN,
            revents: 0,
        };
        if unsafe { libc::poll(&mut pollfd, 1, -1) } < 0 {
            return Err(DeviceError::Grab(std::io::Error::last_os_error()));
        }
        Err(DeviceError::Closed)
    }

    fn close(&mut self) {
        unsafe {
            libc::close(self.read_fd);
            libc::close(self.write_fd);
        }
    }
}

#[test]
fn test_sigint_during_frame_wait_stops_cleanly() {
    let token = CancellationToken::new();
    let controller = SignalController::install(token.clone()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let settings = SessionSettings {
        interval_secs: 0,
        skip_frames: 0,
        quality: 90,
        output_dir: dir.path().to_path_buf(),
    };
    let mut scheduler = SnapshotScheduler::new(settings, SystemClock);
    let mut source = StalledSource::new();

    // Keep signalling this thread until the loop returns, in case the first
    // signal lands before `poll` starts
    let target = unsafe { libc::pthread_self() };
    let done = Arc::new(AtomicBool::new(false));
    let sender = {
        let done = done.clone();
        std::thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(200));
                unsafe { libc::pthread_kill(target, libc::SIGINT) };
            }
        })
    };

    let result = scheduler.run(&mut source, controller.token());
    done.store(true, Ordering::SeqCst);
    sender.join().unwrap();
    source.close();

    let summary = result.expect("interrupted wait must not be a device error");
    assert_eq!(summary.frames, 0);
    assert!(token.is_cancelled());
}
