// SPDX-License-Identifier: GPL-3.0-only

//! Scheduling state of a capture run

use crate::storage::snapshot_path;
use std::path::{Path, PathBuf};

/// Settings a capture session is created from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Seconds between snapshots, 0 saves every frame
    pub interval_secs: u64,
    /// Frames discarded before any snapshot is considered
    pub skip_frames: u32,
    /// JPEG quality 0-100
    pub quality: u8,
    pub output_dir: PathBuf,
}

/// Mutable scheduling state, owned by the scheduler for the process lifetime
#[derive(Debug, Clone)]
pub struct CaptureSession {
    settings: SessionSettings,
    /// Time of the last save attempt, `None` until the first one
    reference: Option<i64>,
    skip_remaining: u32,
}

impl CaptureSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            skip_remaining: settings.skip_frames,
            settings,
            reference: None,
        }
    }

    /// Consume one frame of the initial skip window, if any is left
    pub fn take_skip(&mut self) -> bool {
        if self.skip_remaining > 0 {
            self.skip_remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Whether a frame arriving at `now` should be saved
    ///
    /// An interval of 0 saves every frame. Otherwise strictly more than
    /// `interval` seconds must have passed since the reference time; a session
    /// that has not saved yet is always due.
    pub fn is_due(&self, now: i64) -> bool {
        if self.settings.interval_secs == 0 {
            return true;
        }
        match self.reference {
            None => true,
            Some(reference) => now.saturating_sub(reference) > self.settings.interval_secs as i64,
        }
    }

    /// Time of the last save attempt
    pub fn reference(&self) -> Option<i64> {
        self.reference
    }

    /// Destination of a snapshot taken at `now`
    pub fn snapshot_path_at(&self, now: i64) -> PathBuf {
        snapshot_path(&self.settings.output_dir, now)
    }

    /// Restart the interval from `now`, whether or not the save succeeded
    pub fn mark_attempt(&mut self, now: i64) {
        self.reference = Some(now);
    }

    pub fn skip_remaining(&self) -> u32 {
        self.skip_remaining
    }

    pub fn quality(&self) -> u8 {
        self.settings.quality
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(interval_secs: u64, skip_frames: u32) -> CaptureSession {
        CaptureSession::new(
            SessionSettings {
                interval_secs,
                skip_frames,
                quality: 90,
                output_dir: PathBuf::from("/tmp/snaps"),
            },
        )
    }

    #[test]
    fn test_fresh_session_is_due() {
        assert!(session(60, 0).is_due(1000));
    }

    #[test]
    fn test_interval_is_strictly_greater() {
        let mut s = session(2, 0);
        s.mark_attempt(1000);
        assert!(!s.is_due(1001));
        assert!(!s.is_due(1002));
        assert!(s.is_due(1003));
    }

    #[test]
    fn test_zero_interval_always_due() {
        let mut s = session(0, 0);
        s.mark_attempt(1000);
        assert!(s.is_due(1000));
    }

    #[test]
    fn test_skip_window_counts_down() {
        let mut s = session(0, 2);
        assert!(s.take_skip());
        assert!(s.take_skip());
        assert!(!s.take_skip());
        assert_eq!(s.skip_remaining(), 0);
    }

    #[test]
    fn test_attempt_moves_reference() {
        let mut s = session(2, 0);
        assert_eq!(s.reference(), None);
        s.mark_attempt(1003);
        assert_eq!(s.reference(), Some(1003));
        assert_eq!(s.snapshot_path_at(1003), PathBuf::from("/tmp/snaps/snap_1003.jpg"));
    }
}
