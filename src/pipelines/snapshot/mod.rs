// SPDX-License-Identifier: GPL-3.0-only

//! Periodic snapshot pipeline
//!
//! ```text
//! FrameSource::grab → skip window → interval gate → writer → JPEG file
//!                                                       ↓
//!                                      post-capture command, retention
//! ```
//!
//! The scheduler runs on the main thread. Cancellation is observed at the
//! top of each iteration, so a frame that is being written always completes
//! before the loop exits. A termination signal that arrives while the source
//! waits for a frame interrupts that wait; the failed grab then counts as a
//! clean exit rather than a device error.

pub mod clock;
pub mod passthrough;
pub mod session;
pub mod writer;

pub use clock::{Clock, SystemClock};
pub use passthrough::{DhtPolicy, write_passthrough};
pub use session::{CaptureSession, SessionSettings};
pub use writer::{SaveError, save_frame, write_frame};

use crate::backends::camera::{Frame, FrameSource};
use crate::constants::SIGNAL_GRACE;
use crate::errors::DeviceError;
use crate::process::{ProcessSpawner, WaitMode};
use crate::signals::CancellationToken;
use crate::storage::prune_snapshots;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Action returned by one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Grab the next frame
    Continue,
    /// Leave the loop
    Stop,
}

/// What happened to a single frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Consumed by the initial skip window
    Skipped,
    /// Interval not yet elapsed
    Waiting,
    /// Written to this path
    Saved(PathBuf),
    /// A save was attempted at this path but failed
    Dropped(PathBuf),
    /// A snapshot with this name was already on disk and was kept
    Duplicate(PathBuf),
}

/// Frame counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub skipped: u64,
    pub saved: u64,
    pub dropped: u64,
    pub duplicates: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Skipped => self.skipped += 1,
            FrameOutcome::Waiting => {}
            FrameOutcome::Saved(_) => self.saved += 1,
            FrameOutcome::Dropped(_) => self.dropped += 1,
            FrameOutcome::Duplicate(_) => self.duplicates += 1,
        }
    }
}

/// Command run after each successful save, with the saved path appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCaptureCommand {
    pub program: String,
    pub args: Vec<String>,
    pub wait: WaitMode,
}

/// Decides which frames become files and writes them
pub struct SnapshotScheduler<C: Clock = SystemClock> {
    session: CaptureSession,
    clock: C,
    dht_policy: DhtPolicy,
    post_command: Option<PostCaptureCommand>,
    spawner: ProcessSpawner,
    max_age_secs: Option<u64>,
}

impl<C: Clock> SnapshotScheduler<C> {
    pub fn new(settings: SessionSettings, clock: C) -> Self {
        Self {
            session: CaptureSession::new(settings),
            clock,
            dht_policy: DhtPolicy::default(),
            post_command: None,
            spawner: ProcessSpawner::default(),
            max_age_secs: None,
        }
    }

    pub fn with_dht_policy(mut self, policy: DhtPolicy) -> Self {
        self.dht_policy = policy;
        self
    }

    pub fn with_post_command(mut self, command: Option<PostCaptureCommand>) -> Self {
        self.post_command = command;
        self
    }

    pub fn with_spawner(mut self, spawner: ProcessSpawner) -> Self {
        self.spawner = spawner;
        self
    }

    /// Delete snapshots older than `max_age_secs` after every save
    pub fn with_retention(mut self, max_age_secs: Option<u64>) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Handle one captured frame
    ///
    /// File errors are logged and the frame is dropped; they never stop
    /// the capture loop.
    pub fn process_frame(&mut self, frame: &Frame<'_>) -> FrameOutcome {
        if self.session.take_skip() {
            debug!(
                sequence = frame.sequence(),
                remaining = self.session.skip_remaining(),
                "Skipping frame"
            );
            return FrameOutcome::Skipped;
        }

        let now = self.clock.now();
        if !self.session.is_due(now) {
            return FrameOutcome::Waiting;
        }

        let path = self.session.snapshot_path_at(now);
        info!(path = %path.display(), "Saving image");

        let outcome = match save_frame(frame, &path, self.session.quality(), self.dht_policy) {
            Ok(()) => FrameOutcome::Saved(path),
            // Names have one-second resolution
            Err(e @ SaveError::Exists { .. }) => {
                warn!(error = %e, "Snapshot for this second already saved");
                FrameOutcome::Duplicate(path)
            }
            Err(e) => {
                warn!(error = %e, "Snapshot dropped");
                FrameOutcome::Dropped(path)
            }
        };

        self.session.mark_attempt(self.clock.now());

        if let FrameOutcome::Saved(path) = &outcome {
            self.after_save(path);
        }

        outcome
    }

    /// Capture until `token` is cancelled or the device fails
    ///
    /// The device error is returned as-is so the caller can release the
    /// device before exiting.
    pub fn run<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        token: &CancellationToken,
    ) -> Result<RunSummary, DeviceError> {
        let mut summary = RunSummary::default();

        while self.step(source, token, &mut summary)? == LoopAction::Continue {}

        info!(
            frames = summary.frames,
            saved = summary.saved,
            dropped = summary.dropped,
            duplicates = summary.duplicates,
            "Capture loop finished"
        );
        Ok(summary)
    }

    fn step<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        token: &CancellationToken,
        summary: &mut RunSummary,
    ) -> Result<LoopAction, DeviceError> {
        if token.is_cancelled() {
            info!("Exiting...");
            return Ok(LoopAction::Stop);
        }

        let frame = match source.grab() {
            Ok(frame) => frame,
            // The wait for a frame is not restarted after a signal handler runs
            Err(e)
                if token.is_cancelled()
                    || (e.is_interrupted() && token.wait_timeout(SIGNAL_GRACE)) =>
            {
                debug!(error = %e, "Frame wait interrupted");
                info!("Exiting...");
                return Ok(LoopAction::Stop);
            }
            Err(e) => return Err(e),
        };
        let outcome = self.process_frame(&frame);
        summary.record(&outcome);

        Ok(LoopAction::Continue)
    }

    fn after_save(&mut self, path: &Path) {
        if let Some(command) = &self.post_command {
            let mut args: Vec<&OsStr> = command.args.iter().map(OsStr::new).collect();
            args.push(path.as_os_str());

            info!(program = %command.program, "Executing post-capture command");
            let outcome = self.spawner.spawn(&command.program, &args, command.wait);
            if outcome.is_failure() {
                warn!(program = %command.program, ?outcome, "Post-capture command failed");
            }
        }

        if let Some(max_age) = self.max_age_secs {
            let removed = prune_snapshots(self.session.output_dir(), self.clock.now(), max_age);
            if !removed.is_empty() {
                info!(count = removed.len(), "Removed expired snapshots");
            }
        }
    }
}
