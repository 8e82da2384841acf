// SPDX-License-Identifier: GPL-3.0-only

//! Post-capture command execution
//!
//! Commands run either to completion (blocking) or detached. Detached
//! children are reaped opportunistically on every later spawn so they never
//! pile up as zombies.

use serde::{Deserialize, Serialize};
use std::process::{Child, Command, ExitStatus};
use tracing::{debug, info, warn};

/// How the caller waits for a spawned command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitMode {
    /// Suspend until the child exits
    Blocking,
    /// Return immediately, reap later
    #[default]
    Detached,
}

/// Identity of a launched child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildHandle {
    pub pid: u32,
    pub mode: WaitMode,
}

/// Result of one spawn request
#[derive(Debug)]
pub enum SpawnOutcome {
    /// Blocking child finished with this status
    Exited(ExitStatus),
    /// Child is running in the background
    Detached(ChildHandle),
    /// The command could not be started; the caller carries on regardless
    LaunchFailed(std::io::Error),
}

impl SpawnOutcome {
    /// Whether the command is known to have failed
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Exited(status) => !status.success(),
            Self::Detached(_) => false,
            Self::LaunchFailed(_) => true,
        }
    }
}

/// Launches external commands and keeps track of detached children
#[derive(Debug, Default)]
pub struct ProcessSpawner {
    verbose: bool,
    detached: Vec<Child>,
}

impl ProcessSpawner {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            detached: Vec::new(),
        }
    }

    /// Run `program` with `args`
    ///
    /// Failing to start the program is returned as
    /// [`SpawnOutcome::LaunchFailed`], never as an error of the caller.
    pub fn spawn<S: AsRef<std::ffi::OsStr>>(
        &mut self,
        program: &str,
        args: &[S],
        mode: WaitMode,
    ) -> SpawnOutcome {
        let mut child = match Command::new(program).args(args).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program, error = %e, "Error executing command");
                self.reap();
                return SpawnOutcome::LaunchFailed(e);
            }
        };

        let handle = ChildHandle {
            pid: child.id(),
            mode,
        };
        debug!(program, pid = handle.pid, ?mode, "Command started");

        match mode {
            WaitMode::Blocking => {
                if self.verbose {
                    info!(program, "Waiting for command to finish...");
                }
                let outcome = match child.wait() {
                    Ok(status) => SpawnOutcome::Exited(status),
                    Err(e) => SpawnOutcome::LaunchFailed(e),
                };
                if self.verbose {
                    info!(program, ?outcome, "Command finished");
                }
                outcome
            }
            WaitMode::Detached => {
                self.reap();
                self.detached.push(child);
                SpawnOutcome::Detached(handle)
            }
        }
    }

    /// Collect detached children that have already exited, without blocking
    ///
    /// Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let before = self.detached.len();
        self.detached.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "Reaped command");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "Failed to poll command");
                false
            }
        });
        before - self.detached.len()
    }

    /// Detached children not yet reaped
    pub fn pending(&self) -> usize {
        self.detached.len()
    }
}
