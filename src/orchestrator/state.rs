//! Single-flight run state.
//!
//! ```text
//!   Idle ──try_begin──► Running { current, total } ──ticket dropped──► Idle
//!    ▲                        │
//!    └──── AlreadyRunning ◄───┘ (second try_begin while running)
//! ```

use super::RunError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Whether a capture run is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    /// No run in progress.
    Idle,
    /// A run holds the guard.
    Running {
        /// 1-based index of the capture in progress, 0 before the first.
        current: u32,
        /// Captures requested for this run.
        total: u32,
        /// When the run began.
        started_at: DateTime<Utc>,
    },
}

/// Snapshot of the run state for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    /// True while a run holds the guard.
    pub running: bool,
    /// `(current, total)` while running.
    pub progress: Option<(u32, u32)>,
    /// Whole seconds since the run began.
    pub elapsed_seconds: Option<i64>,
}

/// Shared guard allowing at most one run at a time.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct RunGuard {
    state: Arc<Mutex<RunState>>,
}

impl Default for RunGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RunGuard {
    /// Creates an idle guard.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RunState::Idle)),
        }
    }

    /// Moves Idle to Running, or fails if a run is already active.
    pub fn try_begin(&self, total: u32) -> Result<RunTicket, RunError> {
        let mut state = lock(&self.state);
        if let RunState::Running { current, total, .. } = *state {
            tracing::warn!(current, total, "Capture run already in progress; skipping");
            return Err(RunError::AlreadyRunning);
        }
        *state = RunState::Running {
            current: 0,
            total,
            started_at: Utc::now(),
        };
        tracing::debug!(total, "Capture run started");
        Ok(RunTicket {
            state: Arc::clone(&self.state),
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    /// Returns true while a run is active.
    pub fn is_running(&self) -> bool {
        matches!(self.state(), RunState::Running { .. })
    }

    /// Returns a reporting snapshot.
    pub fn status(&self) -> RunStatus {
        match self.state() {
            RunState::Idle => RunStatus {
                running: false,
                progress: None,
                elapsed_seconds: None,
            },
            RunState::Running {
                current,
                total,
                started_at,
            } => RunStatus {
                running: true,
                progress: Some((current, total)),
                elapsed_seconds: Some((Utc::now() - started_at).num_seconds()),
            },
        }
    }
}

/// Proof of holding the run guard. Dropping it returns the guard to Idle.
#[derive(Debug)]
pub struct RunTicket {
    state: Arc<Mutex<RunState>>,
}

impl RunTicket {
    /// Marks the next capture as in progress and returns its 1-based index.
    pub fn advance(&self) -> u32 {
        let mut state = lock(&self.state);
        match &mut *state {
            RunState::Running { current, .. } => {
                *current += 1;
                *current
            }
            RunState::Idle => 0,
        }
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        *lock(&self.state) = RunState::Idle;
        tracing::debug!("Capture run finished");
    }
}

fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
