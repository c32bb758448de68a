//! Visible sync status with a cancellable auto-reset after success.

use crate::error::Recoverable;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// What the status indicator currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Synced { url: String },
    AwaitingDecision(Recoverable),
    Failed(String),
}

type Sink = dyn Fn(&SyncStatus) + Send + Sync;

struct State {
    status: SyncStatus,
    /// Bumped on every transition; a scheduled reset only fires if it still matches.
    generation: u64,
    pending_reset: Option<JoinHandle<()>>,
}

/// Owns the visible status and the timer that puts it back to idle.
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct StatusIndicator {
    state: Arc<Mutex<State>>,
    sink: Arc<Sink>,
    reset_after: Duration,
}

impl StatusIndicator {
    /// `sink` is called with every new status.
    pub fn new(
        reset_after: Duration,
        sink: impl Fn(&SyncStatus) + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                status: SyncStatus::Idle,
                generation: 0,
                pending_reset: None,
            })),
            sink: Arc::new(sink),
            reset_after,
        }
    }

    /// Indicator that renders nothing.
    pub fn silent(reset_after: Duration) -> Self {
        Self::new(reset_after, |_| {})
    }

    pub fn current(&self) -> SyncStatus {
        self.state.lock().status.clone()
    }

    /// Move to `status`, cancelling any pending reset.
    ///
    /// `Synced` schedules a reset to `Idle` after the configured delay.
    pub fn set(&self, status: SyncStatus) {
        let schedule = matches!(status, SyncStatus::Synced { .. });
        let generation = {
            let mut state = self.state.lock();
            if let Some(handle) = state.pending_reset.take() {
                handle.abort();
            }
            state.generation += 1;
            state.status = status.clone();
            state.generation
        };
        (self.sink)(&status);

        if schedule {
            let this = self.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(this.reset_after).await;
                this.reset_if_current(generation);
            });
            let mut state = self.state.lock();
            if state.generation == generation {
                state.pending_reset = Some(handle);
            } else {
                handle.abort();
            }
        }
    }

    /// Back to idle right away.
    pub fn reset(&self) {
        self.set(SyncStatus::Idle);
    }

    fn reset_if_current(&self, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!("[Status] Stale reset skipped");
                return;
            }
            state.generation += 1;
            state.status = SyncStatus::Idle;
            state.pending_reset = None;
        }
        (self.sink)(&SyncStatus::Idle);
    }
}
