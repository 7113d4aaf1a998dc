//! Run-wide failure state shared by every reader task and the archiver.
//!
//! The state machine is deliberately tiny: a run starts clear and moves to
//! failed exactly once. The first error wins and is kept for the caller;
//! every later failure report is a no-op. Alongside the flag sits a
//! broadcast that wakes anything parked on a suspension point, so a dying
//! run never leaves a reader blocked on a full channel.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::error::ArchiveError;

/// One-way failure flag with an idempotent broadcast.
#[derive(Debug, Default)]
pub struct Cancellation {
    first_error: Mutex<Option<ArchiveError>>,
    token: CancellationToken,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` unless an earlier failure already holds the slot, then
    /// fire the broadcast. Safe to call from any thread, any number of
    /// times.
    pub fn fail(&self, err: ArchiveError) {
        {
            let mut slot = self.first_error.lock().unwrap();
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.token.cancel();
    }

    /// Has this run failed? All "should I keep going" checks route through
    /// here.
    pub fn is_failed(&self) -> bool {
        self.first_error.lock().unwrap().is_some()
    }

    /// Resolves once the failure broadcast has fired. Any number of tasks
    /// may wait concurrently.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Move the recorded error out during teardown. `None` means the run
    /// never failed.
    pub fn take_error(&self) -> Option<ArchiveError> {
        self.first_error.lock().unwrap().take()
    }
}
