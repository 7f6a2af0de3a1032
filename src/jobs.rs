//! Background job handling for the dashboard.
//!
//! Jobs run on the ambient tokio runtime; the dashboard polls them from its
//! tick loop, so all state mutation stays on the caller's logical thread.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::AbortHandle;

/// Polls a spawned task for its result
pub struct AsyncJob<T> {
    receiver: Option<oneshot::Receiver<Result<T>>>,
    abort: Option<AbortHandle>,
}

impl<T: Send + 'static> AsyncJob<T> {
    /// Spawn `fut` on the current runtime. Must be called from within a
    /// tokio context.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
        Self {
            receiver: Some(rx),
            abort: Some(handle.abort_handle()),
        }
    }
}

impl<T> AsyncJob<T> {
    /// Returns Some(result) once the job has completed, None while running
    pub fn poll(&mut self) -> Option<Result<T>> {
        let rx = self.receiver.as_mut()?;
        match rx.try_recv() {
            Ok(res) => {
                self.finish();
                Some(res)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.finish();
                Some(Err(anyhow!("Worker task disconnected")))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Abort the task and forget its result
    pub fn cancel(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
        self.receiver = None;
    }

    fn finish(&mut self) {
        self.receiver = None;
        self.abort = None;
    }
}

/// Identifies which workflow instance and which input generation a result
/// was computed for. Results whose ticket no longer matches are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub instance: u64,
    pub generation: u64,
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Process-unique id for a new workflow instance
pub fn next_instance_id() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}
