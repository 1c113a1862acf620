//! Background sweeper for idle handles.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::factory::HandleFactory;
use crate::pool::PoolState;

/// A running reaper task.
///
/// The task only holds a weak reference to the pool state and exits on its
/// own once the pool is gone.
pub(crate) struct Reaper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Spawn a reaper that sweeps `state` every `interval`.
    pub(crate) fn spawn<F: HandleFactory>(state: Weak<PoolState<F>>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let Some(state) = state.upgrade() else {
                    break;
                };
                state.sweep_expired().await;
            }
            debug!("Reaper exited");
        });

        Self { token, handle }
    }

    /// Signal the task to exit without waiting for it.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the task has exited.
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task and wait for it to exit.
    ///
    /// Cancellation is the expected way out and is not reported.
    pub(crate) async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!(error = %e, "Reaper task failed");
            }
        }
    }
}
