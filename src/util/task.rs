//! Local task spawning with cancellation on drop.

use futures::future::{AbortHandle, abortable};
use std::future::Future;
#[cfg(not(target_family = "wasm"))]
use tokio::task::spawn_local as spawn;
#[cfg(target_family = "wasm")]
use wasm_bindgen_futures::spawn_local as spawn;

/// Runs `future` to completion on the current thread.
///
/// Natively this must be called from within a `tokio::task::LocalSet`.
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(not(target_family = "wasm"))]
    {
        // The JoinHandle is not needed; the task runs detached.
        let _ = spawn(future);
    }
    #[cfg(target_family = "wasm")]
    {
        spawn(future);
    }
}

/// Handle to a spawned task that is aborted when the handle is dropped.
#[derive(Debug)]
pub struct TaskHandle {
    abort: AbortHandle,
}

impl TaskHandle {
    /// Stops the task at its next suspension point. A finished task is unaffected.
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Spawns `future` on the current thread and returns a handle that cancels it.
pub fn spawn_cancellable<F>(future: F) -> TaskHandle
where
    F: Future<Output = ()> + 'static,
{
    let (future, abort) = abortable(future);
    spawn_local(async move {
        let _ = future.await;
    });
    TaskHandle { abort }
}
