use std::time::Duration;

/// Suspends the current task for `duration` without blocking the thread.
pub async fn sleep(duration: Duration) {
    #[cfg(target_family = "wasm")]
    {
        gloo_timers::future::sleep(duration).await;
    }
    #[cfg(not(target_family = "wasm"))]
    {
        tokio::time::sleep(duration).await;
    }
}
