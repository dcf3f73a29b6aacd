//! Timers and background tasks for the dispatcher.
//!
//! Natively these run on tokio. In the browser there is no tokio runtime, so
//! timers come from `setTimeout` and tasks run on the page's microtask queue.

use std::future::Future;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Runs `task` to completion without anyone awaiting it.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_detached<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(task);
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_detached<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
}
