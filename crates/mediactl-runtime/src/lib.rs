//! Shared async runtime and mailbox actor used by the mediactl crates.
//!
//! All controller actors, position pollers and leak-guard releases run on one
//! process-wide multi-threaded tokio runtime so they keep working regardless
//! of which runtime (if any) the caller is on.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

pub mod actor;

fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        Builder::new_multi_thread()
            .enable_all()
            .thread_name("mediactl-runtime")
            .build()
            .expect("failed to build shared tokio runtime")
    })
}

/// Spawns a future on the shared runtime.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    runtime().spawn(future)
}

/// Drives a future to completion from synchronous code.
///
/// Must not be called from inside a runtime worker thread.
pub fn block_on<F: Future>(future: F) -> F::Output {
    runtime().block_on(future)
}
