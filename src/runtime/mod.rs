//! Cooperative scheduling primitives shared by every host.

pub mod checkpoint;
pub mod deferred;

pub use checkpoint::RenderCheckpoint;
pub use deferred::Deferred;

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawns a future on the ambient tokio runtime.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    log::trace!("spawning host task");
    tokio::spawn(future)
}
