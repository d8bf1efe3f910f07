//! Single-resolution signals.
//!
//! A [`Deferred`] resolves at most once. Every clone observes the same value and
//! waiters registered before or after resolution receive it.

use futures::channel::oneshot;
use futures::future::{self, FutureExt, Shared};

use crate::runtime::lock;
use std::sync::{Arc, Mutex};

/// A one-shot, shareable readiness value.
pub struct Deferred<T: Clone> {
    sender: Arc<Mutex<Option<oneshot::Sender<T>>>>,
    receiver: Shared<oneshot::Receiver<T>>,
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
        }
    }
}

impl<T: Clone> Deferred<T> {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            receiver: rx.shared(),
        }
    }

    /// Resolves the signal. Returns `false` if it was already resolved.
    pub fn resolve(&self, value: T) -> bool {
        match lock(&self.sender).take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        lock(&self.sender).is_none()
    }

    /// Whether both handles refer to the same signal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.sender, &other.sender)
    }

    /// Current value, if resolved.
    pub fn peek(&self) -> Option<T> {
        self.receiver.clone().now_or_never().and_then(|r| r.ok())
    }

    /// Waits for resolution. A signal whose resolver is gone stays pending forever.
    pub async fn wait(&self) -> T {
        match self.receiver.clone().await {
            Ok(value) => value,
            Err(_) => future::pending::<T>().await,
        }
    }
}

impl<T: Clone> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
