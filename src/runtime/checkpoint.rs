//! After-render checkpoint.
//!
//! The mounting layer calls [`RenderCheckpoint::settle`] once a render pass has
//! finished. Work scheduled during the pass runs then, in scheduling order.

use futures::channel::oneshot;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::runtime::lock;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Queue {
    jobs: Vec<(Option<String>, Job)>,
    waiters: Vec<oneshot::Sender<()>>,
    passes: u64,
}

/// Deferred work queue flushed at the end of every render pass.
#[derive(Clone, Default)]
pub struct RenderCheckpoint {
    queue: Arc<Mutex<Queue>>,
}

impl RenderCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `job` for the next settle.
    pub fn schedule<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        lock(&self.queue).jobs.push((None, Box::new(job)));
    }

    /// Schedules `job` unless a job with the same key is already pending.
    ///
    /// Returns `false` when the call was coalesced into the pending job.
    pub fn schedule_once<F>(&self, key: impl Into<String>, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let key = key.into();
        let mut queue = lock(&self.queue);
        if queue.jobs.iter().any(|(k, _)| k.as_deref() == Some(key.as_str())) {
            return false;
        }
        queue.jobs.push((Some(key), Box::new(job)));
        true
    }

    /// Resolves at the next settle.
    ///
    /// The waiter is registered when this is called, not when the future is
    /// first polled.
    pub fn next_settle(&self) -> impl Future<Output = ()> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        lock(&self.queue).waiters.push(tx);
        async move {
            // A dropped checkpoint never settles again.
            if rx.await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
    }

    /// Runs every pending job, then wakes settle waiters. Returns the number of jobs run.
    pub fn settle(&self) -> usize {
        let (jobs, waiters) = {
            let mut queue = lock(&self.queue);
            queue.passes += 1;
            (
                std::mem::take(&mut queue.jobs),
                std::mem::take(&mut queue.waiters),
            )
        };

        let count = jobs.len();
        for (_, job) in jobs {
            job();
        }
        for waiter in waiters {
            let _ = waiter.send(());
        }
        count
    }

    pub fn pending(&self) -> usize {
        lock(&self.queue).jobs.len()
    }

    /// Number of completed settle passes.
    pub fn passes(&self) -> u64 {
        lock(&self.queue).passes
    }
}

impl std::fmt::Debug for RenderCheckpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = lock(&self.queue);
        f.debug_struct("RenderCheckpoint")
            .field("pending", &queue.jobs.len())
            .field("waiters", &queue.waiters.len())
            .field("passes", &queue.passes)
            .finish()
    }
}
