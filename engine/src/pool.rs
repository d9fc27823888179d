//! Fixed-size worker pool consuming a shared task queue.

use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error)]
pub enum WorkQueueError {
    #[error("work queue has been shut down")]
    ShutDown,
    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
}

#[derive(Default)]
struct QueueState {
    tasks: VecDeque<Job>,
    /// Tasks enqueued but not yet completed (queued plus running).
    pending: usize,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
    idle: Condvar,
}

pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkQueue {
    pub const DEFAULT_THREADS: usize = 5;

    /// Starts `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, WorkQueueError> {
        let size = threads.max(1);
        let shared = Arc::new(Shared::default());
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || run_worker(&worker_shared));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    // let the workers that did start exit
                    drop(Self { shared, workers: Mutex::new(workers), size });
                    return Err(err.into());
                }
            }
        }
        tracing::debug!(threads = size, "work queue started");
        Ok(Self { shared, workers: Mutex::new(workers), size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Enqueues a task without waiting for it to run.
    pub fn execute<F>(&self, task: F) -> Result<(), WorkQueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(WorkQueueError::ShutDown);
        }
        state.pending += 1;
        state.tasks.push_back(Box::new(task));
        drop(state);
        self.shared.available.notify_one();
        Ok(())
    }

    /// Blocks until every task submitted so far, including tasks those tasks
    /// submit, has completed. Workers keep running. Must not be called from a task.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Tasks submitted but not yet completed.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending
    }

    /// Drains the queue, then stops and joins every worker. Further calls to
    /// [`execute`](Self::execute) fail with [`WorkQueueError::ShutDown`].
    pub fn join(&self) {
        self.finish();
        self.signal_shutdown();
        let workers = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if handle.join().is_err() {
                tracing::warn!("worker thread exited abnormally");
            }
        }
        tracing::debug!("work queue joined");
    }

    pub fn shutdown(&self) {
        self.join();
    }

    fn signal_shutdown(&self) {
        self.shared.state.lock().shutdown = true;
        self.shared.available.notify_all();
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        // Workers finish whatever is still queued before they exit.
        self.signal_shutdown();
    }
}

fn run_worker(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                if let Some(job) = state.tasks.pop_front() {
                    break job;
                }
                if state.shutdown {
                    return;
                }
                shared.available.wait(&mut state);
            }
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            tracing::warn!(reason = panic_message(payload.as_ref()), "task panicked");
        }

        let mut state = shared.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            shared.idle.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
