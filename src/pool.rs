//! Async worker pool (§5): a fixed-size thread pool with a FIFO job queue
//! and a one-shot completion channel per submitted job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::error::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size worker pool. Jobs submitted after `shutdown` returns
/// `Error::ThreadingError` rather than silently dropping.
pub struct AsyncExecutor {
    job_tx: Sender<Job>,
    shutting_down: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl AsyncExecutor {
    /// Spawn a pool with `worker_count` threads (at least 1).
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (job_tx, job_rx) = unbounded::<Job>();
        let shutting_down = Arc::new(AtomicBool::new(false));

        let handles = (0..worker_count)
            .map(|_| {
                let job_rx: Receiver<Job> = job_rx.clone();
                std::thread::spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        job();
                    }
                })
            })
            .collect();

        tracing::debug!(worker_count, "async executor started");
        Self {
            job_tx,
            shutting_down,
            handles,
        }
    }

    /// Default pool sized to the number of logical CPUs (at least 1).
    pub fn with_default_size() -> Self {
        Self::new(std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    /// Submit `work` and get back a receiver that yields its result once a
    /// worker picks it up and runs it.
    pub fn submit<F, T>(&self, work: F) -> Result<Receiver<T>, Error>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(Error::threading_error("worker pool has shut down"));
        }
        let (reply_tx, reply_rx) = bounded(1);
        let job: Job = Box::new(move || {
            let result = work();
            let _ = reply_tx.send(result);
        });
        tracing::trace!(queue_depth = self.job_tx.len(), "submitting async job");
        self.job_tx
            .send(job)
            .map_err(|_| Error::threading_error("worker pool job queue is closed"))?;
        Ok(reply_rx)
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Stop accepting new jobs and block until every queued job drains and
    /// every worker exits.
    pub fn shutdown(self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        let worker_count = self.handles.len();
        drop(self.job_tx);
        for handle in self.handles {
            let _ = handle.join();
        }
        tracing::debug!(worker_count, "async executor shut down");
    }
}
