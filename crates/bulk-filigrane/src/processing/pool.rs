//! Fixed-size worker pool
//!
//! Jobs sit in a shared queue; `size` workers pop one job at a time and keep it until it
//! reaches a terminal state, so at most `size` jobs are ever active. Each job runs in its
//! own task: a panic is caught at the task boundary and recorded as a failed outcome
//! instead of taking the worker or the batch down.

use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;

use super::job::{JobContext, WatermarkJob};
use crate::error::Error;
use crate::types::JobOutcome;

/// Default number of concurrent workers in per-file mode
pub const DEFAULT_WORKERS: usize = 8;

/// Bounded set of workers draining a job queue
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// Create a pool; a size of zero is raised to one
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run every job and return one outcome per job, in completion order.
    ///
    /// `on_outcome` is called after each outcome with `(outcome, completed, total)`.
    pub async fn run<F>(
        &self,
        jobs: Vec<WatermarkJob>,
        ctx: Arc<JobContext>,
        mut on_outcome: F,
    ) -> Vec<JobOutcome>
    where
        F: FnMut(&JobOutcome, usize, usize),
    {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let workers = self.size.min(total);

        tracing::debug!("Starting {} worker(s) for {} job(s)", workers, total);

        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let queue = queue.clone();
                let ctx = ctx.clone();
                let tx = tx.clone();

                tokio::spawn(async move {
                    loop {
                        let next = queue.lock().pop_front();
                        let Some(job) = next else { break };

                        let outcome = run_isolated(job, ctx.clone()).await;
                        if tx.send(outcome).is_err() {
                            break;
                        }
                    }
                    tracing::trace!("Worker {} finished", worker_id);
                })
            })
            .collect();

        // Only the workers hold senders now; the channel closes when the last one exits
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
            if let Some(last) = outcomes.last() {
                on_outcome(last, outcomes.len(), total);
            }
        }

        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!("Worker task ended abnormally: {}", e);
            }
        }

        // Jobs left behind by a worker that died outside a job
        let stranded: Vec<WatermarkJob> = queue.lock().drain(..).collect();
        for job in stranded {
            let outcome = JobOutcome::failed(
                job.file_names(),
                Error::worker("no worker left to run the job").to_string(),
            );
            outcomes.push(outcome);
            if let Some(last) = outcomes.last() {
                on_outcome(last, outcomes.len(), total);
            }
        }

        outcomes
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

/// Run one job in its own task so a panic becomes an outcome
async fn run_isolated(job: WatermarkJob, ctx: Arc<JobContext>) -> JobOutcome {
    let file_names = job.file_names();
    let job_id = job.id();

    match tokio::spawn(async move { job.run(&ctx).await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let detail = join_error_detail(e);
            tracing::error!("Job {} escaped its own error handling: {}", job_id, detail);
            JobOutcome::failed(file_names, Error::worker(detail).to_string())
        }
    }
}

fn join_error_detail(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }

    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("job panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("job panicked: {}", msg)
    } else {
        "job panicked".to_string()
    }
}
