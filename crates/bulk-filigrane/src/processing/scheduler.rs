//! Batch scheduler: turns input files into jobs and runs them on a worker pool

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

use super::job::{JobContext, WatermarkJob};
use super::poll::{Clock, PollPolicy, TokioClock};
use super::pool::{WorkerPool, DEFAULT_WORKERS};
use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::providers::WatermarkService;
use crate::report::BatchReport;
use crate::types::InputFile;

/// How input files are grouped into jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMode {
    /// All files in one request, producing one combined document
    Aggregate { output_path: PathBuf },
    /// One request per file, each written under `output_dir` with its input name
    PerFile { output_dir: PathBuf },
}

/// Completed vs total jobs, reported after every outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Dispatches jobs and collects their outcomes
pub struct Scheduler {
    service: Arc<dyn WatermarkService>,
    poll: PollPolicy,
    clock: Arc<dyn Clock>,
    workers: usize,
}

impl Scheduler {
    pub fn new(service: Arc<dyn WatermarkService>) -> Self {
        Self {
            service,
            poll: PollPolicy::default(),
            clock: Arc::new(TokioClock),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Scheduler with worker count and polling taken from config
    pub fn from_config(service: Arc<dyn WatermarkService>, config: &ProcessingConfig) -> Self {
        Self::new(service)
            .with_workers(config.workers)
            .with_poll_policy(config.poll_policy())
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the jobs for a batch. An empty file list yields no jobs.
    pub fn plan(
        files: Vec<InputFile>,
        watermark: &str,
        mode: &DispatchMode,
    ) -> Result<Vec<WatermarkJob>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let watermark: Arc<str> = Arc::from(watermark);

        match mode {
            DispatchMode::Aggregate { output_path } => Ok(vec![WatermarkJob::new(
                files,
                watermark,
                output_path.clone(),
            )?]),
            DispatchMode::PerFile { output_dir } => files
                .into_iter()
                .map(|file| {
                    let output_path = output_dir.join(file.file_name());
                    WatermarkJob::new(vec![file], watermark.clone(), output_path)
                })
                .collect(),
        }
    }

    /// Run a batch and wait for every job to finish
    pub async fn run(
        &self,
        files: Vec<InputFile>,
        watermark: &str,
        mode: &DispatchMode,
    ) -> Result<BatchReport> {
        self.run_with_progress(files, watermark, mode, |_| {}).await
    }

    /// Run a batch, calling `progress` after each job reaches a terminal state
    pub async fn run_with_progress<F>(
        &self,
        files: Vec<InputFile>,
        watermark: &str,
        mode: &DispatchMode,
        mut progress: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(Progress),
    {
        let started_at = Utc::now();
        let jobs = Self::plan(files, watermark, mode)?;

        let pool = match mode {
            DispatchMode::Aggregate { .. } => WorkerPool::new(1),
            DispatchMode::PerFile { .. } => WorkerPool::new(self.workers),
        };

        tracing::info!(
            "Dispatching {} job(s) to {} on {} worker(s)",
            jobs.len(),
            self.service.name(),
            pool.size()
        );

        let ctx = Arc::new(JobContext {
            service: self.service.clone(),
            poll: self.poll,
            clock: self.clock.clone(),
        });

        let outcomes = pool
            .run(jobs, ctx, |_, completed, total| {
                progress(Progress { completed, total })
            })
            .await;

        let report = BatchReport::new(outcomes, started_at);
        tracing::info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }
}
