//! A single watermarking job: upload, poll, download

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::poll::{poll_until_ready, Clock, PollPolicy};
use crate::error::{Error, Result};
use crate::providers::WatermarkService;
use crate::types::{InputFile, JobOutcome};

/// Job lifecycle. Each active state is entered at most once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Uploading,
    Polling,
    Downloading,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Created => write!(f, "created"),
            JobState::Uploading => write!(f, "uploading"),
            JobState::Polling => write!(f, "polling"),
            JobState::Downloading => write!(f, "downloading"),
            JobState::Succeeded => write!(f, "succeeded"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Everything a job needs from its surroundings. Shared read-only between workers.
pub struct JobContext {
    pub service: Arc<dyn WatermarkService>,
    pub poll: PollPolicy,
    pub clock: Arc<dyn Clock>,
}

/// One remote request: input files, watermark text and where to put the result
#[derive(Debug, Clone)]
pub struct WatermarkJob {
    id: Uuid,
    input_files: Vec<InputFile>,
    watermark: Arc<str>,
    output_path: PathBuf,
}

impl WatermarkJob {
    pub fn new(
        input_files: Vec<InputFile>,
        watermark: Arc<str>,
        output_path: PathBuf,
    ) -> Result<Self> {
        if input_files.is_empty() {
            return Err(Error::EmptyJob);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            input_files,
            watermark,
            output_path,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn file_names(&self) -> Vec<String> {
        self.input_files.iter().map(InputFile::file_name).collect()
    }

    /// Run the job to completion. Every failure ends up in the returned outcome.
    pub async fn run(self, ctx: &JobContext) -> JobOutcome {
        let file_names = self.file_names();
        let mut state = JobState::Created;

        match self.execute(ctx, &mut state).await {
            Ok(()) => {
                tracing::info!(
                    "Job {} succeeded: {} -> {}",
                    self.id,
                    file_names.join(","),
                    self.output_path.display()
                );
                JobOutcome::succeeded(file_names, &self.output_path)
            }
            Err(e) => {
                let failed_in = state;
                self.advance(&mut state, JobState::Failed);
                tracing::warn!(
                    "Job {} failed while {}: {} ({:?})",
                    self.id,
                    failed_in,
                    e,
                    e
                );
                JobOutcome::failed(file_names, e.to_string())
            }
        }
    }

    async fn execute(&self, ctx: &JobContext, state: &mut JobState) -> Result<()> {
        self.advance(state, JobState::Uploading);
        let token = ctx
            .service
            .submit(&self.input_files, &self.watermark)
            .await
            .map_err(|e| match e {
                Error::Upload(_) => e,
                other => Error::upload(other.to_string()),
            })?;

        self.advance(state, JobState::Polling);
        let url = poll_until_ready(ctx.service.as_ref(), &token, &ctx.poll, ctx.clock.as_ref())
            .await?;
        tracing::debug!("Job {} result available at {}", self.id, url);

        self.advance(state, JobState::Downloading);
        let document = ctx.service.fetch_result(&token).await.map_err(|e| match e {
            Error::Download(_) => e,
            other => Error::download(other.to_string()),
        })?;

        write_output(&self.output_path, &document).await?;
        self.advance(state, JobState::Succeeded);
        Ok(())
    }

    fn advance(&self, state: &mut JobState, next: JobState) {
        tracing::debug!("Job {}: {} -> {}", self.id, state, next);
        *state = next;
    }
}

/// Write the document, replacing any previous file at that path.
/// A failed write counts as a failed download.
async fn write_output(path: &Path, document: &[u8]) -> Result<()> {
    tokio::fs::write(path, document)
        .await
        .map_err(|e| Error::download(format!("cannot write {}: {}", path.display(), e)))
}
