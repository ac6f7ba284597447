//! Batch report handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::JobOutcome;

/// All outcomes of one batch, as produced by the jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Outcomes in completion order
    pub outcomes: Vec<JobOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Wrap outcomes without altering them; `finished_at` is now
    pub fn new(outcomes: Vec<JobOutcome>, started_at: DateTime<Utc>) -> Self {
        Self {
            outcomes,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// One display line per outcome
    pub fn lines(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
