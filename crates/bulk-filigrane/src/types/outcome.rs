//! Per-job outcome

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Terminal result of one job. Exactly one is produced per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Names of the input files, in upload order
    pub file_names: Vec<String>,
    pub success: bool,
    /// Output path on success, failure reason otherwise
    pub message: String,
}

impl JobOutcome {
    pub fn succeeded(file_names: Vec<String>, output_path: &Path) -> Self {
        Self {
            file_names,
            success: true,
            message: output_path.display().to_string(),
        }
    }

    pub fn failed(file_names: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            file_names,
            success: false,
            message: message.into(),
        }
    }

    /// Comma-joined file names, `???` when none are known
    pub fn label(&self) -> String {
        if self.file_names.is_empty() {
            "???".to_string()
        } else {
            self.file_names.join(",")
        }
    }
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = if self.success { "✅" } else { "❌" };
        write!(f, "{} {}: {}", icon, self.label(), self.message)
    }
}
