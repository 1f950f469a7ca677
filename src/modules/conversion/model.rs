use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Finished,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Processing => "processing",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One conversion tracked from submission to its terminal outcome.
///
/// State only moves forward: `processing` to exactly one of `finished` or
/// `failed`. The transition methods return `false` and leave the record
/// untouched when the job is already terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub filename: String,
    pub output: Option<PathBuf>,
    pub message: Option<String>,
}

impl Job {
    pub fn new(id: String, filename: String) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            progress: 0,
            filename,
            output: None,
            message: None,
        }
    }

    pub fn finish(&mut self, output: PathBuf) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Finished;
        self.progress = 100;
        self.output = Some(output);
        true
    }

    pub fn fail(&mut self, message: String) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.progress = 100;
        self.message = Some(message);
        true
    }

    /// Raises progress; lower values and updates on terminal jobs are ignored.
    pub fn advance(&mut self, progress: u8) -> bool {
        let progress = progress.min(100);
        if self.status.is_terminal() || progress <= self.progress {
            return false;
        }
        self.progress = progress;
        true
    }
}
