use crate::infrastructure::cloudconvert::types::{JobData, TaskData};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    JobFinished,
    JobFailed,
    Other,
}

/// Body of a CloudConvert webhook delivery. Job events carry `job`, task
/// events carry `task`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub job: Option<JobData>,
    #[serde(default)]
    pub task: Option<TaskData>,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        match self.event.as_str() {
            "job.finished" => EventKind::JobFinished,
            "job.failed" => EventKind::JobFailed,
            _ => EventKind::Other,
        }
    }

    /// Id of the job the delivery concerns. Task events only name it
    /// through `task.job_id`.
    pub fn job_id(&self) -> Option<&str> {
        self.job
            .as_ref()
            .and_then(|job| job.id.as_deref())
            .or_else(|| self.task.as_ref().and_then(|task| task.job_id.as_deref()))
            .filter(|id| !id.is_empty())
    }

    pub fn failure_message(&self) -> String {
        self.job
            .as_ref()
            .and_then(|job| job.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    /// Percentage reported by the delivery, if any: the job's own progress
    /// first, then the percent of the task that triggered the event.
    pub fn progress(&self) -> Option<u8> {
        let raw = self
            .job
            .as_ref()
            .and_then(|job| job.progress)
            .or_else(|| self.task.as_ref().and_then(|task| task.percent))?;

        if !raw.is_finite() {
            return None;
        }
        Some(raw.clamp(0.0, 100.0).round() as u8)
    }
}
