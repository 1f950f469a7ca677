use super::model::{Job, JobStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

pub const DEFAULT_OUTPUT_FORMAT: &str = "pdf";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    /// Target format, e.g. `pdf` or `docx`. A multipart `output_format` field
    /// takes precedence.
    pub output_format: Option<String>,
}

#[derive(Debug, Validate)]
pub struct ConvertOptions {
    #[validate(length(min = 1, max = 16), custom(function = "validate_format"))]
    pub output_format: String,
}

fn validate_format(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("output_format"))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    pub job_id: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Job> for ProgressResponse {
    fn from(job: Job) -> Self {
        Self {
            status: job.status,
            progress: job.progress,
            message: job.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub ok: bool,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
