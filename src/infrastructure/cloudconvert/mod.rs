use reqwest::StatusCode;
use thiserror::Error;

pub mod client;
pub mod types;

pub use client::CloudConvertClient;

#[derive(Debug, Error)]
pub enum CloudConvertError {
    #[error("request to CloudConvert failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CloudConvert responded {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("job response has no id")]
    MissingJobId,

    #[error("job response has no import/upload form")]
    MissingUploadTask,

    #[error("upload to presigned URL rejected with {0}")]
    UploadRejected(StatusCode),

    #[error("no finished export task found in job data")]
    MissingExportTask,

    #[error("no files found in export task result")]
    NoExportedFiles,
}
