use super::dto::{ConvertResponse, ProgressResponse, WebhookAck};
use super::events::{EventKind, WebhookEvent};
use super::model::{Job, JobStatus};
use super::repository::Transition;
use crate::common::error::AppError;
use crate::common::security::verify_signature;
use crate::common::upload::sanitize_file_name;
use crate::infrastructure::cloudconvert::types::JobData;
use crate::infrastructure::storage::local::StorageService;
use crate::state::AppState;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A validated upload, ready to be stored and submitted.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub extension: String,
    pub data: Bytes,
}

pub struct ConversionService;

impl ConversionService {
    pub async fn create_job(
        state: AppState,
        upload: UploadedFile,
        output_format: &str,
    ) -> Result<ConvertResponse, AppError> {
        let input_path = state.storage.save_input(&upload.file_name, &upload.data).await?;
        info!("Stored upload {} ({} bytes)", input_path.display(), upload.data.len());

        let job_id = state
            .converter
            .create_job(
                &upload.file_name,
                &upload.extension,
                upload.data,
                output_format,
                &state.config.webhook_url(),
            )
            .await?;

        state.jobs.insert(Job::new(job_id.clone(), upload.file_name)).await;
        debug!("Registered job {} ({} tracked)", job_id, state.jobs.len().await);

        Ok(ConvertResponse {
            job_id,
            status: JobStatus::Processing,
        })
    }

    pub async fn get_progress(state: AppState, job_id: &str) -> Result<ProgressResponse, AppError> {
        state
            .jobs
            .find_by_id(job_id)
            .await
            .map(ProgressResponse::from)
            .ok_or(AppError::JobNotFound)
    }

    /// Authenticates a delivery and applies it. Once the signature checks
    /// out the answer is always an acknowledgement, whatever the payload.
    pub async fn handle_webhook(
        state: AppState,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookAck, AppError> {
        let signed = verify_signature(body, signature, &state.config.webhook_secret)?;
        debug!("Verified webhook signature (t={:?})", signed.timestamp);

        let event: WebhookEvent = match serde_json::from_slice(body) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring signed webhook with unparseable body: {}", e);
                return Ok(WebhookAck::ok());
            }
        };

        let Some(job_id) = event.job_id() else {
            info!("Ignoring webhook '{}' without a job id", event.event);
            return Ok(WebhookAck::ok());
        };

        let Some(job) = state.jobs.find_by_id(job_id).await else {
            warn!("Received webhook for unknown job: {}", job_id);
            return Ok(WebhookAck::ok());
        };

        match event.kind() {
            EventKind::JobFinished => {
                if job.status.is_terminal() {
                    warn!("Job {} already {}, ignoring job.finished", job_id, job.status);
                    return Ok(WebhookAck::ok());
                }

                let payload = event.job.clone().unwrap_or_default();
                let transition = match Self::fetch_output(&state, job_id, &payload).await {
                    Ok(path) => {
                        info!("Job {} finished, output at {}", job_id, path.display());
                        state.jobs.finish(job_id, path).await
                    }
                    Err(e) => {
                        warn!("Job {} output download failed: {:#}", job_id, e);
                        state.jobs.fail(job_id, format!("Download failed: {e:#}")).await
                    }
                };
                log_ignored(job_id, transition);
            }
            EventKind::JobFailed => {
                let message = event.failure_message();
                warn!("Job {} failed: {}", job_id, message);
                log_ignored(job_id, state.jobs.fail(job_id, message).await);
            }
            EventKind::Other => {
                if let Some(progress) = event.progress() {
                    state.jobs.advance(job_id, progress).await;
                }
            }
        }

        Ok(WebhookAck::ok())
    }

    /// Path of a finished job's output, provided it is still on disk.
    pub async fn output_path(state: AppState, job_id: &str) -> Result<PathBuf, AppError> {
        let job = state.jobs.find_by_id(job_id).await.ok_or(AppError::JobNotFound)?;
        if job.status != JobStatus::Finished {
            return Err(AppError::FileNotReady);
        }

        let path = job.output.ok_or(AppError::FileNotReady)?;
        if !StorageService::is_file(&path).await {
            warn!("Output for job {} missing from disk: {}", job_id, path.display());
            return Err(AppError::OutputMissing);
        }
        Ok(path)
    }

    async fn fetch_output(state: &AppState, job_id: &str, job: &JobData) -> Result<PathBuf> {
        let job_dir = sanitize_file_name(job_id)
            .filter(|dir| dir == job_id)
            .ok_or_else(|| anyhow!("job id {:?} is not usable as a directory name", job_id))?;
        let exported = job.exported_file()?;
        let file_name = sanitize_file_name(&exported.filename)
            .ok_or_else(|| anyhow!("invalid output filename {:?}", exported.filename))?;

        let data = state.converter.download(&exported.url).await?;
        let path = state.storage.save_output(&job_dir, &file_name, &data).await?;
        Ok(path)
    }
}

fn log_ignored(job_id: &str, transition: Transition) {
    if transition == Transition::Ignored {
        warn!("Job {} already terminal, transition ignored", job_id);
    }
}
