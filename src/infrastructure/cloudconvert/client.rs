use super::types::{form_value, JobEnvelope, OP_EXPORT_URL, OP_IMPORT_UPLOAD};
use super::CloudConvertError;
use crate::config::settings::AppConfig;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Events CloudConvert is asked to deliver to the webhook.
pub const WEBHOOK_EVENTS: &[&str] = &["job.finished", "job.failed"];

#[derive(Clone)]
pub struct CloudConvertClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl CloudConvertClient {
    pub fn new(config: &AppConfig) -> Result<Self, CloudConvertError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.cloudconvert_api_url.trim_end_matches('/').to_string(),
            api_key: config.cloudconvert_api_key.clone(),
        })
    }

    /// Creates an upload -> convert -> export job, pushes the file to the
    /// presigned upload form and returns the job id.
    pub async fn create_job(
        &self,
        file_name: &str,
        input_format: &str,
        data: Bytes,
        output_format: &str,
        webhook_url: &str,
    ) -> Result<String, CloudConvertError> {
        let body = json!({
            "tasks": {
                "upload": { "operation": OP_IMPORT_UPLOAD },
                "convert": {
                    "operation": "convert",
                    "input": "upload",
                    "input_format": input_format,
                    "output_format": output_format,
                },
                "export": { "operation": OP_EXPORT_URL, "input": "convert" },
            },
            "webhook": { "url": webhook_url, "events": WEBHOOK_EVENTS },
        });

        let response = self
            .http
            .post(format!("{}/jobs", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let envelope: JobEnvelope = response.json().await?;
        let job = envelope.data;
        let job_id = job.id.clone().ok_or(CloudConvertError::MissingJobId)?;
        let form = job.upload_form()?;

        debug!("Uploading {} ({} bytes) for job {}", file_name, data.len(), job_id);

        let mut multipart = Form::new();
        for (key, value) in &form.parameters {
            multipart = multipart.text(key.clone(), form_value(value));
        }
        multipart = multipart.part("file", Part::bytes(data.to_vec()).file_name(file_name.to_string()));

        let upload = self.http.post(&form.url).multipart(multipart).send().await?;
        if !upload.status().is_success() {
            return Err(CloudConvertError::UploadRejected(upload.status()));
        }

        info!("Created CloudConvert job {} ({} -> {})", job_id, input_format, output_format);
        Ok(job_id)
    }

    /// Plain GET of a presigned download URL.
    pub async fn download(&self, url: &str) -> Result<Bytes, CloudConvertError> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CloudConvertError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CloudConvertError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::path::PathBuf;

    fn config(api_url: String) -> AppConfig {
        AppConfig {
            server_port: 3000,
            cloudconvert_api_key: "test_key".to_string(),
            cloudconvert_api_url: api_url,
            webhook_secret: "secret".to_string(),
            webhook_base_url: "http://localhost:3000".to_string(),
            max_file_size_mb: 20,
            allowed_origins: vec![],
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            http_timeout_secs: 5,
        }
    }

    fn job_response(upload_url: &str) -> String {
        json!({
            "data": {
                "id": "job_123",
                "tasks": [{
                    "operation": "import/upload",
                    "status": "waiting",
                    "result": { "form": { "url": upload_url, "parameters": { "expires": 123, "signature": "sig" } } }
                }]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn create_job_submits_and_uploads() {
        let mut server = mockito::Server::new_async().await;
        let upload_url = format!("{}/upload", server.url());

        let create = server
            .mock("POST", "/jobs")
            .match_header("authorization", "Bearer test_key")
            .match_body(Matcher::PartialJson(json!({
                "tasks": {
                    "convert": { "input_format": "docx", "output_format": "pdf" }
                },
                "webhook": { "url": "http://hook/webhook/cloudconvert" }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(job_response(&upload_url))
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/upload")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"signature\"".to_string()),
                Matcher::Regex("filename=\"report.docx\"".to_string()),
                Matcher::Regex("file-bytes".to_string()),
            ]))
            .with_status(201)
            .create_async()
            .await;

        let client = CloudConvertClient::new(&config(server.url())).unwrap();
        let job_id = client
            .create_job(
                "report.docx",
                "docx",
                Bytes::from_static(b"file-bytes"),
                "pdf",
                "http://hook/webhook/cloudconvert",
            )
            .await
            .unwrap();

        assert_eq!(job_id, "job_123");
        create.assert_async().await;
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn create_job_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/jobs")
            .with_status(401)
            .with_body(r#"{"message":"Unauthenticated."}"#)
            .create_async()
            .await;

        let client = CloudConvertClient::new(&config(server.url())).unwrap();
        let err = client
            .create_job("a.pdf", "pdf", Bytes::new(), "docx", "http://hook")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudConvertError::Status { status, .. } if status == 401));
    }

    #[tokio::test]
    async fn rejected_upload_fails_the_job() {
        let mut server = mockito::Server::new_async().await;
        let upload_url = format!("{}/upload", server.url());
        server
            .mock("POST", "/jobs")
            .with_status(201)
            .with_body(job_response(&upload_url))
            .create_async()
            .await;
        server.mock("POST", "/upload").with_status(403).create_async().await;

        let client = CloudConvertClient::new(&config(server.url())).unwrap();
        let err = client
            .create_job("a.pdf", "pdf", Bytes::new(), "docx", "http://hook")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudConvertError::UploadRejected(status) if status == 403));
    }

    #[tokio::test]
    async fn malformed_job_response_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/jobs")
            .with_status(201)
            .with_body(r#"{"data":{"id":"job_1","tasks":[]}}"#)
            .create_async()
            .await;

        let client = CloudConvertClient::new(&config(server.url())).unwrap();
        let err = client
            .create_job("a.pdf", "pdf", Bytes::new(), "docx", "http://hook")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudConvertError::MissingUploadTask));
    }

    #[tokio::test]
    async fn download_returns_body_and_rejects_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/out.pdf")
            .with_status(200)
            .with_body("%PDF-1.7")
            .create_async()
            .await;
        server.mock("GET", "/gone.pdf").with_status(404).create_async().await;

        let client = CloudConvertClient::new(&config(server.url())).unwrap();
        let bytes = client.download(&format!("{}/out.pdf", server.url())).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.7");

        assert!(client.download(&format!("{}/gone.pdf", server.url())).await.is_err());
    }
}
