use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.cloudconvert.com/v2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub cloudconvert_api_key: String,
    pub cloudconvert_api_url: String,
    pub webhook_secret: String,
    pub webhook_base_url: String,
    pub max_file_size_mb: u64,
    pub allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            cloudconvert_api_key: required(EnvKey::CloudConvertApiKey)?,
            cloudconvert_api_url: env::get_or(EnvKey::CloudConvertApiUrl, DEFAULT_API_URL),
            webhook_secret: required(EnvKey::WebhookSecret)?,
            webhook_base_url: env::get_or(EnvKey::WebhookBaseUrl, "http://localhost:3000"),
            max_file_size_mb: env::get_parsed(EnvKey::MaxFileSizeMb, 20),
            allowed_origins: env::get_list(EnvKey::AllowedOrigins, "http://localhost:3000"),
            upload_dir: PathBuf::from(env::get_or(EnvKey::UploadDir, "uploads")),
            output_dir: PathBuf::from(env::get_or(EnvKey::OutputDir, "outputs")),
            http_timeout_secs: env::get_parsed(EnvKey::HttpTimeoutSecs, 60),
        })
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Callback URL handed to CloudConvert when a job is created.
    pub fn webhook_url(&self) -> String {
        format!(
            "{}/webhook/cloudconvert",
            self.webhook_base_url.trim_end_matches('/')
        )
    }
}

fn required(key: EnvKey) -> Result<String, ConfigError> {
    let name = key.as_str();
    match env::get(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ConfigError::Missing(name)),
    }
}
