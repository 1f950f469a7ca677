use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    CloudConvertApiKey,
    CloudConvertApiUrl,
    WebhookSecret,
    WebhookBaseUrl,
    MaxFileSizeMb,
    AllowedOrigins,
    UploadDir,
    OutputDir,
    HttpTimeoutSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::CloudConvertApiKey => "CLOUDCONVERT_API_KEY",
            EnvKey::CloudConvertApiUrl => "CLOUDCONVERT_API_URL",
            EnvKey::WebhookSecret => "WEBHOOK_SECRET",
            EnvKey::WebhookBaseUrl => "WEBHOOK_BASE_URL",
            EnvKey::MaxFileSizeMb => "MAX_FILE_SIZE_MB",
            EnvKey::AllowedOrigins => "ALLOWED_ORIGINS",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::OutputDir => "OUTPUT_DIR",
            EnvKey::HttpTimeoutSecs => "HTTP_TIMEOUT_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Comma-separated list, blank entries dropped.
pub fn get_list(key: EnvKey, default: &str) -> Vec<String> {
    get_or(key, default)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
