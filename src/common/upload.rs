use crate::common::error::AppError;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use std::path::Path;
use tracing::warn;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "png", "jpg", "jpeg", "mp4", "mp3"];

/// Lowercased text after the last `.`, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Checks the declared name against the allow-list and returns the extension.
pub fn validate_extension(file_name: &str) -> Result<String, AppError> {
    match extension_of(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(AppError::UnsupportedFileType(ext)),
        None => Err(AppError::UnsupportedFileType(String::new())),
    }
}

/// Final path component of a client or collaborator supplied name, so it can
/// never escape the directory it is written into.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let normalized = raw.replace('\\', "/");
    let name = Path::new(&normalized).file_name()?.to_str()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// The body limit surfaces from the multipart parser as a 413; report it as
/// the upload being too large.
pub fn multipart_error(err: MultipartError, max_mb: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded the request body limit");
        AppError::FileTooLarge { max_mb }
    } else {
        AppError::Multipart(err)
    }
}

/// Buffers a multipart field, failing as soon as it grows past `max_bytes`.
pub async fn read_limited(mut field: Field<'_>, max_bytes: u64, max_mb: u64) -> Result<Bytes, AppError> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_mb))?
    {
        if (buffer.len() + chunk.len()) as u64 > max_bytes {
            warn!("Rejecting upload larger than {} bytes", max_bytes);
            return Err(AppError::FileTooLarge { max_mb });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(validate_extension("Report.DOCX").unwrap(), "docx");
        assert_eq!(validate_extension("archive.tar.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn disallowed_or_missing_extension_is_rejected() {
        assert!(matches!(
            validate_extension("setup.exe"),
            Err(AppError::UnsupportedFileType(ext)) if ext == "exe"
        ));
        assert!(validate_extension("README").is_err());
        assert!(validate_extension("trailing.").is_err());
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd.pdf").as_deref(), Some("passwd.pdf"));
        assert_eq!(sanitize_file_name("C:\\Users\\me\\cv.docx").as_deref(), Some("cv.docx"));
        assert_eq!(sanitize_file_name("report.pdf").as_deref(), Some("report.pdf"));
    }

    #[test]
    fn sanitize_rejects_empty_names() {
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("dir/"), Some("dir".to_string()));
    }
}
