use super::dto::{
    ConvertOptions, ConvertQuery, ConvertResponse, ProgressResponse, WebhookAck,
    DEFAULT_OUTPUT_FORMAT,
};
use super::service::{ConversionService, UploadedFile};
use crate::common::error::AppError;
use crate::common::response::ApiSuccess;
use crate::common::security::SIGNATURE_HEADER;
use crate::common::upload::{multipart_error, read_limited, sanitize_file_name, validate_extension};
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::info;
use validator::Validate;

/// Upload a file and start a conversion
#[utoipa::path(
    post,
    path = "/convert",
    params(ConvertQuery),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Conversion started", body = ConvertResponse),
        (status = 400, description = "Unsupported file type or file too large"),
        (status = 500, description = "Conversion job could not be created")
    ),
    tag = "Conversion"
)]
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
    multipart: Multipart,
) -> impl IntoResponse {
    let (upload, output_format) = match read_convert_form(&state, query, multipart).await {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };

    match ConversionService::create_job(state, upload, &output_format).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Walks the form. The extension is checked as soon as the file part's
/// header is seen and the size while it streams, so nothing invalid is ever
/// written or sent upstream.
async fn read_convert_form(
    state: &AppState,
    query: ConvertQuery,
    mut multipart: Multipart,
) -> Result<(UploadedFile, String), AppError> {
    let mut upload = None;
    let mut output_format = query.output_format;
    let max_mb = state.config.max_file_size_mb;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_mb))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let declared = field.file_name().ok_or(AppError::MissingFile)?.to_string();
                let file_name = sanitize_file_name(&declared)
                    .ok_or_else(|| AppError::UnsupportedFileType(String::new()))?;
                let extension = validate_extension(&file_name)?;

                let data = read_limited(field, state.config.max_upload_bytes(), max_mb).await?;

                info!("Received upload {} ({} bytes)", file_name, data.len());
                upload = Some(UploadedFile { file_name, extension, data });
            }
            "output_format" => {
                let text = field.text().await.map_err(|e| multipart_error(e, max_mb))?;
                output_format = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(AppError::MissingFile)?;

    let options = ConvertOptions {
        output_format: output_format
            .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string())
            .to_ascii_lowercase(),
    };
    options
        .validate()
        .map_err(|_| AppError::InvalidRequest("output_format must be 1-16 letters or digits".to_string()))?;

    Ok((upload, options.output_format))
}

/// Current state of a conversion job
#[utoipa::path(
    get,
    path = "/progress/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID issued by /convert")
    ),
    responses(
        (status = 200, description = "Job state", body = ProgressResponse),
        (status = 404, description = "Job not found")
    ),
    tag = "Conversion"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match ConversionService::get_progress(state, &job_id).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

/// CloudConvert callback
/// The body is verified byte-for-byte against the signature header before
/// it is parsed.
#[utoipa::path(
    post,
    path = "/webhook/cloudconvert",
    params(
        ("CloudConvert-Signature" = String, Header, description = "t=<timestamp>,v1=<hex hmac-sha256>")
    ),
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAck),
        (status = 403, description = "Signature missing or invalid")
    ),
    tag = "Conversion"
)]
pub async fn cloudconvert_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match ConversionService::handle_webhook(state, signature, &body).await {
        Ok(ack) => ApiSuccess(ack, StatusCode::OK).into_response(),
        Err(e) => {
            tracing::warn!("Rejected webhook delivery: {}", e);
            e.into_response()
        }
    }
}

/// Download a converted file
#[utoipa::path(
    get,
    path = "/download/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID issued by /convert")
    ),
    responses(
        (status = 200, description = "Converted file", body = Vec<u8>),
        (status = 404, description = "Job unknown, not finished, or file missing")
    ),
    tag = "Conversion"
)]
pub async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let path = match ConversionService::output_path(state, &job_id).await {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    // The file can vanish between the check and the open.
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => return AppError::OutputMissing.into_response(),
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download")
        .replace('"', "");
    let content_type = mime_guess::from_path(&path)
        .first()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
        .to_string();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        );

    if let Ok(meta) = file.metadata().await {
        builder = builder.header(header::CONTENT_LENGTH, meta.len());
    }

    let body = Body::from_stream(ReaderStream::new(file));

    builder
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
