use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod events;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;


/// Room for multipart boundaries and the small text fields around the file.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn router(state: AppState) -> axum::Router<AppState> {
    let upload_limit = usize::try_from(
        state
            .config
            .max_upload_bytes()
            .saturating_add(MULTIPART_OVERHEAD),
    )
    .unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/convert",
            post(handler::convert).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/progress/{job_id}", get(handler::get_progress))
        .route("/webhook/cloudconvert", post(handler::cloudconvert_webhook))
        .route("/download/{job_id}", get(handler::download))
}
