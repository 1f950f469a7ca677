use utoipa::OpenApi;
use crate::modules::conversion::dto::{ConvertResponse, ProgressResponse, WebhookAck};
use crate::modules::conversion::model::JobStatus;

#[derive(OpenApi)]
#[openapi(
    info(title = "Real-Time File Converter API"),
    paths(
        crate::modules::conversion::handler::convert,
        crate::modules::conversion::handler::get_progress,
        crate::modules::conversion::handler::cloudconvert_webhook,
        crate::modules::conversion::handler::download,
    ),
    components(
        schemas(ConvertResponse, ProgressResponse, WebhookAck, JobStatus)
    ),
    tags(
        (name = "Conversion", description = "File upload, job progress and converted downloads")
    )
)]
pub struct ApiDoc;
