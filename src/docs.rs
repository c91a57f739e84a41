use utoipa::OpenApi;
use crate::common::response::ErrorBody;
use crate::modules::jobs::dto::{RenderRequest, StatusResponse, SubmitResponse};
use crate::modules::jobs::model::JobStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::submit_render,
        crate::modules::jobs::handler::get_status,
        crate::modules::jobs::handler::download_video,
    ),
    components(
        schemas(RenderRequest, SubmitResponse, StatusResponse, JobStatus, ErrorBody)
    ),
    tags(
        (name = "Render", description = "Asynchronous video render jobs")
    )
)]
pub struct ApiDoc;
