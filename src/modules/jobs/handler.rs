use super::dto::{RenderRequest, StatusResponse, SubmitResponse};
use super::service::JobService;
use crate::common::response::{ApiError, ApiSuccess, ErrorBody};
use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

pub const DOWNLOAD_FILENAME: &str = "video.mp4";
const NOT_READY: &str = "File not ready";

/// Submit a render job
#[utoipa::path(
    post,
    path = "/render",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Job accepted", body = SubmitResponse),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Job could not be dispatched", body = ErrorBody)
    ),
    tag = "Render"
)]
pub async fn submit_render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> impl IntoResponse {
    match JobService::submit(state, req).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => {
            error!("Failed to submit render job: {}", e);
            ApiError::internal(e.to_string()).into_response()
        }
    }
}

/// Poll job status
#[utoipa::path(
    get,
    path = "/status/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID returned by /render")
    ),
    responses(
        (status = 200, description = "Current job status", body = StatusResponse),
        (status = 404, description = "Unknown or expired job", body = ErrorBody)
    ),
    tag = "Render"
)]
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match JobService::status(state, &job_id).await {
        Some(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        None => ApiError::not_found().into_response(),
    }
}

/// Download the rendered video
#[utoipa::path(
    get,
    path = "/download/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID returned by /render")
    ),
    responses(
        (status = 200, description = "Rendered video", body = Vec<u8>, content_type = "video/mp4"),
        (status = 404, description = "Unknown job or video not ready", body = String, content_type = "text/plain")
    ),
    tag = "Render"
)]
pub async fn download_video(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let Some(path) = JobService::completed_output(state, &job_id).await else {
        return not_ready();
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) => {
            warn!(%job_id, "Completed video {} unavailable: {}", path.display(), e);
            return not_ready();
        }
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
        );

    if let Ok(meta) = file.metadata().await {
        builder = builder.header(header::CONTENT_LENGTH, meta.len());
    }

    let body = Body::from_stream(ReaderStream::new(file));

    builder
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn not_ready() -> Response {
    (StatusCode::NOT_FOUND, NOT_READY).into_response()
}
