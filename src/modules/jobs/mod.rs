use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod service;
pub mod store;

pub fn router() -> axum::Router<AppState> {
    Router::new()
        .route("/render", post(handler::submit_render))
        .route("/status/{job_id}", get(handler::get_status))
        .route("/download/{job_id}", get(handler::download_video))
}
