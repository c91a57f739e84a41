use axum::Router;
use axum::extract::DefaultBodyLimit;
use crate::state::AppState;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    // Request logs at INFO so the default filter keeps them.
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    crate::routes::configure_routes()
        .layer(
            ServiceBuilder::new()
                .layer(trace)
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .with_state(state)
}
