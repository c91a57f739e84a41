use dotenvy::dotenv;
use render_server::config::settings::{AppConfig, DEFAULT_LOG_FILTER};
use render_server::infrastructure::renderer::CommandRenderer;
use render_server::state::AppState;
use render_server::workers::reclaimer::Reclaimer;
use render_server::{app, lifecycle};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    lifecycle::install_panic_hook();

    info!("Starting render server...");

    let config = AppConfig::new();
    lifecycle::prepare_work_dir(&config.temp_dir).await;

    let Some(renderer) = CommandRenderer::from_command_line(&config.render_command) else {
        error!("RENDER_COMMAND is empty");
        std::process::exit(1);
    };
    info!("Render command: {}", config.render_command.join(" "));

    let state = AppState::new(config.clone(), Arc::new(renderer));

    let reclaimer = Reclaimer::new(state.jobs.clone(), config.job_ttl, config.sweep_interval);
    tokio::spawn(reclaimer.run());

    let app = app::create_app(state);

    if let Err(e) = lifecycle::serve(&config.listen, app).await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    info!("HTTP server closed");
}
