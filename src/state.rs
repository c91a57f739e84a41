use crate::config::settings::AppConfig;
use crate::infrastructure::renderer::Renderer;
use crate::modules::jobs::store::JobStore;
use crate::workers::executor::RenderExecutor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jobs: JobStore,
    pub executor: RenderExecutor,
}

impl AppState {
    pub fn new(config: AppConfig, renderer: Arc<dyn Renderer>) -> Self {
        let jobs = JobStore::new();
        let executor = RenderExecutor::new(jobs.clone(), renderer);

        Self {
            config,
            jobs,
            executor,
        }
    }
}
