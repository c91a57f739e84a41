use crate::infrastructure::renderer::Renderer;
use crate::modules::jobs::store::{JobStore, JobStoreError};
use futures_util::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const PANIC_MESSAGE: &str = "render task panicked";

/// Runs renders in the background and writes their outcome into the store.
#[derive(Clone)]
pub struct RenderExecutor {
    store: JobStore,
    renderer: Arc<dyn Renderer>,
}

impl RenderExecutor {
    pub fn new(store: JobStore, renderer: Arc<dyn Renderer>) -> Self {
        Self { store, renderer }
    }

    /// Fire-and-forget. The returned handle is only useful to tests; callers
    /// on the request path drop it.
    pub fn execute(&self, job_id: Uuid, request: Value, work_dir: PathBuf) -> JoinHandle<()> {
        let store = self.store.clone();
        let renderer = Arc::clone(&self.renderer);

        tokio::spawn(async move {
            info!(%job_id, "🎬 Render started");

            let outcome = AssertUnwindSafe(renderer.render(request, &work_dir))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(path)) => complete(&store, job_id, path).await,
                Ok(Err(e)) => {
                    error!(%job_id, "❌ Render failed: {}", e);
                    record_failure(&store, job_id, e.to_string()).await;
                }
                Err(_) => {
                    error!(%job_id, "❌ Render task panicked");
                    record_failure(&store, job_id, PANIC_MESSAGE.to_string()).await;
                }
            }
        })
    }
}

async fn complete(store: &JobStore, job_id: Uuid, path: PathBuf) {
    if !is_file(&path).await {
        error!(%job_id, "❌ Renderer reported {} but no file exists", path.display());
        record_failure(store, job_id, "Rendered video is missing".to_string()).await;
        return;
    }

    match store.set_completed(job_id, path.clone()).await {
        Ok(()) => info!(%job_id, "✅ Render completed: {}", path.display()),
        Err(JobStoreError::NotFound(_)) => {
            warn!(%job_id, "Job was reclaimed before its render finished, discarding output");
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(%job_id, "Failed to remove orphaned output {}: {}", path.display(), e);
            }
        }
        Err(e) => warn!(%job_id, "Dropping render result: {}", e),
    }
}

async fn record_failure(store: &JobStore, job_id: Uuid, message: String) {
    if let Err(e) = store.set_error(job_id, message).await {
        warn!(%job_id, "Dropping render failure: {}", e);
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::renderer::RenderError;
    use crate::modules::jobs::model::JobStatus;
    use async_trait::async_trait;
    use serde_json::json;

    /// Writes the request's `bytes` field to a file, or fails with its
    /// `fail` field.
    struct ScriptedRenderer;

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn render(&self, request: Value, work_dir: &Path) -> Result<PathBuf, RenderError> {
            if let Some(msg) = request.get("fail").and_then(Value::as_str) {
                return Err(RenderError::failed(msg));
            }
            if request.get("panic").is_some() {
                panic!("renderer blew up");
            }
            let path = work_dir.join(format!("{}.mp4", Uuid::new_v4()));
            if request.get("phantom").is_none() {
                let bytes = request.get("bytes").and_then(Value::as_str).unwrap_or("video");
                tokio::fs::write(&path, bytes).await?;
            }
            Ok(path)
        }
    }

    async fn run(request: Value) -> (JobStore, Uuid, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new();
        let executor = RenderExecutor::new(store.clone(), Arc::new(ScriptedRenderer));
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();

        executor
            .execute(id, request, dir.path().to_path_buf())
            .await
            .unwrap();

        (store, id, dir)
    }

    #[tokio::test]
    async fn success_marks_job_completed_with_existing_file() {
        let (store, id, _dir) = run(json!({ "bytes": "frames" })).await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status(), JobStatus::Completed);
        let path = record.output_path().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "frames");
    }

    #[tokio::test]
    async fn failure_records_collaborator_message() {
        let (store, id, _dir) = run(json!({ "fail": "invalid scene 2" })).await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status(), JobStatus::Error);
        assert_eq!(record.error_message(), Some("invalid scene 2"));
    }

    #[tokio::test]
    async fn panic_is_recorded_as_error() {
        let (store, id, _dir) = run(json!({ "panic": true })).await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status(), JobStatus::Error);
        assert_eq!(record.error_message(), Some(PANIC_MESSAGE));
    }

    #[tokio::test]
    async fn reported_path_without_file_is_an_error() {
        let (store, id, _dir) = run(json!({ "phantom": true })).await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status(), JobStatus::Error);
        assert_eq!(record.error_message(), Some("Rendered video is missing"));
    }

    #[tokio::test]
    async fn output_of_reclaimed_job_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new();
        let executor = RenderExecutor::new(store.clone(), Arc::new(ScriptedRenderer));

        // No record was created, as if the reclaimer removed it mid-render.
        executor
            .execute(Uuid::new_v4(), json!({}), dir.path().to_path_buf())
            .await
            .unwrap();

        assert!(store.is_empty().await);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
