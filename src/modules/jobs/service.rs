use super::dto::{RenderRequest, StatusResponse, SubmitResponse};
use crate::state::AppState;
use anyhow::{Result, anyhow};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

pub struct JobService;

impl JobService {
    /// Only the exact form handed out by `submit` names a job; anything else
    /// (other UUID spellings included) is simply unknown.
    pub fn parse_job_id(raw: &str) -> Option<Uuid> {
        Uuid::parse_str(raw)
            .ok()
            .filter(|id| id.hyphenated().to_string() == raw)
    }

    /// Registers the job and hands it to the executor without waiting.
    pub async fn submit(state: AppState, req: RenderRequest) -> Result<SubmitResponse> {
        let job_id = Uuid::new_v4();

        state
            .jobs
            .create(job_id)
            .await
            .map_err(|e| anyhow!("Failed to register job: {}", e))?;

        info!(%job_id, "Job Started");

        state
            .executor
            .execute(job_id, req.0, state.config.temp_dir.clone());

        Ok(SubmitResponse { job_id })
    }

    pub async fn status(state: AppState, raw_id: &str) -> Option<StatusResponse> {
        let id = Self::parse_job_id(raw_id)?;
        state.jobs.get(id).await.map(StatusResponse::from)
    }

    /// Path of the finished video, if the job exists and completed.
    pub async fn completed_output(state: AppState, raw_id: &str) -> Option<PathBuf> {
        let id = Self::parse_job_id(raw_id)?;
        let record = state.jobs.get(id).await?;
        record.output_path().cloned()
    }
}
