//! In-memory job store shared by the HTTP handlers, the render executor and
//! the reclaimer.
//!
//! Each operation takes the lock exactly once, so readers never see a
//! half-applied transition and a record can leave `Processing` only once.

use super::model::{JobRecord, JobState};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobStoreError {
    #[error("Job {0} already exists")]
    AlreadyExists(Uuid),

    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Job {0} already finished")]
    AlreadyFinished(Uuid),
}

#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, id: Uuid) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&id) {
            return Err(JobStoreError::AlreadyExists(id));
        }
        jobs.insert(id, JobRecord::new(id));
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn set_completed(&self, id: Uuid, output_path: PathBuf) -> Result<(), JobStoreError> {
        self.finish(id, JobState::Completed { output_path }).await
    }

    pub async fn set_error(&self, id: Uuid, message: impl Into<String>) -> Result<(), JobStoreError> {
        self.finish(
            id,
            JobState::Failed {
                message: message.into(),
            },
        )
        .await
    }

    async fn finish(&self, id: Uuid, next: JobState) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        let record = jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;
        if record.state.is_terminal() {
            return Err(JobStoreError::AlreadyFinished(id));
        }
        record.state = next;
        Ok(())
    }

    pub async fn list_all(&self) -> Vec<(Uuid, JobRecord)> {
        self.jobs
            .read()
            .await
            .iter()
            .map(|(id, record)| (*id, record.clone()))
            .collect()
    }

    pub async fn remove(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
