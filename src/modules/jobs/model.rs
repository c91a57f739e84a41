use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

/// Lifecycle of a render job. The output path only exists on `Completed`
/// and the message only on `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Processing,
    Completed { output_path: PathBuf },
    Failed { message: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Processing => JobStatus::Processing,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Processing)
    }
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub state: JobState,
    pub created_at: Instant,
}

impl JobRecord {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: JobState::Processing,
            created_at: Instant::now(),
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        match &self.state {
            JobState::Completed { output_path } => Some(output_path),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Age measured from submission, saturating at zero if `now` is earlier.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
