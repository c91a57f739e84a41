use super::model::{JobRecord, JobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Render job description. Passed to the renderer untouched.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct RenderRequest(pub Value);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<JobRecord> for StatusResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            status: record.status(),
            error: record.error_message().map(str::to_string),
        }
    }
}
