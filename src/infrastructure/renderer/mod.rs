//! Boundary to the program that actually produces the video.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod command;

pub use command::CommandRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer ran and rejected the job. Displayed verbatim to clients.
    #[error("{0}")]
    Failed(String),

    #[error("Failed to start renderer: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode render request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RenderError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Turns a render request into a finished file inside `work_dir`.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, request: Value, work_dir: &Path) -> Result<PathBuf, RenderError>;
}
