use super::{RenderError, Renderer};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs an external render program as
/// `program [args...] <request.json> <output.mp4>`.
///
/// The program reads the request from the JSON file and writes the video to
/// the output path. A non-zero exit is a failed render; the last line it
/// printed to stderr becomes the error message.
#[derive(Clone, Debug)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a renderer from a split command line. The first element is the
    /// program, the rest are passed before the file arguments.
    pub fn from_command_line(parts: &[String]) -> Option<Self> {
        let (program, args) = parts.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(&self, request: Value, work_dir: &Path) -> Result<PathBuf, RenderError> {
        let stem = Uuid::new_v4();
        let request_path = work_dir.join(format!("{}.json", stem));
        let output_path = work_dir.join(format!("{}.mp4", stem));

        fs::write(&request_path, serde_json::to_vec(&request)?).await?;

        info!("🎬 Running renderer: {} -> {}", self.program, output_path.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&request_path)
            .arg(&output_path)
            .stdin(Stdio::null())
            .output()
            .await;

        if let Err(e) = fs::remove_file(&request_path).await {
            warn!("Failed to remove render request {}: {}", request_path.display(), e);
        }

        let output = output.map_err(RenderError::Spawn)?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let _ = fs::remove_file(&output_path).await;
            let message = last_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Renderer exited with {}", output.status));
            return Err(RenderError::Failed(message));
        }

        if !stderr.trim().is_empty() {
            debug!("Renderer stderr: {}", stderr.trim());
        }

        match fs::metadata(&output_path).await {
            Ok(meta) if meta.is_file() => Ok(output_path),
            _ => Err(RenderError::failed("Renderer finished without producing a video")),
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}
