use crate::config::env::{self, EnvKey};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "3002";
pub const DEFAULT_RENDER_COMMAND: &str = "render-video";
pub const DEFAULT_JOB_TTL_SECS: u64 = 30 * 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "render_server=info,tower_http=info";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Port number, `host:port`, or a socket path. Kept as the raw string.
    pub listen: String,
    pub temp_dir: PathBuf,
    pub render_command: Vec<String>,
    pub job_ttl: Duration,
    pub sweep_interval: Duration,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Self {
        let temp_dir = match env::get(EnvKey::TempDir) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_temp_dir(),
        };

        Self {
            listen: env::get_or(EnvKey::Listen, DEFAULT_LISTEN),
            temp_dir,
            render_command: parse_command(&env::get_or(
                EnvKey::RenderCommand,
                DEFAULT_RENDER_COMMAND,
            )),
            job_ttl: Duration::from_secs(env::get_parsed(
                EnvKey::JobTtlSecs,
                DEFAULT_JOB_TTL_SECS,
            )),
            sweep_interval: Duration::from_secs(
                env::get_parsed(EnvKey::SweepIntervalSecs, DEFAULT_SWEEP_INTERVAL_SECS).max(1),
            ),
            max_body_bytes: env::get_parsed(EnvKey::MaxBodyBytes, DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            temp_dir: default_temp_dir(),
            render_command: parse_command(DEFAULT_RENDER_COMMAND),
            job_ttl: Duration::from_secs(DEFAULT_JOB_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("temp")
}

fn parse_command(raw: &str) -> Vec<String> {
    let parts: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        vec![DEFAULT_RENDER_COMMAND.to_string()]
    } else {
        parts
    }
}
