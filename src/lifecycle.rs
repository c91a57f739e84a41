//! Process startup and shutdown: listener binding, graceful drain on
//! termination signals, and logging of otherwise-uncaught panics.

use anyhow::{Context, Result};
use axum::Router;
use std::path::Path;
#[cfg(unix)]
use std::path::PathBuf;
use tracing::{error, info};

/// Where the HTTP server listens. The configured value is never converted to
/// a number: a bare port binds every interface, `host:port` binds as given,
/// anything else is a Unix socket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenTarget {
    Tcp(String),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl ListenTarget {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if is_port(raw) {
            return ListenTarget::Tcp(format!("0.0.0.0:{}", raw));
        }

        #[cfg(unix)]
        {
            let host_port = !raw.contains('/')
                && raw
                    .rsplit_once(':')
                    .is_some_and(|(host, port)| !host.is_empty() && is_port(port));
            if !host_port {
                return ListenTarget::Unix(PathBuf::from(raw));
            }
        }

        ListenTarget::Tcp(raw.to_string())
    }
}

fn is_port(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Binds `listen` and serves `app` until SIGINT/SIGTERM, then drains
/// in-flight requests before returning.
pub async fn serve(listen: &str, app: Router) -> Result<()> {
    serve_with_shutdown(listen, app, shutdown_signal()).await
}

/// Like [`serve`], but stops accepting connections when `signal` resolves.
pub async fn serve_with_shutdown<F>(listen: &str, app: Router, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match ListenTarget::parse(listen) {
        ListenTarget::Tcp(addr) => {
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("✅ Render Server Live on {}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await?;
        }
        #[cfg(unix)]
        ListenTarget::Unix(path) => {
            remove_stale_socket(&path).await?;
            let listener = tokio::net::UnixListener::bind(&path)
                .with_context(|| format!("Failed to bind {}", path.display()))?;
            info!("✅ Render Server Live on {}", path.display());

            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await?;

            let _ = tokio::fs::remove_file(&path).await;
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn remove_stale_socket(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove stale socket {}", path.display())),
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("SIGTERM/SIGINT received: closing HTTP server");
}

/// Routes panics through tracing. Tokio contains a panic to the task it
/// happened in, so the server keeps answering health and status requests.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(%location, "CRITICAL RENDER SERVER ERROR: {}", payload);
    }));
}

/// Creates the working directory. Failure is logged, not fatal: renders
/// will fail individually and show up as job errors.
pub async fn prepare_work_dir(dir: &Path) {
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => info!("Working directory: {}", dir.display()),
        Err(e) => error!("Temp Dir Error ({}): {}", dir.display(), e),
    }
}
