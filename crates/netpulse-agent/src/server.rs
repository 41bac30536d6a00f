//! Snapshot server: a long-lived static file responder.
//!
//! Serves GET requests for files under the data directory and attaches a
//! permissive cross-origin header to every response. It knows nothing about
//! snapshot semantics; the exposed content simply includes the writer's
//! output files. Started once at scheduler startup and normally lives until
//! process exit, but the handle carries an explicit shutdown signal so its
//! owner can stop it deliberately.

use axum::Router;
use netpulse_core::{AgentError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

/// A running snapshot server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is actually bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal shutdown and wait for in-flight responses to drain.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Bind the responder on `port` and serve `dir` until shutdown.
///
/// Binding happens before the task is spawned, so a port conflict surfaces
/// here rather than inside the background task.
///
/// # Errors
///
/// Returns `AgentError::Server` if the listener cannot bind.
pub async fn spawn(dir: PathBuf, port: u16) -> Result<ServerHandle> {
    // A wildcard allow-origin goes on every response, whether or not the
    // request carried an Origin header.
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = Router::new()
        .fallback_service(ServeDir::new(&dir))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AgentError::Server(format!("bind {addr}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| AgentError::Server(format!("local addr: {e}")))?;

    info!(addr = %local_addr, dir = %dir.display(), "snapshot server listening");

    let (shutdown, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = rx.await;
        });
        if let Err(e) = serve.await {
            error!(error = %e, "snapshot server exited");
        }
    });

    Ok(ServerHandle {
        local_addr,
        shutdown,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_files_with_cors_header() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latest.json"), r#"{"data":{},"hmac":"00"}"#).unwrap();

        // Port 0: let the OS pick, read the bound address from the handle.
        let handle = spawn(dir.path().to_path_buf(), 0).await.unwrap();
        let addr = SocketAddr::from(([127, 0, 0, 1], handle.local_addr().port()));

        let response = get(addr, "/latest.json").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response
            .to_lowercase()
            .contains("access-control-allow-origin: *"));
        assert!(response.contains("hmac"));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_file_is_404_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn(dir.path().to_path_buf(), 0).await.unwrap();
        let addr = SocketAddr::from(([127, 0, 0, 1], handle.local_addr().port()));

        let response = get(addr, "/nope.json").await;
        assert!(response.starts_with("HTTP/1.1 404"));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_port_conflict_surfaces_at_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let first = spawn(dir.path().to_path_buf(), 0).await.unwrap();
        let taken = first.local_addr().port();

        let second = spawn(dir.path().to_path_buf(), taken).await;
        assert!(matches!(second, Err(AgentError::Server(_))));

        first.shutdown().await;
    }
}
