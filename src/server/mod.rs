// HTTP API - accepts snapshot submissions and serves per-user aggregates
//
// Two resource groups share the same shape:
//   POST /api/v1/projects/:user_id   replace project snapshots, recompute
//   GET  /api/v1/projects/:user_id   stored aggregate (zeroed on first read)
//   POST /api/v1/tasks/:user_id      replace task snapshots, recompute
//   GET  /api/v1/tasks/:user_id      stored aggregate (zeroed on first read)

mod error;
mod projects;
mod tasks;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::storage::Database;

pub use error::ApiError;

/// Default bind address for `workstats serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the API router over a database.
pub fn router(db: Database) -> Router {
    Router::new()
        .route(
            "/api/v1/projects/:user_id",
            get(projects::get_project_analytics).post(projects::post_projects),
        )
        .route(
            "/api/v1/tasks/:user_id",
            get(tasks::get_task_analytics).post(tasks::post_tasks),
        )
        .with_state(AppState { db })
}

/// Serve the API until `shutdown` resolves, then finish in-flight requests.
pub async fn serve<F>(config: ServerConfig, db: Database, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(db);
    let listener = TcpListener::bind(config.bind_addr).await?;
    log::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("Server stopped");
    Ok(())
}

/// Parse a submission body. An empty body or a JSON `null` counts as an
/// empty submission.
fn parse_submissions<T: DeserializeOwned>(body: &[u8]) -> std::result::Result<Vec<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid submission body: {e}")))?;
    Ok(items.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskSubmission;

    #[test]
    fn test_parse_empty_and_null_bodies() {
        assert!(parse_submissions::<TaskSubmission>(b"").unwrap().is_empty());
        assert!(parse_submissions::<TaskSubmission>(b"  \n").unwrap().is_empty());
        assert!(parse_submissions::<TaskSubmission>(b"null").unwrap().is_empty());
        assert!(parse_submissions::<TaskSubmission>(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_submissions::<TaskSubmission>(b"{\"not\": \"a list\"}"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_submissions::<TaskSubmission>(b"[{\"status\": \"TODO\"}]"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_default_config_matches_default_bind() {
        assert_eq!(
            ServerConfig::default().bind_addr,
            DEFAULT_BIND.parse::<SocketAddr>().unwrap()
        );
    }
}
