pub mod date_util;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
pub use metrics::{ProjectAnalytics, TaskAnalytics};
pub use model::{
    Priority, ProjectSnapshot, ProjectStatus, ProjectSubmission, TaskSnapshot, TaskStatus,
    TaskSubmission,
};
pub use server::{ServerConfig, DEFAULT_BIND};
pub use storage::repository::StoreStatus;
pub use storage::Database;

use storage::repository;
use uuid::Uuid;

/// Main entry point for the analytics store.
#[derive(Clone)]
pub struct WorkStats {
    db: Database,
}

impl WorkStats {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Projects ───────────────────────────────────────────────────

    /// Replace the user's project snapshots with `items` and return the
    /// recomputed aggregate. Empty `items` is a no-op returning a zeroed record.
    pub async fn replace_projects(
        &self,
        user_id: Uuid,
        items: &[ProjectSubmission],
    ) -> Result<ProjectAnalytics> {
        ingest::replace_projects(&self.db, user_id, items).await
    }

    /// Remove the user's project snapshots. Returns how many were removed.
    pub async fn clear_projects(&self, user_id: Uuid) -> Result<usize> {
        ingest::clear_projects(&self.db, user_id).await
    }

    pub async fn project_analytics(&self, user_id: Uuid) -> Result<ProjectAnalytics> {
        ingest::project_analytics_or_create(&self.db, user_id).await
    }

    // ── Tasks ──────────────────────────────────────────────────────

    /// Replace the user's task snapshots with `items` and return the
    /// recomputed aggregate. Empty `items` is a no-op returning a zeroed record.
    pub async fn replace_tasks(
        &self,
        user_id: Uuid,
        items: &[TaskSubmission],
    ) -> Result<TaskAnalytics> {
        ingest::replace_tasks(&self.db, user_id, items).await
    }

    /// Remove the user's task snapshots. Returns how many were removed.
    pub async fn clear_tasks(&self, user_id: Uuid) -> Result<usize> {
        ingest::clear_tasks(&self.db, user_id).await
    }

    pub async fn task_analytics(&self, user_id: Uuid) -> Result<TaskAnalytics> {
        ingest::task_analytics_or_create(&self.db, user_id).await
    }

    // ── Server & status ────────────────────────────────────────────

    /// Run the HTTP API until Ctrl-C.
    pub async fn serve(&self, config: ServerConfig) -> Result<()> {
        server::serve(config, self.db.clone(), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Could not listen for Ctrl-C: {e}");
            }
        })
        .await
    }

    /// Row counts across the store.
    pub async fn status(&self) -> Result<StoreStatus> {
        let status = self
            .db
            .reader()
            .call(|conn| repository::store_status(conn))
            .await?;
        Ok(status)
    }
}
