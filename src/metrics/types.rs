use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate project statistics for one user.
///
/// The first group of fields covers the live window (non-deleted
/// snapshots); the `*_lifetime` fields cover every snapshot in the last
/// submission, deleted ones included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalytics {
    /// `None` until the record has been persisted.
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub total_projects: u32,
    pub active_projects: u32,
    pub completed_projects: u32,
    /// Mean completion percentage, rounded to the nearest integer.
    pub average_progress: u32,
    pub overdue_projects: u32,
    pub total_projects_lifetime: u32,
    pub completed_projects_lifetime: u32,
    pub abandoned_projects_lifetime: u32,
    /// Whole days, truncating mean.
    pub average_project_duration_lifetime: i64,
    pub project_completion_rate_lifetime: f64,
}

impl ProjectAnalytics {
    /// All-zero record for a user, not yet persisted.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// Aggregate task statistics for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalytics {
    /// `None` until the record has been persisted.
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub todo_tasks: u32,
    pub overdue_tasks: u32,
    /// Percentage of live tasks that are completed.
    pub completion_rate: f64,
    /// Mean whole days from creation to completion.
    pub avg_completion_time: f64,
    pub low_priority_count: u32,
    pub medium_priority_count: u32,
    pub high_priority_count: u32,
    pub lifetime_total_tasks: u32,
    pub lifetime_completed_tasks: u32,
    pub lifetime_abandoned_tasks: u32,
    pub lifetime_overdue_tasks: u32,
    pub lifetime_average_completion_time: f64,
    /// Truncated to a whole percentage.
    pub lifetime_completion_rate: i32,
    /// Hours from creation to completion of the quickest task.
    pub fastest_completion_time: i64,
}

impl TaskAnalytics {
    /// All-zero record for a user, not yet persisted.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}
