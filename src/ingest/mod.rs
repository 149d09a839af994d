//! Replace-then-recompute workflow for submitted snapshot sets.
//!
//! Every submission supersedes the user's previous snapshot set. The delete,
//! the inserts, the recomputation and the aggregate upsert all run inside one
//! SQLite transaction on the writer connection, so a failure at any step
//! leaves the previous set and aggregate untouched.

use uuid::Uuid;

use crate::error::Result;
use crate::metrics::{
    compute_project_analytics, compute_task_analytics, ProjectAnalytics, TaskAnalytics,
};
use crate::model::{ProjectSnapshot, ProjectSubmission, TaskSnapshot, TaskSubmission};
use crate::storage::repository;
use crate::storage::Database;

/// Replace a user's project snapshots and recompute their aggregate.
///
/// Each snapshot is owned by the `userId` carried in its own payload, while
/// the live and lifetime views are read back for `user_id`. An empty
/// submission returns a zeroed, unsaved aggregate and leaves the store alone.
pub async fn replace_projects(
    db: &Database,
    user_id: Uuid,
    items: &[ProjectSubmission],
) -> Result<ProjectAnalytics> {
    if items.is_empty() {
        return Ok(ProjectAnalytics::empty(user_id));
    }
    for item in items {
        item.validate()?;
    }
    let snapshots: Vec<ProjectSnapshot> = items.iter().map(ProjectSnapshot::from).collect();

    let (saved, removed, inserted) = db
        .writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let removed = repository::delete_project_snapshots_for_user(&tx, user_id)?;
            for snap in &snapshots {
                repository::insert_project_snapshot(&tx, snap)?;
            }

            let live = repository::find_live_project_snapshots_for_user(&tx, user_id)?;
            let lifetime = repository::find_project_snapshots_for_user(&tx, user_id)?;
            let mut analytics = compute_project_analytics(&live, &lifetime, user_id);
            if let Some(existing) = repository::find_project_analytics_for_user(&tx, user_id)? {
                analytics.id = existing.id;
            }

            let saved = repository::upsert_project_analytics(&tx, &analytics)?;
            tx.commit()?;
            Ok::<_, rusqlite::Error>((saved, removed, snapshots.len()))
        })
        .await?;

    log::debug!("Replaced projects for {user_id}: removed {removed}, inserted {inserted}");
    Ok(saved)
}

/// Replace a user's task snapshots and recompute their aggregate.
///
/// Snapshots are always stored under `user_id`; any user id in the payload
/// is ignored. An empty submission returns a zeroed, unsaved aggregate and
/// leaves the store alone.
pub async fn replace_tasks(
    db: &Database,
    user_id: Uuid,
    items: &[TaskSubmission],
) -> Result<TaskAnalytics> {
    if items.is_empty() {
        return Ok(TaskAnalytics::empty(user_id));
    }
    let snapshots: Vec<TaskSnapshot> = items
        .iter()
        .map(|item| TaskSnapshot::from_submission(user_id, item))
        .collect();

    let (saved, removed, inserted) = db
        .writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let removed = repository::delete_task_snapshots_for_user(&tx, user_id)?;
            for snap in &snapshots {
                repository::insert_task_snapshot(&tx, snap)?;
            }

            let current = repository::find_live_task_snapshots_for_user(&tx, user_id)?;
            let lifetime = repository::find_task_snapshots_for_user(&tx, user_id)?;
            let mut analytics = compute_task_analytics(&current, &lifetime, user_id);
            if let Some(existing) = repository::find_task_analytics_for_user(&tx, user_id)? {
                analytics.id = existing.id;
            }

            let saved = repository::upsert_task_analytics(&tx, &analytics)?;
            tx.commit()?;
            Ok::<_, rusqlite::Error>((saved, removed, snapshots.len()))
        })
        .await?;

    log::debug!("Replaced tasks for {user_id}: removed {removed}, inserted {inserted}");
    Ok(saved)
}

/// Drop every project snapshot for a user without touching the aggregate.
pub async fn clear_projects(db: &Database, user_id: Uuid) -> Result<usize> {
    let removed = db
        .writer()
        .call(move |conn| repository::delete_project_snapshots_for_user(conn, user_id))
        .await?;
    log::debug!("Cleared {removed} project snapshots for {user_id}");
    Ok(removed)
}

/// Drop every task snapshot for a user without touching the aggregate.
pub async fn clear_tasks(db: &Database, user_id: Uuid) -> Result<usize> {
    let removed = db
        .writer()
        .call(move |conn| repository::delete_task_snapshots_for_user(conn, user_id))
        .await?;
    log::debug!("Cleared {removed} task snapshots for {user_id}");
    Ok(removed)
}

/// Stored project aggregate for a user, persisting a zeroed one on first read.
pub async fn project_analytics_or_create(
    db: &Database,
    user_id: Uuid,
) -> Result<ProjectAnalytics> {
    let analytics = db
        .writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let analytics = match repository::find_project_analytics_for_user(&tx, user_id)? {
                Some(existing) => existing,
                None => {
                    log::debug!("No project analytics for {user_id}, materializing empty record");
                    repository::upsert_project_analytics(&tx, &ProjectAnalytics::empty(user_id))?
                }
            };
            tx.commit()?;
            Ok::<_, rusqlite::Error>(analytics)
        })
        .await?;
    Ok(analytics)
}

/// Stored task aggregate for a user, persisting a zeroed one on first read.
pub async fn task_analytics_or_create(db: &Database, user_id: Uuid) -> Result<TaskAnalytics> {
    let analytics = db
        .writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let analytics = match repository::find_task_analytics_for_user(&tx, user_id)? {
                Some(existing) => existing,
                None => {
                    log::debug!("No task analytics for {user_id}, materializing empty record");
                    repository::upsert_task_analytics(&tx, &TaskAnalytics::empty(user_id))?
                }
            };
            tx.commit()?;
            Ok::<_, rusqlite::Error>(analytics)
        })
        .await?;
    Ok(analytics)
}
