use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;
use crate::metrics::{ProjectAnalytics, TaskAnalytics};
use crate::model::{ProjectSnapshot, TaskSnapshot};

// ── Project snapshots ──────────────────────────────────────────────

const PROJECT_SNAPSHOT_COLUMNS: &str = "project_id, user_id, status, created_on, due_date,
     completion_percentage, completed_on, deleted";

pub fn insert_project_snapshot(
    conn: &Connection,
    snap: &ProjectSnapshot,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO project_snapshots (
            project_id, user_id, status, created_on, due_date,
            completion_percentage, completed_on, deleted
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            snap.project_id.to_string(),
            snap.user_id.to_string(),
            snap.status.as_str(),
            snap.created_on,
            snap.due_date,
            snap.completion_percentage,
            snap.completed_on,
            snap.deleted,
        ],
    )?;
    Ok(())
}

/// Remove every project snapshot owned by a user. Returns the number of rows removed.
pub fn delete_project_snapshots_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "DELETE FROM project_snapshots WHERE user_id = ?1",
        params![user_id.to_string()],
    )
}

/// All project snapshots for a user, deleted ones included (the lifetime view).
pub fn find_project_snapshots_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<ProjectSnapshot>, rusqlite::Error> {
    let sql = format!(
        "SELECT {PROJECT_SNAPSHOT_COLUMNS} FROM project_snapshots
         WHERE user_id = ?1 ORDER BY snapshot_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], project_snapshot_from_row)?;
    rows.collect()
}

/// Non-deleted project snapshots for a user (the live view).
pub fn find_live_project_snapshots_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<ProjectSnapshot>, rusqlite::Error> {
    let sql = format!(
        "SELECT {PROJECT_SNAPSHOT_COLUMNS} FROM project_snapshots
         WHERE user_id = ?1 AND deleted = 0 ORDER BY snapshot_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], project_snapshot_from_row)?;
    rows.collect()
}

fn project_snapshot_from_row(row: &Row) -> Result<ProjectSnapshot, rusqlite::Error> {
    Ok(ProjectSnapshot {
        project_id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        status: enum_column(row, 2)?,
        created_on: row.get(3)?,
        due_date: row.get(4)?,
        completion_percentage: row.get(5)?,
        completed_on: row.get(6)?,
        deleted: row.get(7)?,
    })
}

// ── Task snapshots ─────────────────────────────────────────────────

const TASK_SNAPSHOT_COLUMNS: &str =
    "task_id, user_id, status, priority, created_on, due_date, completed_on, deleted";

pub fn insert_task_snapshot(conn: &Connection, snap: &TaskSnapshot) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO task_snapshots (
            task_id, user_id, status, priority, created_on, due_date, completed_on, deleted
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            snap.task_id.to_string(),
            snap.user_id.to_string(),
            snap.status.as_str(),
            snap.priority.as_str(),
            snap.created_on,
            snap.due_date,
            snap.completed_on,
            snap.deleted,
        ],
    )?;
    Ok(())
}

/// Remove every task snapshot owned by a user. Returns the number of rows removed.
pub fn delete_task_snapshots_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "DELETE FROM task_snapshots WHERE user_id = ?1",
        params![user_id.to_string()],
    )
}

pub fn find_task_snapshots_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<TaskSnapshot>, rusqlite::Error> {
    let sql = format!(
        "SELECT {TASK_SNAPSHOT_COLUMNS} FROM task_snapshots
         WHERE user_id = ?1 ORDER BY snapshot_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], task_snapshot_from_row)?;
    rows.collect()
}

pub fn find_live_task_snapshots_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<TaskSnapshot>, rusqlite::Error> {
    let sql = format!(
        "SELECT {TASK_SNAPSHOT_COLUMNS} FROM task_snapshots
         WHERE user_id = ?1 AND deleted = 0 ORDER BY snapshot_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], task_snapshot_from_row)?;
    rows.collect()
}

fn task_snapshot_from_row(row: &Row) -> Result<TaskSnapshot, rusqlite::Error> {
    Ok(TaskSnapshot {
        task_id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        status: enum_column(row, 2)?,
        priority: enum_column(row, 3)?,
        created_on: row.get(4)?,
        due_date: row.get(5)?,
        completed_on: row.get(6)?,
        deleted: row.get(7)?,
    })
}

// ── Project analytics ──────────────────────────────────────────────

pub fn find_project_analytics_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Option<ProjectAnalytics>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, user_id, total_projects, active_projects, completed_projects,
                average_progress, overdue_projects, total_projects_lifetime,
                completed_projects_lifetime, abandoned_projects_lifetime,
                average_project_duration_lifetime, project_completion_rate_lifetime
         FROM project_analytics WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| {
            Ok(ProjectAnalytics {
                id: Some(uuid_column(row, 0)?),
                user_id: uuid_column(row, 1)?,
                total_projects: row.get(2)?,
                active_projects: row.get(3)?,
                completed_projects: row.get(4)?,
                average_progress: row.get(5)?,
                overdue_projects: row.get(6)?,
                total_projects_lifetime: row.get(7)?,
                completed_projects_lifetime: row.get(8)?,
                abandoned_projects_lifetime: row.get(9)?,
                average_project_duration_lifetime: row.get(10)?,
                project_completion_rate_lifetime: row.get(11)?,
            })
        },
    )
    .optional()
}

/// Save a project aggregate keyed by its id, generating one when the record
/// has never been persisted. Returns the record as stored.
pub fn upsert_project_analytics(
    conn: &Connection,
    analytics: &ProjectAnalytics,
) -> Result<ProjectAnalytics, rusqlite::Error> {
    let mut saved = analytics.clone();
    let id = *saved.id.get_or_insert_with(Uuid::new_v4);

    conn.execute(
        "INSERT INTO project_analytics (
            id, user_id, total_projects, active_projects, completed_projects,
            average_progress, overdue_projects, total_projects_lifetime,
            completed_projects_lifetime, abandoned_projects_lifetime,
            average_project_duration_lifetime, project_completion_rate_lifetime,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, datetime('now'))
        ON CONFLICT(id) DO UPDATE SET
            user_id=excluded.user_id, total_projects=excluded.total_projects,
            active_projects=excluded.active_projects,
            completed_projects=excluded.completed_projects,
            average_progress=excluded.average_progress,
            overdue_projects=excluded.overdue_projects,
            total_projects_lifetime=excluded.total_projects_lifetime,
            completed_projects_lifetime=excluded.completed_projects_lifetime,
            abandoned_projects_lifetime=excluded.abandoned_projects_lifetime,
            average_project_duration_lifetime=excluded.average_project_duration_lifetime,
            project_completion_rate_lifetime=excluded.project_completion_rate_lifetime,
            updated_at=excluded.updated_at",
        params![
            id.to_string(),
            saved.user_id.to_string(),
            saved.total_projects,
            saved.active_projects,
            saved.completed_projects,
            saved.average_progress,
            saved.overdue_projects,
            saved.total_projects_lifetime,
            saved.completed_projects_lifetime,
            saved.abandoned_projects_lifetime,
            saved.average_project_duration_lifetime,
            saved.project_completion_rate_lifetime,
        ],
    )?;
    Ok(saved)
}

// ── Task analytics ─────────────────────────────────────────────────

pub fn find_task_analytics_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Option<TaskAnalytics>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, user_id, total_tasks, completed_tasks, in_progress_tasks, todo_tasks,
                overdue_tasks, completion_rate, avg_completion_time, low_priority_count,
                medium_priority_count, high_priority_count, lifetime_total_tasks,
                lifetime_completed_tasks, lifetime_abandoned_tasks, lifetime_overdue_tasks,
                lifetime_average_completion_time, lifetime_completion_rate,
                fastest_completion_time
         FROM task_analytics WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| {
            Ok(TaskAnalytics {
                id: Some(uuid_column(row, 0)?),
                user_id: uuid_column(row, 1)?,
                total_tasks: row.get(2)?,
                completed_tasks: row.get(3)?,
                in_progress_tasks: row.get(4)?,
                todo_tasks: row.get(5)?,
                overdue_tasks: row.get(6)?,
                completion_rate: row.get(7)?,
                avg_completion_time: row.get(8)?,
                low_priority_count: row.get(9)?,
                medium_priority_count: row.get(10)?,
                high_priority_count: row.get(11)?,
                lifetime_total_tasks: row.get(12)?,
                lifetime_completed_tasks: row.get(13)?,
                lifetime_abandoned_tasks: row.get(14)?,
                lifetime_overdue_tasks: row.get(15)?,
                lifetime_average_completion_time: row.get(16)?,
                lifetime_completion_rate: row.get(17)?,
                fastest_completion_time: row.get(18)?,
            })
        },
    )
    .optional()
}

/// Save a task aggregate keyed by its id, generating one when the record
/// has never been persisted. Returns the record as stored.
pub fn upsert_task_analytics(
    conn: &Connection,
    analytics: &TaskAnalytics,
) -> Result<TaskAnalytics, rusqlite::Error> {
    let mut saved = analytics.clone();
    let id = *saved.id.get_or_insert_with(Uuid::new_v4);

    conn.execute(
        "INSERT INTO task_analytics (
            id, user_id, total_tasks, completed_tasks, in_progress_tasks, todo_tasks,
            overdue_tasks, completion_rate, avg_completion_time, low_priority_count,
            medium_priority_count, high_priority_count, lifetime_total_tasks,
            lifetime_completed_tasks, lifetime_abandoned_tasks, lifetime_overdue_tasks,
            lifetime_average_completion_time, lifetime_completion_rate,
            fastest_completion_time, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18, ?19, datetime('now')
        )
        ON CONFLICT(id) DO UPDATE SET
            user_id=excluded.user_id, total_tasks=excluded.total_tasks,
            completed_tasks=excluded.completed_tasks,
            in_progress_tasks=excluded.in_progress_tasks, todo_tasks=excluded.todo_tasks,
            overdue_tasks=excluded.overdue_tasks, completion_rate=excluded.completion_rate,
            avg_completion_time=excluded.avg_completion_time,
            low_priority_count=excluded.low_priority_count,
            medium_priority_count=excluded.medium_priority_count,
            high_priority_count=excluded.high_priority_count,
            lifetime_total_tasks=excluded.lifetime_total_tasks,
            lifetime_completed_tasks=excluded.lifetime_completed_tasks,
            lifetime_abandoned_tasks=excluded.lifetime_abandoned_tasks,
            lifetime_overdue_tasks=excluded.lifetime_overdue_tasks,
            lifetime_average_completion_time=excluded.lifetime_average_completion_time,
            lifetime_completion_rate=excluded.lifetime_completion_rate,
            fastest_completion_time=excluded.fastest_completion_time,
            updated_at=excluded.updated_at",
        params![
            id.to_string(),
            saved.user_id.to_string(),
            saved.total_tasks,
            saved.completed_tasks,
            saved.in_progress_tasks,
            saved.todo_tasks,
            saved.overdue_tasks,
            saved.completion_rate,
            saved.avg_completion_time,
            saved.low_priority_count,
            saved.medium_priority_count,
            saved.high_priority_count,
            saved.lifetime_total_tasks,
            saved.lifetime_completed_tasks,
            saved.lifetime_abandoned_tasks,
            saved.lifetime_overdue_tasks,
            saved.lifetime_average_completion_time,
            saved.lifetime_completion_rate,
            saved.fastest_completion_time,
        ],
    )?;
    Ok(saved)
}

// ── Status ─────────────────────────────────────────────────────────

/// Row counts across the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub project_snapshots: i64,
    pub task_snapshots: i64,
    pub project_analytics: i64,
    pub task_analytics: i64,
}

pub fn store_status(conn: &Connection) -> Result<StoreStatus, rusqlite::Error> {
    let count = |table: &str| -> Result<i64, rusqlite::Error> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    };
    Ok(StoreStatus {
        project_snapshots: count("project_snapshots")?,
        task_snapshots: count("task_snapshots")?,
        project_analytics: count("project_analytics")?,
        task_analytics: count("task_analytics")?,
    })
}

// ── Helpers ────────────────────────────────────────────────────────

fn uuid_column(row: &Row, idx: usize) -> Result<Uuid, rusqlite::Error> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn enum_column<T>(row: &Row, idx: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = Error>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e: Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, ProjectStatus, TaskStatus};
    use crate::storage::Database;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn project(user_id: Uuid, status: ProjectStatus, deleted: bool) -> ProjectSnapshot {
        ProjectSnapshot {
            project_id: Uuid::new_v4(),
            user_id,
            status,
            created_on: ts(1, 9),
            due_date: ts(20, 17),
            completion_percentage: 35,
            completed_on: None,
            deleted,
        }
    }

    fn task(user_id: Uuid, status: TaskStatus, deleted: bool) -> TaskSnapshot {
        TaskSnapshot {
            task_id: Uuid::new_v4(),
            user_id,
            status,
            priority: Priority::High,
            created_on: ts(2, 10),
            due_date: ts(9, 10),
            completed_on: Some(ts(4, 15)),
            deleted,
        }
    }

    #[tokio::test]
    async fn test_project_snapshot_round_trip() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                let mut snap = project(user, ProjectStatus::InProgress, false);
                snap.completed_on = Some(ts(12, 8));
                insert_project_snapshot(conn, &snap)?;

                let all = find_project_snapshots_for_user(conn, user)?;
                assert_eq!(all, vec![snap]);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_live_view_excludes_deleted() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                insert_project_snapshot(conn, &project(user, ProjectStatus::Active, false))?;
                insert_project_snapshot(conn, &project(user, ProjectStatus::Overdue, true))?;
                insert_task_snapshot(conn, &task(user, TaskStatus::Todo, false))?;
                insert_task_snapshot(conn, &task(user, TaskStatus::Completed, true))?;
                insert_task_snapshot(conn, &task(user, TaskStatus::Overdue, true))?;

                assert_eq!(find_project_snapshots_for_user(conn, user)?.len(), 2);
                let live = find_live_project_snapshots_for_user(conn, user)?;
                assert_eq!(live.len(), 1);
                assert_eq!(live[0].status, ProjectStatus::Active);

                assert_eq!(find_task_snapshots_for_user(conn, user)?.len(), 3);
                let live = find_live_task_snapshots_for_user(conn, user)?;
                assert_eq!(live.len(), 1);
                assert_eq!(live[0].status, TaskStatus::Todo);
                assert_eq!(live[0].priority, Priority::High);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_user() {
        let db = Database::open_memory().await.unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                insert_task_snapshot(conn, &task(alice, TaskStatus::Todo, false))?;
                insert_task_snapshot(conn, &task(alice, TaskStatus::Todo, true))?;
                insert_task_snapshot(conn, &task(bob, TaskStatus::Todo, false))?;
                insert_project_snapshot(conn, &project(bob, ProjectStatus::Active, false))?;

                assert_eq!(delete_task_snapshots_for_user(conn, alice)?, 2);
                assert!(find_task_snapshots_for_user(conn, alice)?.is_empty());
                assert_eq!(find_task_snapshots_for_user(conn, bob)?.len(), 1);

                assert_eq!(delete_project_snapshots_for_user(conn, alice)?, 0);
                assert_eq!(find_project_snapshots_for_user(conn, bob)?.len(), 1);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_item_for_same_user_is_rejected() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                let snap = project(user, ProjectStatus::Active, false);
                insert_project_snapshot(conn, &snap)?;
                assert!(insert_project_snapshot(conn, &snap).is_err());

                // Same project id under another user is fine
                let other = ProjectSnapshot {
                    user_id: Uuid::new_v4(),
                    ..snap
                };
                insert_project_snapshot(conn, &other)?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_project_analytics_upsert_keeps_id() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                assert_eq!(find_project_analytics_for_user(conn, user)?, None);

                let first = upsert_project_analytics(conn, &ProjectAnalytics::empty(user))?;
                let id = first.id.expect("id assigned on first save");

                let updated = ProjectAnalytics {
                    id: Some(id),
                    total_projects: 3,
                    average_progress: 67,
                    average_project_duration_lifetime: 4,
                    project_completion_rate_lifetime: 37.5,
                    ..ProjectAnalytics::empty(user)
                };
                let second = upsert_project_analytics(conn, &updated)?;
                assert_eq!(second, updated);

                let stored = find_project_analytics_for_user(conn, user)?.unwrap();
                assert_eq!(stored, updated);

                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM project_analytics",
                    [],
                    |row| row.get(0),
                )?;
                assert_eq!(count, 1);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_analytics_without_id_for_existing_user_conflicts() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                upsert_task_analytics(conn, &TaskAnalytics::empty(user))?;
                assert!(upsert_task_analytics(conn, &TaskAnalytics::empty(user)).is_err());
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_task_analytics_round_trip() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        db.writer()
            .call(move |conn| {
                let analytics = TaskAnalytics {
                    total_tasks: 4,
                    completed_tasks: 1,
                    completion_rate: 25.0,
                    avg_completion_time: 2.5,
                    high_priority_count: 4,
                    lifetime_total_tasks: 6,
                    lifetime_abandoned_tasks: 2,
                    lifetime_completion_rate: 33,
                    fastest_completion_time: 5,
                    ..TaskAnalytics::empty(user)
                };
                let saved = upsert_task_analytics(conn, &analytics)?;
                assert!(saved.id.is_some());

                let stored = find_task_analytics_for_user(conn, user)?.unwrap();
                assert_eq!(stored, saved);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_status_counts_rows() {
        let db = Database::open_memory().await.unwrap();
        let user = Uuid::new_v4();

        let status = db
            .writer()
            .call(move |conn| {
                insert_task_snapshot(conn, &task(user, TaskStatus::Todo, false))?;
                insert_task_snapshot(conn, &task(user, TaskStatus::Todo, false))?;
                upsert_project_analytics(conn, &ProjectAnalytics::empty(user))?;
                store_status(conn)
            })
            .await
            .unwrap();

        assert_eq!(
            status,
            StoreStatus {
                project_snapshots: 0,
                task_snapshots: 2,
                project_analytics: 1,
                task_analytics: 0,
            }
        );
    }
}
