//! Task analytics endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use super::{parse_submissions, ApiError, AppState};
use crate::ingest;
use crate::metrics::TaskAnalytics;
use crate::model::TaskSubmission;

/// POST /api/v1/tasks/:user_id
///
/// An empty submission clears the user's task snapshots and replies with a
/// zeroed aggregate that is not persisted.
pub async fn post_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<TaskAnalytics>, ApiError> {
    let items: Vec<TaskSubmission> = parse_submissions(&body)?;

    if items.is_empty() {
        ingest::clear_tasks(&state.db, user_id).await?;
        return Ok(Json(TaskAnalytics::empty(user_id)));
    }

    let analytics = ingest::replace_tasks(&state.db, user_id, &items).await?;
    Ok(Json(analytics))
}

/// GET /api/v1/tasks/:user_id
pub async fn get_task_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TaskAnalytics>, ApiError> {
    let analytics = ingest::task_analytics_or_create(&state.db, user_id).await?;
    Ok(Json(analytics))
}
