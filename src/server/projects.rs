//! Project analytics endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use super::{parse_submissions, ApiError, AppState};
use crate::ingest;
use crate::metrics::ProjectAnalytics;
use crate::model::ProjectSubmission;

/// POST /api/v1/projects/:user_id
///
/// An empty submission clears the user's project snapshots and replies with
/// an empty 200 body; the stored aggregate is left as it was.
pub async fn post_projects(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let items: Vec<ProjectSubmission> = parse_submissions(&body)?;

    if items.is_empty() {
        ingest::clear_projects(&state.db, user_id).await?;
        return Ok(StatusCode::OK.into_response());
    }

    let analytics = ingest::replace_projects(&state.db, user_id, &items).await?;
    Ok(Json(analytics).into_response())
}

/// GET /api/v1/projects/:user_id
pub async fn get_project_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProjectAnalytics>, ApiError> {
    let analytics = ingest::project_analytics_or_create(&state.db, user_id).await?;
    Ok(Json(analytics))
}
