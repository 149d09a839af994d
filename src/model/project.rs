use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_util::{local_datetime, option_local_datetime};
use crate::error::{Error, Result};

/// Lifecycle state reported for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    Overdue,
    InProgress,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Overdue => "OVERDUE",
            ProjectStatus::InProgress => "IN_PROGRESS",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "OVERDUE" => Ok(ProjectStatus::Overdue),
            "IN_PROGRESS" => Ok(ProjectStatus::InProgress),
            other => Err(Error::InvalidInput(format!("unknown project status: {other}"))),
        }
    }
}

/// One project as submitted by a client.
///
/// The owning user is read from the payload, not from the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSubmission {
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[serde(with = "local_datetime")]
    pub created_on: NaiveDateTime,
    pub status: ProjectStatus,
    #[serde(with = "local_datetime")]
    pub due_date: NaiveDateTime,
    pub completion_percentage: u8,
    #[serde(default, with = "option_local_datetime")]
    pub completed_on: Option<NaiveDateTime>,
    #[serde(default)]
    pub deleted: bool,
}

impl ProjectSubmission {
    pub fn validate(&self) -> Result<()> {
        if self.completion_percentage > 100 {
            return Err(Error::InvalidInput(format!(
                "completionPercentage for project {} must be within 0-100, got {}",
                self.project_id, self.completion_percentage
            )));
        }
        Ok(())
    }
}

/// Stored state of one project at the time of the last submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub status: ProjectStatus,
    pub created_on: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub completion_percentage: u8,
    pub completed_on: Option<NaiveDateTime>,
    pub deleted: bool,
}

impl From<&ProjectSubmission> for ProjectSnapshot {
    fn from(s: &ProjectSubmission) -> Self {
        Self {
            project_id: s.project_id,
            user_id: s.user_id,
            status: s.status,
            created_on: s.created_on,
            due_date: s.due_date,
            completion_percentage: s.completion_percentage,
            completed_on: s.completed_on,
            deleted: s.deleted,
        }
    }
}
