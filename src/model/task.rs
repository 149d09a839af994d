use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_util::{local_datetime, option_local_datetime};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Overdue => "OVERDUE",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "OVERDUE" => Ok(TaskStatus::Overdue),
            other => Err(Error::InvalidInput(format!("unknown task status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            other => Err(Error::InvalidInput(format!("unknown task priority: {other}"))),
        }
    }
}

/// One task as submitted by a client.
///
/// A `userId` in the payload is accepted but never stored; tasks always
/// belong to the user named in the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    pub task_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(with = "local_datetime")]
    pub created_on: NaiveDateTime,
    #[serde(with = "local_datetime")]
    pub due_date: NaiveDateTime,
    #[serde(default, with = "option_local_datetime")]
    pub completed_on: Option<NaiveDateTime>,
    #[serde(default)]
    pub deleted: bool,
}

/// Stored state of one task at the time of the last submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_on: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub completed_on: Option<NaiveDateTime>,
    pub deleted: bool,
}

impl TaskSnapshot {
    pub fn from_submission(user_id: Uuid, s: &TaskSubmission) -> Self {
        Self {
            task_id: s.task_id,
            user_id,
            status: s.status,
            priority: s.priority,
            created_on: s.created_on,
            due_date: s.due_date,
            completed_on: s.completed_on,
            deleted: s.deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("low".parse::<Priority>().is_err());
    }

    #[test]
    fn test_snapshot_takes_path_user_over_payload() {
        let path_user = Uuid::new_v4();
        let json = r#"{
            "taskId": "9d4c0d6a-1b7f-4f87-a3f0-23d8b5c6e7aa",
            "userId": "00000000-0000-0000-0000-000000000001",
            "status": "COMPLETED",
            "priority": "MEDIUM",
            "createdOn": "2025-03-01T09:30:00",
            "dueDate": "2025-03-05T09:30:00",
            "completedOn": "2025-03-03T12:00:00",
            "deleted": true
        }"#;
        let s: TaskSubmission = serde_json::from_str(json).unwrap();
        let snap = TaskSnapshot::from_submission(path_user, &s);
        assert_eq!(snap.user_id, path_user);
        assert_eq!(snap.status, TaskStatus::Completed);
        assert!(snap.deleted);
        assert!(snap.completed_on.is_some());
    }

    #[test]
    fn test_missing_priority_is_rejected() {
        let json = r#"{
            "taskId": "9d4c0d6a-1b7f-4f87-a3f0-23d8b5c6e7aa",
            "status": "TODO",
            "createdOn": "2025-03-01T09:30:00",
            "dueDate": "2025-03-05T09:30:00"
        }"#;
        assert!(serde_json::from_str::<TaskSubmission>(json).is_err());
    }

    #[test]
    fn test_timestamps_without_seconds_are_accepted() {
        let json = r#"{
            "taskId": "9d4c0d6a-1b7f-4f87-a3f0-23d8b5c6e7aa",
            "status": "COMPLETED",
            "priority": "HIGH",
            "createdOn": "2025-03-01T09:30",
            "dueDate": "2025-03-05T09:30:00",
            "completedOn": "2025-03-03T12:00"
        }"#;
        let s: TaskSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(s.created_on.to_string(), "2025-03-01 09:30:00");
        assert_eq!(s.completed_on.unwrap().to_string(), "2025-03-03 12:00:00");
    }

    #[test]
    fn test_null_completed_on_is_absent() {
        let json = r#"{
            "taskId": "9d4c0d6a-1b7f-4f87-a3f0-23d8b5c6e7aa",
            "status": "TODO",
            "priority": "LOW",
            "createdOn": "2025-03-01T09:30:00",
            "dueDate": "2025-03-05T09:30:00",
            "completedOn": null
        }"#;
        let s: TaskSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(s.completed_on, None);
    }

    #[test]
    fn test_date_only_timestamp_is_rejected() {
        let json = r#"{
            "taskId": "9d4c0d6a-1b7f-4f87-a3f0-23d8b5c6e7aa",
            "status": "TODO",
            "priority": "LOW",
            "createdOn": "2025-03-01",
            "dueDate": "2025-03-05T09:30:00"
        }"#;
        assert!(serde_json::from_str::<TaskSubmission>(json).is_err());
    }
}
