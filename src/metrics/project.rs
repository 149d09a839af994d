use uuid::Uuid;

use super::{completion_days, count, percentage, ProjectAnalytics};
use crate::model::{ProjectSnapshot, ProjectStatus};

/// Derive project statistics from the live and lifetime views of a user's
/// snapshot set.
///
/// An empty live view yields the zeroed record, even when the lifetime view
/// still holds deleted projects.
pub fn compute_project_analytics(
    live: &[ProjectSnapshot],
    lifetime: &[ProjectSnapshot],
    user_id: Uuid,
) -> ProjectAnalytics {
    if live.is_empty() {
        return ProjectAnalytics::empty(user_id);
    }

    let completed_lifetime = count(lifetime, |p| p.status == ProjectStatus::Completed);

    ProjectAnalytics {
        id: None,
        user_id,
        total_projects: live.len() as u32,
        active_projects: count(live, |p| p.status == ProjectStatus::Active),
        completed_projects: count(live, |p| p.status == ProjectStatus::Completed),
        average_progress: average_progress(live),
        overdue_projects: count(live, |p| p.status == ProjectStatus::Overdue),
        total_projects_lifetime: lifetime.len() as u32,
        completed_projects_lifetime: completed_lifetime,
        abandoned_projects_lifetime: count(lifetime, |p| {
            p.status == ProjectStatus::Overdue && p.deleted
        }),
        average_project_duration_lifetime: average_duration_days(lifetime),
        project_completion_rate_lifetime: percentage(completed_lifetime, lifetime.len() as u32),
    }
}

fn average_progress(projects: &[ProjectSnapshot]) -> u32 {
    let sum: u32 = projects
        .iter()
        .map(|p| u32::from(p.completion_percentage))
        .sum();
    if sum == 0 {
        return 0;
    }
    (sum as f32 / projects.len() as f32).round() as u32
}

/// Truncating integer mean of whole days to completion.
fn average_duration_days(projects: &[ProjectSnapshot]) -> i64 {
    let days = completion_days(projects.iter().map(|p| (p.created_on, p.completed_on)));
    if days.is_empty() {
        return 0;
    }
    days.iter().sum::<i64>() / days.len() as i64
}
