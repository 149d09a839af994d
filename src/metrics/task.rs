use uuid::Uuid;

use super::{completion_days, count, percentage, TaskAnalytics};
use crate::date_util::whole_hours_between;
use crate::model::{Priority, TaskSnapshot, TaskStatus};

/// Derive task statistics from the current and lifetime views of a user's
/// snapshot set. Empty views simply produce zero counts and rates.
pub fn compute_task_analytics(
    current: &[TaskSnapshot],
    lifetime: &[TaskSnapshot],
    user_id: Uuid,
) -> TaskAnalytics {
    let total = current.len() as u32;
    let completed = count(current, |t| t.status == TaskStatus::Completed);
    let lifetime_total = lifetime.len() as u32;
    let lifetime_completed = count(lifetime, |t| t.status == TaskStatus::Completed);

    TaskAnalytics {
        id: None,
        user_id,
        total_tasks: total,
        completed_tasks: completed,
        in_progress_tasks: count(current, |t| t.status == TaskStatus::InProgress),
        todo_tasks: count(current, |t| t.status == TaskStatus::Todo),
        overdue_tasks: count(current, |t| t.status == TaskStatus::Overdue),
        completion_rate: percentage(completed, total),
        avg_completion_time: average_completion_days(current),
        low_priority_count: count(current, |t| t.priority == Priority::Low),
        medium_priority_count: count(current, |t| t.priority == Priority::Medium),
        high_priority_count: count(current, |t| t.priority == Priority::High),
        lifetime_total_tasks: lifetime_total,
        lifetime_completed_tasks: lifetime_completed,
        lifetime_abandoned_tasks: count(lifetime, |t| {
            t.status != TaskStatus::Completed && t.deleted
        }),
        lifetime_overdue_tasks: count(lifetime, |t| t.status == TaskStatus::Overdue && t.deleted),
        lifetime_average_completion_time: average_completion_days(lifetime),
        lifetime_completion_rate: percentage(lifetime_completed, lifetime_total) as i32,
        fastest_completion_time: fastest_completion_hours(lifetime),
    }
}

fn average_completion_days(tasks: &[TaskSnapshot]) -> f64 {
    let days = completion_days(tasks.iter().map(|t| (t.created_on, t.completed_on)));
    if days.is_empty() {
        return 0.0;
    }
    days.iter().sum::<i64>() as f64 / days.len() as f64
}

fn fastest_completion_hours(tasks: &[TaskSnapshot]) -> i64 {
    tasks
        .iter()
        .filter_map(|t| t.completed_on.map(|done| (t.created_on, done)))
        .min_by_key(|(created, done)| *done - *created)
        .map(|(created, done)| whole_hours_between(created, done))
        .unwrap_or(0)
}
