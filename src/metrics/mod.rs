pub mod project;
pub mod task;
pub mod types;

pub use project::compute_project_analytics;
pub use task::compute_task_analytics;
pub use types::*;

use chrono::NaiveDateTime;

use crate::date_util::whole_days_between;

/// `part / whole * 100`, or 0.0 when there is nothing to divide by.
fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Whole days from creation to completion for each item that has a
/// completion timestamp. Items still open are skipped.
fn completion_days<I>(spans: I) -> Vec<i64>
where
    I: IntoIterator<Item = (NaiveDateTime, Option<NaiveDateTime>)>,
{
    spans
        .into_iter()
        .filter_map(|(created, completed)| completed.map(|done| whole_days_between(created, done)))
        .collect()
}

fn count<T>(items: &[T], pred: impl Fn(&T) -> bool) -> u32 {
    items.iter().filter(|i| pred(*i)).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2, 4), 50.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 3), 100.0);
    }

    #[test]
    fn test_completion_days_skips_open_items() {
        let t0 = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let days = completion_days([
            (t0, Some(t0 + Duration::days(3))),
            (t0, None),
            (t0, Some(t0 + Duration::hours(30))),
        ]);
        assert_eq!(days, vec![3, 1]);
    }
}
