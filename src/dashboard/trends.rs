use chrono::{DateTime, Datelike, Duration, Utc};

use crate::date_util::{day_end, day_start, last_day_of_month, month_first, round1, week_monday};
use crate::error::Result;
use crate::model::{Task, TimesheetEntry};
use crate::query::{DateRange, Period, ScopedQuery};
use crate::storage::Database;

use super::leaderboard::point_weight;
use super::types::TrendPoint;

/// A labeled time slice of the trend series.
#[derive(Debug, Clone)]
pub(crate) struct TrendBucket {
    pub label: String,
    pub range: DateRange,
}

/// Build the bucket series for a period keyword. The shape follows the
/// keyword, not the resolved window:
///
/// - `today` — eight 3-hour buckets from midnight, labeled by start time
/// - `month` — four weekly buckets from the 1st, clipped to month end
/// - anything else — the seven days of the current calendar week
pub(crate) fn build_buckets(period: Period, now: DateTime<Utc>) -> Vec<TrendBucket> {
    let today = now.date_naive();
    match period {
        Period::Today => {
            let base = day_start(today);
            (0..8)
                .map(|i| {
                    let start = base + Duration::hours(3 * i);
                    TrendBucket {
                        label: start.format("%H:%M").to_string(),
                        range: DateRange {
                            start,
                            end: start + Duration::hours(3) - Duration::seconds(1),
                        },
                    }
                })
                .collect()
        }
        Period::Month => {
            let start = day_start(month_first(today));
            let month_end = day_end(last_day_of_month(today.year(), today.month()));
            (0..4)
                .map(|i| {
                    let bucket_start = start + Duration::days(7 * i);
                    let bucket_end =
                        (bucket_start + Duration::days(7) - Duration::seconds(1)).min(month_end);
                    TrendBucket {
                        label: format!("Week {}", i + 1),
                        range: DateRange {
                            start: bucket_start,
                            end: bucket_end,
                        },
                    }
                })
                .collect()
        }
        Period::Week | Period::Custom => {
            let monday = week_monday(today);
            (0..7)
                .map(|i| {
                    let day = monday + Duration::days(i);
                    TrendBucket {
                        label: day.format("%a %b %-d").to_string(),
                        range: DateRange {
                            start: day_start(day),
                            end: day_end(day),
                        },
                    }
                })
                .collect()
        }
    }
}

/// The member-history fallback: the last eight calendar weeks ending
/// today, independent of the active filter.
fn trailing_week_buckets(now: DateTime<Utc>) -> Vec<TrendBucket> {
    let monday = week_monday(now.date_naive());
    (0..8)
        .rev()
        .map(|i| {
            let start_day = monday - Duration::days(7 * i);
            TrendBucket {
                label: start_day.format("%b %-d").to_string(),
                range: DateRange {
                    start: day_start(start_day),
                    end: day_end(start_day + Duration::days(6)),
                },
            }
        })
        .collect()
}

fn point_for(bucket: &TrendBucket, tasks: &[Task], member_id: Option<i64>) -> TrendPoint {
    let done: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            t.status.is_done()
                && bucket.range.contains(t.updated_at)
                && member_id.is_none_or(|id| t.assigned_to(id))
        })
        .collect();
    TrendPoint {
        label: bucket.label.clone(),
        tasks_completed: done.len() as u32,
        points_earned: done.iter().map(|t| point_weight(t.priority)).sum(),
        hours_tracked: None,
    }
}

/// Team-wide trend series over done tasks in scope.
pub fn team_trends(tasks: &[Task], period: Period, now: DateTime<Utc>) -> Vec<TrendPoint> {
    build_buckets(period, now)
        .iter()
        .map(|b| point_for(b, tasks, None))
        .collect()
}

/// One member's history, same shapes as the team series but anchored to
/// their tasks and hours. A custom period falls back to eight trailing
/// calendar weeks.
pub fn member_history(
    member_id: i64,
    tasks: &[Task],
    entries: &[TimesheetEntry],
    period: Period,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let buckets = match period {
        Period::Custom => trailing_week_buckets(now),
        p => build_buckets(p, now),
    };
    buckets
        .iter()
        .map(|b| {
            let mut point = point_for(b, tasks, Some(member_id));
            point.hours_tracked = Some(round1(
                entries
                    .iter()
                    .filter(|e| e.user_id == member_id && b.range.contains_date(e.date))
                    .map(|e| e.hours)
                    .sum(),
            ));
            point
        })
        .collect()
}

pub async fn compute(db: &Database, scope: &ScopedQuery) -> Result<Vec<TrendPoint>> {
    let tasks = super::scoped_tasks(db, scope).await?;
    Ok(team_trends(&tasks, scope.period, scope.now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, TaskStatus};
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        // Friday, March 14
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn done_task(id: i64, priority: Priority, updated: DateTime<Utc>) -> Task {
        Task {
            id,
            project_id: 1,
            title: format!("Task {id}"),
            status: TaskStatus::Done,
            priority,
            due_date: None,
            created_at: updated,
            updated_at: updated,
            assignee_ids: vec![1],
        }
    }

    #[test]
    fn test_today_shape() {
        let buckets = build_buckets(Period::Today, now());
        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[0].label, "00:00");
        assert_eq!(buckets[1].label, "03:00");
        assert_eq!(buckets[7].label, "21:00");
        assert_eq!(
            buckets[7].range.end.to_rfc3339(),
            "2025-03-14T23:59:59+00:00"
        );
        // Buckets tile the day without overlap
        for pair in buckets.windows(2) {
            assert_eq!(
                pair[1].range.start,
                pair[0].range.end + Duration::seconds(1)
            );
        }
    }

    #[test]
    fn test_month_shape_clips_to_month_end() {
        let feb = NaiveDate::from_ymd_opt(2025, 2, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc();
        let buckets = build_buckets(Period::Month, feb);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].label, "Week 1");
        assert_eq!(buckets[3].label, "Week 4");
        assert_eq!(
            buckets[0].range.start.to_rfc3339(),
            "2025-02-01T00:00:00+00:00"
        );
        // The last bucket ends exactly at month end in a 28-day February
        assert_eq!(
            buckets[3].range.end.to_rfc3339(),
            "2025-02-28T23:59:59+00:00"
        );
    }

    #[test]
    fn test_week_shape_anchors_to_current_monday() {
        let buckets = build_buckets(Period::Week, now());
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].label, "Mon Mar 10");
        assert_eq!(buckets[6].label, "Sun Mar 16");
        // Custom uses the same shape for team trends
        let custom = build_buckets(Period::Custom, now());
        assert_eq!(custom.len(), 7);
        assert_eq!(custom[0].label, buckets[0].label);
    }

    #[test]
    fn test_counts_and_points_per_bucket() {
        let tue = NaiveDate::from_ymd_opt(2025, 3, 11)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        let tasks = vec![
            done_task(1, Priority::High, tue),
            done_task(2, Priority::Medium, tue),
            done_task(3, Priority::Low, now()),
        ];
        let points = team_trends(&tasks, Period::Week, now());
        assert_eq!(points.len(), 7);
        assert_eq!(points[1].tasks_completed, 2); // Tuesday
        assert_eq!(points[1].points_earned, 5); // 3 + 2
        assert_eq!(points[4].tasks_completed, 1); // Friday
        assert_eq!(points[4].points_earned, 1);
        assert_eq!(points[0].tasks_completed, 0);
        assert!(points[0].hours_tracked.is_none());
    }

    #[test]
    fn test_member_history_custom_falls_back_to_eight_weeks() {
        let history = member_history(1, &[], &[], Period::Custom, now());
        assert_eq!(history.len(), 8);
        // Oldest week first, current week last
        assert_eq!(history[0].label, "Jan 20");
        assert_eq!(history[7].label, "Mar 10");
        assert!(history.iter().all(|p| p.hours_tracked == Some(0.0)));
    }

    #[test]
    fn test_member_history_filters_by_member() {
        let mut other = done_task(2, Priority::High, now());
        other.assignee_ids = vec![9];
        let tasks = vec![done_task(1, Priority::High, now()), other];
        let entries = vec![
            TimesheetEntry {
                id: 1,
                task_id: 1,
                user_id: 1,
                date: now().date_naive(),
                hours: 5.5,
                status: crate::model::EntryStatus::Approved,
                updated_at: now(),
            },
            TimesheetEntry {
                id: 2,
                task_id: 2,
                user_id: 9,
                date: now().date_naive(),
                hours: 3.0,
                status: crate::model::EntryStatus::Approved,
                updated_at: now(),
            },
        ];
        let history = member_history(1, &tasks, &entries, Period::Week, now());
        // Friday bucket holds only member 1's work
        assert_eq!(history[4].tasks_completed, 1);
        assert_eq!(history[4].points_earned, 3);
        assert_eq!(history[4].hours_tracked, Some(5.5));
    }
}
