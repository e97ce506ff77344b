use chrono::Duration;

use crate::date_util::{day_end, day_start, round1, week_monday};
use crate::error::Result;
use crate::model::{Member, Roster, Task, TaskStatus, TimesheetEntry};
use crate::query::{DateRange, ScopedQuery};
use crate::storage::Database;

use super::leaderboard::point_weight;
use super::trends;
use super::types::{
    Alert, DayHours, HoursBucket, MemberDetail, MemberDetailFull, PriorityBreakdown, RecentTask,
    StatusBreakdown,
};

/// Active-task count above which a member is flagged as carrying too much.
const HEAVY_LOAD_TASKS: u32 = 12;

/// Daily hours above this are overtime; weekly buckets use a 40-hour line.
const DAILY_OVERTIME_HOURS: f64 = 9.0;
const WEEKLY_OVERTIME_HOURS: f64 = 40.0;

/// Hours breakdowns switch from daily to weekly buckets past this span.
const DAILY_BREAKDOWN_MAX_DAYS: i64 = 14;

fn status_breakdown(active: &[&Task]) -> StatusBreakdown {
    let mut by_status = StatusBreakdown::default();
    for task in active {
        match task.status {
            TaskStatus::Todo => by_status.todo += 1,
            TaskStatus::InProgress => by_status.in_progress += 1,
            TaskStatus::Review => by_status.review += 1,
            TaskStatus::Revision => by_status.revision += 1,
            TaskStatus::Done => {}
        }
    }
    by_status
}

fn priority_breakdown(active: &[&Task]) -> PriorityBreakdown {
    let mut by_priority = PriorityBreakdown::default();
    for task in active {
        match task.priority {
            crate::model::Priority::High => by_priority.high += 1,
            crate::model::Priority::Medium => by_priority.medium += 1,
            crate::model::Priority::Low => by_priority.low += 1,
        }
    }
    by_priority
}

/// The fixed Mon–Sun breakdown of the current calendar week, independent
/// of the active filter window.
fn current_week_hours(member_id: i64, entries: &[TimesheetEntry], scope: &ScopedQuery) -> Vec<DayHours> {
    let monday = week_monday(scope.now.date_naive());
    (0..7)
        .map(|i| {
            let date = monday + Duration::days(i);
            let hours = round1(
                entries
                    .iter()
                    .filter(|e| e.user_id == member_id && e.date == date)
                    .map(|e| e.hours)
                    .sum(),
            );
            DayHours {
                date,
                label: date.format("%a").to_string(),
                hours,
                overtime: hours > DAILY_OVERTIME_HOURS,
            }
        })
        .collect()
}

fn member_alerts(overdue: u32, active: u32) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if overdue > 0 {
        alerts.push(Alert {
            kind: "overdue",
            message: format!("{overdue} overdue task(s)"),
            count: overdue,
        });
    }
    if active > HEAVY_LOAD_TASKS {
        alerts.push(Alert {
            kind: "overload",
            message: format!("{active} active tasks assigned"),
            count: active,
        });
    }
    alerts
}

/// The base profile that backs the dashboard's `memberDetails` section.
pub fn base_profile(
    member: &Member,
    role: &'static str,
    tasks: &[Task],
    entries: &[TimesheetEntry],
    scope: &ScopedQuery,
) -> MemberDetail {
    let assigned: Vec<&Task> = tasks.iter().filter(|t| t.assigned_to(member.id)).collect();
    let active: Vec<&Task> = assigned
        .iter()
        .copied()
        .filter(|t| t.status.is_active())
        .collect();
    let today = scope.now.date_naive();
    let week_start = day_start(week_monday(today));

    let done_in_window: Vec<&&Task> = assigned
        .iter()
        .filter(|t| t.status.is_done() && scope.range.contains(t.updated_at))
        .collect();
    let done_this_week = assigned
        .iter()
        .filter(|t| t.status.is_done() && t.updated_at >= week_start)
        .count() as u32;
    let overdue = active
        .iter()
        .filter(|t| t.due_date.is_some_and(|d| d < today))
        .count() as u32;

    let denominator = done_in_window.len() + active.len();
    let completion_rate = if denominator > 0 {
        round1(done_in_window.len() as f64 / denominator as f64 * 100.0)
    } else {
        0.0
    };

    let daily_hours = current_week_hours(member.id, entries, scope);
    let weekly_hours = round1(daily_hours.iter().map(|d| d.hours).sum());

    MemberDetail {
        member_id: member.id,
        name: member.name.clone(),
        role,
        avatar_url: member.avatar_url.clone(),
        active_tasks: active.len() as u32,
        by_status: status_breakdown(&active),
        by_priority: priority_breakdown(&active),
        done_this_week,
        overdue,
        completion_rate,
        points_earned: done_in_window.iter().map(|t| point_weight(t.priority)).sum(),
        weekly_hours,
        daily_hours,
        alerts: member_alerts(overdue, active.len() as u32),
    }
}

/// Hours breakdown over the filter window itself: daily buckets for spans
/// of up to two weeks, weekly buckets beyond that with the last bucket
/// clipped to the window's end.
fn hours_breakdown(
    member_id: i64,
    entries: &[TimesheetEntry],
    range: &DateRange,
) -> Vec<HoursBucket> {
    let member_hours = |bucket: &DateRange| -> f64 {
        round1(
            entries
                .iter()
                .filter(|e| e.user_id == member_id && bucket.contains_date(e.date))
                .map(|e| e.hours)
                .sum(),
        )
    };

    let span = range.span_days() + 1;
    let mut buckets = Vec::new();
    if span <= DAILY_BREAKDOWN_MAX_DAYS {
        let mut day = range.start.date_naive();
        let last = range.end.date_naive();
        while day <= last {
            let bucket = DateRange {
                start: day_start(day),
                end: day_end(day),
            };
            let hours = member_hours(&bucket);
            buckets.push(HoursBucket {
                label: day.format("%a %b %-d").to_string(),
                hours,
                target: 8.0,
                overtime: hours > DAILY_OVERTIME_HOURS,
            });
            day += Duration::days(1);
        }
    } else {
        let mut start = range.start.date_naive();
        let last = range.end.date_naive();
        while start <= last {
            let end = (start + Duration::days(6)).min(last);
            let bucket = DateRange {
                start: day_start(start),
                end: day_end(end),
            };
            let hours = member_hours(&bucket);
            buckets.push(HoursBucket {
                label: start.format("%b %-d").to_string(),
                hours,
                target: WEEKLY_OVERTIME_HOURS,
                overtime: hours > WEEKLY_OVERTIME_HOURS,
            });
            start += Duration::days(7);
        }
    }
    buckets
}

/// Up to the ten most-recently-updated tasks assigned to the member whose
/// last update falls inside the window.
fn recent_tasks(member_id: i64, tasks: &[Task], range: &DateRange) -> Vec<RecentTask> {
    let mut recent: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.assigned_to(member_id) && range.contains(t.updated_at))
        .collect();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent
        .into_iter()
        .take(10)
        .map(|t| RecentTask {
            id: t.id,
            title: t.title.clone(),
            status: t.status,
            priority: t.priority,
            due_date: t.due_date,
            updated_at: t.updated_at.to_rfc3339(),
        })
        .collect()
}

/// The comprehensive profile behind the member endpoint.
pub fn full_profile(
    member: &Member,
    role: &'static str,
    tasks: &[Task],
    entries: &[TimesheetEntry],
    scope: &ScopedQuery,
) -> MemberDetailFull {
    MemberDetailFull {
        profile: base_profile(member, role, tasks, entries, scope),
        hours_breakdown: hours_breakdown(member.id, entries, &scope.range),
        recent_tasks: recent_tasks(member.id, tasks, &scope.range),
        performance_history: trends::member_history(
            member.id,
            tasks,
            entries,
            scope.period,
            scope.now,
        ),
    }
}

pub async fn compute(
    db: &Database,
    scope: &ScopedQuery,
    roster: &Roster,
) -> Result<Vec<MemberDetail>> {
    let tasks = super::scoped_tasks(db, scope).await?;
    let entries = super::scoped_entries(db, scope).await?;
    Ok(roster
        .members
        .iter()
        .map(|m| base_profile(m, roster.role_of(m.id), &tasks, &entries, scope))
        .collect())
}

pub async fn compute_full(
    db: &Database,
    scope: &ScopedQuery,
    roster: &Roster,
    member_id: i64,
) -> Result<Option<MemberDetailFull>> {
    let Some(member) = roster.get(member_id) else {
        return Ok(None);
    };
    let tasks = super::scoped_tasks(db, scope).await?;
    let entries = super::scoped_entries(db, scope).await?;
    Ok(Some(full_profile(
        member,
        roster.role_of(member_id),
        &tasks,
        &entries,
        scope,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryStatus, Priority};
    use crate::query::{DashboardFilter, Period};
    use chrono::{DateTime, NaiveDate, Utc};

    fn now() -> DateTime<Utc> {
        // Friday, March 14
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn scope() -> ScopedQuery {
        ScopedQuery::new(1, &DashboardFilter::default(), now())
    }

    fn member() -> Member {
        Member {
            id: 1,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            avatar_url: None,
        }
    }

    fn task(id: i64, status: TaskStatus, priority: Priority) -> Task {
        Task {
            id,
            project_id: 1,
            title: format!("Task {id}"),
            status,
            priority,
            due_date: None,
            created_at: now() - Duration::days(5),
            updated_at: now(),
            assignee_ids: vec![1],
        }
    }

    fn entry(id: i64, date: NaiveDate, hours: f64) -> TimesheetEntry {
        TimesheetEntry {
            id,
            task_id: 1,
            user_id: 1,
            date,
            hours,
            status: EntryStatus::Approved,
            updated_at: now(),
        }
    }

    #[test]
    fn test_base_profile_counts() {
        let mut overdue = task(1, TaskStatus::InProgress, Priority::High);
        overdue.due_date = Some(now().date_naive() - Duration::days(1));
        let tasks = vec![
            overdue,
            task(2, TaskStatus::Todo, Priority::Medium),
            task(3, TaskStatus::Review, Priority::Low),
            task(4, TaskStatus::Done, Priority::High),
            task(5, TaskStatus::Done, Priority::Low),
        ];
        let profile = base_profile(&member(), "member", &tasks, &[], &scope());

        assert_eq!(profile.active_tasks, 3);
        assert_eq!(profile.by_status.todo, 1);
        assert_eq!(profile.by_status.in_progress, 1);
        assert_eq!(profile.by_status.review, 1);
        assert_eq!(profile.by_priority.high, 1);
        assert_eq!(profile.by_priority.medium, 1);
        assert_eq!(profile.by_priority.low, 1);
        assert_eq!(profile.done_this_week, 2);
        assert_eq!(profile.overdue, 1);
        // 2 done in window / (2 done + 3 active)
        assert_eq!(profile.completion_rate, 40.0);
        assert_eq!(profile.points_earned, 4);
    }

    #[test]
    fn test_daily_hours_cover_current_week() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let entries = vec![
            entry(1, monday, 4.0),
            entry(2, monday, 6.0),
            entry(3, monday + Duration::days(4), 8.0),
            // outside the current week
            entry(4, monday - Duration::days(1), 5.0),
        ];
        let profile = base_profile(&member(), "member", &[], &entries, &scope());

        assert_eq!(profile.daily_hours.len(), 7);
        assert_eq!(profile.daily_hours[0].label, "Mon");
        assert_eq!(profile.daily_hours[0].hours, 10.0);
        assert!(profile.daily_hours[0].overtime);
        assert_eq!(profile.daily_hours[4].hours, 8.0);
        assert!(!profile.daily_hours[4].overtime);
        assert_eq!(profile.weekly_hours, 18.0);
    }

    #[test]
    fn test_member_alerts() {
        let mut tasks: Vec<Task> = (1..=13)
            .map(|id| task(id, TaskStatus::InProgress, Priority::Low))
            .collect();
        tasks[0].due_date = Some(now().date_naive() - Duration::days(2));
        let profile = base_profile(&member(), "member", &tasks, &[], &scope());

        assert_eq!(profile.alerts.len(), 2);
        assert_eq!(profile.alerts[0].kind, "overdue");
        assert_eq!(profile.alerts[0].count, 1);
        assert_eq!(profile.alerts[1].kind, "overload");
        assert_eq!(profile.alerts[1].count, 13);
    }

    #[test]
    fn test_no_alerts_when_quiet() {
        let tasks = vec![task(1, TaskStatus::InProgress, Priority::Low)];
        let profile = base_profile(&member(), "member", &tasks, &[], &scope());
        assert!(profile.alerts.is_empty());
    }

    #[test]
    fn test_hours_breakdown_daily_for_short_windows() {
        let scope = scope(); // week: 7 days
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let entries = vec![entry(1, monday + Duration::days(1), 9.5)];
        let buckets = hours_breakdown(1, &entries, &scope.range);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].label, "Mon Mar 10");
        assert_eq!(buckets[0].target, 8.0);
        assert_eq!(buckets[1].hours, 9.5);
        assert!(buckets[1].overtime);
        assert!(!buckets[0].overtime);
    }

    #[test]
    fn test_hours_breakdown_weekly_for_long_windows() {
        let filter = DashboardFilter {
            period: Period::Custom,
            date_from: Some("2025-03-01".into()),
            date_to: Some("2025-03-31".into()),
            ..Default::default()
        };
        let scope = ScopedQuery::new(1, &filter, now());
        let entries = vec![
            entry(1, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), 41.0),
            entry(2, NaiveDate::from_ymd_opt(2025, 3, 30).unwrap(), 6.0),
        ];
        let buckets = hours_breakdown(1, &entries, &scope.range);

        // March 1..=31 in 7-day steps: 5 buckets, the last clipped to 3 days
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].label, "Mar 1");
        assert_eq!(buckets[0].target, 40.0);
        assert!(buckets[0].overtime);
        assert_eq!(buckets[4].label, "Mar 29");
        assert_eq!(buckets[4].hours, 6.0);
        assert!(!buckets[4].overtime);
    }

    #[test]
    fn test_recent_tasks_capped_at_ten_newest_first() {
        let scope = scope();
        let tasks: Vec<Task> = (1..=12)
            .map(|id| {
                let mut t = task(id, TaskStatus::InProgress, Priority::Low);
                t.updated_at = now() - Duration::hours(id);
                t
            })
            .collect();
        let recent = recent_tasks(1, &tasks, &scope.range);

        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, 1);
        assert_eq!(recent[9].id, 10);
        for pair in recent.windows(2) {
            assert!(pair[0].updated_at >= pair[1].updated_at);
        }
    }

    #[test]
    fn test_full_profile_history_has_eight_points_for_today() {
        let filter = DashboardFilter {
            period: Period::Today,
            ..Default::default()
        };
        let scope = ScopedQuery::new(1, &filter, now());
        let full = full_profile(&member(), "manager", &[], &[], &scope);
        assert_eq!(full.performance_history.len(), 8);
        assert!(full
            .performance_history
            .iter()
            .all(|p| p.hours_tracked.is_some()));
    }

    #[test]
    fn test_zero_denominator_completion_rate() {
        let profile = base_profile(&member(), "member", &[], &[], &scope());
        assert_eq!(profile.completion_rate, 0.0);
        assert_eq!(profile.points_earned, 0);
    }
}
