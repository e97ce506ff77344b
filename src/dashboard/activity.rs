use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::query::ScopedQuery;
use crate::storage::repository::{EntryEventRow, TaskEventRow};
use crate::storage::Database;

use super::types::ActivityEvent;

/// Each source stream contributes up to this many events before the merge.
const FEED_FETCH_LIMIT: u32 = 5;

/// The merged feed never exceeds this many entries.
const FEED_LIMIT: usize = 10;

fn task_event(row: &TaskEventRow) -> (DateTime<Utc>, ActivityEvent) {
    let user = row
        .assignee_name
        .clone()
        .unwrap_or_else(|| "Unassigned".to_string());
    let (kind, description) = if row.status.is_done() {
        (
            "completed",
            format!("\"{}\" in {} was completed", row.title, row.project_name),
        )
    } else {
        (
            "status",
            format!(
                "\"{}\" in {} moved to {}",
                row.title,
                row.project_name,
                row.status.label()
            ),
        )
    };
    (
        row.updated_at,
        ActivityEvent {
            id: format!("task-{}", row.task_id),
            title: row.title.clone(),
            description,
            kind,
            time: row.updated_at.to_rfc3339(),
            user,
        },
    )
}

fn entry_event(row: &EntryEventRow) -> (DateTime<Utc>, ActivityEvent) {
    (
        row.updated_at,
        ActivityEvent {
            id: format!("timesheet-{}", row.entry_id),
            title: row.task_title.clone(),
            description: format!(
                "{} logged {}h on \"{}\"",
                row.user_name, row.hours, row.task_title
            ),
            kind: "timesheet",
            time: row.updated_at.to_rfc3339(),
            user: row.user_name.clone(),
        },
    )
}

/// Merge the two event streams into one feed, newest first, capped at ten.
pub fn merge(task_rows: &[TaskEventRow], entry_rows: &[EntryEventRow]) -> Vec<ActivityEvent> {
    let mut timed: Vec<(DateTime<Utc>, ActivityEvent)> = task_rows
        .iter()
        .map(task_event)
        .chain(entry_rows.iter().map(entry_event))
        .collect();
    timed.sort_by(|a, b| b.0.cmp(&a.0));
    timed
        .into_iter()
        .take(FEED_LIMIT)
        .map(|(_, event)| event)
        .collect()
}

pub async fn compute(db: &Database, scope: &ScopedQuery) -> Result<Vec<ActivityEvent>> {
    let ws = scope.workspace_id;
    let pid = scope.project_id();
    let task_rows = db
        .reader()
        .call(move |conn| {
            crate::storage::repository::fetch_recent_tasks(conn, ws, pid, FEED_FETCH_LIMIT)
        })
        .await?;
    let entry_rows = db
        .reader()
        .call(move |conn| {
            crate::storage::repository::fetch_recent_entries(conn, ws, pid, FEED_FETCH_LIMIT)
        })
        .await?;
    Ok(merge(&task_rows, &entry_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use chrono::{Duration, NaiveDate};

    fn base() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn task_row(id: i64, status: TaskStatus, at: DateTime<Utc>) -> TaskEventRow {
        TaskEventRow {
            task_id: id,
            title: format!("Task {id}"),
            project_name: "Website".into(),
            status,
            updated_at: at,
            assignee_name: Some("Alice".into()),
        }
    }

    fn entry_row(id: i64, at: DateTime<Utc>) -> EntryEventRow {
        EntryEventRow {
            entry_id: id,
            task_title: format!("Task {id}"),
            user_name: "Bob".into(),
            hours: 2.5,
            updated_at: at,
        }
    }

    #[test]
    fn test_merge_caps_at_ten_strictly_descending() {
        let tasks: Vec<TaskEventRow> = (0..6)
            .map(|i| task_row(i, TaskStatus::InProgress, base() - Duration::minutes(2 * i)))
            .collect();
        let entries: Vec<EntryEventRow> = (0..6)
            .map(|i| entry_row(i, base() - Duration::minutes(2 * i + 1)))
            .collect();

        let feed = merge(&tasks, &entries);
        assert_eq!(feed.len(), 10);
        for pair in feed.windows(2) {
            let a = DateTime::parse_from_rfc3339(&pair[0].time).unwrap();
            let b = DateTime::parse_from_rfc3339(&pair[1].time).unwrap();
            assert!(a > b);
        }
        // Interleaved sources, newest overall first
        assert_eq!(feed[0].id, "task-0");
        assert_eq!(feed[1].id, "timesheet-0");
    }

    #[test]
    fn test_completed_task_event() {
        let feed = merge(&[task_row(7, TaskStatus::Done, base())], &[]);
        assert_eq!(feed[0].kind, "completed");
        assert_eq!(feed[0].description, "\"Task 7\" in Website was completed");
        assert_eq!(feed[0].user, "Alice");
        assert_eq!(feed[0].time, "2025-03-14T12:00:00+00:00");
    }

    #[test]
    fn test_status_change_event_names_the_state() {
        let feed = merge(&[task_row(3, TaskStatus::Review, base())], &[]);
        assert_eq!(feed[0].kind, "status");
        assert_eq!(feed[0].description, "\"Task 3\" in Website moved to Review");
    }

    #[test]
    fn test_unassigned_task_event() {
        let mut row = task_row(1, TaskStatus::InProgress, base());
        row.assignee_name = None;
        let feed = merge(&[row], &[]);
        assert_eq!(feed[0].user, "Unassigned");
    }

    #[test]
    fn test_timesheet_event() {
        let feed = merge(&[], &[entry_row(9, base())]);
        assert_eq!(feed[0].id, "timesheet-9");
        assert_eq!(feed[0].kind, "timesheet");
        assert_eq!(feed[0].description, "Bob logged 2.5h on \"Task 9\"");
        assert_eq!(feed[0].user, "Bob");
    }

    #[test]
    fn test_empty_sources_empty_feed() {
        assert!(merge(&[], &[]).is_empty());
    }
}
