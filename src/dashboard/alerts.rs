use chrono::Duration;

use crate::error::Result;
use crate::model::{Roster, Task, TaskStatus};
use crate::query::ScopedQuery;
use crate::storage::Database;

use super::types::{Alert, CriticalAlerts, WorkloadStatus};
use super::workload;

/// Tasks sitting in review longer than this raise a warning.
const REVIEW_STALL_DAYS: i64 = 3;

/// Name up to the first two members, collapsing the rest to "and N more".
fn member_phrase(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [a, b] => format!("{a} and {b}"),
        [a, b, rest @ ..] => format!("{a}, {b} and {} more", rest.len()),
    }
}

fn overdue_alert(tasks: &[Task], scope: &ScopedQuery) -> Option<Alert> {
    let today = scope.now.date_naive();
    let count = tasks
        .iter()
        .filter(|t| t.status.is_active() && t.due_date.is_some_and(|d| d < today))
        .count() as u32;
    (count > 0).then(|| Alert {
        kind: "overdue",
        message: format!("{count} task(s) are overdue"),
        count,
    })
}

fn overloaded_alert(scores: &[super::types::WorkloadScore]) -> Option<Alert> {
    let overloaded: Vec<&str> = scores
        .iter()
        .filter(|s| s.status == WorkloadStatus::Overloaded)
        .map(|s| s.name.as_str())
        .collect();
    let count = overloaded.len() as u32;
    (count > 0).then(|| {
        let verb = if count == 1 { "is" } else { "are" };
        Alert {
            kind: "overload",
            message: format!("{} {verb} overloaded", member_phrase(&overloaded)),
            count,
        }
    })
}

fn review_stall_alert(tasks: &[Task], scope: &ScopedQuery) -> Option<Alert> {
    let cutoff = scope.now - Duration::days(REVIEW_STALL_DAYS);
    let count = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Review && t.updated_at < cutoff)
        .count() as u32;
    (count > 0).then(|| Alert {
        kind: "review_stall",
        message: format!("{count} task(s) stuck in review for {REVIEW_STALL_DAYS}+ days"),
        count,
    })
}

fn revision_alert(tasks: &[Task]) -> Option<Alert> {
    let count = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Revision)
        .count() as u32;
    (count > 0).then(|| Alert {
        kind: "revision",
        message: format!("{count} task(s) awaiting revision"),
        count,
    })
}

/// Raised only when more than one member is underutilized; a single idle
/// member is not a staffing signal.
fn underutilized_alert(scores: &[super::types::WorkloadScore]) -> Option<Alert> {
    let idle: Vec<&str> = scores
        .iter()
        .filter(|s| s.status == WorkloadStatus::Underutilized)
        .map(|s| s.name.as_str())
        .collect();
    let count = idle.len() as u32;
    (count > 1).then(|| Alert {
        kind: "underutilized",
        message: format!("{} appear underutilized", member_phrase(&idle)),
        count,
    })
}

/// Run every detector over the scope. Each rule inspects the data on its
/// own; one rule yielding nothing never suppresses the others.
pub fn detect(tasks: &[Task], roster: &Roster, scope: &ScopedQuery) -> CriticalAlerts {
    let scores: Vec<super::types::WorkloadScore> = roster
        .members
        .iter()
        .map(|m| workload::score_member(m, tasks))
        .collect();

    let urgent = [overdue_alert(tasks, scope), overloaded_alert(&scores)]
        .into_iter()
        .flatten()
        .collect();
    let warnings = [
        review_stall_alert(tasks, scope),
        revision_alert(tasks),
        underutilized_alert(&scores),
    ]
    .into_iter()
    .flatten()
    .collect();

    CriticalAlerts { urgent, warnings }
}

pub async fn compute(
    db: &Database,
    scope: &ScopedQuery,
    roster: &Roster,
) -> Result<CriticalAlerts> {
    let tasks = super::scoped_tasks(db, scope).await?;
    Ok(detect(&tasks, roster, scope))
}
