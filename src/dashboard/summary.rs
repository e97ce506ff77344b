use crate::date_util::round1;
use crate::error::Result;
use crate::model::{Roster, Task, TaskStatus, TimesheetEntry};
use crate::query::ScopedQuery;
use crate::storage::Database;

use super::types::{TaskOverview, TeamSummary};

/// Team composition plus headline counters. Composition reads the current
/// board; completions and hours use the active window.
pub fn team_summary(
    roster: &Roster,
    tasks: &[Task],
    entries: &[TimesheetEntry],
    scope: &ScopedQuery,
) -> TeamSummary {
    TeamSummary {
        total_members: roster.members.len() as u32,
        manager_name: roster.get(roster.manager_id).map(|m| m.name.clone()),
        active_tasks: tasks.iter().filter(|t| t.status.is_active()).count() as u32,
        completed_in_period: tasks
            .iter()
            .filter(|t| t.status.is_done() && scope.range.contains(t.updated_at))
            .count() as u32,
        hours_in_period: round1(
            entries
                .iter()
                .filter(|e| scope.range.contains_date(e.date))
                .map(|e| e.hours)
                .sum(),
        ),
    }
}

/// Task-state histogram over everything in scope, regardless of window.
pub fn task_overview(tasks: &[Task]) -> TaskOverview {
    let mut overview = TaskOverview {
        total: tasks.len() as u32,
        ..Default::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Todo => overview.todo += 1,
            TaskStatus::InProgress => overview.in_progress += 1,
            TaskStatus::Review => overview.review += 1,
            TaskStatus::Revision => overview.revision += 1,
            TaskStatus::Done => overview.done += 1,
        }
    }
    if overview.total > 0 {
        overview.completion_rate =
            round1(overview.done as f64 / overview.total as f64 * 100.0);
    }
    overview
}

pub async fn compute_summary(
    db: &Database,
    scope: &ScopedQuery,
    roster: &Roster,
) -> Result<TeamSummary> {
    let tasks = super::scoped_tasks(db, scope).await?;
    let entries = super::scoped_entries(db, scope).await?;
    Ok(team_summary(roster, &tasks, &entries, scope))
}

pub async fn compute_overview(db: &Database, scope: &ScopedQuery) -> Result<TaskOverview> {
    let tasks = super::scoped_tasks(db, scope).await?;
    Ok(task_overview(&tasks))
}
