use crate::date_util::round1;
use crate::error::Result;
use crate::model::{Task, TimesheetEntry};
use crate::query::{DateRange, ScopedQuery};
use crate::storage::Database;

use super::types::ProductivityMetrics;

fn completed_in(tasks: &[Task], range: &DateRange) -> u32 {
    tasks
        .iter()
        .filter(|t| t.status.is_done() && range.contains(t.updated_at))
        .count() as u32
}

fn hours_in(entries: &[TimesheetEntry], range: &DateRange) -> f64 {
    entries
        .iter()
        .filter(|e| range.contains_date(e.date))
        .map(|e| e.hours)
        .sum()
}

/// Percent change of completions. When the previous window is empty, any
/// current activity reads as +100%.
fn task_change(current: u32, previous: u32) -> f64 {
    if previous > 0 {
        round1((current as f64 - previous as f64) / previous as f64 * 100.0)
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}

/// Percent change of hours. Unlike `task_change`, an empty previous window
/// always reads as 0%, never +100%. The two functions intentionally differ.
fn hours_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        round1((current - previous) / previous * 100.0)
    } else {
        0.0
    }
}

pub fn metrics(tasks: &[Task], entries: &[TimesheetEntry], scope: &ScopedQuery) -> ProductivityMetrics {
    let completed_current = completed_in(tasks, &scope.range);
    let completed_previous = completed_in(tasks, &scope.previous);
    // Change is computed over the raw sums; rounding is display-only.
    let hours_current_raw = hours_in(entries, &scope.range);
    let hours_previous_raw = hours_in(entries, &scope.previous);

    let task_change = task_change(completed_current, completed_previous);
    let trend = if task_change > 0.0 {
        "up"
    } else if task_change < 0.0 {
        "down"
    } else {
        "stable"
    };

    ProductivityMetrics {
        completed_current,
        completed_previous,
        hours_current: round1(hours_current_raw),
        hours_previous: round1(hours_previous_raw),
        task_change,
        hours_change: hours_change(hours_current_raw, hours_previous_raw),
        trend,
    }
}

pub async fn compute(db: &Database, scope: &ScopedQuery) -> Result<ProductivityMetrics> {
    let tasks = super::scoped_tasks(db, scope).await?;
    let entries = super::scoped_entries(db, scope).await?;
    Ok(metrics(&tasks, &entries, scope))
}
