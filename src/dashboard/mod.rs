//! The dashboard aggregators. Each submodule computes one section of the
//! payload as a pure function over rows it fetched itself; `assemble` runs
//! them concurrently and applies the fault policy so a failed section
//! degrades to its zero-value default instead of sinking the request.

pub mod activity;
pub mod alerts;
pub mod leaderboard;
pub mod member_detail;
pub mod productivity;
pub mod summary;
pub mod trends;
pub mod types;
pub mod workload;

pub use types::{DashboardPayload, MemberDetailFull};

use crate::error::Result;
use crate::model::{Roster, Task, TimesheetEntry};
use crate::query::ScopedQuery;
use crate::storage::{repository, Database};

/// All tasks visible to the scope's workspace/project filter.
pub(crate) async fn scoped_tasks(db: &Database, scope: &ScopedQuery) -> Result<Vec<Task>> {
    let ws = scope.workspace_id;
    let pid = scope.project_id();
    let tasks = db
        .reader()
        .call(move |conn| repository::fetch_tasks(conn, ws, pid))
        .await?;
    Ok(tasks)
}

/// All timesheet entries visible to the scope, joined transitively through
/// their tasks' projects.
pub(crate) async fn scoped_entries(
    db: &Database,
    scope: &ScopedQuery,
) -> Result<Vec<TimesheetEntry>> {
    let ws = scope.workspace_id;
    let pid = scope.project_id();
    let entries = db
        .reader()
        .call(move |conn| repository::fetch_entries(conn, ws, pid))
        .await?;
    Ok(entries)
}

/// The fault policy: a failed section logs and degrades to its default.
/// Centralized here so every section is handled the same way and the
/// policy itself can be tested.
fn section_or_default<T: Default>(section: &str, scope: &ScopedQuery, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("{section} failed ({}): {e}", scope.describe());
            T::default()
        }
    }
}

/// Compute every dashboard section concurrently and assemble the payload.
/// Infallible: each section independently falls back to its default.
pub async fn assemble(db: &Database, scope: &ScopedQuery, roster: &Roster) -> DashboardPayload {
    let (
        team_summary,
        task_overview,
        metrics,
        distribution,
        board,
        critical,
        members,
        trend_points,
        feed,
    ) = tokio::join!(
        summary::compute_summary(db, scope, roster),
        summary::compute_overview(db, scope),
        productivity::compute(db, scope),
        workload::compute(db, scope, roster),
        leaderboard::compute(db, scope, roster),
        alerts::compute(db, scope, roster),
        member_detail::compute(db, scope, roster),
        trends::compute(db, scope),
        activity::compute(db, scope),
    );

    DashboardPayload {
        team_summary: section_or_default("teamSummary", scope, team_summary),
        task_overview_stats: section_or_default("taskOverviewStats", scope, task_overview),
        productivity_metrics: section_or_default("productivityMetrics", scope, metrics),
        workload_distribution: section_or_default("workloadDistribution", scope, distribution),
        team_leaderboard: section_or_default("teamLeaderboard", scope, board),
        critical_alerts: section_or_default("criticalAlerts", scope, critical),
        member_details: section_or_default("memberDetails", scope, members),
        productivity_trends: section_or_default("productivityTrends", scope, trend_points),
        recent_activities: section_or_default("recentActivities", scope, feed),
    }
}
