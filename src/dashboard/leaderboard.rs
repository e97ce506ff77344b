use crate::date_util::round1;
use crate::error::Result;
use crate::model::{Member, Priority, Roster, Task};
use crate::query::{DateRange, ScopedQuery};
use crate::storage::Database;

use super::types::LeaderboardEntry;

/// Priority weights for completion points. A deliberately distinct scale
/// from `workload::workload_weight`; the two tables must never be merged.
pub(crate) fn point_weight(priority: Priority) -> u32 {
    match priority {
        Priority::High => 3,
        Priority::Medium => 2,
        Priority::Low => 1,
    }
}

/// A completed task counts as on time when it has no due date or was last
/// updated on or before it.
pub(crate) fn completed_on_time(task: &Task) -> bool {
    match task.due_date {
        None => true,
        Some(due) => task.updated_at.date_naive() <= due,
    }
}

fn entry_for(member: &Member, tasks: &[Task], range: &DateRange) -> LeaderboardEntry {
    let done: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status.is_done() && t.assigned_to(member.id) && range.contains(t.updated_at))
        .collect();
    let points: u32 = done.iter().map(|t| point_weight(t.priority)).sum();
    let on_time = done.iter().filter(|t| completed_on_time(t)).count();
    let on_time_rate = if done.is_empty() {
        0.0
    } else {
        round1(on_time as f64 / done.len() as f64 * 100.0)
    };
    LeaderboardEntry {
        member_id: member.id,
        name: member.name.clone(),
        tasks_completed: done.len() as u32,
        points,
        on_time_rate,
        rank: 0,
    }
}

/// Rank the roster by points over done tasks updated inside the window.
/// The sort is stable, so tied members keep their roster order; ranks are
/// dense 1-based positions and never skip.
pub fn rank_members(roster: &[Member], tasks: &[Task], range: &DateRange) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = roster
        .iter()
        .map(|m| entry_for(m, tasks, range))
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as u32;
    }
    entries
}

pub async fn compute(
    db: &Database,
    scope: &ScopedQuery,
    roster: &Roster,
) -> Result<Vec<LeaderboardEntry>> {
    let tasks = super::scoped_tasks(db, scope).await?;
    Ok(rank_members(&roster.members, &tasks, &scope.range))
}
