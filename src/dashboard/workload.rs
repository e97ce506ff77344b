use crate::date_util::round1;
use crate::error::Result;
use crate::model::{Member, Priority, Roster, Task};
use crate::query::ScopedQuery;
use crate::storage::Database;

use super::types::{WorkloadDistribution, WorkloadScore, WorkloadStatus};

/// Priority weights for load scoring. This is deliberately a different
/// table from the leaderboard's point weights (`leaderboard::point_weight`);
/// the two scales must never be merged.
pub(crate) fn workload_weight(priority: Priority) -> f64 {
    match priority {
        Priority::High => 3.0,
        Priority::Medium => 1.5,
        Priority::Low => 1.0,
    }
}

/// Weighted score that counts as a full working load.
const FULL_LOAD_SCORE: f64 = 15.0;

/// Reported percentages saturate at this value.
const PERCENTAGE_CAP: f64 = 200.0;

const OVERLOADED_ABOVE: f64 = 120.0;
const UNDERUTILIZED_BELOW: f64 = 40.0;

/// Classify a load percentage. Both thresholds are exclusive: exactly 120
/// is still `normal`.
pub(crate) fn classify(percentage: f64) -> WorkloadStatus {
    if percentage > OVERLOADED_ABOVE {
        WorkloadStatus::Overloaded
    } else if percentage < UNDERUTILIZED_BELOW {
        WorkloadStatus::Underutilized
    } else {
        WorkloadStatus::Normal
    }
}

/// Score one member over their active tasks in scope.
pub fn score_member(member: &Member, tasks: &[Task]) -> WorkloadScore {
    let active: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status.is_active() && t.assigned_to(member.id))
        .collect();
    let total_score: f64 = active.iter().map(|t| workload_weight(t.priority)).sum();
    let percentage = round1(total_score / FULL_LOAD_SCORE * 100.0).min(PERCENTAGE_CAP);
    WorkloadScore {
        member_id: member.id,
        name: member.name.clone(),
        task_count: active.len() as u32,
        total_score,
        percentage,
        status: classify(percentage),
    }
}

/// Score the whole roster and summarize the spread, sorted by descending
/// load percentage.
pub fn distribution(roster: &[Member], tasks: &[Task]) -> WorkloadDistribution {
    let mut members: Vec<WorkloadScore> =
        roster.iter().map(|m| score_member(m, tasks)).collect();
    members.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let overloaded_count = members
        .iter()
        .filter(|s| s.status == WorkloadStatus::Overloaded)
        .count() as u32;
    let underutilized_count = members
        .iter()
        .filter(|s| s.status == WorkloadStatus::Underutilized)
        .count() as u32;

    WorkloadDistribution {
        members,
        overloaded_count,
        underutilized_count,
        needs_rebalancing: overloaded_count > 0 || underutilized_count > 1,
    }
}

pub async fn compute(
    db: &Database,
    scope: &ScopedQuery,
    roster: &Roster,
) -> Result<WorkloadDistribution> {
    let tasks = super::scoped_tasks(db, scope).await?;
    Ok(distribution(&roster.members, &tasks))
}
