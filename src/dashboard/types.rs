use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Priority, TaskStatus};

/// The complete dashboard response. Every section is present on every
/// request; a failed section carries its documented zero-value default.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub team_summary: TeamSummary,
    pub task_overview_stats: TaskOverview,
    pub productivity_metrics: ProductivityMetrics,
    pub workload_distribution: WorkloadDistribution,
    pub team_leaderboard: Vec<LeaderboardEntry>,
    pub critical_alerts: CriticalAlerts,
    pub member_details: Vec<MemberDetail>,
    pub productivity_trends: Vec<TrendPoint>,
    pub recent_activities: Vec<ActivityEvent>,
}

/// Team composition plus headline counters for the window.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub total_members: u32,
    pub manager_name: Option<String>,
    pub active_tasks: u32,
    pub completed_in_period: u32,
    pub hours_in_period: f64,
}

/// Task-state histogram over the current board.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOverview {
    pub total: u32,
    pub todo: u32,
    pub in_progress: u32,
    pub review: u32,
    pub revision: u32,
    pub done: u32,
    pub completion_rate: f64,
}

/// Period-over-period completion and hours comparison.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityMetrics {
    pub completed_current: u32,
    pub completed_previous: u32,
    pub hours_current: f64,
    pub hours_previous: f64,
    pub task_change: f64,
    pub hours_change: f64,
    pub trend: &'static str,
}

impl Default for ProductivityMetrics {
    fn default() -> Self {
        ProductivityMetrics {
            completed_current: 0,
            completed_previous: 0,
            hours_current: 0.0,
            hours_previous: 0.0,
            task_change: 0.0,
            hours_change: 0.0,
            trend: "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    Normal,
    Overloaded,
    Underutilized,
}

/// One member's load score against the fixed full-load reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadScore {
    pub member_id: i64,
    pub name: String,
    pub task_count: u32,
    pub total_score: f64,
    pub percentage: f64,
    pub status: WorkloadStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDistribution {
    pub members: Vec<WorkloadScore>,
    pub overloaded_count: u32,
    pub underutilized_count: u32,
    pub needs_rebalancing: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub member_id: i64,
    pub name: String,
    pub tasks_completed: u32,
    pub points: u32,
    pub on_time_rate: f64,
    /// Dense 1-based position after the points sort; ties keep roster order.
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalAlerts {
    pub urgent: Vec<Alert>,
    pub warnings: Vec<Alert>,
}

/// Active-task counts by workflow state (done tracked separately).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub todo: u32,
    pub in_progress: u32,
    pub review: u32,
    pub revision: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

/// One day of the fixed Mon–Sun breakdown in a member profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub date: NaiveDate,
    pub label: String,
    pub hours: f64,
    pub overtime: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    pub member_id: i64,
    pub name: String,
    pub role: &'static str,
    pub avatar_url: Option<String>,
    pub active_tasks: u32,
    pub by_status: StatusBreakdown,
    pub by_priority: PriorityBreakdown,
    pub done_this_week: u32,
    pub overdue: u32,
    pub completion_rate: f64,
    pub points_earned: u32,
    pub weekly_hours: f64,
    pub daily_hours: Vec<DayHours>,
    pub alerts: Vec<Alert>,
}

/// A window-adaptive hours bucket in the comprehensive member profile:
/// daily with an 8-hour target for windows up to 14 days, weekly with a
/// 40-hour target beyond that.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursBucket {
    pub label: String,
    pub hours: f64,
    pub target: f64,
    pub overtime: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTask {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub updated_at: String,
}

/// The comprehensive per-member profile: the base profile plus hours
/// breakdown, recent tasks, and performance history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailFull {
    #[serde(flatten)]
    pub profile: MemberDetail,
    pub hours_breakdown: Vec<HoursBucket>,
    pub recent_tasks: Vec<RecentTask>,
    pub performance_history: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub tasks_completed: u32,
    pub points_earned: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_tracked: Option<f64>,
}

/// One entry of the merged activity feed. `time` is always an absolute
/// RFC 3339 instant; display formatting is the consumer's job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub time: String,
    pub user: String,
}
