use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::query::period::{self, DateRange, Period};

/// Project restriction within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    #[default]
    All,
    Id(i64),
}

impl ProjectFilter {
    /// Parse the caller-supplied `project_id` parameter: `"all"` or a
    /// numeric id.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(ProjectFilter::All);
        }
        s.parse::<i64>()
            .map(ProjectFilter::Id)
            .map_err(|_| Error::FilterParse(format!("project_id must be 'all' or numeric, got {s:?}")))
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            ProjectFilter::All => None,
            ProjectFilter::Id(id) => Some(*id),
        }
    }
}

/// Caller-supplied dashboard parameters, before resolution.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub project: ProjectFilter,
    pub period: Period,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// The immutable per-request scope shared read-only by every aggregator:
/// workspace, project restriction, resolved current and comparison windows,
/// and the injected clock. Constructed once, never mutated.
#[derive(Debug, Clone)]
pub struct ScopedQuery {
    pub workspace_id: i64,
    pub project: ProjectFilter,
    pub period: Period,
    pub range: DateRange,
    pub previous: DateRange,
    pub now: DateTime<Utc>,
}

impl ScopedQuery {
    pub fn new(workspace_id: i64, filter: &DashboardFilter, now: DateTime<Utc>) -> Self {
        let range = period::resolve(
            filter.period,
            filter.date_from.as_deref(),
            filter.date_to.as_deref(),
            now,
        );
        ScopedQuery {
            workspace_id,
            project: filter.project,
            period: filter.period,
            range,
            previous: range.previous(),
            now,
        }
    }

    pub fn project_id(&self) -> Option<i64> {
        self.project.id()
    }

    /// Context string for fault logging.
    pub fn describe(&self) -> String {
        format!(
            "workspace={} project={} period={} range={}..{}",
            self.workspace_id,
            match self.project {
                ProjectFilter::All => "all".to_string(),
                ProjectFilter::Id(id) => id.to_string(),
            },
            self.period,
            self.range.start.to_rfc3339(),
            self.range.end.to_rfc3339(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_project_filter_parse() {
        assert_eq!(ProjectFilter::parse("all").unwrap(), ProjectFilter::All);
        assert_eq!(ProjectFilter::parse("All").unwrap(), ProjectFilter::All);
        assert_eq!(ProjectFilter::parse("42").unwrap(), ProjectFilter::Id(42));
        assert!(ProjectFilter::parse("everything").is_err());
    }

    #[test]
    fn test_scope_resolves_both_windows() {
        let filter = DashboardFilter {
            period: Period::Week,
            ..Default::default()
        };
        let scope = ScopedQuery::new(7, &filter, now());
        assert_eq!(scope.workspace_id, 7);
        assert_eq!(scope.range.span_days(), 6);
        assert_eq!(scope.previous, scope.range.previous());
        assert!(scope.previous.start < scope.range.start);
    }

    #[test]
    fn test_default_filter_is_week_all_projects() {
        let filter = DashboardFilter::default();
        assert_eq!(filter.period, Period::Week);
        assert_eq!(filter.project, ProjectFilter::All);
    }
}
