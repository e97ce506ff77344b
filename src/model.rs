use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a task. Everything except `Done` counts as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Revision,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Revision => "revision",
            TaskStatus::Done => "done",
        }
    }

    /// Parse a stored status string. Unknown values degrade to `todo`.
    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" => TaskStatus::InProgress,
            "review" => TaskStatus::Review,
            "revision" => TaskStatus::Revision,
            "done" => TaskStatus::Done,
            _ => TaskStatus::Todo,
        }
    }

    /// Human-readable form for activity descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Revision => "Revision",
            TaskStatus::Done => "Done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    pub fn is_active(&self) -> bool {
        !self.is_done()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a stored priority string. Unknown values weigh like `low`.
    pub fn parse(s: &str) -> Self {
        match s {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

/// Approval state of a timesheet entry. Carried through for consumers;
/// hour sums do not filter on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Submitted,
    Approved,
    Revision,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Submitted => "submitted",
            EntryStatus::Approved => "approved",
            EntryStatus::Revision => "revision",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "submitted" => EntryStatus::Submitted,
            "approved" => EntryStatus::Approved,
            "revision" => EntryStatus::Revision,
            _ => EntryStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assignee_ids: Vec<i64>,
}

impl Task {
    pub fn assigned_to(&self, member_id: i64) -> bool {
        self.assignee_ids.contains(&member_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub hours: f64,
    pub status: EntryStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub manager_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
}

/// The materialized member roster of a workspace: non-manager members plus
/// the single manager, deduplicated by id. Roles are derived, never stored.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub members: Vec<Member>,
    pub manager_id: i64,
}

impl Roster {
    pub fn role_of(&self, member_id: i64) -> &'static str {
        if member_id == self.manager_id {
            "manager"
        } else {
            "member"
        }
    }

    pub fn get(&self, member_id: i64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }
}

/// A complete workspace snapshot for ingestion (CLI `load`, tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceFixture {
    pub workspace: Workspace,
    pub members: Vec<Member>,
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub timesheet_entries: Vec<TimesheetEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Review,
            TaskStatus::Revision,
            TaskStatus::Done,
        ] {
            assert_eq!(TaskStatus::parse(s.as_str()), s);
        }
    }

    #[test]
    fn test_unknown_text_degrades() {
        assert_eq!(TaskStatus::parse("blocked"), TaskStatus::Todo);
        assert_eq!(Priority::parse("urgent"), Priority::Low);
        assert_eq!(EntryStatus::parse("rejected"), EntryStatus::Draft);
    }

    #[test]
    fn test_roster_roles() {
        let roster = Roster {
            members: vec![
                Member {
                    id: 1,
                    name: "Alice".into(),
                    email: "alice@example.com".into(),
                    avatar_url: None,
                },
                Member {
                    id: 2,
                    name: "Bob".into(),
                    email: "bob@example.com".into(),
                    avatar_url: None,
                },
            ],
            manager_id: 1,
        };
        assert_eq!(roster.role_of(1), "manager");
        assert_eq!(roster.role_of(2), "member");
        assert_eq!(roster.get(2).unwrap().name, "Bob");
        assert!(roster.get(99).is_none());
    }
}
