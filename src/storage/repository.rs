use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{
    EntryStatus, Member, Priority, Project, Roster, Task, TaskStatus, TimesheetEntry, Workspace,
};

// ── Row parsing helpers ────────────────────────────────────────────

fn parse_instant(s: &str, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_date_opt(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

// ── Workspaces & roster ────────────────────────────────────────────

pub fn upsert_workspace(conn: &Connection, ws: &Workspace) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO workspaces (id, name, manager_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, manager_id=excluded.manager_id",
        params![ws.id, ws.name, ws.manager_id],
    )?;
    Ok(())
}

pub fn fetch_workspace(
    conn: &Connection,
    workspace_id: i64,
) -> Result<Option<Workspace>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, name, manager_id FROM workspaces WHERE id = ?1",
        params![workspace_id],
        |row| {
            Ok(Workspace {
                id: row.get(0)?,
                name: row.get(1)?,
                manager_id: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn upsert_member(conn: &Connection, member: &Member) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO members (id, name, email, avatar_url) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
           name=excluded.name, email=excluded.email, avatar_url=excluded.avatar_url",
        params![member.id, member.name, member.email, member.avatar_url],
    )?;
    Ok(())
}

pub fn add_workspace_member(
    conn: &Connection,
    workspace_id: i64,
    member_id: i64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO workspace_members (workspace_id, member_id) VALUES (?1, ?2)",
        params![workspace_id, member_id],
    )?;
    Ok(())
}

/// Materialize the workspace roster: non-manager members ∪ the manager,
/// deduplicated by id. A missing workspace yields an empty roster.
pub fn fetch_roster(conn: &Connection, workspace_id: i64) -> Result<Roster, rusqlite::Error> {
    let manager_id: Option<i64> = conn
        .query_row(
            "SELECT manager_id FROM workspaces WHERE id = ?1",
            params![workspace_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(manager_id) = manager_id else {
        return Ok(Roster::default());
    };

    let mut stmt = conn.prepare(
        "SELECT m.id, m.name, m.email, m.avatar_url FROM members m
         WHERE m.id IN (
             SELECT member_id FROM workspace_members WHERE workspace_id = ?1
             UNION
             SELECT manager_id FROM workspaces WHERE id = ?1
         )
         ORDER BY m.id",
    )?;
    let members = stmt
        .query_map(params![workspace_id], |row| {
            Ok(Member {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                avatar_url: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Roster {
        members,
        manager_id,
    })
}

// ── Projects ───────────────────────────────────────────────────────

pub fn upsert_project(conn: &Connection, project: &Project) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO projects (id, workspace_id, name) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET workspace_id=excluded.workspace_id, name=excluded.name",
        params![project.id, project.workspace_id, project.name],
    )?;
    Ok(())
}

// ── Tasks ──────────────────────────────────────────────────────────

pub fn upsert_task(conn: &Connection, task: &Task) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO tasks (id, project_id, title, status, priority, due_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
           project_id=excluded.project_id, title=excluded.title, status=excluded.status,
           priority=excluded.priority, due_date=excluded.due_date,
           created_at=excluded.created_at, updated_at=excluded.updated_at",
        params![
            task.id,
            task.project_id,
            task.title,
            task.status.as_str(),
            task.priority.as_str(),
            task.due_date.map(|d| d.to_string()),
            task.created_at.to_rfc3339(),
            task.updated_at.to_rfc3339(),
        ],
    )?;

    conn.execute(
        "DELETE FROM task_assignees WHERE task_id = ?1",
        params![task.id],
    )?;
    for member_id in &task.assignee_ids {
        conn.execute(
            "INSERT OR IGNORE INTO task_assignees (task_id, member_id) VALUES (?1, ?2)",
            params![task.id, member_id],
        )?;
    }
    Ok(())
}

/// All tasks in the workspace, optionally restricted to one project,
/// with assignee ids attached.
pub fn fetch_tasks(
    conn: &Connection,
    workspace_id: i64,
    project_id: Option<i64>,
) -> Result<Vec<Task>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.project_id, t.title, t.status, t.priority, t.due_date,
                t.created_at, t.updated_at
         FROM tasks t
         JOIN projects p ON p.id = t.project_id
         WHERE p.workspace_id = ?1 AND (?2 IS NULL OR p.id = ?2)
         ORDER BY t.id",
    )?;
    let mut tasks = stmt
        .query_map(params![workspace_id, project_id], |row| {
            Ok(Task {
                id: row.get(0)?,
                project_id: row.get(1)?,
                title: row.get(2)?,
                status: TaskStatus::parse(&row.get::<_, String>(3)?),
                priority: Priority::parse(&row.get::<_, String>(4)?),
                due_date: parse_date_opt(row.get(5)?),
                created_at: parse_instant(&row.get::<_, String>(6)?, 6)?,
                updated_at: parse_instant(&row.get::<_, String>(7)?, 7)?,
                assignee_ids: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT ta.task_id, ta.member_id
         FROM task_assignees ta
         JOIN tasks t ON t.id = ta.task_id
         JOIN projects p ON p.id = t.project_id
         WHERE p.workspace_id = ?1 AND (?2 IS NULL OR p.id = ?2)
         ORDER BY ta.rowid",
    )?;
    let mut by_task: HashMap<i64, Vec<i64>> = HashMap::new();
    for row in stmt.query_map(params![workspace_id, project_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })? {
        let (task_id, member_id) = row?;
        by_task.entry(task_id).or_default().push(member_id);
    }
    for task in &mut tasks {
        if let Some(ids) = by_task.remove(&task.id) {
            task.assignee_ids = ids;
        }
    }
    Ok(tasks)
}

// ── Timesheet entries ──────────────────────────────────────────────

pub fn upsert_entry(conn: &Connection, entry: &TimesheetEntry) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO timesheet_entries (id, task_id, user_id, entry_date, hours, status, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           task_id=excluded.task_id, user_id=excluded.user_id, entry_date=excluded.entry_date,
           hours=excluded.hours, status=excluded.status, updated_at=excluded.updated_at",
        params![
            entry.id,
            entry.task_id,
            entry.user_id,
            entry.date.to_string(),
            entry.hours,
            entry.status.as_str(),
            entry.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All timesheet entries scoped transitively through task → project →
/// workspace, optionally restricted to one project.
pub fn fetch_entries(
    conn: &Connection,
    workspace_id: i64,
    project_id: Option<i64>,
) -> Result<Vec<TimesheetEntry>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.task_id, e.user_id, e.entry_date, e.hours, e.status, e.updated_at
         FROM timesheet_entries e
         JOIN tasks t ON t.id = e.task_id
         JOIN projects p ON p.id = t.project_id
         WHERE p.workspace_id = ?1 AND (?2 IS NULL OR p.id = ?2)
         ORDER BY e.id",
    )?;
    let entries = stmt
        .query_map(params![workspace_id, project_id], |row| {
            let date: String = row.get(3)?;
            Ok(TimesheetEntry {
                id: row.get(0)?,
                task_id: row.get(1)?,
                user_id: row.get(2)?,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
                hours: row.get(4)?,
                status: EntryStatus::parse(&row.get::<_, String>(5)?),
                updated_at: parse_instant(&row.get::<_, String>(6)?, 6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

// ── Activity feed streams ──────────────────────────────────────────

/// A task row projected for the activity feed, with the owning project's
/// name and the first assignee resolved.
#[derive(Debug, Clone)]
pub struct TaskEventRow {
    pub task_id: i64,
    pub title: String,
    pub project_name: String,
    pub status: TaskStatus,
    pub updated_at: DateTime<Utc>,
    pub assignee_name: Option<String>,
}

pub fn fetch_recent_tasks(
    conn: &Connection,
    workspace_id: i64,
    project_id: Option<i64>,
    limit: u32,
) -> Result<Vec<TaskEventRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.title, p.name, t.status, t.updated_at,
                (SELECT m.name FROM task_assignees ta
                 JOIN members m ON m.id = ta.member_id
                 WHERE ta.task_id = t.id ORDER BY ta.rowid LIMIT 1)
         FROM tasks t
         JOIN projects p ON p.id = t.project_id
         WHERE p.workspace_id = ?1 AND (?2 IS NULL OR p.id = ?2)
         ORDER BY t.updated_at DESC
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(params![workspace_id, project_id, limit], |row| {
            Ok(TaskEventRow {
                task_id: row.get(0)?,
                title: row.get(1)?,
                project_name: row.get(2)?,
                status: TaskStatus::parse(&row.get::<_, String>(3)?),
                updated_at: parse_instant(&row.get::<_, String>(4)?, 4)?,
                assignee_name: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// A timesheet row projected for the activity feed, with the logging
/// user's name and the task title resolved.
#[derive(Debug, Clone)]
pub struct EntryEventRow {
    pub entry_id: i64,
    pub task_title: String,
    pub user_name: String,
    pub hours: f64,
    pub updated_at: DateTime<Utc>,
}

pub fn fetch_recent_entries(
    conn: &Connection,
    workspace_id: i64,
    project_id: Option<i64>,
    limit: u32,
) -> Result<Vec<EntryEventRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT e.id, t.title, m.name, e.hours, e.updated_at
         FROM timesheet_entries e
         JOIN tasks t ON t.id = e.task_id
         JOIN projects p ON p.id = t.project_id
         JOIN members m ON m.id = e.user_id
         WHERE p.workspace_id = ?1 AND (?2 IS NULL OR p.id = ?2)
         ORDER BY e.updated_at DESC
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(params![workspace_id, project_id, limit], |row| {
            Ok(EntryEventRow {
                entry_id: row.get(0)?,
                task_title: row.get(1)?,
                user_name: row.get(2)?,
                hours: row.get(3)?,
                updated_at: parse_instant(&row.get::<_, String>(4)?, 4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Status ─────────────────────────────────────────────────────────

pub fn table_counts(conn: &Connection) -> Result<Vec<(String, i64)>, rusqlite::Error> {
    let mut counts = Vec::new();
    for table in [
        "workspaces",
        "members",
        "projects",
        "tasks",
        "timesheet_entries",
    ] {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        counts.push((table.to_string(), count));
    }
    Ok(counts)
}
