pub mod dashboard;
pub mod date_util;
pub mod error;
pub mod model;
pub mod query;
pub mod storage;

pub use dashboard::{DashboardPayload, MemberDetailFull};
pub use error::{Error, Result};
pub use model::{Member, Roster, Task, TimesheetEntry, Workspace, WorkspaceFixture};
pub use query::period::Period;
pub use query::scope::{DashboardFilter, ProjectFilter, ScopedQuery};
pub use storage::Database;

use chrono::{DateTime, Utc};

use storage::repository;

/// Main entry point for the team performance dashboard.
pub struct TeamPulse {
    db: Database,
}

impl TeamPulse {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open against the default database path (`~/.teampulse/teampulse.db`).
    pub async fn open() -> Result<Self> {
        Ok(Self::new(Database::open().await?))
    }

    pub async fn open_at(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(Database::open_at(path).await?))
    }

    /// In-memory instance (for testing).
    pub async fn open_memory() -> Result<Self> {
        Ok(Self::new(Database::open_memory().await?))
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Ingest a complete workspace snapshot in one transaction. Existing
    /// rows are upserted, so loading the same fixture twice is a no-op.
    pub async fn import(&self, fixture: &WorkspaceFixture) -> Result<()> {
        let fixture = fixture.clone();
        self.db
            .writer()
            .call(move |conn| {
                let tx = conn.transaction()?;
                repository::upsert_workspace(&tx, &fixture.workspace)?;
                for member in &fixture.members {
                    repository::upsert_member(&tx, member)?;
                    repository::add_workspace_member(&tx, fixture.workspace.id, member.id)?;
                }
                for project in &fixture.projects {
                    repository::upsert_project(&tx, project)?;
                }
                for task in &fixture.tasks {
                    repository::upsert_task(&tx, task)?;
                }
                for entry in &fixture.timesheet_entries {
                    repository::upsert_entry(&tx, entry)?;
                }
                tx.commit()?;
                Ok::<(), rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }

    /// Compute the full nine-section dashboard payload. Never fails as a
    /// whole: a section that cannot be computed is returned as its
    /// documented zero-value default.
    pub async fn dashboard(
        &self,
        workspace_id: i64,
        filter: &DashboardFilter,
        now: DateTime<Utc>,
    ) -> DashboardPayload {
        let scope = ScopedQuery::new(workspace_id, filter, now);
        let roster = match self.fetch_roster(workspace_id).await {
            Ok(roster) => roster,
            Err(e) => {
                log::error!("roster unavailable ({}): {e}", scope.describe());
                Roster::default()
            }
        };
        dashboard::assemble(&self.db, &scope, &roster).await
    }

    /// Comprehensive profile for one member, or `None` when the member is
    /// not on the workspace roster.
    pub async fn member_detail(
        &self,
        workspace_id: i64,
        member_id: i64,
        filter: &DashboardFilter,
        now: DateTime<Utc>,
    ) -> Result<Option<MemberDetailFull>> {
        let scope = ScopedQuery::new(workspace_id, filter, now);
        let roster = self.fetch_roster(workspace_id).await?;
        dashboard::member_detail::compute_full(&self.db, &scope, &roster, member_id).await
    }

    pub async fn roster(&self, workspace_id: i64) -> Result<Roster> {
        self.fetch_roster(workspace_id).await
    }

    /// Row counts per table, for the CLI `status` command.
    pub async fn status(&self) -> Result<Vec<(String, i64)>> {
        let counts = self
            .db
            .reader()
            .call(|conn| repository::table_counts(conn))
            .await?;
        Ok(counts)
    }

    async fn fetch_roster(&self, workspace_id: i64) -> Result<Roster> {
        let roster = self
            .db
            .reader()
            .call(move |conn| repository::fetch_roster(conn, workspace_id))
            .await?;
        Ok(roster)
    }
}
