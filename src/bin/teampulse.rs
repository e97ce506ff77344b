use clap::{Parser, Subcommand};

use teampulse::{DashboardFilter, Period, ProjectFilter, TeamPulse, WorkspaceFixture};

#[derive(Parser)]
#[command(name = "teampulse", about = "Team performance dashboard CLI")]
struct Cli {
    /// Database path (default: ~/.teampulse/teampulse.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a workspace snapshot from a JSON file
    Load {
        /// Path to the fixture file
        file: String,
    },
    /// Compute the dashboard payload for a workspace
    Dashboard {
        /// Workspace id
        #[arg(long)]
        workspace: i64,
        /// Project filter: 'all' or a numeric project id
        #[arg(long, default_value = "all")]
        project: String,
        /// Period: today, week, month, or custom
        #[arg(long, default_value = "week")]
        period: String,
        /// Window start (YYYY-MM-DD, period=custom only)
        #[arg(long)]
        from: Option<String>,
        /// Window end (YYYY-MM-DD, period=custom only)
        #[arg(long)]
        to: Option<String>,
    },
    /// Comprehensive profile for one member
    Member {
        /// Member id
        #[arg(value_name = "MEMBER_ID")]
        member_id: i64,
        /// Workspace id
        #[arg(long)]
        workspace: i64,
        /// Project filter: 'all' or a numeric project id
        #[arg(long, default_value = "all")]
        project: String,
        /// Period: today, week, month, or custom
        #[arg(long, default_value = "week")]
        period: String,
        /// Window start (YYYY-MM-DD, period=custom only)
        #[arg(long)]
        from: Option<String>,
        /// Window end (YYYY-MM-DD, period=custom only)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show database status
    Status,
}

fn build_filter(
    project: &str,
    period: &str,
    from: Option<String>,
    to: Option<String>,
) -> anyhow::Result<DashboardFilter> {
    Ok(DashboardFilter {
        project: ProjectFilter::parse(project)?,
        period: Period::parse(period),
        date_from: from,
        date_to: to,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let tp = match &cli.db {
        Some(path) => TeamPulse::open_at(path).await?,
        None => TeamPulse::open().await?,
    };

    match cli.command {
        Commands::Load { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let fixture: WorkspaceFixture = serde_json::from_str(&raw)?;
            tp.import(&fixture).await?;
            println!(
                "Loaded workspace {} ({}): {} members, {} projects, {} tasks, {} entries",
                fixture.workspace.id,
                fixture.workspace.name,
                fixture.members.len(),
                fixture.projects.len(),
                fixture.tasks.len(),
                fixture.timesheet_entries.len(),
            );
        }
        Commands::Dashboard {
            workspace,
            project,
            period,
            from,
            to,
        } => {
            let filter = build_filter(&project, &period, from, to)?;
            let payload = tp.dashboard(workspace, &filter, chrono::Utc::now()).await;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Member {
            member_id,
            workspace,
            project,
            period,
            from,
            to,
        } => {
            let filter = build_filter(&project, &period, from, to)?;
            match tp
                .member_detail(workspace, member_id, &filter, chrono::Utc::now())
                .await?
            {
                Some(detail) => println!("{}", serde_json::to_string_pretty(&detail)?),
                None => anyhow::bail!("member {member_id} is not on workspace {workspace}'s roster"),
            }
        }
        Commands::Status => {
            for (table, count) in tp.status().await? {
                println!("{table:20} {count}");
            }
        }
    }

    Ok(())
}
