use std::io::Read;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use workstats::{
    Database, ProjectAnalytics, ProjectSubmission, ServerConfig, TaskAnalytics, TaskSubmission,
    WorkStats,
};

#[derive(Parser)]
#[command(name = "workstats", about = "Per-user project and task analytics")]
struct Cli {
    /// Database path (default: ~/.workstats/workstats.db)
    #[arg(long, env = "WORKSTATS_DB")]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "WORKSTATS_BIND", default_value = workstats::DEFAULT_BIND)]
        bind: SocketAddr,
    },
    /// Project analytics
    Projects {
        #[command(subcommand)]
        action: AnalyticsAction,
    },
    /// Task analytics
    Tasks {
        #[command(subcommand)]
        action: AnalyticsAction,
    },
    /// Show store status
    Status,
}

#[derive(Subcommand)]
enum AnalyticsAction {
    /// Show the stored aggregate for a user (created empty if absent)
    Show {
        user_id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a user's snapshots with a JSON array read from a file
    Submit {
        user_id: Uuid,
        /// Path to the JSON array, or `-` for stdin
        #[arg(long, default_value = "-")]
        file: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
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

    let db = match &cli.db {
        Some(path) => Database::open_at(path).await?,
        None => Database::open().await?,
    };
    let ws = WorkStats::new(db);

    match cli.command {
        Commands::Serve { bind } => {
            ws.serve(ServerConfig { bind_addr: bind }).await?;
        }
        Commands::Projects { action } => handle_projects(&ws, action).await?,
        Commands::Tasks { action } => handle_tasks(&ws, action).await?,
        Commands::Status => print_status(&ws).await?,
    }
    Ok(())
}

async fn handle_projects(ws: &WorkStats, action: AnalyticsAction) -> anyhow::Result<()> {
    match action {
        AnalyticsAction::Show { user_id, json } => {
            let a = ws.project_analytics(user_id).await?;
            print_project_analytics(&a, json)?;
        }
        AnalyticsAction::Submit { user_id, file, json } => {
            let items: Vec<ProjectSubmission> = read_submissions(&file)?;
            if items.is_empty() {
                let removed = ws.clear_projects(user_id).await?;
                println!("Cleared {removed} project snapshots for {user_id}");
                return Ok(());
            }
            let a = ws.replace_projects(user_id, &items).await?;
            print_project_analytics(&a, json)?;
        }
    }
    Ok(())
}

async fn handle_tasks(ws: &WorkStats, action: AnalyticsAction) -> anyhow::Result<()> {
    match action {
        AnalyticsAction::Show { user_id, json } => {
            let a = ws.task_analytics(user_id).await?;
            print_task_analytics(&a, json)?;
        }
        AnalyticsAction::Submit { user_id, file, json } => {
            let items: Vec<TaskSubmission> = read_submissions(&file)?;
            let a = if items.is_empty() {
                let removed = ws.clear_tasks(user_id).await?;
                log::info!("Cleared {removed} task snapshots for {user_id}");
                TaskAnalytics::empty(user_id)
            } else {
                ws.replace_tasks(user_id, &items).await?
            };
            print_task_analytics(&a, json)?;
        }
    }
    Ok(())
}

fn read_submissions<T: DeserializeOwned>(file: &str) -> anyhow::Result<Vec<T>> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_json::from_str(&raw)?;
    Ok(items.unwrap_or_default())
}

async fn print_status(ws: &WorkStats) -> anyhow::Result<()> {
    let s = ws.status().await?;
    println!("Store Status");
    println!("  Project snapshots: {}", s.project_snapshots);
    println!("  Task snapshots:    {}", s.task_snapshots);
    println!("  Project analytics: {}", s.project_analytics);
    println!("  Task analytics:    {}", s.task_analytics);
    Ok(())
}

fn print_project_analytics(a: &ProjectAnalytics, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(a)?);
        return Ok(());
    }
    println!("Project Analytics: {}", a.user_id);
    println!("  Current:");
    println!("    Total:      {}", a.total_projects);
    println!("    Active:     {}", a.active_projects);
    println!("    Completed:  {}", a.completed_projects);
    println!("    Overdue:    {}", a.overdue_projects);
    println!("    Progress:   {}%", a.average_progress);
    println!("  Lifetime:");
    println!("    Total:      {}", a.total_projects_lifetime);
    println!(
        "    Completed:  {} ({:.1}%)",
        a.completed_projects_lifetime, a.project_completion_rate_lifetime
    );
    println!("    Abandoned:  {}", a.abandoned_projects_lifetime);
    println!("    Avg length: {} days", a.average_project_duration_lifetime);
    Ok(())
}

fn print_task_analytics(a: &TaskAnalytics, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(a)?);
        return Ok(());
    }
    println!("Task Analytics: {}", a.user_id);
    println!("  Current:");
    println!("    Total:       {}", a.total_tasks);
    println!("    To do:       {}", a.todo_tasks);
    println!("    In progress: {}", a.in_progress_tasks);
    println!("    Completed:   {} ({:.1}%)", a.completed_tasks, a.completion_rate);
    println!("    Overdue:     {}", a.overdue_tasks);
    println!("    Avg time:    {:.1} days", a.avg_completion_time);
    println!(
        "    Priority:    {} low / {} medium / {} high",
        a.low_priority_count, a.medium_priority_count, a.high_priority_count
    );
    println!("  Lifetime:");
    println!("    Total:       {}", a.lifetime_total_tasks);
    println!(
        "    Completed:   {} ({}%)",
        a.lifetime_completed_tasks, a.lifetime_completion_rate
    );
    println!("    Abandoned:   {}", a.lifetime_abandoned_tasks);
    println!("    Overdue:     {}", a.lifetime_overdue_tasks);
    println!("    Avg time:    {:.1} days", a.lifetime_average_completion_time);
    println!("    Fastest:     {} hours", a.fastest_completion_time);
    Ok(())
}
