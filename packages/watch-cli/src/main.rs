//! Command-line front end for competitor page monitoring.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use competitor_watch::{
    ChangeSummary, Competitor, HttpFetcher, Monitor, OpenAiBackend, PipelineConfig, Snapshot,
    SqliteStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

type CliMonitor = Monitor<HttpFetcher, SqliteStore, OpenAiBackend>;

#[derive(Parser)]
#[command(name = "competitor-watch")]
#[command(about = "Track strategic changes on competitor web pages")]
struct Cli {
    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a competitor page
    Add { url: String },

    /// List registered competitors
    List,

    /// Fetch a competitor page and record what changed
    Check { id: i64 },

    /// Check every registered competitor
    CheckAll,

    /// Show recent snapshots for a competitor
    History {
        id: i64,
        /// Number of snapshots to show
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },

    /// Remove a competitor and its history
    Remove { id: i64 },

    /// Show database and LLM availability
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,competitor_watch=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let monitor = build_monitor(config).await?;

    match cli.command {
        Commands::Add { url } => cmd_add(&monitor, &url, cli.json).await,
        Commands::List => cmd_list(&monitor, cli.json).await,
        Commands::Check { id } => cmd_check(&monitor, id, cli.json).await,
        Commands::CheckAll => cmd_check_all(&monitor, cli.json).await,
        Commands::History { id, limit } => cmd_history(&monitor, id, limit, cli.json).await,
        Commands::Remove { id } => cmd_remove(&monitor, id).await,
        Commands::Status => cmd_status(&monitor, cli.json).await,
    }
}

async fn build_monitor(config: Config) -> Result<CliMonitor> {
    let store = SqliteStore::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    let fetcher = HttpFetcher::with_timeout(config.fetch_timeout)
        .context("Failed to create HTTP client")?;

    if config.credentials.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, change summaries will be unavailable");
    }
    let backend = config.credentials.map(OpenAiBackend::new);

    Ok(Monitor::new(fetcher, store, backend)
        .with_config(PipelineConfig::new().with_fetch_timeout(config.fetch_timeout)))
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_add(monitor: &CliMonitor, url: &str, json: bool) -> Result<()> {
    let competitor = monitor.add_competitor(url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&competitor)?);
    } else {
        println!(
            "{} {} ({})",
            "Watching".bright_green().bold(),
            competitor.name.bold(),
            competitor.url
        );
        println!("  id: {}", competitor.id);
    }
    Ok(())
}

async fn cmd_list(monitor: &CliMonitor, json: bool) -> Result<()> {
    let competitors = monitor.list_competitors().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&competitors)?);
        return Ok(());
    }

    if competitors.is_empty() {
        println!("{}", "No competitors registered yet.".dimmed());
        return Ok(());
    }

    for competitor in &competitors {
        print_competitor(competitor);
    }
    Ok(())
}

async fn cmd_check(monitor: &CliMonitor, id: i64, json: bool) -> Result<()> {
    let snapshot = monitor
        .check(id)
        .await
        .with_context(|| format!("Check failed for competitor {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

async fn cmd_check_all(monitor: &CliMonitor, json: bool) -> Result<()> {
    let outcomes = monitor.check_all().await?;

    if json {
        let results: Vec<_> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(snapshot) => serde_json::json!({
                    "competitor_id": outcome.competitor.id,
                    "snapshot": snapshot,
                }),
                Err(e) => serde_json::json!({
                    "competitor_id": outcome.competitor.id,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for outcome in &outcomes {
        print_competitor(&outcome.competitor);
        match &outcome.result {
            Ok(snapshot) => print_snapshot(snapshot),
            Err(e) => println!("  {} {}", "✗".bright_red(), e),
        }
        println!();
    }
    Ok(())
}

async fn cmd_history(monitor: &CliMonitor, id: i64, limit: usize, json: bool) -> Result<()> {
    let snapshots = monitor.history(id, Some(limit)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("{}", "No snapshots yet. Run `check` first.".dimmed());
    }
    for snapshot in &snapshots {
        print_snapshot(snapshot);
        println!();
    }
    Ok(())
}

async fn cmd_remove(monitor: &CliMonitor, id: i64) -> Result<()> {
    monitor.remove_competitor(id).await?;
    println!("{} competitor {}", "Removed".bright_yellow(), id);
    Ok(())
}

async fn cmd_status(monitor: &CliMonitor, json: bool) -> Result<()> {
    let status = monitor.status().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let paint = |value: &str| {
        if value == "ok" || value == "connected" {
            value.bright_green()
        } else {
            value.bright_red()
        }
    };
    println!("backend:  {}", paint(&status.backend));
    println!("database: {}", paint(&status.database));
    println!("llm:      {}", paint(&status.llm));
    Ok(())
}

// ============================================================================
// Formatting
// ============================================================================

fn print_competitor(competitor: &Competitor) {
    println!(
        "{} {} {}",
        format!("[{}]", competitor.id).bright_cyan(),
        competitor.name.bold(),
        competitor.url.dimmed()
    );
}

fn print_snapshot(snapshot: &Snapshot) {
    let changes = &snapshot.change_set;
    println!(
        "{} {}  {} {}",
        "Snapshot".bold(),
        snapshot.id,
        snapshot.timestamp.format("%Y-%m-%d %H:%M UTC").to_string().dimmed(),
        format!(
            "+{} -{}",
            changes.lines_added_count, changes.lines_removed_count
        )
        .bright_magenta()
    );

    match &snapshot.summary {
        ChangeSummary::Error { error } => println!("  {} {}", "!".bright_red(), error),
        ChangeSummary::Message { message } => println!("  {}", message.dimmed()),
        ChangeSummary::Categorized(categorized) if categorized.is_empty() => {
            println!("  {}", ChangeSummary::NO_CHANGES.dimmed())
        }
        ChangeSummary::Categorized(categorized) => {
            for (category, items) in categorized.categories() {
                if items.is_empty() {
                    continue;
                }
                println!("  {}", category.to_uppercase().bright_yellow().bold());
                for item in items {
                    println!("    • {}", item);
                }
            }
        }
    }
}
