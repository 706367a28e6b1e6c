mod commands;
mod render;
mod utils;

use std::env;

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use taskcal_core::{AppState, LocalStore, PostgrestRemote, Priority, TaskCalConfig, User};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::utils::tui::create_spinner;

/// The app as the CLI runs it: tasks synced through PostgREST when a
/// `[remote]` table is configured, local-only otherwise.
pub type App = AppState<PostgrestRemote>;

#[derive(Parser)]
#[command(name = "taskcal")]
#[command(about = "Plan to-do tasks on a month calendar, synced to a hosted table")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an email address (no password, this only labels your tasks)
    Login { email: String },
    Logout,
    /// Show who is logged in and whether the remote store is reachable
    Status,
    /// Show a month grid with task previews
    Month {
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Month number, 1-12
        #[arg(long, requires = "year")]
        month: Option<u32>,

        /// Show the month after the current one
        #[arg(long, conflicts_with_all = ["prev", "year"])]
        next: bool,

        /// Show the month before the current one
        #[arg(long, conflicts_with = "year")]
        prev: bool,
    },
    /// List the tasks of a day
    Day {
        /// YYYY-MM-DD, "today", "tomorrow" or "yesterday"
        date: String,
    },
    Add {
        /// YYYY-MM-DD, "today", "tomorrow" or "yesterday"
        date: String,

        text: String,

        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },
    /// Mark a task done, or open again
    Toggle {
        date: String,

        /// Task number as shown by `taskcal day`
        index: usize,
    },
    Delete {
        date: String,

        /// Task number as shown by `taskcal day`
        index: usize,
    },
    /// Reload tasks from the remote store
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut app = open_app()?;

    match cli.command {
        Commands::Login { email } => commands::login::run(&mut app, &email).await,
        Commands::Logout => commands::logout::run(&mut app),
        Commands::Status => commands::status::run(&mut app).await,
        Commands::Month {
            year,
            month,
            next,
            prev,
        } => {
            require_user(&mut app).await?;
            let month = commands::month::resolve(year, month, next, prev)?;
            commands::month::run(&app, month)
        }
        Commands::Day { date } => {
            require_user(&mut app).await?;
            commands::day::run(&app, parse_day(&date)?)
        }
        Commands::Add {
            date,
            text,
            priority,
        } => {
            require_user(&mut app).await?;
            commands::add::run(&mut app, parse_day(&date)?, &text, priority).await
        }
        Commands::Toggle { date, index } => {
            require_user(&mut app).await?;
            commands::toggle::run(&mut app, parse_day(&date)?, to_index(index)?).await
        }
        Commands::Delete { date, index } => {
            require_user(&mut app).await?;
            commands::delete::run(&mut app, parse_day(&date)?, to_index(index)?).await
        }
        Commands::Sync => {
            require_user(&mut app).await?;
            commands::sync::run(&mut app).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKCAL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "taskcal=debug,info"
        } else {
            "taskcal=warn"
        })
    });

    let format = env::var("TASKCAL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn open_app() -> Result<App> {
    let config = TaskCalConfig::load()?;
    let store = LocalStore::new(config.data_path());

    tracing::debug!(
        data_dir = %store.dir().display(),
        remote = config.remote.is_some(),
        "config loaded"
    );

    let remote = match &config.remote {
        Some(remote_config) => Some(PostgrestRemote::new(remote_config)?),
        None => None,
    };

    Ok(AppState::new(store, remote))
}

/// Resume the remembered user and load their tasks.
async fn require_user(app: &mut App) -> Result<User> {
    let spinner = app.has_remote().then(|| create_spinner("Loading tasks...".into()));
    let user = app.resume().await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match user {
        Some(user) => Ok(user),
        None => anyhow::bail!(
            "Not logged in.\n\n\
            Log in with:\n  \
            taskcal login <email>"
        ),
    }
}

/// Parse a day argument: an ISO date or a word relative to today.
fn parse_day(input: &str) -> Result<NaiveDate> {
    let today = Local::now().date_naive();

    let day = match input.trim().to_lowercase().as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    };

    day.ok_or_else(|| {
        anyhow::anyhow!("Invalid date '{input}'. Use YYYY-MM-DD, today, tomorrow or yesterday")
    })
}

/// Task numbers on the command line start at 1.
fn to_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Task numbers start at 1"))
}
