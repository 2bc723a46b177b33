mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "daygrid")]
#[command(about = "Shareable month calendar with hourly notes")]
struct Cli {
    /// Calendar id override (defaults to the configured calendar)
    #[arg(short, long, global = true)]
    calendar: Option<String>,

    /// Data directory override
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month grid
    Month {
        /// Month to show (YYYY-MM, defaults to the current month)
        month: Option<String>,
    },
    /// Show the hour slots of one day
    Day {
        /// Day to show (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },
    /// Write one slot's note (empty text clears the slot)
    Set {
        /// Day of the slot (YYYY-MM-DD)
        date: String,
        /// Hour of the slot (7-22)
        hour: String,
        /// Note text
        text: String,
    },
    /// Clear one slot
    Clear {
        /// Day of the slot (YYYY-MM-DD)
        date: String,
        /// Hour of the slot (7-22)
        hour: String,
    },
    /// Walk through every slot of a day, then save the whole day
    Edit {
        /// Day to edit (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },
    /// Live month view that follows backend changes
    Watch {
        /// Month to watch (YYYY-MM, defaults to the current month)
        month: Option<String>,
    },
    /// Copy the calendar's share link to the clipboard
    Share,
    /// Adopt a shared calendar (accepts a share URL or a bare id)
    Open {
        /// Share link or calendar id
        link: String,
    },
    /// Show backend mode, calendar id and paths
    Info,
    /// Check connectivity against the active backend
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // `open` rewrites the config, so it runs before the context resolves
    // (and possibly persists) a calendar id.
    if let Commands::Open { link } = &cli.command {
        return commands::open::run(link);
    }

    let ctx = commands::Context::resolve(cli.calendar.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Month { month } => commands::month::run(&ctx, month.as_deref()).await,
        Commands::Day { date } => commands::day::run(&ctx, date.as_deref()).await,
        Commands::Set { date, hour, text } => commands::set::run(&ctx, &date, &hour, &text).await,
        Commands::Clear { date, hour } => commands::set::run(&ctx, &date, &hour, "").await,
        Commands::Edit { date } => commands::edit::run(&ctx, date.as_deref()).await,
        Commands::Watch { month } => commands::watch::run(&ctx, month.as_deref()).await,
        Commands::Share => commands::share::run(&ctx).await,
        Commands::Open { .. } => unreachable!("handled above"),
        Commands::Info => commands::info::run(&ctx),
        Commands::Ping => commands::ping::run(&ctx).await,
    }
}
