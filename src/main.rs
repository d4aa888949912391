mod commands;
mod render;
mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use careercal_core::filter::SortKey;
use careercal_core::settings::Settings;
use careercal_core::{Category, Priority};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "careercal")]
#[command(about = "Plan career events, expand recurring ones and track your progress")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event
    Add {
        title: String,

        /// Start date/time in your timezone (e.g., "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// Duration (e.g., "30m", "1h 30m")
        #[arg(short, long, default_value = "1h")]
        duration: String,

        #[arg(short, long, default_value = "task")]
        category: Category,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Repeat rule (e.g., "FREQ=WEEKLY;BYDAY=MO,WE;COUNT=8")
        #[arg(short, long)]
        repeat: Option<String>,

        /// Minutes before start to remind (repeatable)
        #[arg(long = "remind")]
        reminders: Vec<u32>,

        /// Create the event even if it overlaps others
        #[arg(short, long)]
        force: bool,
    },
    /// List events, with recurring ones expanded
    List {
        /// Show events from this date (YYYY-MM-DD, or "start" for all past events)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        #[arg(short, long)]
        category: Vec<Category>,

        #[arg(short, long)]
        priority: Vec<Priority>,

        /// Text to search for in summary, description and location
        #[arg(short = 'q', long)]
        search: Option<String>,

        #[arg(long)]
        hide_completed: bool,

        #[arg(long)]
        hide_cancelled: bool,

        /// Only events created from drafts
        #[arg(long)]
        ai: bool,

        #[arg(long, default_value_t = SortKey::StartAsc)]
        sort: SortKey,

        #[arg(long)]
        json: bool,
    },
    /// Show the instances of a recurring event
    Expand {
        id: String,

        /// Most instances to show (defaults to max_instances from config)
        #[arg(short, long)]
        max: Option<usize>,
    },
    /// Explain a repeat rule in words
    Describe { rrule: String },
    /// Find events that overlap a time slot or an existing event
    Conflicts {
        /// Event id to check
        #[arg(conflicts_with = "start")]
        id: Option<String>,

        /// Start of the slot to check
        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long, default_value = "1h")]
        duration: String,
    },
    /// Completion, streak and productivity overview
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Deliver reminders that are due now
    Reminders {
        /// Only show what is due, without marking reminders as sent
        #[arg(long)]
        dry_run: bool,
    },
    /// Write events as an iCalendar file
    Export {
        /// File to write (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read events from an iCalendar file
    Import { path: PathBuf },
    /// Create an event from a JSON draft ("-" reads stdin)
    Draft { path: PathBuf },
    /// Mark an event as completed
    Done {
        id: String,

        /// Mark it as not completed instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete an event
    Delete { id: String },
    /// Show config paths and current settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let settings = Settings::load().context("Could not load settings")?;

    match cli.command {
        Commands::Add {
            title,
            start,
            duration,
            category,
            priority,
            location,
            description,
            repeat,
            reminders,
            force,
        } => commands::add::run(
            &settings,
            commands::add::NewEvent {
                title,
                start,
                duration,
                category,
                priority,
                location,
                description,
                repeat,
                reminders,
            },
            force,
        ),
        Commands::List {
            from,
            to,
            category,
            priority,
            search,
            hide_completed,
            hide_cancelled,
            ai,
            sort,
            json,
        } => commands::list::run(
            &settings,
            commands::list::ListArgs {
                from,
                to,
                categories: category,
                priorities: priority,
                search,
                show_completed: !hide_completed,
                show_cancelled: !hide_cancelled,
                ai_suggested_only: ai,
                sort,
                json,
            },
        ),
        Commands::Expand { id, max } => {
            commands::expand::run(&settings, &id, max.unwrap_or(settings.max_instances))
        }
        Commands::Describe { rrule } => commands::describe::run(&rrule),
        Commands::Conflicts {
            id,
            start,
            duration,
        } => match (id, start) {
            (Some(id), _) => commands::conflicts::run_for_event(&settings, &id),
            (None, Some(start)) => commands::conflicts::run_for_slot(&settings, &start, &duration),
            (None, None) => anyhow::bail!("Give an event id or --start to check for conflicts"),
        },
        Commands::Stats { json } => commands::stats::run(&settings, json),
        Commands::Reminders { dry_run } => commands::reminders::run(&settings, dry_run),
        Commands::Export { output } => commands::export::run(&settings, output.as_deref()),
        Commands::Import { path } => commands::import::run(&settings, &path),
        Commands::Draft { path } => commands::draft::run(&settings, &path),
        Commands::Done { id, undo } => commands::done::run(&settings, &id, !undo),
        Commands::Delete { id } => commands::delete::run(&settings, &id),
        Commands::Config => commands::config::run(&settings),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    Ok(())
}
