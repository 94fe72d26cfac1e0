pub mod entry;
pub mod history;
pub mod profile;
pub mod streak;
pub mod transfer;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use entry::{process_log_command, process_remove_command, LogCommand};
use history::{process_history_command, HistoryCommand};
use profile::{process_profile_command, ProfileCommand};
use streak::{process_streak_command, process_summary_command, StreakCommand};
use tracing::level_filters::LevelFilter;
use transfer::{process_export_command, process_import_command, ExportCommand};
use uuid::Uuid;

use crate::{
    storage::{profile::ProfileStorage, record_storage::RecordStorageImpl},
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, create_application_path},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Daystreak", version, long_about = None)]
#[command(about = "Daily weight log that keeps track of your streak", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record a weight measurement")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show current and best streak")]
    Streak {
        #[command(flatten)]
        command: StreakCommand,
    },
    #[command(about = "Show streak, goal progress, today's hint and latest entries")]
    Summary,
    #[command(about = "Show averaged weight history")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Export all measurements as CSV")]
    Export {
        #[command(flatten)]
        command: ExportCommand,
    },
    #[command(about = "Import measurements from a CSV file with date,weight,note columns")]
    Import { file: PathBuf },
    #[command(about = "Show or change profile settings")]
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    #[command(about = "Remove a measurement by its id")]
    Remove { id: Uuid },
}

/// Storage and time shared by all commands.
pub struct AppContext {
    pub records: RecordStorageImpl,
    pub profiles: ProfileStorage,
    pub clock: Box<dyn Clock>,
}

impl AppContext {
    pub fn new(dir: PathBuf, clock: Box<dyn Clock>) -> Result<Self> {
        Ok(Self {
            records: RecordStorageImpl::new(dir.join("records"))?,
            profiles: ProfileStorage::new(dir),
            clock,
        })
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => create_application_path(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    let context = AppContext::new(dir, Box::new(DefaultClock))?;

    match args.commands {
        Commands::Log { command } => process_log_command(&context, command).await,
        Commands::Streak { command } => process_streak_command(&context, command).await,
        Commands::Summary => process_summary_command(&context).await,
        Commands::History { command } => process_history_command(&context, command).await,
        Commands::Export { command } => process_export_command(&context, command).await,
        Commands::Import { file } => process_import_command(&context, &file).await,
        Commands::Profile { command } => process_profile_command(&context, command).await,
        Commands::Remove { id } => process_remove_command(&context, id).await,
    }
}
