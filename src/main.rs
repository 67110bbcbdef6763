use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};

use class_sheets_lib::commands::{self, AppState, CommandError};
use class_sheets_lib::config::Config;
use class_sheets_lib::notify::{ConsoleNotifier, Notifier};

/// Maintain per-class sheets in a classroom workbook and generate
/// per-student replicas of a template sheet.
#[derive(Parser)]
#[command(name = "class-sheets", version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Editor granted on protected sheets (defaults to the signed-in account)
    #[arg(long, global = true, value_name = "EMAIL")]
    user: Option<String>,

    /// More output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create, protect and label the sheets for new roster classes
    CreateClasses {
        #[arg(long)]
        spreadsheet: String,
    },
    /// Copy the template into a new spreadsheet for the student on a sheet
    Replicate {
        #[arg(long)]
        spreadsheet: String,
        /// Sheet holding the student's data
        #[arg(long)]
        sheet: String,
    },
    /// Remove whole-sheet protections from the listed class sheets
    RemoveProtections {
        #[arg(long)]
        spreadsheet: String,
    },
    /// Re-apply the class-sheet protection to existing class sheets
    Reprotect {
        #[arg(long)]
        spreadsheet: String,
    },
    /// Write a config file with the defaults
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    if let Command::InitConfig { force } = cli.command {
        return commands::init_config(cli.config.as_deref(), force)
            .map(|_| ())
            .map_err(|e| {
                ConsoleNotifier.alert(e.message());
                e
            });
    }

    let state = Config::load(cli.config.as_deref())
        .map_err(CommandError::from)
        .and_then(|config| AppState::from_config(config, cli.user))
        .map_err(|e| {
            ConsoleNotifier.alert(e.message());
            e
        })?;

    match cli.command {
        Command::CreateClasses { spreadsheet } => {
            let outcome = commands::create_classes(&state, spreadsheet).await?;
            if outcome.nothing_created() {
                println!("No new class to create.");
            }
            for sheet in &outcome.created {
                println!("Created {}", sheet.name);
            }
        }
        Command::Replicate { spreadsheet, sheet } => {
            let outcome = commands::replicate(&state, spreadsheet, sheet).await?;
            println!("{}", outcome.url);
        }
        Command::RemoveProtections { spreadsheet } => {
            let outcome = commands::remove_protections(&state, spreadsheet).await?;
            println!("Removed {} protection(s)", outcome.removed);
        }
        Command::Reprotect { spreadsheet } => {
            let outcome = commands::reprotect(&state, spreadsheet).await?;
            println!("Protected {} sheet(s)", outcome.added);
        }
        Command::InitConfig { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("[main] {}", e);
            ExitCode::FAILURE
        }
    }
}
