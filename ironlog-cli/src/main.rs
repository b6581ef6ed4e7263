use clap::{Parser, Subcommand};
use ironlog_core::{JsonFileStore, WorkoutRepository};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use commands::{ConfigCommand, ExerciseCommand, SetCommand, WorkoutCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "ironlog")]
#[command(version)]
#[command(about = "A strength training log for the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start, finish and browse workouts
    Workout(WorkoutCommand),

    /// Add, remove and reorder exercises
    Exercise(ExerciseCommand),

    /// Log and edit sets
    Set(SetCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--format json` output stays parseable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;
    tracing::debug!("Data directory: {}", config.data_dir.value.display());

    execute_command(&cli.command, &config, cli_config_path)
}

fn execute_command(
    command: &Option<Commands>,
    config: &Config,
    cli_config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = || WorkoutRepository::new(JsonFileStore::new(config.data_dir.value.clone()));

    match command {
        Some(Commands::Workout(cmd)) => {
            let repo = repo();
            let mut current = repo.load_current();
            let result = cmd.run(&repo, &mut current, config);
            save_if_dirty(&repo, &mut current);
            result?;
        }
        Some(Commands::Exercise(cmd)) => {
            let repo = repo();
            let mut current = repo.load_current();
            let result = cmd.run(&repo, &mut current);
            save_if_dirty(&repo, &mut current);
            result?;
        }
        Some(Commands::Set(cmd)) => {
            let repo = repo();
            let mut current = repo.load_current();
            let result = cmd.run(&repo, &mut current);
            save_if_dirty(&repo, &mut current);
            result?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(config, cli_config_path)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Persists the current-workout pointer if the command moved it, even when
/// the command itself failed afterwards.
fn save_if_dirty(repo: &commands::Repo, current: &mut ironlog_core::CurrentWorkout) {
    if current.is_dirty() {
        repo.save_current(current);
    }
}
