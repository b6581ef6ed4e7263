mod config_cmd;
mod exercise;
mod resolve;
mod set;
mod workout;

use clap::ValueEnum;
use ironlog_core::{JsonFileStore, WorkoutRepository};

pub use config_cmd::ConfigCommand;
pub use exercise::ExerciseCommand;
pub use set::SetCommand;
pub use workout::WorkoutCommand;

/// Repository backed by the configured data directory
pub type Repo = WorkoutRepository<JsonFileStore>;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
