use clap::{Args, Subcommand, ValueEnum};
use ironlog_core::{
    CurrentWorkout, MetaChanges, NewWorkout, RepeatOptions, ReplaceWith, Workout, WorkoutFilter,
};
use std::io::Read;
use std::path::PathBuf;

use super::resolve::{parse_date, parse_timestamp, resolve_workout};
use super::{OutputFormat, Repo};
use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Done,
}

impl From<&StatusFilter> for WorkoutFilter {
    fn from(status: &StatusFilter) -> Self {
        match status {
            StatusFilter::All => WorkoutFilter::All,
            StatusFilter::Draft => WorkoutFilter::OnlyDraft,
            StatusFilter::Done => WorkoutFilter::OnlyDone,
        }
    }
}

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Start a new workout and make it current
    Start {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Workout name (defaults to the configured workout_name)
        #[arg(long, short)]
        name: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Start even if another workout is in progress
        #[arg(long)]
        force: bool,
    },

    /// List workouts, newest first
    List {
        #[arg(long, short, value_enum, default_value = "all")]
        status: StatusFilter,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a workout (defaults to the one in progress)
    Show {
        id: Option<String>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change a workout's date, name or notes
    Meta {
        /// Workout ID (defaults to the one in progress)
        id: Option<String>,

        #[arg(long, short)]
        date: Option<String>,

        /// New name (empty string clears it)
        #[arg(long, short)]
        name: Option<String>,

        /// New notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a workout as done
    Finish {
        /// Workout ID (defaults to the one in progress)
        id: Option<String>,

        /// Completion time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Discard a workout that has not been finished
    Cancel {
        /// Workout ID (defaults to the one in progress)
        id: Option<String>,
    },

    /// Delete any workout, finished or not
    Delete { id: String },

    /// Start a new workout with the same exercises and sets as another
    Repeat {
        /// Workout ID to copy
        source: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Name (defaults to the source's name)
        #[arg(long, short)]
        name: Option<String>,
    },

    /// Replace a workout's content from a JSON file ('-' reads stdin)
    Replace {
        id: String,

        #[arg(long, short)]
        file: PathBuf,
    },

    /// Show finished workouts, most recently completed first
    History {
        /// Maximum number of workouts to show
        #[arg(long, short)]
        limit: Option<usize>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WorkoutCommand {
    pub fn run(
        &self,
        repo: &Repo,
        current: &mut CurrentWorkout,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::Start {
                date,
                name,
                notes,
                force,
            } => {
                if !force {
                    if let Some(draft) = repo.get_draft_workout(current) {
                        return Err(format!(
                            "A workout is already in progress: {} ({}). Finish or cancel it, or use --force.",
                            draft.display_name(),
                            draft.id
                        )
                        .into());
                    }
                }

                let mut new = NewWorkout::default()
                    .with_name(name.clone().unwrap_or_else(|| config.workout_name.value.clone()));
                if let Some(d) = date {
                    new = new.with_date(parse_date(d)?);
                }
                if let Some(n) = notes {
                    new = new.with_notes(n);
                }

                let workout = repo.create_workout(current, new);
                println!("Started workout: {} ({})", workout.display_name(), workout.id);
                Ok(())
            }

            WorkoutSubcommand::List { status, format } => {
                let workouts = repo.list_workouts(current, status.into());
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => {
                        if workouts.is_empty() {
                            println!("No workouts found.");
                        } else {
                            print_workout_table(&workouts, current);
                        }
                    }
                }
                Ok(())
            }

            WorkoutSubcommand::Show { id, format } => {
                let workout = resolve_workout(repo, current, id.as_deref())?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workout)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", workout);
                        println!("\n{}", workout.stats());
                        println!("ID: {}", workout.id);
                    }
                }
                Ok(())
            }

            WorkoutSubcommand::Meta {
                id,
                date,
                name,
                notes,
            } => {
                let changes = MetaChanges {
                    date: date.as_deref().map(parse_date).transpose()?,
                    name: name.clone(),
                    notes: notes.clone(),
                };
                if changes.is_empty() {
                    return Err("Nothing to change. Pass --date, --name or --notes.".into());
                }

                let workout = resolve_workout(repo, current, id.as_deref())?;
                if !repo.update_workout_meta(current, &workout.id, changes) {
                    return Err(format!("Workout not found: {}", workout.id).into());
                }
                println!("Updated workout: {}", workout.id);
                Ok(())
            }

            WorkoutSubcommand::Finish { id, at } => {
                let finished_at = at.as_deref().map(parse_timestamp).transpose()?;
                let workout = resolve_workout(repo, current, id.as_deref())?;
                if workout.is_done() {
                    return Err(format!("Workout already finished: {}", workout.id).into());
                }
                if !repo.finish_workout(current, &workout.id, finished_at) {
                    return Err(format!("Workout not found: {}", workout.id).into());
                }

                let finished = resolve_workout(repo, current, Some(&workout.id))?;
                println!("Finished workout: {} ({})", finished.display_name(), finished.id);
                println!("{}", finished.stats());
                Ok(())
            }

            WorkoutSubcommand::Cancel { id } => {
                let workout = resolve_workout(repo, current, id.as_deref())?;
                if workout.is_done() {
                    return Err(format!(
                        "Workout {} is already finished. Use 'ironlog workout delete' to remove it.",
                        workout.id
                    )
                    .into());
                }
                if !repo.delete_workout(current, &workout.id) {
                    return Err(format!("Workout not found: {}", workout.id).into());
                }
                println!("Cancelled workout: {}", workout.id);
                Ok(())
            }

            WorkoutSubcommand::Delete { id } => {
                if !repo.delete_workout(current, id) {
                    return Err(format!("Workout not found: {}", id).into());
                }
                println!("Deleted workout: {}", id);
                Ok(())
            }

            WorkoutSubcommand::Repeat { source, date, name } => {
                let options = RepeatOptions {
                    date: date.as_deref().map(parse_date).transpose()?,
                    name: name.clone(),
                };
                let copy = repo
                    .repeat_workout(current, source, options)
                    .ok_or_else(|| format!("Workout not found: {}", source))?;

                println!("Started workout: {} ({})", copy.display_name(), copy.id);
                println!("Repeated from: {}", source);
                Ok(())
            }

            WorkoutSubcommand::Replace { id, file } => {
                let contents = if file.as_os_str() == "-" {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                } else {
                    std::fs::read_to_string(file)
                        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?
                };
                let next: ReplaceWith = serde_json::from_str(&contents)
                    .map_err(|e| format!("Invalid workout JSON: {}", e))?;

                if !repo.replace_workout(current, id, next) {
                    return Err(format!("Workout not found: {}", id).into());
                }
                println!("Replaced workout: {}", id);
                Ok(())
            }

            WorkoutSubcommand::History { limit, format } => {
                let mut workouts = repo.list_history(current);
                if let Some(limit) = limit {
                    workouts.truncate(*limit);
                }

                match format {
                    OutputFormat::Json => {
                        let entries: Vec<HistoryEntry<'_>> = workouts
                            .iter()
                            .map(|w| HistoryEntry {
                                workout: w,
                                stats: w.stats(),
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        if workouts.is_empty() {
                            println!("No finished workouts yet.");
                        }
                        for w in &workouts {
                            let when = w
                                .finished_at
                                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                                .unwrap_or_else(|| w.date.to_string());
                            println!("{}  {}  ({})", when, w.display_name(), w.id);
                            println!("  {}", w.stats());
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(serde::Serialize)]
struct HistoryEntry<'a> {
    #[serde(flatten)]
    workout: &'a Workout,
    stats: ironlog_core::WorkoutStats,
}

fn print_workout_table(workouts: &[Workout], current: &CurrentWorkout) {
    println!(
        "{:<36}  {:<10}  {:<6}  {:<9}  NAME",
        "ID", "DATE", "STATUS", "EXERCISES"
    );
    println!("{}", "-".repeat(80));
    for w in workouts {
        let marker = if current.points_to(&w.id) { " *" } else { "" };
        println!(
            "{:<36}  {:<10}  {:<6}  {:<9}  {}{}",
            w.id,
            w.date,
            w.status.as_str(),
            w.exercises.len(),
            w.display_name(),
            marker
        );
    }
}
