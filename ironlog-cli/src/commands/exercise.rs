use clap::{Args, Subcommand};
use ironlog_core::{CurrentWorkout, Direction, NewExercise};

use super::resolve::{find_exercise, resolve_workout};
use super::Repo;

#[derive(Args)]
pub struct ExerciseCommand {
    /// Workout ID (defaults to the one in progress)
    #[arg(long, short, global = true)]
    pub workout: Option<String>,

    #[command(subcommand)]
    pub command: ExerciseSubcommand,
}

#[derive(Subcommand)]
pub enum ExerciseSubcommand {
    /// Add an exercise at the end of the workout
    Add {
        name: String,

        /// Target muscle group
        #[arg(long, short)]
        muscle: Option<String>,
    },

    /// Remove an exercise and its sets
    Remove {
        /// Exercise ID or name
        exercise: String,
    },

    /// Move an exercise one place up or down
    Move {
        /// Exercise ID or name
        exercise: String,

        /// up or down
        direction: Direction,
    },
}

impl ExerciseCommand {
    pub fn run(
        &self,
        repo: &Repo,
        current: &mut CurrentWorkout,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let workout = resolve_workout(repo, current, self.workout.as_deref())?;

        match &self.command {
            ExerciseSubcommand::Add { name, muscle } => {
                let mut new = NewExercise::new(name);
                if let Some(m) = muscle {
                    new = new.with_target_muscle(m);
                }
                let exercise = repo
                    .add_exercise(current, &workout.id, new)
                    .ok_or_else(|| format!("Workout not found: {}", workout.id))?;

                println!(
                    "Added exercise #{}: {} ({})",
                    exercise.position + 1,
                    exercise,
                    exercise.id
                );
                Ok(())
            }

            ExerciseSubcommand::Remove { exercise } => {
                let target = find_exercise(&workout, exercise)?;
                if !repo.remove_exercise(current, &workout.id, &target.id) {
                    return Err(format!("Workout not found: {}", workout.id).into());
                }
                println!("Removed exercise: {}", target.name);
                Ok(())
            }

            ExerciseSubcommand::Move {
                exercise,
                direction,
            } => {
                let target = find_exercise(&workout, exercise)?;
                if !repo.move_exercise(current, &workout.id, &target.id, *direction) {
                    let edge = match direction {
                        Direction::Up => "first",
                        Direction::Down => "last",
                    };
                    return Err(format!(
                        "Cannot move '{}': it is already {} or the only exercise",
                        target.name, edge
                    )
                    .into());
                }
                println!("Moved exercise: {}", target.name);
                Ok(())
            }
        }
    }
}
