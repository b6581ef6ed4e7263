use clap::{Args, Subcommand};
use ironlog_core::{CurrentWorkout, NewSet, SetAdjustment, SetChanges};

use super::resolve::{find_exercise, find_set, resolve_workout};
use super::Repo;

#[derive(Args)]
pub struct SetCommand {
    /// Workout ID (defaults to the one in progress)
    #[arg(long, short, global = true)]
    pub workout: Option<String>,

    #[command(subcommand)]
    pub command: SetSubcommand,
}

#[derive(Subcommand)]
pub enum SetSubcommand {
    /// Add a set to an exercise
    Add {
        /// Exercise ID or name
        exercise: String,

        #[arg(allow_negative_numbers = true)]
        reps: i64,

        /// Weight in kg
        #[arg(allow_negative_numbers = true)]
        weight: f64,

        /// Rate of perceived exertion
        #[arg(long)]
        rpe: Option<f64>,

        /// Rest after the set, in seconds
        #[arg(long)]
        rest: Option<u32>,

        #[arg(long)]
        warmup: bool,
    },

    /// Remove a set
    Remove {
        /// Exercise ID or name
        exercise: String,

        /// Set ID or number (1-based)
        set: String,
    },

    /// Change a set's reps, weight or done state
    Update {
        /// Exercise ID or name
        exercise: String,

        /// Set ID or number (1-based)
        set: String,

        #[arg(long, allow_negative_numbers = true)]
        reps: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,

        /// Mark the set as done
        #[arg(long, conflicts_with = "undone")]
        done: bool,

        /// Mark the set as not done
        #[arg(long)]
        undone: bool,
    },

    /// Step reps or weight up or down
    Adjust {
        /// Exercise ID or name
        exercise: String,

        /// Set ID or number (1-based)
        set: String,

        /// Reps to add (negative to remove)
        #[arg(long, allow_negative_numbers = true, conflicts_with = "weight")]
        reps: Option<i64>,

        /// Kilograms to add (negative to remove), snapped to 0.5 kg
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,
    },
}

impl SetCommand {
    pub fn run(
        &self,
        repo: &Repo,
        current: &mut CurrentWorkout,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let workout = resolve_workout(repo, current, self.workout.as_deref())?;

        match &self.command {
            SetSubcommand::Add {
                exercise,
                reps,
                weight,
                rpe,
                rest,
                warmup,
            } => {
                let target = find_exercise(&workout, exercise)?;
                let mut new = NewSet::new(*reps, *weight);
                if let Some(r) = rpe {
                    new = new.with_rpe(*r);
                }
                if let Some(r) = rest {
                    new = new.with_rest_sec(*r);
                }
                if *warmup {
                    new = new.warmup();
                }

                let set = repo
                    .add_set(current, &workout.id, &target.id, new)
                    .ok_or_else(|| format!("Exercise not found: {}", target.name))?;
                println!(
                    "Added set #{} to {}: {}",
                    target.sets.len() + 1,
                    target.name,
                    set
                );
                Ok(())
            }

            SetSubcommand::Remove { exercise, set } => {
                let target = find_exercise(&workout, exercise)?;
                let found = find_set(target, set)?;
                if !repo.remove_set(current, &workout.id, &target.id, &found.id) {
                    return Err(format!("Set not found: {}", set).into());
                }
                println!("Removed set from {}: {}", target.name, found);
                Ok(())
            }

            SetSubcommand::Update {
                exercise,
                set,
                reps,
                weight,
                done,
                undone,
            } => {
                let changes = SetChanges {
                    reps: *reps,
                    weight: *weight,
                    is_done: match (done, undone) {
                        (true, _) => Some(true),
                        (_, true) => Some(false),
                        _ => None,
                    },
                };
                if changes.is_empty() {
                    return Err("Nothing to change. Pass --reps, --weight, --done or --undone.".into());
                }

                let target = find_exercise(&workout, exercise)?;
                let found = find_set(target, set)?;
                if !repo.update_set(current, &workout.id, &target.id, &found.id, changes) {
                    return Err(format!("Set not found: {}", set).into());
                }
                print_updated(repo, current, &workout.id, &target.id, &found.id)
            }

            SetSubcommand::Adjust {
                exercise,
                set,
                reps,
                weight,
            } => {
                let adjustment = match (reps, weight) {
                    (Some(r), _) => SetAdjustment::Reps(*r),
                    (_, Some(w)) => SetAdjustment::Weight(*w),
                    _ => return Err("Pass --reps or --weight.".into()),
                };

                let target = find_exercise(&workout, exercise)?;
                let found = find_set(target, set)?;
                if !repo.adjust_set(current, &workout.id, &target.id, &found.id, adjustment) {
                    return Err(format!("Set not found: {}", set).into());
                }
                print_updated(repo, current, &workout.id, &target.id, &found.id)
            }
        }
    }
}

fn print_updated(
    repo: &Repo,
    current: &mut CurrentWorkout,
    workout_id: &str,
    exercise_id: &str,
    set_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let workout = resolve_workout(repo, current, Some(workout_id))?;
    let set = workout
        .find_exercise(exercise_id)
        .and_then(|e| e.find_set(set_id))
        .ok_or_else(|| format!("Set not found: {}", set_id))?;
    println!("Updated set: {}", set);
    Ok(())
}
