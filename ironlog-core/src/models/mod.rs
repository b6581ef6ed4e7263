mod changes;
mod exercise;
mod set;
mod stats;
mod status;
mod workout;

pub use changes::{
    Direction, MetaChanges, NewExercise, NewSet, NewWorkout, RepeatOptions, ReplaceWith,
    SetAdjustment, SetChanges, WorkoutFilter,
};
pub use exercise::{Exercise, DEFAULT_EXERCISE_NAME};
pub use set::ExerciseSet;
pub use stats::WorkoutStats;
pub use status::WorkoutStatus;
pub use workout::Workout;
