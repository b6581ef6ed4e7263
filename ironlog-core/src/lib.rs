//! Ironlog Core Library
//!
//! Workout data model, repair of stored records, and the repository that
//! reads and writes them through a key-value store.

pub mod clock;
pub mod ids;
pub mod models;
pub mod repair;
pub mod repository;
pub mod session;
pub mod storage;
pub mod update;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use models::{
    Direction, Exercise, ExerciseSet, MetaChanges, NewExercise, NewSet, NewWorkout, RepeatOptions,
    ReplaceWith, SetAdjustment, SetChanges, Workout, WorkoutFilter, WorkoutStats, WorkoutStatus,
};
pub use repair::{repair_workout, RepairContext, Repaired};
pub use repository::WorkoutRepository;
pub use session::CurrentWorkout;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, Slot, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
