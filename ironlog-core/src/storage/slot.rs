//! Named slots in the key-value store.

/// Persisted values owned by the workout repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// JSON array of every workout record.
    Workouts,
    /// JSON string holding the id of the current draft, `""` when none.
    CurrentWorkoutId,
}

impl Slot {
    /// Returns the store key for this slot.
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Workouts => "workouts",
            Slot::CurrentWorkoutId => "current-workout-id",
        }
    }
}
