use serde::Serialize;
use std::fmt;

use super::workout::Workout;

/// Aggregate numbers shown next to a workout in the history list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct WorkoutStats {
    pub exercises: usize,
    pub sets: usize,
    pub total_reps: u64,
    /// Σ reps × weight, in kg.
    pub total_volume: f64,
}

impl WorkoutStats {
    pub fn of(workout: &Workout) -> Self {
        let mut stats = WorkoutStats {
            exercises: workout.exercises.len(),
            ..Default::default()
        };
        for set in workout.exercises.iter().flat_map(|e| &e.sets) {
            stats.sets += 1;
            stats.total_reps += u64::from(set.reps);
            stats.total_volume += set.volume();
        }
        stats
    }
}

impl fmt::Display for WorkoutStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exercises: {} | Sets: {} | Reps: {} | Volume: {:.0} kg",
            self.exercises, self.sets, self.total_reps, self.total_volume
        )
    }
}
