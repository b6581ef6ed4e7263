//! Turning command-line references into records.

use chrono::{DateTime, NaiveDate, Utc};
use ironlog_core::{CurrentWorkout, Exercise, ExerciseSet, KeyValueStore, Workout, WorkoutRepository};

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp '{}'. Use RFC 3339, e.g. 2025-03-14T18:30:00Z.", s))
}

/// The workout named by `id`, or the current draft when no id is given.
pub fn resolve_workout<S: KeyValueStore>(
    repo: &WorkoutRepository<S>,
    current: &mut CurrentWorkout,
    id: Option<&str>,
) -> Result<Workout, String> {
    match id {
        Some(id) => repo
            .get_workout(current, id)
            .ok_or_else(|| format!("Workout not found: {}", id)),
        None => repo.get_draft_workout(current).ok_or_else(|| {
            "No workout in progress. Start one with 'ironlog workout start' or give a workout id."
                .to_string()
        }),
    }
}

/// Finds an exercise by id, or by case-insensitive name in display order.
pub fn find_exercise<'a>(workout: &'a Workout, reference: &str) -> Result<&'a Exercise, String> {
    if let Some(exercise) = workout.find_exercise(reference) {
        return Ok(exercise);
    }

    let wanted = reference.to_lowercase();
    workout
        .sorted_exercises()
        .into_iter()
        .find(|e| e.name.to_lowercase() == wanted)
        .ok_or_else(|| format!("Exercise not found: {}", reference))
}

/// Finds a set by id, or by its 1-based number within the exercise.
pub fn find_set<'a>(exercise: &'a Exercise, reference: &str) -> Result<&'a ExerciseSet, String> {
    if let Some(set) = exercise.find_set(reference) {
        return Ok(set);
    }

    reference
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| exercise.sets.get(i))
        .ok_or_else(|| format!("Set not found: {} (in {})", reference, exercise.name))
}
