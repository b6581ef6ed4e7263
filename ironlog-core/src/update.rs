//! Pure update helpers.
//!
//! Each function takes the current value by reference and returns a new one,
//! leaving siblings of the changed record as they were. `None` means a lookup
//! failed and nothing should be written.

use chrono::NaiveDate;
use serde_json::Value;

use crate::ids::IdGenerator;
use crate::models::{
    Direction, Exercise, ExerciseSet, SetAdjustment, SetChanges, Workout, WorkoutStatus,
};
use crate::repair::{repair_exercise, sanitize_reps, sanitize_weight};

/// Replaces the workout with `workout_id` by `f`'s result.
pub fn with_workout<F>(workouts: &[Workout], workout_id: &str, f: F) -> Option<Vec<Workout>>
where
    F: FnOnce(&Workout) -> Option<Workout>,
{
    let index = workouts.iter().position(|w| w.id == workout_id)?;
    let updated = f(&workouts[index])?;

    let mut next = workouts.to_vec();
    next[index] = updated;
    Some(next)
}

/// Replaces the exercise with `exercise_id` by `f`'s result.
pub fn with_exercise<F>(workout: &Workout, exercise_id: &str, f: F) -> Option<Workout>
where
    F: FnOnce(&Exercise) -> Option<Exercise>,
{
    let index = workout.exercises.iter().position(|e| e.id == exercise_id)?;
    let updated = f(&workout.exercises[index])?;

    let mut next = workout.clone();
    next.exercises[index] = updated;
    Some(next)
}

/// Replaces the set with `set_id` by `f`'s result.
pub fn with_set<F>(exercise: &Exercise, set_id: &str, f: F) -> Option<Exercise>
where
    F: FnOnce(&ExerciseSet) -> ExerciseSet,
{
    let index = exercise.sets.iter().position(|s| s.id == set_id)?;
    let updated = f(&exercise.sets[index]);

    let mut next = exercise.clone();
    next.sets[index] = updated;
    Some(next)
}

pub fn without_workout(workouts: &[Workout], workout_id: &str) -> Option<Vec<Workout>> {
    let index = workouts.iter().position(|w| w.id == workout_id)?;
    let mut next = workouts.to_vec();
    next.remove(index);
    Some(next)
}

fn assign_positions(exercises: Vec<Exercise>) -> Vec<Exercise> {
    exercises
        .into_iter()
        .enumerate()
        .map(|(i, mut e)| {
            e.position = u32::try_from(i).unwrap_or(u32::MAX);
            e
        })
        .collect()
}

/// Sorts by position (stable, so ties keep their order) and renumbers
/// densely from zero.
pub fn renumber_positions(mut exercises: Vec<Exercise>) -> Vec<Exercise> {
    exercises.sort_by_key(|e| e.position);
    assign_positions(exercises)
}

/// Moves one exercise a step up or down in display order.
///
/// Returns `None` when there are fewer than two exercises, the id is
/// unknown, or the move would leave the list.
pub fn move_exercise(
    exercises: &[Exercise],
    exercise_id: &str,
    direction: Direction,
) -> Option<Vec<Exercise>> {
    if exercises.len() < 2 {
        return None;
    }

    let mut list = renumber_positions(exercises.to_vec());
    let index = list.iter().position(|e| e.id == exercise_id)?;
    let target = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down => index + 1,
    };
    if target >= list.len() {
        return None;
    }

    let moved = list.remove(index);
    list.insert(target, moved);
    Some(assign_positions(list))
}

/// Applies the provided fields of `changes`; the rest keep their values.
pub fn apply_set_changes(set: &ExerciseSet, changes: &SetChanges) -> ExerciseSet {
    let mut next = set.clone();
    if let Some(reps) = changes.reps {
        next.reps = sanitize_reps(reps);
    }
    if let Some(weight) = changes.weight {
        next.weight = sanitize_weight(weight);
    }
    if let Some(is_done) = changes.is_done {
        next.is_done = is_done;
    }
    next
}

/// Reps after a +/- step.
pub fn step_reps(current: u32, delta: i64) -> u32 {
    sanitize_reps(i64::from(current).saturating_add(delta))
}

/// Weight after a +/- step, snapped to the 0.5 kg grid.
pub fn step_weight(current: f64, delta: f64) -> f64 {
    sanitize_weight(((current + delta) * 2.0).round() / 2.0)
}

/// Turns a relative adjustment into absolute changes for `set`.
pub fn adjustment_changes(set: &ExerciseSet, adjustment: SetAdjustment) -> SetChanges {
    match adjustment {
        SetAdjustment::Reps(delta) => SetChanges::reps(i64::from(step_reps(set.reps, delta))),
        SetAdjustment::Weight(delta) => SetChanges::weight(step_weight(set.weight, delta)),
    }
}

/// Builds a fresh draft from `source`: new ids throughout, back-references
/// pointing at the copies, progress cleared, notes dropped.
pub fn repeat_copy(
    source: &Workout,
    ids: &dyn IdGenerator,
    date: NaiveDate,
    name: Option<String>,
) -> Workout {
    let workout_id = ids.new_id();

    let exercises = source
        .sorted_exercises()
        .into_iter()
        .enumerate()
        .map(|(i, exercise)| {
            let exercise_id = ids.new_id();
            let sets = exercise
                .sets
                .iter()
                .map(|set| ExerciseSet {
                    id: ids.new_id(),
                    exercise_id: exercise_id.clone(),
                    reps: set.reps,
                    weight: set.weight,
                    rpe: set.rpe,
                    rest_sec: set.rest_sec,
                    is_warmup: Some(set.is_warmup()),
                    is_done: false,
                    extra: Default::default(),
                })
                .collect();

            Exercise {
                id: exercise_id.clone(),
                workout_id: workout_id.clone(),
                name: exercise.name.clone(),
                target_muscle: exercise.target_muscle.clone(),
                position: u32::try_from(i).unwrap_or(u32::MAX),
                sets,
                extra: Default::default(),
            }
        })
        .collect();

    Workout {
        id: workout_id,
        date,
        name: name.or_else(|| source.name.clone()),
        notes: None,
        source_workout_id: Some(source.id.clone()),
        status: WorkoutStatus::Draft,
        finished_at: None,
        exercises,
        extra: Default::default(),
    }
}

/// Reads replacement content for `workout_id` with the same rules as stored
/// data, then renumbers positions in their given order. Back-references are
/// rewritten to the target.
pub fn sanitize_replacement(
    exercises: &[Value],
    workout_id: &str,
    ids: &dyn IdGenerator,
) -> Vec<Exercise> {
    let repaired = exercises
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut exercise = repair_exercise(raw, workout_id, index, ids).into_inner();
            exercise.workout_id = workout_id.to_string();
            for set in &mut exercise.sets {
                set.exercise_id = exercise.id.clone();
            }
            exercise
        })
        .collect();

    renumber_positions(repaired)
}
