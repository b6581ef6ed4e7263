//! Workout repository.
//!
//! Every operation reads the whole collection from the store, repairs it,
//! and, if it changes anything, writes the whole collection back once. A
//! failed lookup is a no-op that returns `false` or `None` and writes nothing.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::models::{
    Direction, Exercise, ExerciseSet, MetaChanges, NewExercise, NewSet, NewWorkout, RepeatOptions,
    ReplaceWith, SetAdjustment, SetChanges, Workout, WorkoutFilter, WorkoutStatus,
};
use crate::repair::{repair_collection, sanitize_reps, sanitize_weight, RepairContext};
use crate::session::CurrentWorkout;
use crate::storage::{load_json, save_json, KeyValueStore, Slot};
use crate::update::{
    adjustment_changes, apply_set_changes, move_exercise, repeat_copy, sanitize_replacement,
    with_exercise, with_set, with_workout, without_workout,
};

pub struct WorkoutRepository<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl<S: KeyValueStore> WorkoutRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
            ids: Box::new(UuidGenerator),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========== Current workout ==========

    pub fn load_current(&self) -> CurrentWorkout {
        let id: String = load_json(&self.store, Slot::CurrentWorkoutId, String::new());
        CurrentWorkout::new(Some(id))
    }

    pub fn save_current(&self, current: &mut CurrentWorkout) {
        save_json(
            &self.store,
            Slot::CurrentWorkoutId,
            current.id().unwrap_or_default(),
        );
        current.mark_saved();
    }

    // ========== Queries ==========

    /// Workouts matching `filter`, newest date first. Workouts on the same
    /// date keep the order they were created in.
    pub fn list_workouts(&self, current: &CurrentWorkout, filter: WorkoutFilter) -> Vec<Workout> {
        let mut workouts: Vec<Workout> = self
            .load_all(current)
            .into_iter()
            .filter(|w| match filter {
                WorkoutFilter::All => true,
                WorkoutFilter::OnlyDone => w.is_done(),
                WorkoutFilter::OnlyDraft => w.is_draft(),
            })
            .collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        workouts
    }

    /// Finished workouts, most recently completed first.
    pub fn list_history(&self, current: &CurrentWorkout) -> Vec<Workout> {
        let mut workouts = self.list_workouts(current, WorkoutFilter::OnlyDone);
        workouts.sort_by(|a, b| b.history_key().cmp(&a.history_key()));
        workouts
    }

    pub fn get_workout(&self, current: &CurrentWorkout, workout_id: &str) -> Option<Workout> {
        self.load_all(current)
            .into_iter()
            .find(|w| w.id == workout_id)
    }

    /// The draft the pointer refers to. A pointer to a missing or finished
    /// workout is cleared.
    pub fn get_draft_workout(&self, current: &mut CurrentWorkout) -> Option<Workout> {
        let id = current.id()?.to_string();
        match self.get_workout(current, &id) {
            Some(workout) if workout.is_draft() => Some(workout),
            _ => {
                debug!("Clearing stale current workout pointer '{}'", id);
                current.clear();
                None
            }
        }
    }

    // ========== Workout lifecycle ==========

    /// Appends a new draft and makes it current.
    pub fn create_workout(&self, current: &mut CurrentWorkout, new: NewWorkout) -> Workout {
        let mut workouts = self.load_all(current);

        let mut workout = Workout::new(
            self.ids.new_id(),
            new.date.unwrap_or_else(|| self.clock.today()),
        );
        workout.name = non_empty(new.name);
        workout.notes = non_empty(new.notes);

        workouts.push(workout.clone());
        self.save_all(&workouts);
        current.set(workout.id.clone());

        debug!("Created workout '{}'", workout.id);
        workout
    }

    /// Applies the given date, name and notes. An empty string clears
    /// name or notes.
    pub fn update_workout_meta(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        changes: MetaChanges,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            let mut next = w.clone();
            if let Some(date) = changes.date {
                next.date = date;
            }
            if let Some(name) = changes.name {
                next.name = non_empty(Some(name));
            }
            if let Some(notes) = changes.notes {
                next.notes = non_empty(Some(notes));
            }
            Some(next)
        })
    }

    /// Marks a workout done. The pointer is cleared only if it referred to
    /// this workout.
    pub fn finish_workout(
        &self,
        current: &mut CurrentWorkout,
        workout_id: &str,
        finished_at: Option<DateTime<Utc>>,
    ) -> bool {
        let finished_at = finished_at.unwrap_or_else(|| self.clock.now());
        let finished = self.modify(current, workout_id, |w| {
            let mut next = w.clone();
            next.status = WorkoutStatus::Done;
            next.finished_at = Some(finished_at);
            next.extra.remove("finishedAt");
            Some(next)
        });

        if finished && current.points_to(workout_id) {
            current.clear();
        }
        finished
    }

    pub fn delete_workout(&self, current: &mut CurrentWorkout, workout_id: &str) -> bool {
        let workouts = self.load_all(current);
        let Some(next) = without_workout(&workouts, workout_id) else {
            return false;
        };

        self.save_all(&next);
        if current.points_to(workout_id) {
            current.clear();
        }

        debug!("Deleted workout '{}'", workout_id);
        true
    }

    /// Starts a new draft from an existing workout's structure and makes it
    /// current. Any previous draft stays stored but is no longer current.
    pub fn repeat_workout(
        &self,
        current: &mut CurrentWorkout,
        source_id: &str,
        options: RepeatOptions,
    ) -> Option<Workout> {
        let mut workouts = self.load_all(current);
        let source = workouts.iter().find(|w| w.id == source_id)?;

        let date = options.date.unwrap_or_else(|| self.clock.today());
        let copy = repeat_copy(source, self.ids.as_ref(), date, non_empty(options.name));

        workouts.push(copy.clone());
        self.save_all(&workouts);
        current.set(copy.id.clone());

        debug!("Repeated workout '{}' as '{}'", source_id, copy.id);
        Some(copy)
    }

    /// Replaces a workout's content wholesale. Id, status and completion
    /// time are kept.
    pub fn replace_workout(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        next: ReplaceWith,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            let mut replaced = w.clone();
            if let Some(date) = next.date {
                replaced.date = date;
            }
            if next.name.is_some() {
                replaced.name = non_empty(next.name);
            }
            if next.notes.is_some() {
                replaced.notes = non_empty(next.notes);
            }
            replaced.exercises = sanitize_replacement(&next.exercises, &w.id, self.ids.as_ref());
            Some(replaced)
        })
    }

    // ========== Exercises ==========

    /// Appends an exercise at the end of the display order.
    pub fn add_exercise(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        new: NewExercise,
    ) -> Option<Exercise> {
        let mut added = None;
        self.modify(current, workout_id, |w| {
            let position = u32::try_from(w.exercises.len()).unwrap_or(u32::MAX);
            let mut exercise = Exercise::new(self.ids.new_id(), &w.id, new.name, position);
            exercise.target_muscle = non_empty(new.target_muscle);

            let mut next = w.clone();
            next.exercises.push(exercise.clone());
            added = Some(exercise);
            Some(next)
        });
        added
    }

    /// Removes an exercise. Sibling positions are left as they are, and an
    /// unknown exercise id still counts as success.
    pub fn remove_exercise(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        exercise_id: &str,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            let mut next = w.clone();
            next.exercises.retain(|e| e.id != exercise_id);
            Some(next)
        })
    }

    pub fn move_exercise(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        exercise_id: &str,
        direction: Direction,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            let exercises = move_exercise(&w.exercises, exercise_id, direction)?;
            Some(w.clone().with_exercises(exercises))
        })
    }

    // ========== Sets ==========

    /// Appends a not-yet-done set. Negative reps or weight are stored as 0.
    pub fn add_set(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        exercise_id: &str,
        new: NewSet,
    ) -> Option<ExerciseSet> {
        let mut added = None;
        self.modify(current, workout_id, |w| {
            with_exercise(w, exercise_id, |e| {
                let set = ExerciseSet {
                    id: self.ids.new_id(),
                    exercise_id: e.id.clone(),
                    reps: sanitize_reps(new.reps),
                    weight: sanitize_weight(new.weight),
                    rpe: new.rpe.filter(|r| r.is_finite()),
                    rest_sec: new.rest_sec,
                    is_warmup: Some(new.is_warmup),
                    is_done: false,
                    extra: Default::default(),
                };

                let mut next = e.clone();
                next.sets.push(set.clone());
                added = Some(set);
                Some(next)
            })
        });
        added
    }

    pub fn remove_set(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        exercise_id: &str,
        set_id: &str,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            with_exercise(w, exercise_id, |e| {
                e.find_set(set_id)?;
                let mut next = e.clone();
                next.sets.retain(|s| s.id != set_id);
                Some(next)
            })
        })
    }

    /// Applies the provided fields. Reps and weight are clamped at zero.
    pub fn update_set(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        exercise_id: &str,
        set_id: &str,
        changes: SetChanges,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            with_exercise(w, exercise_id, |e| {
                with_set(e, set_id, |s| apply_set_changes(s, &changes))
            })
        })
    }

    /// Steps reps by whole reps or weight on the 0.5 kg grid.
    pub fn adjust_set(
        &self,
        current: &CurrentWorkout,
        workout_id: &str,
        exercise_id: &str,
        set_id: &str,
        adjustment: SetAdjustment,
    ) -> bool {
        self.modify(current, workout_id, |w| {
            with_exercise(w, exercise_id, |e| {
                with_set(e, set_id, |s| {
                    apply_set_changes(s, &adjustment_changes(s, adjustment))
                })
            })
        })
    }

    // ========== Internals ==========

    /// Loads and repairs the stored collection in persisted order, writing
    /// it back if repair changed anything.
    fn load_all(&self, current: &CurrentWorkout) -> Vec<Workout> {
        let raw: Value = load_json(&self.store, Slot::Workouts, Value::Array(Vec::new()));
        let ctx = RepairContext {
            current_id: current.id(),
            today: self.clock.today(),
            ids: self.ids.as_ref(),
        };

        let repaired = repair_collection(&raw, &ctx);
        if repaired.is_fixed() {
            info!("Repaired stored workouts, writing them back");
            let workouts = repaired.into_inner();
            self.save_all(&workouts);
            return workouts;
        }
        repaired.into_inner()
    }

    fn save_all(&self, workouts: &[Workout]) {
        save_json(&self.store, Slot::Workouts, workouts);
    }

    /// Replaces one workout with `f`'s result and saves. Returns `false`
    /// without writing when the workout or a nested lookup is missing.
    fn modify<F>(&self, current: &CurrentWorkout, workout_id: &str, f: F) -> bool
    where
        F: FnOnce(&Workout) -> Option<Workout>,
    {
        let workouts = self.load_all(current);
        match with_workout(&workouts, workout_id, f) {
            Some(next) => {
                self.save_all(&next);
                debug!("Updated workout '{}'", workout_id);
                true
            }
            None => {
                debug!("No change to workout '{}': lookup failed", workout_id);
                false
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ids::SequentialIds;
    use crate::storage::{JsonFileStore, MemoryStore};
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn repo(store: MemoryStore) -> WorkoutRepository<MemoryStore> {
        WorkoutRepository::new(store)
            .with_clock(FixedClock::on(today()))
            .with_ids(SequentialIds::new("id"))
    }

    fn sorted_positions(workout: &Workout) -> Vec<u32> {
        let mut positions: Vec<u32> = workout.exercises.iter().map(|e| e.position).collect();
        positions.sort();
        positions
    }

    fn draft_with_exercises(
        repo: &WorkoutRepository<MemoryStore>,
        current: &mut CurrentWorkout,
        names: &[&str],
    ) -> (Workout, Vec<Exercise>) {
        let workout = repo.create_workout(current, NewWorkout::default());
        let exercises = names
            .iter()
            .map(|name| {
                repo.add_exercise(current, &workout.id, NewExercise::new(*name))
                    .unwrap()
            })
            .collect();
        (workout, exercises)
    }

    #[test]
    fn test_create_workout_defaults() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();

        let workout = repo.create_workout(&mut current, NewWorkout::default());
        assert_eq!(workout.date, today());
        assert!(workout.is_draft());
        assert!(workout.exercises.is_empty());
        assert!(current.points_to(&workout.id));
        assert!(current.is_dirty());
        assert_eq!(repo.store().writes(), 1);
    }

    #[test]
    fn test_current_pointer_round_trip() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let workout = repo.create_workout(&mut current, NewWorkout::default());

        repo.save_current(&mut current);
        assert!(!current.is_dirty());

        let reloaded = repo.load_current();
        assert!(reloaded.points_to(&workout.id));
    }

    #[test]
    fn test_single_current_draft_after_create_and_repeat() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();

        let first = repo.create_workout(&mut current, NewWorkout::default());
        assert_eq!(repo.get_draft_workout(&mut current).unwrap().id, first.id);

        let copy = repo
            .repeat_workout(&mut current, &first.id, RepeatOptions::default())
            .unwrap();
        assert_eq!(repo.get_draft_workout(&mut current).unwrap().id, copy.id);

        // The displaced draft is still stored.
        assert!(repo.get_workout(&current, &first.id).unwrap().is_draft());
    }

    #[test]
    fn test_finish_and_delete_clear_current_draft() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();

        let a = repo.create_workout(&mut current, NewWorkout::default());
        assert!(repo.finish_workout(&mut current, &a.id, None));
        assert!(repo.get_draft_workout(&mut current).is_none());

        let b = repo.create_workout(&mut current, NewWorkout::default());
        assert!(repo.delete_workout(&mut current, &b.id));
        assert!(repo.get_draft_workout(&mut current).is_none());
        assert!(repo.get_workout(&current, &b.id).is_none());
    }

    #[test]
    fn test_finish_other_workout_keeps_pointer() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();

        let b = repo.create_workout(&mut current, NewWorkout::default());
        let a = repo.create_workout(&mut current, NewWorkout::default());
        assert!(current.points_to(&a.id));

        assert!(repo.finish_workout(&mut current, &b.id, None));
        assert!(current.points_to(&a.id));
    }

    #[test]
    fn test_finish_records_time() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let w = repo.create_workout(&mut current, NewWorkout::default());

        let at = Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap();
        assert!(repo.finish_workout(&mut current, &w.id, Some(at)));
        let stored = repo.get_workout(&current, &w.id).unwrap();
        assert_eq!(stored.status, WorkoutStatus::Done);
        assert_eq!(stored.finished_at, Some(at));

        let w2 = repo.create_workout(&mut current, NewWorkout::default());
        repo.finish_workout(&mut current, &w2.id, None);
        let stored = repo.get_workout(&current, &w2.id).unwrap();
        assert_eq!(stored.finished_at, Some(FixedClock::on(today()).now()));
    }

    #[test]
    fn test_stale_pointer_self_heals() {
        let store = MemoryStore::new()
            .with_raw("workouts", "[]")
            .with_raw("current-workout-id", "\"gone\"");
        let repo = repo(store);
        let mut current = repo.load_current();

        assert!(repo.get_draft_workout(&mut current).is_none());
        assert_eq!(current.id(), None);
        assert!(current.is_dirty());
    }

    #[test]
    fn test_missing_status_matching_pointer_is_draft() {
        let store = MemoryStore::new()
            .with_raw(
                "workouts",
                r#"[{"id":"a","date":"2025-03-01"},{"id":"b","date":"2025-03-02"}]"#,
            )
            .with_raw("current-workout-id", "\"a\"");
        let repo = repo(store);
        let mut current = repo.load_current();

        assert_eq!(repo.get_draft_workout(&mut current).unwrap().id, "a");
        assert!(repo.get_workout(&current, "b").unwrap().is_done());
    }

    #[test]
    fn test_bench_press_scenario() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();

        let w = repo.create_workout(&mut current, NewWorkout::default());
        let ex = repo
            .add_exercise(&current, &w.id, NewExercise::new("Bench Press"))
            .unwrap();
        let set = repo
            .add_set(&current, &w.id, &ex.id, NewSet::new(8, 40.0))
            .unwrap();
        assert!(repo.update_set(&current, &w.id, &ex.id, &set.id, SetChanges::done(true)));
        assert!(repo.finish_workout(&mut current, &w.id, None));

        let done = repo.list_workouts(&current, WorkoutFilter::OnlyDone);
        assert_eq!(done.len(), 1);
        let bench = &done[0].exercises[0];
        assert!(bench.name.contains("Bench Press"));
        assert_eq!(bench.sets.len(), 1);
        assert_eq!(bench.sets[0].reps, 8);
        assert_eq!(bench.sets[0].weight, 40.0);
        assert!(bench.sets[0].is_done);
        assert!(repo.get_draft_workout(&mut current).is_none());
    }

    #[test]
    fn test_move_first_exercise_down() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["A", "B", "C"]);

        assert!(repo.move_exercise(&current, &w.id, &ex[0].id, Direction::Down));

        let stored = repo.get_workout(&current, &w.id).unwrap();
        let order: Vec<(&str, u32)> = stored
            .sorted_exercises()
            .into_iter()
            .map(|e| (e.name.as_str(), e.position))
            .collect();
        assert_eq!(order, vec![("B", 0), ("A", 1), ("C", 2)]);
    }

    #[test]
    fn test_move_out_of_bounds_does_not_write() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["A", "B"]);
        let writes = repo.store().writes();

        assert!(!repo.move_exercise(&current, &w.id, &ex[0].id, Direction::Up));
        assert!(!repo.move_exercise(&current, &w.id, &ex[1].id, Direction::Down));
        assert!(!repo.move_exercise(&current, &w.id, "missing", Direction::Up));
        assert_eq!(repo.store().writes(), writes);
    }

    #[test]
    fn test_dense_positions_after_add_and_move() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["A", "B", "C", "D"]);

        assert_eq!(
            sorted_positions(&repo.get_workout(&current, &w.id).unwrap()),
            vec![0, 1, 2, 3]
        );

        // Removing leaves a gap; the next move heals it.
        assert!(repo.remove_exercise(&current, &w.id, &ex[1].id));
        assert_eq!(
            sorted_positions(&repo.get_workout(&current, &w.id).unwrap()),
            vec![0, 2, 3]
        );

        assert!(repo.move_exercise(&current, &w.id, &ex[3].id, Direction::Up));
        assert_eq!(
            sorted_positions(&repo.get_workout(&current, &w.id).unwrap()),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_remove_exercise_unknown_workout() {
        let repo = repo(MemoryStore::new());
        let current = repo.load_current();
        assert!(!repo.remove_exercise(&current, "nope", "e1"));
        assert_eq!(repo.store().writes(), 0);
    }

    #[test]
    fn test_add_set_clamps_and_resets_done() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["Squat"]);

        let set = repo
            .add_set(
                &current,
                &w.id,
                &ex[0].id,
                NewSet::new(-3, -10.0).with_rpe(7.5).with_rest_sec(120).warmup(),
            )
            .unwrap();
        assert_eq!(set.reps, 0);
        assert_eq!(set.weight, 0.0);
        assert!(!set.is_done);
        assert!(set.is_warmup());
        assert_eq!(set.rpe, Some(7.5));
        assert_eq!(set.exercise_id, ex[0].id);

        assert!(repo
            .add_set(&current, &w.id, "missing", NewSet::new(5, 20.0))
            .is_none());
    }

    #[test]
    fn test_update_set_clamping_law() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["Row"]);
        let set = repo
            .add_set(&current, &w.id, &ex[0].id, NewSet::new(10, 50.0))
            .unwrap();

        assert!(repo.update_set(&current, &w.id, &ex[0].id, &set.id, SetChanges::reps(-5)));
        assert!(repo.update_set(&current, &w.id, &ex[0].id, &set.id, SetChanges::weight(-1.0)));

        let stored = repo.get_workout(&current, &w.id).unwrap();
        let stored_set = &stored.exercises[0].sets[0];
        assert_eq!(stored_set.reps, 0);
        assert_eq!(stored_set.weight, 0.0);
        assert!(!stored_set.is_done);
    }

    #[test]
    fn test_update_and_remove_unknown_set() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["Row"]);
        let writes = repo.store().writes();

        assert!(!repo.update_set(&current, &w.id, &ex[0].id, "s9", SetChanges::done(true)));
        assert!(!repo.remove_set(&current, &w.id, &ex[0].id, "s9"));
        assert!(!repo.remove_set(&current, &w.id, "e9", "s9"));
        assert_eq!(repo.store().writes(), writes);
    }

    #[test]
    fn test_remove_set() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["Row"]);
        let first = repo
            .add_set(&current, &w.id, &ex[0].id, NewSet::new(10, 50.0))
            .unwrap();
        let second = repo
            .add_set(&current, &w.id, &ex[0].id, NewSet::new(8, 55.0))
            .unwrap();

        assert!(repo.remove_set(&current, &w.id, &ex[0].id, &first.id));
        let stored = repo.get_workout(&current, &w.id).unwrap();
        assert_eq!(stored.exercises[0].sets.len(), 1);
        assert_eq!(stored.exercises[0].sets[0].id, second.id);
    }

    #[test]
    fn test_adjust_set() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["Curl"]);
        let set = repo
            .add_set(&current, &w.id, &ex[0].id, NewSet::new(1, 10.0))
            .unwrap();

        assert!(repo.adjust_set(&current, &w.id, &ex[0].id, &set.id, SetAdjustment::Reps(-2)));
        assert!(repo.adjust_set(&current, &w.id, &ex[0].id, &set.id, SetAdjustment::Weight(1.2)));

        let stored = repo.get_workout(&current, &w.id).unwrap();
        assert_eq!(stored.exercises[0].sets[0].reps, 0);
        assert_eq!(stored.exercises[0].sets[0].weight, 11.0);
    }

    #[test]
    fn test_update_workout_meta() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let w = repo.create_workout(&mut current, NewWorkout::default().with_notes("tired"));

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let changes = MetaChanges {
            date: Some(date),
            name: Some("Pull".into()),
            notes: None,
        };
        assert!(repo.update_workout_meta(&current, &w.id, changes));

        let stored = repo.get_workout(&current, &w.id).unwrap();
        assert_eq!(stored.date, date);
        assert_eq!(stored.name.as_deref(), Some("Pull"));
        assert_eq!(stored.notes.as_deref(), Some("tired"));

        assert!(!repo.update_workout_meta(&current, "nope", MetaChanges::default()));
    }

    #[test]
    fn test_repeat_copies_structure_and_resets_progress() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, ex) = draft_with_exercises(&repo, &mut current, &["Bench", "Fly"]);
        repo.update_workout_meta(
            &current,
            &w.id,
            MetaChanges {
                name: Some("Push".into()),
                notes: Some("felt strong".into()),
                ..Default::default()
            },
        );
        for reps in [8, 6] {
            let s = repo
                .add_set(&current, &w.id, &ex[0].id, NewSet::new(reps, 60.0))
                .unwrap();
            repo.update_set(&current, &w.id, &ex[0].id, &s.id, SetChanges::done(true));
        }
        repo.add_set(&current, &w.id, &ex[1].id, NewSet::new(12, 14.0));
        repo.finish_workout(&mut current, &w.id, None);

        let source = repo.get_workout(&current, &w.id).unwrap();
        let copy = repo
            .repeat_workout(&mut current, &w.id, RepeatOptions::default())
            .unwrap();

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.source_workout_id.as_deref(), Some(source.id.as_str()));
        assert_eq!(copy.name.as_deref(), Some("Push"));
        assert!(copy.notes.is_none());
        assert_eq!(copy.date, today());
        assert!(copy.is_draft());
        assert_eq!(copy.exercises.len(), source.exercises.len());

        let source_ids: Vec<&str> = source
            .exercises
            .iter()
            .flat_map(|e| std::iter::once(e.id.as_str()).chain(e.sets.iter().map(|s| s.id.as_str())))
            .collect();
        for (copied, original) in copy.exercises.iter().zip(source.sorted_exercises()) {
            assert_eq!(copied.sets.len(), original.sets.len());
            assert!(!source_ids.contains(&copied.id.as_str()));
            for s in &copied.sets {
                assert!(!s.is_done);
                assert!(!source_ids.contains(&s.id.as_str()));
            }
        }
        assert!(current.points_to(&copy.id));
    }

    #[test]
    fn test_repeat_unknown_source() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        assert!(repo
            .repeat_workout(&mut current, "nope", RepeatOptions::default())
            .is_none());
        assert_eq!(current.id(), None);
    }

    #[test]
    fn test_replace_workout_keeps_identity() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, _) = draft_with_exercises(&repo, &mut current, &["A"]);
        repo.finish_workout(&mut current, &w.id, None);
        let before = repo.get_workout(&current, &w.id).unwrap();

        let next: ReplaceWith = serde_json::from_str(
            r#"{
                "name": "Edited",
                "exercises": [
                    {"id": "x2", "workoutId": "other", "name": "Dip", "position": 7,
                     "sets": [{"id": "s1", "exerciseId": "zzz", "reps": 5, "weight": -3, "isDone": true}]},
                    {"id": "x1", "workoutId": "other", "name": "Pushup", "position": 2, "sets": []}
                ]
            }"#,
        )
        .unwrap();
        assert!(repo.replace_workout(&current, &w.id, next));

        let after = repo.get_workout(&current, &w.id).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.status, WorkoutStatus::Done);
        assert_eq!(after.finished_at, before.finished_at);
        assert_eq!(after.date, before.date);
        assert_eq!(after.name.as_deref(), Some("Edited"));
        assert_eq!(sorted_positions(&after), vec![0, 1]);

        let dip = after.find_exercise("x2").unwrap();
        assert_eq!(dip.workout_id, w.id);
        assert_eq!(dip.position, 1);
        assert_eq!(dip.sets[0].exercise_id, "x2");
        assert_eq!(dip.sets[0].weight, 0.0);
        assert!(dip.sets[0].is_done);

        assert!(!repo.replace_workout(&current, "nope", ReplaceWith::default()));
    }

    #[test]
    fn test_list_filters_and_orders_by_date() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();

        let first = repo.create_workout(&mut current, NewWorkout::default().with_date(d(10)));
        let newest = repo.create_workout(&mut current, NewWorkout::default().with_date(d(12)));
        let second = repo.create_workout(&mut current, NewWorkout::default().with_date(d(10)));
        repo.finish_workout(&mut current, &first.id, None);

        let all: Vec<String> = repo
            .list_workouts(&current, WorkoutFilter::All)
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(all, vec![newest.id.clone(), first.id.clone(), second.id.clone()]);

        let drafts = repo.list_workouts(&current, WorkoutFilter::OnlyDraft);
        assert_eq!(drafts.len(), 2);
        let done = repo.list_workouts(&current, WorkoutFilter::OnlyDone);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, first.id);
    }

    #[test]
    fn test_history_orders_by_completion() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();

        let early = repo.create_workout(&mut current, NewWorkout::default().with_date(d(12)));
        let late = repo.create_workout(&mut current, NewWorkout::default().with_date(d(11)));
        repo.create_workout(&mut current, NewWorkout::default());

        repo.finish_workout(
            &mut current,
            &early.id,
            Some(Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap()),
        );
        repo.finish_workout(
            &mut current,
            &late.id,
            Some(Utc.with_ymd_and_hms(2025, 3, 13, 9, 0, 0).unwrap()),
        );

        let history: Vec<String> = repo
            .list_history(&current)
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(history, vec![late.id, early.id]);
    }

    #[test]
    fn test_repair_writes_back_once() {
        let store = MemoryStore::new().with_raw(
            "workouts",
            r#"[{"id":"a","date":"garbage","status":"done",
                 "exercises":[{"id":"e","name":"","sets":[{"id":"s","reps":"7","weight":-2}]}]}]"#,
        );
        let repo = repo(store);
        let current = repo.load_current();

        let first = repo.list_workouts(&current, WorkoutFilter::All);
        assert_eq!(repo.store().writes(), 1);
        assert_eq!(first[0].date, today());
        assert_eq!(first[0].exercises[0].sets[0].reps, 7);

        let second = repo.list_workouts(&current, WorkoutFilter::All);
        assert_eq!(repo.store().writes(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_records_without_id_survive_load() {
        let store = MemoryStore::new().with_raw(
            "workouts",
            r#"[{"date":"2025-03-01","name":"Legacy","status":"done","exercises":[]},
                {"id":"b","date":"2025-03-02","status":"done",
                 "exercises":[{"id":"e","workoutId":"b","name":"Row","position":0,
                               "sets":[{"reps":8,"weight":50}]}]}]"#,
        );
        let repo = repo(store);
        let current = repo.load_current();

        let listed = repo.list_workouts(&current, WorkoutFilter::All);
        assert_eq!(listed.len(), 2);
        let legacy = listed.iter().find(|w| w.name.as_deref() == Some("Legacy")).unwrap();
        assert_eq!(legacy.id, "id1");

        let b = repo.get_workout(&current, "b").unwrap();
        let set = &b.exercises[0].sets[0];
        assert_eq!(set.id, "id2");
        assert_eq!(set.exercise_id, "e");
        assert_eq!(set.reps, 8);
        assert_eq!(set.weight, 50.0);

        let raw = repo.store().raw("workouts").unwrap();
        assert!(raw.contains("\"Legacy\""));
        assert!(raw.contains("\"id2\""));
        assert_eq!(repo.store().writes(), 1);
        assert!(repo.get_workout(&current, "id1").is_some());
        assert_eq!(repo.store().writes(), 1);
    }

    #[test]
    fn test_replace_workout_reads_loose_content() {
        let repo = repo(MemoryStore::new());
        let mut current = repo.load_current();
        let (w, _) = draft_with_exercises(&repo, &mut current, &["A"]);
        repo.finish_workout(&mut current, &w.id, None);

        let next: ReplaceWith = serde_json::from_str(
            r#"{
                "exercises": [
                    {"id": "a", "name": "Squat", "position": 1,
                     "sets": [{"id": "s1", "reps": -3, "weight": 60, "isDone": 1},
                              {"id": "s2", "reps": "5", "weight": "62.5"}]},
                    {"id": "b", "name": "Lunge"},
                    {"id": "c", "name": "Calf Raise"}
                ]
            }"#,
        )
        .unwrap();
        assert!(repo.replace_workout(&current, &w.id, next));

        let after = repo.get_workout(&current, &w.id).unwrap();
        let mut exercises = after.exercises.clone();
        exercises.sort_by_key(|e| e.position);
        let order: Vec<&str> = exercises.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        let squat = after.find_exercise("a").unwrap();
        assert_eq!(squat.sets[0].reps, 0);
        assert!(squat.sets[0].is_done);
        assert_eq!(squat.sets[1].reps, 5);
        assert_eq!(squat.sets[1].weight, 62.5);
        assert!(!squat.sets[1].is_done);
    }

    #[test]
    fn test_finish_overwrites_unreadable_finished_at() {
        let store = MemoryStore::new().with_raw(
            "workouts",
            r#"[{"id":"a","date":"2025-03-01","status":"draft","finishedAt":"soon","exercises":[]}]"#,
        );
        let repo = repo(store);
        let mut current = repo.load_current();

        assert!(repo.finish_workout(&mut current, "a", None));
        let raw = repo.store().raw("workouts").unwrap();
        assert_eq!(raw.matches("finishedAt").count(), 1);
        assert!(!raw.contains("soon"));
        assert!(repo.get_workout(&current, "a").unwrap().finished_at.is_some());
    }

    #[test]
    fn test_corrupt_collection_loads_empty() {
        let store = MemoryStore::new().with_raw("workouts", "{not json");
        let repo = repo(store);
        let current = repo.load_current();

        assert!(repo.list_workouts(&current, WorkoutFilter::All).is_empty());
        assert_eq!(repo.store().writes(), 0);
    }

    #[test]
    fn test_unknown_fields_survive_updates() {
        let store = MemoryStore::new().with_raw(
            "workouts",
            r#"[{"id":"a","date":"2025-03-01","status":"done","exercises":[],"mood":"great"}]"#,
        );
        let repo = repo(store);
        let current = repo.load_current();

        assert!(repo.add_exercise(&current, "a", NewExercise::new("Plank")).is_some());
        let raw = repo.store().raw("workouts").unwrap();
        assert!(raw.contains("\"mood\":\"great\""));
    }

    #[test]
    fn test_file_store_persists_between_repositories() {
        let dir = TempDir::new().unwrap();
        let mut current;
        let id;
        {
            let repo = WorkoutRepository::new(JsonFileStore::new(dir.path().to_path_buf()));
            current = repo.load_current();
            id = repo.create_workout(&mut current, NewWorkout::default()).id;
            repo.save_current(&mut current);
        }

        let repo = WorkoutRepository::new(JsonFileStore::new(dir.path().to_path_buf()));
        current = repo.load_current();
        let draft = repo.get_draft_workout(&mut current).unwrap();
        assert_eq!(draft.id, id);
    }
}
