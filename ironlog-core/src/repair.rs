//! Repair of persisted workout records.
//!
//! Stored data may predate fields this version relies on, or may have been
//! hand-edited. Every record read from the store passes through
//! [`repair_workout`], which builds a typed [`Workout`] and reports whether
//! anything had to change. Each fallback rule is its own function so it can
//! be tested in isolation.
//!
//! Repair is idempotent: serializing a repaired workout and repairing it
//! again yields [`Repaired::Clean`] with an equal value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::ids::IdGenerator;
use crate::models::{Exercise, ExerciseSet, Workout, WorkoutStatus, DEFAULT_EXERCISE_NAME};

const WORKOUT_FIELDS: &[&str] = &[
    "id",
    "date",
    "name",
    "notes",
    "sourceWorkoutId",
    "status",
    "finishedAt",
    "exercises",
];
const EXERCISE_FIELDS: &[&str] = &["id", "workoutId", "name", "targetMuscle", "position", "sets"];
const SET_FIELDS: &[&str] = &[
    "id",
    "exerciseId",
    "reps",
    "weight",
    "rpe",
    "restSec",
    "isWarmup",
    "isDone",
];

/// A value read from storage, tagged with whether it had to be repaired.
#[derive(Debug, Clone, PartialEq)]
pub enum Repaired<T> {
    /// Stored data was already valid.
    Clean(T),
    /// At least one field was replaced or coerced.
    Fixed(T),
}

impl<T> Repaired<T> {
    fn new(value: T, fixed: bool) -> Self {
        if fixed {
            Repaired::Fixed(value)
        } else {
            Repaired::Clean(value)
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Repaired::Fixed(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Repaired::Clean(v) | Repaired::Fixed(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Repaired::Clean(v) | Repaired::Fixed(v) => v,
        }
    }

    /// Unwraps the value, raising `fixed` if this one was repaired.
    fn track(self, fixed: &mut bool) -> T {
        if self.is_fixed() {
            *fixed = true;
        }
        self.into_inner()
    }
}

/// What repair needs to know beyond the record itself.
#[derive(Clone, Copy)]
pub struct RepairContext<'a> {
    /// Id held by the current-workout pointer, if any.
    pub current_id: Option<&'a str>,
    pub today: NaiveDate,
    /// Source of ids for records stored without one.
    pub ids: &'a dyn IdGenerator,
}

/// Parses the `YYYY-MM-DD` prefix of a string.
pub fn calendar_date(s: &str) -> Option<NaiveDate> {
    let prefix = s.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Keeps a parseable date, otherwise takes the day of `finishedAt`, otherwise
/// today. A date with trailing text (e.g. a full timestamp) is cut to its day.
pub fn repair_date(
    date: Option<&Value>,
    finished_at: Option<&Value>,
    today: NaiveDate,
) -> Repaired<NaiveDate> {
    if let Some(raw) = date.and_then(Value::as_str) {
        if let Some(parsed) = calendar_date(raw) {
            let canonical = raw == parsed.to_string();
            return Repaired::new(parsed, !canonical);
        }
    }

    let fallback = finished_at
        .and_then(Value::as_str)
        .and_then(calendar_date)
        .unwrap_or(today);
    Repaired::Fixed(fallback)
}

/// Records written before statuses existed are `draft` only when the
/// current-workout pointer names them.
pub fn repair_status(
    status: Option<&Value>,
    id: &str,
    current_id: Option<&str>,
) -> Repaired<WorkoutStatus> {
    match status.and_then(Value::as_str) {
        Some("draft") => Repaired::Clean(WorkoutStatus::Draft),
        Some("done") => Repaired::Clean(WorkoutStatus::Done),
        _ if current_id == Some(id) => Repaired::Fixed(WorkoutStatus::Draft),
        _ => Repaired::Fixed(WorkoutStatus::Done),
    }
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Reads `finishedAt` as RFC 3339. Timestamps without an offset are taken as
/// UTC and rewritten canonically. `None` for anything unreadable; the caller
/// keeps such values as they are stored.
pub fn repair_finished_at(value: Option<&Value>) -> Repaired<Option<DateTime<Utc>>> {
    let Some(s) = value.and_then(Value::as_str) else {
        return Repaired::Clean(None);
    };

    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Repaired::Clean(Some(at.with_timezone(&Utc)));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())
        .map(|naive| Repaired::Fixed(Some(naive.and_utc())))
        .unwrap_or(Repaired::Clean(None))
}

/// Keeps a whole, non-negative position; anything else becomes the index.
pub fn repair_position(value: Option<&Value>, index: usize) -> Repaired<u32> {
    match value.and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok()) {
        Some(position) => Repaired::Clean(position),
        None => Repaired::Fixed(u32::try_from(index).unwrap_or(u32::MAX)),
    }
}

/// Numeric reading of a loosely typed value: numbers as-is, numeric strings
/// parsed, booleans as 1/0, null and blank strings as 0. `None` when the
/// value is absent or does not denote a finite number.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// JavaScript-style truthiness.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Clamps entered reps into the stored range.
pub fn sanitize_reps(reps: i64) -> u32 {
    u32::try_from(reps.max(0)).unwrap_or(u32::MAX)
}

/// Clamps an entered weight to a finite value `>= 0`.
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

fn count_from_f64(n: f64) -> u32 {
    // float-to-int casts saturate, and NaN maps to 0
    n.max(0.0).trunc() as u32
}

/// Reps must be a whole, non-negative count; fractions are truncated and
/// anything unreadable is 0.
pub fn coerce_reps(value: Option<&Value>) -> Repaired<u32> {
    match value.and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok()) {
        Some(reps) => Repaired::Clean(reps),
        None => Repaired::Fixed(count_from_f64(coerce_number(value).unwrap_or(0.0))),
    }
}

pub fn coerce_weight(value: Option<&Value>) -> Repaired<f64> {
    match value.and_then(Value::as_f64) {
        Some(w) if w.is_finite() && w >= 0.0 => Repaired::Clean(w),
        _ => Repaired::Fixed(sanitize_weight(coerce_number(value).unwrap_or(0.0))),
    }
}

pub fn coerce_done(value: Option<&Value>) -> Repaired<bool> {
    match value {
        Some(Value::Bool(b)) => Repaired::Clean(*b),
        other => Repaired::Fixed(truthy(other)),
    }
}

fn optional_string(value: Option<&Value>) -> Repaired<Option<String>> {
    match value {
        None | Some(Value::Null) => Repaired::Clean(None),
        Some(Value::String(s)) => Repaired::Clean(Some(s.clone())),
        Some(_) => Repaired::Fixed(None),
    }
}

fn optional_rpe(value: Option<&Value>) -> Repaired<Option<f64>> {
    match value {
        None | Some(Value::Null) => Repaired::Clean(None),
        Some(Value::Number(n)) if n.as_f64().map(f64::is_finite).unwrap_or(false) => {
            Repaired::Clean(n.as_f64())
        }
        other => Repaired::Fixed(coerce_number(other)),
    }
}

fn optional_count(value: Option<&Value>) -> Repaired<Option<u32>> {
    match value {
        None | Some(Value::Null) => Repaired::Clean(None),
        Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Repaired::Clean(Some(n)),
            None => Repaired::Fixed(coerce_number(value).map(count_from_f64)),
        },
    }
}

fn optional_flag(value: Option<&Value>) -> Repaired<Option<bool>> {
    match value {
        None | Some(Value::Null) => Repaired::Clean(None),
        Some(Value::Bool(b)) => Repaired::Clean(Some(*b)),
        other => Repaired::Fixed(Some(truthy(other))),
    }
}

/// Back-reference to the owning record, filled in when missing.
fn owner_ref(value: Option<&Value>, owner_id: &str) -> Repaired<String> {
    match value.and_then(Value::as_str) {
        Some(id) => Repaired::Clean(id.to_string()),
        None => Repaired::Fixed(owner_id.to_string()),
    }
}

/// Keeps a non-empty string id; numeric ids become strings and anything
/// else gets a fresh id.
fn record_id(obj: &Map<String, Value>, ids: &dyn IdGenerator) -> Repaired<String> {
    match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Repaired::Clean(id.clone()),
        Some(Value::Number(n)) => Repaired::Fixed(n.to_string()),
        _ => Repaired::Fixed(ids.new_id()),
    }
}

/// Fields of a stored record. Entries that are not objects are read as
/// empty records so they still get an id and defaults.
fn record_fields<'v>(
    raw: &'v Value,
    empty: &'v Map<String, Value>,
    kind: &str,
) -> Repaired<&'v Map<String, Value>> {
    match raw.as_object() {
        Some(obj) => Repaired::Clean(obj),
        None => {
            tracing::warn!("Stored {} is not an object, replacing it with an empty one", kind);
            Repaired::Fixed(empty)
        }
    }
}

fn extra_fields(obj: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Repairs one stored set.
pub fn repair_set(raw: &Value, exercise_id: &str, ids: &dyn IdGenerator) -> Repaired<ExerciseSet> {
    let empty = Map::new();
    let mut fixed = false;
    let obj = record_fields(raw, &empty, "set").track(&mut fixed);
    let id = record_id(obj, ids).track(&mut fixed);

    let set = ExerciseSet {
        exercise_id: owner_ref(obj.get("exerciseId"), exercise_id).track(&mut fixed),
        reps: coerce_reps(obj.get("reps")).track(&mut fixed),
        weight: coerce_weight(obj.get("weight")).track(&mut fixed),
        rpe: optional_rpe(obj.get("rpe")).track(&mut fixed),
        rest_sec: optional_count(obj.get("restSec")).track(&mut fixed),
        is_warmup: optional_flag(obj.get("isWarmup")).track(&mut fixed),
        is_done: coerce_done(obj.get("isDone")).track(&mut fixed),
        extra: extra_fields(obj, SET_FIELDS),
        id,
    };

    Repaired::new(set, fixed)
}

/// Repairs one stored exercise found at `index` in its workout.
pub fn repair_exercise(
    raw: &Value,
    workout_id: &str,
    index: usize,
    ids: &dyn IdGenerator,
) -> Repaired<Exercise> {
    let empty = Map::new();
    let mut fixed = false;
    let obj = record_fields(raw, &empty, "exercise").track(&mut fixed);
    let id = record_id(obj, ids).track(&mut fixed);

    let name = match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => {
            fixed = true;
            DEFAULT_EXERCISE_NAME.to_string()
        }
    };

    let sets = match obj.get("sets") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| repair_set(item, &id, ids).track(&mut fixed))
            .collect(),
        _ => {
            fixed = true;
            Vec::new()
        }
    };

    let exercise = Exercise {
        workout_id: owner_ref(obj.get("workoutId"), workout_id).track(&mut fixed),
        name,
        target_muscle: optional_string(obj.get("targetMuscle")).track(&mut fixed),
        position: repair_position(obj.get("position"), index).track(&mut fixed),
        sets,
        extra: extra_fields(obj, EXERCISE_FIELDS),
        id,
    };

    Repaired::new(exercise, fixed)
}

/// Repairs one stored workout. Records are never dropped: one without a
/// usable id is given a fresh one.
pub fn repair_workout(raw: &Value, ctx: &RepairContext<'_>) -> Repaired<Workout> {
    let empty = Map::new();
    let mut fixed = false;
    let obj = record_fields(raw, &empty, "workout").track(&mut fixed);
    let id = record_id(obj, ctx.ids).track(&mut fixed);

    let date = repair_date(obj.get("date"), obj.get("finishedAt"), ctx.today).track(&mut fixed);
    let status = repair_status(obj.get("status"), &id, ctx.current_id).track(&mut fixed);
    let finished_at = repair_finished_at(obj.get("finishedAt")).track(&mut fixed);

    let exercises = match obj.get("exercises") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| repair_exercise(item, &id, index, ctx.ids).track(&mut fixed))
            .collect(),
        _ => {
            fixed = true;
            Vec::new()
        }
    };

    let mut extra = extra_fields(obj, WORKOUT_FIELDS);
    // an unreadable finishedAt stays stored as it was
    if finished_at.is_none() {
        if let Some(raw) = obj.get("finishedAt").filter(|v| !v.is_null()) {
            extra.insert("finishedAt".to_string(), raw.clone());
        }
    }

    let workout = Workout {
        date,
        name: optional_string(obj.get("name")).track(&mut fixed),
        notes: optional_string(obj.get("notes")).track(&mut fixed),
        source_workout_id: optional_string(obj.get("sourceWorkoutId")).track(&mut fixed),
        status,
        finished_at,
        exercises,
        extra,
        id,
    };

    Repaired::new(workout, fixed)
}

/// Repairs a whole stored collection.
///
/// A slot that is not an array loads as empty and is reported clean, so the
/// unreadable value stays on disk until the next real write replaces it.
pub fn repair_collection(raw: &Value, ctx: &RepairContext<'_>) -> Repaired<Vec<Workout>> {
    let Some(items) = raw.as_array() else {
        if !raw.is_null() {
            tracing::warn!("Stored workouts are not a list, starting empty");
        }
        return Repaired::Clean(Vec::new());
    };

    let mut fixed = false;
    let workouts = items
        .iter()
        .map(|item| repair_workout(item, ctx).track(&mut fixed))
        .collect();

    Repaired::new(workouts, fixed)
}
