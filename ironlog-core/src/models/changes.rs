//! Input payloads for repository operations.
//!
//! Every field that the caller may leave out is an `Option`; `None` always
//! means "keep what is stored" (or "use the default" for create-like calls).

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Which workouts `list_workouts` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkoutFilter {
    #[default]
    All,
    OnlyDone,
    OnlyDraft,
}

#[derive(Debug, Clone, Default)]
pub struct NewWorkout {
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl NewWorkout {
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewExercise {
    pub name: String,
    pub target_muscle: Option<String>,
}

impl NewExercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_muscle: None,
        }
    }

    pub fn with_target_muscle(mut self, muscle: impl Into<String>) -> Self {
        self.target_muscle = Some(muscle.into());
        self
    }
}

/// A set as entered by the user. Reps and weight are sanitized on insert,
/// so out-of-range input is accepted here.
#[derive(Debug, Clone, Default)]
pub struct NewSet {
    pub reps: i64,
    pub weight: f64,
    pub rpe: Option<f64>,
    pub rest_sec: Option<u32>,
    pub is_warmup: bool,
}

impl NewSet {
    pub fn new(reps: i64, weight: f64) -> Self {
        Self {
            reps,
            weight,
            ..Default::default()
        }
    }

    pub fn with_rpe(mut self, rpe: f64) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn with_rest_sec(mut self, rest_sec: u32) -> Self {
        self.rest_sec = Some(rest_sec);
        self
    }

    pub fn warmup(mut self) -> Self {
        self.is_warmup = true;
        self
    }
}

/// Partial update of a set.
#[derive(Debug, Clone, Default)]
pub struct SetChanges {
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub is_done: Option<bool>,
}

impl SetChanges {
    pub fn reps(reps: i64) -> Self {
        Self {
            reps: Some(reps),
            ..Default::default()
        }
    }

    pub fn weight(weight: f64) -> Self {
        Self {
            weight: Some(weight),
            ..Default::default()
        }
    }

    pub fn done(is_done: bool) -> Self {
        Self {
            is_done: Some(is_done),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reps.is_none() && self.weight.is_none() && self.is_done.is_none()
    }
}

/// Relative nudge of one set field, as done by the editor's +/- buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetAdjustment {
    Reps(i64),
    Weight(f64),
}

/// Partial update of a workout's date, name and notes.
#[derive(Debug, Clone, Default)]
pub struct MetaChanges {
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl MetaChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.name.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(format!("Invalid direction '{}'. Valid options: up, down", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RepeatOptions {
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
}

/// New content for an already finished workout. Exercises stay loosely
/// typed until the repository reads them with the stored-data rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceWith {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Value>,
}
