use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One performed (or planned) set within an exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: String,
    /// Owning exercise. Used for lookups only.
    #[serde(default)]
    pub exercise_id: String,
    pub reps: u32,
    /// Kilograms.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_sec: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_warmup: Option<bool>,
    #[serde(default)]
    pub is_done: bool,
    /// Fields this version does not know about, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExerciseSet {
    pub fn new(id: impl Into<String>, exercise_id: impl Into<String>, reps: u32, weight: f64) -> Self {
        Self {
            id: id.into(),
            exercise_id: exercise_id.into(),
            reps,
            weight,
            rpe: None,
            rest_sec: None,
            is_warmup: None,
            is_done: false,
            extra: Map::new(),
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

    pub fn with_warmup(mut self, is_warmup: bool) -> Self {
        self.is_warmup = Some(is_warmup);
        self
    }

    pub fn is_warmup(&self) -> bool {
        self.is_warmup.unwrap_or(false)
    }

    /// reps × weight
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }
}

impl fmt::Display for ExerciseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_done { "x" } else { " " };
        write!(f, "[{}] {} x {} kg", mark, self.reps, self.weight)?;
        if let Some(rpe) = self.rpe {
            write!(f, " @ RPE {}", rpe)?;
        }
        if let Some(rest) = self.rest_sec {
            write!(f, ", rest {}s", rest)?;
        }
        if self.is_warmup() {
            write!(f, " (warmup)")?;
        }
        Ok(())
    }
}
