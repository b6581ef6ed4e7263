use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::set::ExerciseSet;

/// Name given to exercises stored without one.
pub const DEFAULT_EXERCISE_NAME: &str = "Exercise";

/// One named movement within a workout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    /// Owning workout. Used for lookups only.
    #[serde(default)]
    pub workout_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_muscle: Option<String>,
    /// Display order among sibling exercises.
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exercise {
    pub fn new(
        id: impl Into<String>,
        workout_id: impl Into<String>,
        name: impl Into<String>,
        position: u32,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            workout_id: workout_id.into(),
            name: if name.trim().is_empty() {
                DEFAULT_EXERCISE_NAME.to_string()
            } else {
                name
            },
            target_muscle: None,
            position,
            sets: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_target_muscle(mut self, muscle: impl Into<String>) -> Self {
        self.target_muscle = Some(muscle.into());
        self
    }

    pub fn with_sets(mut self, sets: Vec<ExerciseSet>) -> Self {
        self.sets = sets;
        self
    }

    pub fn find_set(&self, set_id: &str) -> Option<&ExerciseSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.is_done).count()
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(muscle) = &self.target_muscle {
            write!(f, " ({})", muscle)?;
        }
        Ok(())
    }
}
