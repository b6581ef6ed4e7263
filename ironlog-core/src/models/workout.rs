use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::exercise::Exercise;
use super::stats::WorkoutStats;
use super::status::WorkoutStatus;

/// One training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Workout this one was repeated from. Never an ownership relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_workout_id: Option<String>,
    pub status: WorkoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workout {
    /// A fresh draft with no exercises.
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            name: None,
            notes: None,
            source_workout_id: None,
            status: WorkoutStatus::Draft,
            finished_at: None,
            exercises: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_exercises(mut self, exercises: Vec<Exercise>) -> Self {
        self.exercises = exercises;
        self
    }

    pub fn is_draft(&self) -> bool {
        self.status == WorkoutStatus::Draft
    }

    pub fn is_done(&self) -> bool {
        self.status == WorkoutStatus::Done
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Workout",
        }
    }

    pub fn find_exercise(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    /// Exercises in display order. Ties keep stored order.
    pub fn sorted_exercises(&self) -> Vec<&Exercise> {
        let mut list: Vec<&Exercise> = self.exercises.iter().collect();
        list.sort_by_key(|e| e.position);
        list
    }

    pub fn stats(&self) -> WorkoutStats {
        WorkoutStats::of(self)
    }

    /// Sort key for the history view: completion time, falling back to the
    /// start of the workout's calendar day.
    pub fn history_key(&self) -> NaiveDateTime {
        match self.finished_at {
            Some(at) => at.naive_utc(),
            None => self.date.and_time(chrono::NaiveTime::MIN),
        }
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} - {}", self.date, self.display_name());
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        writeln!(f, "Status: {}", self.status)?;

        if let Some(at) = self.finished_at {
            writeln!(f, "Finished: {}", at.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(source) = &self.source_workout_id {
            writeln!(f, "Repeated from: {}", source)?;
        }

        if !self.exercises.is_empty() {
            writeln!(f)?;
            for (i, exercise) in self.sorted_exercises().into_iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, exercise)?;
                for (n, set) in exercise.sets.iter().enumerate() {
                    writeln!(f, "   {}. {}", n + 1, set)?;
                }
            }
        }

        if let Some(notes) = self.notes.as_deref().filter(|n| !n.is_empty()) {
            writeln!(f, "\nNotes: {}", notes)?;
        }

        Ok(())
    }
}
