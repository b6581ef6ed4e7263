//! The current-workout pointer.
//!
//! At most one draft is "in progress". Which one is held here, as a value the
//! caller owns and hands to the repository, rather than as hidden state.
//! The repository loads it with `load_current` and the caller persists it
//! with `save_current` once [`CurrentWorkout::is_dirty`] reports a change.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentWorkout {
    id: Option<String>,
    dirty: bool,
}

impl CurrentWorkout {
    /// A pointer as read from storage. An empty id means no workout.
    pub fn new(id: Option<String>) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            dirty: false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn points_to(&self, workout_id: &str) -> bool {
        self.id.as_deref() == Some(workout_id)
    }

    pub fn set(&mut self, workout_id: impl Into<String>) {
        let workout_id = workout_id.into();
        if !self.points_to(&workout_id) {
            self.id = Some(workout_id);
            self.dirty = true;
        }
    }

    pub fn clear(&mut self) {
        if self.id.take().is_some() {
            self.dirty = true;
        }
    }

    /// Whether the pointer changed since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
