//! Identifier generation for workouts, exercises and sets.

use std::cell::Cell;
use uuid::Uuid;

pub trait IdGenerator {
    /// Returns an id unique within the lifetime of the dataset.
    fn new_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Predictable ids (`<prefix>1`, `<prefix>2`, ...).
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}{}", self.prefix, n)
    }
}
