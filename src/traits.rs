//! Seams between the core and its collaborators

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StorageError;
use crate::task::Task;

/// Durable storage for the task list.
///
/// The whole collection is read once at startup, and written in full after every change.
pub trait TaskBackend: Send {
    /// Returns every stored task, in the order they have been stored
    fn load_all(&mut self) -> Result<Vec<Task>, StorageError>;
    /// Replaces the stored collection with `tasks`. This must not return before the data is written (or failed to)
    fn save_all(&mut self, tasks: &[Task]) -> Result<(), StorageError>;
}

/// Tells what time it is
pub trait Clock: Send + Sync {
    /// The current local calendar date
    fn today(&self) -> NaiveDate;
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}
