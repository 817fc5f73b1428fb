//! To-do tasks and their lifecycle status

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};


/// The stable identifier of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    content: Uuid,
}

impl TaskId {
    /// Generate a random TaskId.
    pub fn random() -> Self {
        Self { content: Uuid::new_v4() }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.content
    }
}

impl From<Uuid> for TaskId {
    fn from(uuid: Uuid) -> Self {
        Self { content: uuid }
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let u = Uuid::parse_str(s)?;
        Ok(Self::from(u))
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}



/// How important a task is. `1` is the most important.
///
/// There are as many priorities as choices offered to the user when a task is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(3);

    pub fn new(value: u8) -> Result<Self> {
        if value < Self::HIGHEST.0 || value > Self::LOWEST.0 {
            return Err(Error::invalid(format!(
                "priority must be between {} and {}, got {}", Self::HIGHEST.0, Self::LOWEST.0, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority(2)
    }
}

impl TryFrom<u8> for Priority {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        priority.0
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}



/// Whether a task is done.
///
/// The completion date is optional, because tasks that have been loaded from older files may not have one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed(Option<DateTime<Utc>>),
    Uncompleted,
}
impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }
}



/// Where a task stands in its lifecycle.
///
/// A task that is scheduled always has a date, and a task that is not scheduled never has one.
/// Rather than storing a status and an optional date side by side, the date lives inside the
/// `Scheduled` variant, so that these impossible combinations cannot even be expressed.
/// The same goes for the archive timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not planned yet
    Unscheduled,
    /// To be done today
    Today,
    /// Planned for a given day (the sweep turns it into `Today` when that day comes)
    Scheduled(NaiveDate),
    /// Done and put away, at the given time. This is terminal.
    Archived(DateTime<Utc>),
}

impl TaskStatus {
    pub fn scheduled_for(&self) -> Option<NaiveDate> {
        match self {
            TaskStatus::Scheduled(date) => Some(*date),
            _ => None,
        }
    }

    pub fn archived_at(&self) -> Option<&DateTime<Utc>> {
        match self {
            TaskStatus::Archived(at) => Some(at),
            _ => None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at().is_some()
    }

    /// A short name of the variant, without its embedded data
    pub fn name(&self) -> &'static str {
        match self {
            TaskStatus::Unscheduled => "unscheduled",
            TaskStatus::Today => "today",
            TaskStatus::Scheduled(_) => "scheduled",
            TaskStatus::Archived(_) => "archived",
        }
    }

    /// Whether a task in this status is allowed to move to `next`.
    ///
    /// Transitions only go forward, except between `Today` and `Scheduled`. Nothing leaves `Archived`.
    pub fn can_become(&self, next: &TaskStatus) -> bool {
        use TaskStatus::*;

        if self == next {
            return true;
        }
        match (self, next) {
            (Archived(_), _) => false,
            (_, Unscheduled) => false,
            (Unscheduled, Today) | (Unscheduled, Scheduled(_)) => true,
            (Today, Scheduled(_)) | (Scheduled(_), Today) | (Scheduled(_), Scheduled(_)) => true,
            (Today, Archived(_)) | (Scheduled(_), Archived(_)) => true,
            _ => false,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Scheduled(date) => write!(f, "scheduled for {}", date),
            TaskStatus::Archived(at) => write!(f, "archived on {}", at.to_rfc3339()),
            other => write!(f, "{}", other.name()),
        }
    }
}



/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    /// What has to be done
    text: String,
    priority: Priority,
    status: TaskStatus,
    completion_status: CompletionStatus,
    creation_date: DateTime<Utc>,
    /// The last time this item was modified
    last_modified: DateTime<Utc>,
}


impl Task {
    /// Create a brand new, unscheduled Task.
    /// This will pick a new (random) task ID.
    pub fn new(text: String, priority: Priority) -> Self {
        let now = Utc::now();
        Self::new_with_parameters(TaskId::random(), text, priority,
                                  TaskStatus::Unscheduled, CompletionStatus::Uncompleted,
                                  now, now)
    }

    /// Create a new Task instance, e.g. one that has been read from a file
    pub fn new_with_parameters(id: TaskId, text: String, priority: Priority,
                               status: TaskStatus, completion_status: CompletionStatus,
                               creation_date: DateTime<Utc>, last_modified: DateTime<Utc>,
                            ) -> Self
    {
        Self {
            id,
            text,
            priority,
            status,
            completion_status,
            creation_date,
            last_modified,
        }
    }

    pub fn id(&self) -> &TaskId             { &self.id }
    pub fn text(&self) -> &str              { &self.text }
    pub fn priority(&self) -> Priority      { self.priority }
    pub fn status(&self) -> &TaskStatus     { &self.status }
    pub fn completed(&self) -> bool         { self.completion_status.is_completed() }
    pub fn completion_status(&self) -> &CompletionStatus { &self.completion_status }
    pub fn creation_date(&self) -> &DateTime<Utc>        { &self.creation_date }
    pub fn last_modified(&self) -> &DateTime<Utc>        { &self.last_modified }
    pub fn scheduled_for(&self) -> Option<NaiveDate>     { self.status.scheduled_for() }
    pub fn archived_at(&self) -> Option<&DateTime<Utc>>  { self.status.archived_at() }

    /// Check the invariants that do not depend on the history of this task
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::invalid(format!("task {} has an empty text", self.id)));
        }
        Ok(())
    }

    /// Check that `updated` is a legal next version of this task
    pub fn validate_update(&self, updated: &Task) -> Result<()> {
        updated.validate()?;

        if updated.id != self.id {
            return Err(Error::invalid(format!("task {} cannot change its id to {}", self.id, updated.id)));
        }
        if updated.creation_date != self.creation_date {
            return Err(Error::invalid(format!("task {} cannot change its creation date", self.id)));
        }
        if self.status.can_become(&updated.status) == false {
            return Err(Error::invalid(format!(
                "task {} cannot go from {} to {}", self.id, self.status.name(), updated.status.name()
            )));
        }
        Ok(())
    }

    fn update_last_modified(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Set the completion status
    pub fn set_completion_status(&mut self, new_completion_status: CompletionStatus) {
        self.update_last_modified();
        self.completion_status = new_completion_status;
    }

    /// Mark this task as (un)completed, at time `now`.
    /// Returns whether anything changed.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> bool {
        if self.completed() == completed {
            return false;
        }
        let new_status = if completed {
            CompletionStatus::Completed(Some(now))
        } else {
            CompletionStatus::Uncompleted
        };
        self.set_completion_status(new_status);
        true
    }

    /// Change the lifecycle status.
    ///
    /// This does not check the transition is legal. The store does that when the change is committed.
    /// Returns whether anything changed.
    pub fn set_status(&mut self, new_status: TaskStatus) -> bool {
        if self.status == new_status {
            return false;
        }
        self.update_last_modified();
        self.status = new_status;
        true
    }
}
