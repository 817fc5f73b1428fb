//! Commands that move tasks through their lifecycle
//!
//! ```text
//!                 schedule(d)
//!  Unscheduled ─────────────────► Scheduled(d) ──┐
//!       │                           ▲    │        │ archive_completed(Scheduled(d))
//!       │ move_to_today   schedule  │    │ move_to_today, or sweep on day d
//!       │                           │    ▼        ▼
//!       └────────────────────────►  Today ─────► Archived
//!                                       archive_completed(Today)
//! ```
//!
//! Batch commands skip the ids they do not know, so that the valid ids of the same batch still succeed.
//! Archived tasks are never moved again.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::store::{BatchOutcome, TaskStore};
use crate::task::{Task, TaskId, TaskStatus};
use crate::traits::TaskBackend;

/// Which tasks an archive command looks at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveScope {
    /// Tasks planned for today
    Today,
    /// Tasks scheduled for the given day
    Scheduled(NaiveDate),
}

impl ArchiveScope {
    /// The scope that matches what is displayed for a given view date (see [`crate::view::project`])
    pub fn for_view(view_date: Option<NaiveDate>) -> Self {
        match view_date {
            None => ArchiveScope::Today,
            Some(date) => ArchiveScope::Scheduled(date),
        }
    }

    fn contains(&self, status: &TaskStatus) -> bool {
        match (self, status) {
            (ArchiveScope::Today, TaskStatus::Today) => true,
            (ArchiveScope::Scheduled(wanted), TaskStatus::Scheduled(date)) => wanted == date,
            _ => false,
        }
    }
}


/// Plan the given tasks for today.
///
/// Unscheduled and scheduled tasks become `Today` (a scheduled task loses its date).
/// Tasks already planned for today, and archived tasks, are left as they are.
pub fn move_to_today<'a, B, I>(store: &mut TaskStore<B>, ids: I) -> Result<BatchOutcome>
where
    B: TaskBackend,
    I: IntoIterator<Item = &'a TaskId>,
{
    let outcome = store.mutate_batch(ids, |task| {
        match task.status() {
            TaskStatus::Unscheduled | TaskStatus::Scheduled(_) => task.set_status(TaskStatus::Today),
            TaskStatus::Today => false,
            TaskStatus::Archived(_) => {
                log::debug!("Task {} is archived, not moving it to today", task.id());
                false
            },
        }
    })?;
    log::info!("Moved {} tasks to today", outcome.changed.len());
    Ok(outcome)
}

/// Schedule the given tasks for `date`, replacing any previous date.
///
/// Any date is accepted, including past ones. Archived tasks are left as they are.
pub fn schedule<'a, B, I>(store: &mut TaskStore<B>, ids: I, date: NaiveDate) -> Result<BatchOutcome>
where
    B: TaskBackend,
    I: IntoIterator<Item = &'a TaskId>,
{
    let outcome = store.mutate_batch(ids, |task| {
        if task.status().is_archived() {
            log::debug!("Task {} is archived, not scheduling it", task.id());
            return false;
        }
        task.set_status(TaskStatus::Scheduled(date))
    })?;
    log::info!("Scheduled {} tasks for {}", outcome.changed.len(), date);
    Ok(outcome)
}

/// Turn every task scheduled for `today` into a `Today` task.
///
/// Only an exact date match counts: tasks scheduled for a past day stay scheduled for that day,
/// so that they remain visible under their date until the user deals with them.
/// Running this several times on the same day gives the same result as running it once.
///
/// Returns the ids of the tasks that have been moved.
pub fn auto_move_scheduled_to_today<B: TaskBackend>(store: &mut TaskStore<B>, today: NaiveDate) -> Result<Vec<TaskId>> {
    let moved = store.mutate_where(
        |task| task.scheduled_for() == Some(today),
        |task| task.set_status(TaskStatus::Today),
    )?;
    if moved.is_empty() == false {
        log::info!("{} scheduled tasks are due today ({}), moved them to today", moved.len(), today);
    }
    Ok(moved)
}

/// Archive every completed task of `scope`, stamping them with `now`.
///
/// Tasks of that scope that are not completed stay where they are.
/// Returns the ids of the archived tasks.
pub fn archive_completed<B: TaskBackend>(store: &mut TaskStore<B>, scope: ArchiveScope, now: DateTime<Utc>) -> Result<Vec<TaskId>> {
    let archived = store.mutate_where(
        |task| task.completed() && scope.contains(task.status()),
        |task| task.set_status(TaskStatus::Archived(now)),
    )?;
    log::info!("Archived {} completed tasks ({:?})", archived.len(), scope);
    Ok(archived)
}

/// Mark a single task as (un)completed, and return its updated version.
///
/// This works whatever the status of the task, archived tasks included (they stay archived).
pub fn set_completed<B: TaskBackend>(store: &mut TaskStore<B>, id: &TaskId, completed: bool, now: DateTime<Utc>) -> Result<Task> {
    store.mutate(id, |task| { task.set_completed(completed, now); })
}
