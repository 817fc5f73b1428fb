//! The entry point of this crate: a task store shared between the foreground commands and the background sweep

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::clock::SystemClock;
use crate::error::Result;
use crate::export::{self, ArchiveRow};
use crate::lifecycle::{self, ArchiveScope};
use crate::store::{BatchOutcome, StatusFilter, TaskStore};
use crate::sweep::feedback::FeedbackSender;
use crate::sweep::{Sweeper, SweeperHandle};
use crate::task::{Priority, Task, TaskId};
use crate::traits::{Clock, TaskBackend};
use crate::view::{self, Projection};

/// A task store that can be used from several places at once
pub type SharedStore<B> = Arc<Mutex<TaskStore<B>>>;

/// Lock a shared store.
///
/// A poisoned lock is recovered: tasks are replaced as a whole, so a panic cannot leave a half-updated task behind.
pub(crate) fn lock<B: TaskBackend>(store: &SharedStore<B>) -> MutexGuard<'_, TaskStore<B>> {
    store.lock().unwrap_or_else(|poisoned| {
        log::warn!("Task store lock was poisoned, recovering it");
        poisoned.into_inner()
    })
}


/// Every command of the task tracker.
///
/// Each command holds the store lock for its whole duration (including the write to the backend),
/// so that commands never interleave with each other, nor with a sweep.
/// Clones share the same tasks.
pub struct TaskTracker<B: TaskBackend> {
    store: SharedStore<B>,
    clock: Arc<dyn Clock>,
}

impl<B: TaskBackend> TaskTracker<B> {
    /// Load the tasks from `backend`, using the wall clock of this machine
    pub fn open(backend: B) -> Result<Self> {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    /// Load the tasks from `backend`, using a custom clock
    pub fn with_clock(backend: B, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = TaskStore::open(backend)?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            clock,
        })
    }

    /// The underlying store, e.g. to give it to a custom [`Sweeper`]
    pub fn shared_store(&self) -> SharedStore<B> {
        Arc::clone(&self.store)
    }

    /// Create a new unscheduled task. `priority` must be 1 (highest) to 3 (lowest)
    pub fn add_task(&self, text: &str, priority: u8) -> Result<Task> {
        let priority = Priority::new(priority)?;
        lock(&self.store).add(text, priority)
    }

    pub fn find(&self, id: &TaskId) -> Result<Task> {
        lock(&self.store).find(id).map(|task| task.clone())
    }

    /// A snapshot of every task, in insertion order
    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.store).all().to_vec()
    }

    /// A snapshot of the tasks whose status is in `filter`
    pub fn filter(&self, filter: StatusFilter) -> Vec<Task> {
        lock(&self.store).filter(filter).into_iter().cloned().collect()
    }

    pub fn set_completed(&self, id: &TaskId, completed: bool) -> Result<Task> {
        let now = self.clock.now();
        lifecycle::set_completed(&mut *lock(&self.store), id, completed, now)
    }

    /// See [`lifecycle::move_to_today`]
    pub fn move_to_today<'a, I>(&self, ids: I) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = &'a TaskId>,
    {
        lifecycle::move_to_today(&mut *lock(&self.store), ids)
    }

    /// See [`lifecycle::schedule`]
    pub fn schedule<'a, I>(&self, ids: I, date: NaiveDate) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = &'a TaskId>,
    {
        lifecycle::schedule(&mut *lock(&self.store), ids, date)
    }

    /// See [`lifecycle::archive_completed`]
    pub fn archive_completed(&self, scope: ArchiveScope) -> Result<Vec<TaskId>> {
        let now = self.clock.now();
        lifecycle::archive_completed(&mut *lock(&self.store), scope, now)
    }

    /// Archive the completed tasks that are displayed in the primary list of `view_date`
    pub fn archive_completed_in_view(&self, view_date: Option<NaiveDate>) -> Result<Vec<TaskId>> {
        self.archive_completed(ArchiveScope::for_view(view_date))
    }

    /// Run a sweep right now, without waiting for the background sweeper
    pub fn sweep_now(&self) -> Result<Vec<TaskId>> {
        let today = self.clock.today();
        lifecycle::auto_move_scheduled_to_today(&mut *lock(&self.store), today)
    }

    /// What to display for `view_date` (or for today if `None`)
    pub fn view(&self, view_date: Option<NaiveDate>) -> Projection {
        view::project(lock(&self.store).all(), view_date)
    }

    /// The archived tasks, oldest archive first
    pub fn export_rows(&self) -> Vec<ArchiveRow> {
        export::export_rows(lock(&self.store).all())
    }

    /// The archived tasks, as CSV text
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.export_rows())
    }

    /// Write the archived tasks to a CSV file in `folder`, named after the current date.
    ///
    /// Returns the path of the written file.
    pub fn export_csv_to_folder(&self, folder: &Path) -> Result<PathBuf> {
        let path = folder.join(export::default_file_name(self.clock.today()));
        export::save_csv(&path, &self.export_rows())?;
        Ok(path)
    }
}

impl<B: TaskBackend + 'static> TaskTracker<B> {
    /// Start the background sweep (see [`Sweeper::spawn`]). This must be called from within a tokio runtime
    #[must_use = "dropping the handle stops the sweeper"]
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        Sweeper::new(self.shared_store(), Arc::clone(&self.clock)).spawn()
    }

    /// Start the background sweep, that reports every sweep to `feedback_sender`
    #[must_use = "dropping the handle stops the sweeper"]
    pub fn spawn_sweeper_with_feedback(&self, feedback_sender: FeedbackSender) -> SweeperHandle {
        Sweeper::new(self.shared_store(), Arc::clone(&self.clock))
            .with_feedback(feedback_sender)
            .spawn()
    }
}

impl<B: TaskBackend> Clone for TaskTracker<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::clock::ManualClock;
    use crate::error::ErrorKind;
    use crate::mock_behaviour::MemoryBackend;
    use crate::task::TaskStatus;

    fn tracker(today: NaiveDate) -> (TaskTracker<MemoryBackend>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(today));
        let tracker = TaskTracker::with_clock(MemoryBackend::new(), clock.clone()).unwrap();
        (tracker, clock)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_task_checks_the_priority() {
        let (tracker, _) = tracker(date(2026, 10, 19));
        assert_eq!(tracker.add_task("Too urgent", 0).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(tracker.add_task("Not urgent enough", 4).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert!(tracker.tasks().is_empty());

        let task = tracker.add_task("Buy milk", 3).unwrap();
        assert_eq!(task.priority(), Priority::LOWEST);
        assert_eq!(tracker.find(task.id()).unwrap(), task);
    }

    #[test]
    fn archive_what_is_in_view() {
        let today = date(2026, 10, 19);
        let later = date(2026, 10, 22);
        let (tracker, _) = tracker(today);
        let a = tracker.add_task("A", 2).unwrap();
        let b = tracker.add_task("B", 2).unwrap();
        tracker.move_to_today(&[*a.id()]).unwrap();
        tracker.schedule(&[*b.id()], later).unwrap();
        tracker.set_completed(a.id(), true).unwrap();
        tracker.set_completed(b.id(), true).unwrap();

        assert_eq!(tracker.archive_completed_in_view(Some(later)).unwrap(), vec![*b.id()]);
        assert_eq!(tracker.find(a.id()).unwrap().status(), &TaskStatus::Today);
        assert_eq!(tracker.archive_completed_in_view(None).unwrap(), vec![*a.id()]);
        assert_eq!(tracker.filter(StatusFilter::ARCHIVED).len(), 2);
    }

    #[test]
    fn sweep_follows_the_clock() {
        let (tracker, clock) = tracker(date(2026, 10, 19));
        let task = tracker.add_task("Buy milk", 2).unwrap();
        tracker.schedule(&[*task.id()], date(2026, 10, 20)).unwrap();

        assert!(tracker.sweep_now().unwrap().is_empty());
        clock.set_today(date(2026, 10, 20));
        assert_eq!(tracker.sweep_now().unwrap(), vec![*task.id()]);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let (tracker, _) = tracker(date(2026, 10, 19));
        tracker.add_task("Survivor", 2).unwrap();

        let store = tracker.shared_store();
        let result = std::thread::spawn(move || {
            let _guard = store.lock().unwrap();
            panic!("panicking while holding the lock");
        }).join();
        assert!(result.is_err());

        assert_eq!(tracker.tasks().len(), 1);
        tracker.add_task("Still working", 2).unwrap();
        assert_eq!(tracker.tasks().len(), 2);
    }

    #[test]
    fn export_to_a_folder() {
        let folder = tempfile::tempdir().unwrap();
        let (tracker, _) = tracker(date(2026, 10, 19));
        let task = tracker.add_task("Buy milk", 2).unwrap();
        tracker.move_to_today(&[*task.id()]).unwrap();
        tracker.set_completed(task.id(), true).unwrap();
        tracker.archive_completed(ArchiveScope::Today).unwrap();

        let path = tracker.export_csv_to_folder(folder.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "todo-archive-2026-10-19.csv");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), tracker.export_csv());
        assert_eq!(tracker.export_rows().len(), 1);
    }
}
