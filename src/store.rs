//! The in-memory task list, persisted through a [`TaskBackend`] after every change

use std::collections::{HashMap, HashSet};

use bitflags::bitflags;

use crate::error::{Error, Result, StorageError};
use crate::task::{Priority, Task, TaskId, TaskStatus};
use crate::traits::TaskBackend;

bitflags! {
    /// A set of statuses, used to pick tasks from a [`TaskStore`]
    pub struct StatusFilter: u8 {
        const UNSCHEDULED = 1;
        const TODAY = 2;
        const SCHEDULED = 4;
        const ARCHIVED = 8;
        /// Everything that is not archived yet
        const ACTIVE = Self::UNSCHEDULED.bits | Self::TODAY.bits | Self::SCHEDULED.bits;
    }
}

impl StatusFilter {
    pub fn matches(&self, status: &TaskStatus) -> bool {
        let flag = match status {
            TaskStatus::Unscheduled => Self::UNSCHEDULED,
            TaskStatus::Today => Self::TODAY,
            TaskStatus::Scheduled(_) => Self::SCHEDULED,
            TaskStatus::Archived(_) => Self::ARCHIVED,
        };
        self.contains(flag)
    }
}


/// What a batch operation did with each of the ids it was given
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutcome {
    /// Tasks that have been modified, in store order
    pub changed: Vec<TaskId>,
    /// Tasks that exist, but were left as they were (e.g. they already were in the target state)
    pub unchanged: Vec<TaskId>,
    /// Ids that match no task. These have been skipped.
    pub missing: Vec<TaskId>,
}


/// Owns every task, and makes sure every change is checked then written to the backend
#[derive(Debug)]
pub struct TaskStore<B: TaskBackend> {
    backend: B,
    tasks: Vec<Task>,
}

impl<B: TaskBackend> TaskStore<B> {
    /// Load every task from `backend`.
    ///
    /// Stored data that breaks an invariant (e.g. two tasks with the same id) is rejected rather than silently fixed.
    pub fn open(mut backend: B) -> Result<Self> {
        let tasks = backend.load_all()?;

        let mut seen = HashSet::new();
        for task in &tasks {
            if seen.insert(*task.id()) == false {
                return Err(StorageError::Corrupted(format!("task {} is stored twice", task.id())).into());
            }
            task.validate().map_err(|err| StorageError::Corrupted(err.to_string()))?;
        }
        log::info!("Task store opened with {} tasks", tasks.len());

        Ok(Self { backend, tasks })
    }

    /// Create a new unscheduled task. Surrounding whitespace is removed from `text`
    pub fn add(&mut self, text: &str, priority: Priority) -> Result<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid("task text is empty"));
        }

        let task = Task::new(text.to_string(), priority);
        log::debug!("Adding task {} ({:?})", task.id(), task.text());
        self.tasks.push(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Every task, in insertion order
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &TaskId) -> Result<&Task> {
        self.tasks.iter()
            .find(|t| t.id() == id)
            .ok_or(Error::NotFound(*id))
    }

    /// Tasks whose status is in `filter`, in insertion order
    pub fn filter(&self, filter: StatusFilter) -> Vec<&Task> {
        self.tasks.iter()
            .filter(|t| filter.matches(t.status()))
            .collect()
    }

    /// Apply a change to a single task, then persist the whole collection.
    ///
    /// The change is made on a copy, that only replaces the stored task if it is a legal update.
    /// If it is not, `InvalidInput` is returned and nothing is changed.
    pub fn mutate<F>(&mut self, id: &TaskId, updater: F) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let index = self.tasks.iter()
            .position(|t| t.id() == id)
            .ok_or(Error::NotFound(*id))?;

        let mut updated = self.tasks[index].clone();
        updater(&mut updated);
        if updated == self.tasks[index] {
            return Ok(updated);
        }
        self.tasks[index].validate_update(&updated)?;

        self.tasks[index] = updated.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Apply `updater` to every task whose id is in `ids`, then persist once.
    ///
    /// `updater` returns whether it changed the task. Every updated copy is checked before any is committed,
    /// so that a batch is either entirely applied or not at all. Unknown ids are skipped.
    pub fn mutate_batch<'a, I, F>(&mut self, ids: I, updater: F) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = &'a TaskId>,
        F: FnMut(&mut Task) -> bool,
    {
        let requested: Vec<TaskId> = ids.into_iter().cloned().collect();
        let wanted: HashSet<TaskId> = requested.iter().cloned().collect();

        let (changed, unchanged) = self.commit_where(|t| wanted.contains(t.id()), updater)?;

        let mut outcome = BatchOutcome { changed, unchanged, missing: Vec::new() };
        let mut reported = HashSet::new();
        for id in requested {
            if self.tasks.iter().any(|t| t.id() == &id) == false && reported.insert(id) {
                log::warn!("No task with id {}, skipping it", id);
                outcome.missing.push(id);
            }
        }
        Ok(outcome)
    }

    /// Apply `updater` to every task that matches `predicate`, then persist once.
    ///
    /// Returns the ids of the tasks that have actually changed.
    pub fn mutate_where<P, F>(&mut self, predicate: P, updater: F) -> Result<Vec<TaskId>>
    where
        P: Fn(&Task) -> bool,
        F: FnMut(&mut Task) -> bool,
    {
        let (changed, _unchanged) = self.commit_where(predicate, updater)?;
        Ok(changed)
    }

    fn commit_where<P, F>(&mut self, predicate: P, mut updater: F) -> Result<(Vec<TaskId>, Vec<TaskId>)>
    where
        P: Fn(&Task) -> bool,
        F: FnMut(&mut Task) -> bool,
    {
        let mut updates = HashMap::new();
        let mut changed = Vec::new();
        let mut unchanged = Vec::new();

        for (index, task) in self.tasks.iter().enumerate() {
            if predicate(task) == false {
                continue;
            }
            let mut updated = task.clone();
            if updater(&mut updated) {
                task.validate_update(&updated)?;
                changed.push(*task.id());
                updates.insert(index, updated);
            } else {
                unchanged.push(*task.id());
            }
        }

        if updates.is_empty() {
            return Ok((changed, unchanged));
        }
        for (index, updated) in updates {
            self.tasks[index] = updated;
        }
        self.persist()?;
        Ok((changed, unchanged))
    }

    /// Write the whole collection to the backend.
    ///
    /// In case of failure, the in-memory state is kept: the next successful write will store it.
    fn persist(&mut self) -> Result<()> {
        if let Err(err) = self.backend.save_all(&self.tasks) {
            log::error!("Unable to persist {} tasks: {}", self.tasks.len(), err);
            return Err(err.into());
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, Utc};

    use crate::error::ErrorKind;
    use crate::mock_behaviour::{MemoryBackend, MockBehaviour};

    fn store() -> (TaskStore<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = TaskStore::open(backend.clone()).unwrap();
        (store, backend)
    }

    #[test]
    fn add_trims_and_persists() {
        let (mut store, backend) = store();
        let task = store.add("  Buy milk \n", Priority::new(2).unwrap()).unwrap();

        assert_eq!(task.text(), "Buy milk");
        assert_eq!(task.status(), &TaskStatus::Unscheduled);
        assert_eq!(task.completed(), false);
        assert_eq!(backend.stored_tasks(), vec![task.clone()]);
        assert_eq!(store.find(task.id()).unwrap(), &task);
    }

    #[test]
    fn add_rejects_empty_text() {
        let (mut store, backend) = store();
        let err = store.add(" \t ", Priority::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(store.all().is_empty());
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn find_unknown_id() {
        let (store, _) = store();
        let id = TaskId::random();
        match store.find(&id) {
            Err(Error::NotFound(missing)) => assert_eq!(missing, id),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn mutate_rejects_illegal_updates() {
        let (mut store, backend) = store();
        let task = store.add("Write report", Priority::HIGHEST).unwrap();
        let saves = backend.save_count();

        let err = store.mutate(task.id(), |t| { t.set_status(TaskStatus::Archived(Utc::now())); }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(store.find(task.id()).unwrap().status(), &TaskStatus::Unscheduled);
        assert_eq!(backend.save_count(), saves);

        let err = store.mutate(&TaskId::random(), |t| { t.set_status(TaskStatus::Today); }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let (mut store, _) = store();
        let a = store.add("A", Priority::default()).unwrap();
        let b = store.add("B", Priority::default()).unwrap();
        store.mutate(b.id(), |t| { t.set_status(TaskStatus::Today); }).unwrap();

        // B cannot go back to Unscheduled, so the legal change on A must not be committed either
        let ids = vec![*a.id(), *b.id()];
        let a_id = *a.id();
        let result = store.mutate_batch(ids.iter(), |t| {
            if t.id() == &a_id {
                t.set_status(TaskStatus::Today)
            } else {
                t.set_status(TaskStatus::Unscheduled)
            }
        });
        assert!(result.is_err());
        assert_eq!(store.find(a.id()).unwrap().status(), &TaskStatus::Unscheduled);
        assert_eq!(store.find(b.id()).unwrap().status(), &TaskStatus::Today);
    }

    #[test]
    fn batch_skips_unknown_ids() {
        let (mut store, _) = store();
        let a = store.add("A", Priority::default()).unwrap();
        let unknown = TaskId::random();

        let ids = vec![unknown, *a.id()];
        let outcome = store.mutate_batch(ids.iter(), |t| t.set_status(TaskStatus::Today)).unwrap();
        assert_eq!(outcome.changed, vec![*a.id()]);
        assert!(outcome.unchanged.is_empty());
        assert_eq!(outcome.missing, vec![unknown]);
    }

    #[test]
    fn filter_by_status() {
        let (mut store, _) = store();
        let a = store.add("A", Priority::default()).unwrap();
        let b = store.add("B", Priority::default()).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
        store.mutate(b.id(), |t| { t.set_status(TaskStatus::Scheduled(date)); }).unwrap();

        let unscheduled: Vec<TaskId> = store.filter(StatusFilter::UNSCHEDULED).iter().map(|t| *t.id()).collect();
        assert_eq!(unscheduled, vec![*a.id()]);
        assert_eq!(store.filter(StatusFilter::ACTIVE).len(), 2);
        assert!(store.filter(StatusFilter::ARCHIVED).is_empty());
    }

    #[test]
    fn failed_write_keeps_the_change() {
        let (mut store, backend) = store();
        let task = store.add("Buy milk", Priority::default()).unwrap();

        backend.set_behaviour(MockBehaviour::fail_now(1));
        let err = store.mutate(task.id(), |t| { t.set_status(TaskStatus::Today); }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(store.find(task.id()).unwrap().status(), &TaskStatus::Today);
        assert_eq!(backend.stored_tasks()[0].status(), &TaskStatus::Unscheduled);

        // The next successful write catches up
        store.add("Call dentist", Priority::default()).unwrap();
        assert_eq!(backend.stored_tasks()[0].status(), &TaskStatus::Today);
    }

    #[test]
    fn open_rejects_duplicates() {
        let task = Task::new("Twice".to_string(), Priority::default());
        let backend = MemoryBackend::with_tasks(vec![task.clone(), task]);
        let err = TaskStore::open(backend).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    }

    #[test]
    fn open_rejects_empty_texts() {
        let task = Task::new("".to_string(), Priority::default());
        let backend = MemoryBackend::with_tasks(vec![task]);
        assert!(TaskStore::open(backend).is_err());
    }
}
