//! This module provides an in-memory backend, whose behaviour can be tweaked so that it returns errors on some tests

use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::task::Task;
use crate::traits::TaskBackend;

/// This stores some behaviour tweaks, that describe how a mocked instance will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    pub load_behaviour: (u32, u32),
    pub save_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All actions will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            load_behaviour: (0, n_fails),
            save_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_load(&mut self) -> Result<(), StorageError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.load_behaviour, "load")
    }
    pub fn can_save(&mut self) -> Result<(), StorageError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.save_behaviour, "save")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), StorageError> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(StorageError::Mocked(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value)))
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}



/// A backend that keeps its tasks in memory.
///
/// Clones share the same storage and the same [`MockBehaviour`], so that a test can keep a clone
/// to inspect what has been written, or to make the next writes fail.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    stored: Arc<Mutex<Vec<Task>>>,
    behaviour: Arc<Mutex<MockBehaviour>>,
    n_saves: Arc<Mutex<u32>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already contains `tasks`
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::new();
        *lock(&backend.stored) = tasks;
        backend
    }

    /// Change how the next loads and saves will behave
    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *lock(&self.behaviour) = behaviour;
    }

    /// What has been written by the last successful save
    pub fn stored_tasks(&self) -> Vec<Task> {
        lock(&self.stored).clone()
    }

    /// How many saves have succeeded so far
    pub fn save_count(&self) -> u32 {
        *lock(&self.n_saves)
    }
}

impl TaskBackend for MemoryBackend {
    fn load_all(&mut self) -> Result<Vec<Task>, StorageError> {
        lock(&self.behaviour).can_load()?;
        Ok(self.stored_tasks())
    }

    fn save_all(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        lock(&self.behaviour).can_save()?;
        *lock(&self.stored) = tasks.to_vec();
        *lock(&self.n_saves) += 1;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
