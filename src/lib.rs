//! This crate provides the core of a personal task tracker.
//!
//! Tasks are either unscheduled, planned for today, scheduled for a given day, or archived once completed.
//! They are kept in a [`TaskStore`], that writes the whole list to a [`TaskBackend`](traits::TaskBackend)
//! (e.g. a [`JsonFile`](storage::JsonFile)) after every change.
//!
//! The commands that move tasks through their lifecycle are in the [`lifecycle`] module. \
//! What a user interface should display for a given day is computed by the [`view`] module. \
//! A background [`Sweeper`](sweep::Sweeper) moves scheduled tasks to today when their day has come.
//!
//! All these are put together in a [`TaskTracker`], that can be shared between a user interface and the background sweep.

pub mod traits;
pub mod error;
pub use error::{Error, ErrorKind, Result};

mod task;
pub use task::{CompletionStatus, Priority, Task, TaskId, TaskStatus};
pub mod store;
pub use store::{BatchOutcome, StatusFilter, TaskStore};

pub mod lifecycle;
pub use lifecycle::ArchiveScope;
pub mod view;
pub use view::Projection;
pub mod export;
pub mod sweep;

pub mod tracker;
pub use tracker::TaskTracker;

pub mod storage;
pub mod mock_behaviour;
pub mod clock;

pub mod config;
pub mod utils;
