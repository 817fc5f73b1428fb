//! The periodic sweep, that moves scheduled tasks to today when their day has come
//!
//! It runs as a background tokio task, and shares the task store with the foreground commands
//! (see [`TaskTracker`](crate::tracker::TaskTracker)). Each firing holds the store lock for its
//! whole duration, so that it never interleaves with a foreground command.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{ErrorKind, Result};
use crate::lifecycle;
use crate::store::StatusFilter;
use crate::task::TaskId;
use crate::tracker::{lock, SharedStore};
use crate::traits::{Clock, TaskBackend};

pub mod feedback;
use feedback::{FeedbackSender, SweepProgress};

/// Time between two sweeps
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);


/// Moves due tasks to today, once per [`SWEEP_INTERVAL`]
pub struct Sweeper<B: TaskBackend> {
    store: SharedStore<B>,
    clock: Arc<dyn Clock>,
    progress: SweepProgress,
}

impl<B: TaskBackend + 'static> Sweeper<B> {
    pub fn new(store: SharedStore<B>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, progress: SweepProgress::new() }
    }

    /// Send the progress of every sweep to `feedback_sender`
    pub fn with_feedback(mut self, feedback_sender: FeedbackSender) -> Self {
        self.progress = SweepProgress::new_with_feedback_channel(feedback_sender);
        self
    }

    /// Run a single sweep, now.
    ///
    /// Errors are logged and reported to the feedback channel (if any) before being returned.
    pub fn sweep_once(&mut self) -> Result<Vec<TaskId>> {
        self.progress.start();
        let today = self.clock.today();

        let (result, due) = {
            let mut store = lock(&self.store);
            let due = store.filter(StatusFilter::SCHEDULED).iter()
                .filter(|task| task.scheduled_for() == Some(today))
                .count();
            (lifecycle::auto_move_scheduled_to_today(&mut *store, today), due)
        };

        let promoted = match &result {
            Ok(moved) => moved.len(),
            Err(err) => {
                self.progress.error(&format!("Sweep for {} failed: {}", today, err));
                // A failed write does not undo the moves
                match err.kind() {
                    ErrorKind::PersistenceFailure => due,
                    _ => 0,
                }
            },
        };
        self.progress.finish(promoted);
        result
    }

    /// Start sweeping in the background: right away, then once per [`SWEEP_INTERVAL`].
    ///
    /// This must be called from within a tokio runtime.
    /// A sweep is never started while the previous one is still running; ticks that have been missed are skipped.
    #[must_use = "dropping the handle stops the sweeper"]
    pub fn spawn(mut self) -> SweeperHandle {
        let (shutdown_sender, mut shutdown_receiver) = oneshot::channel::<()>();

        let join_handle = tokio::spawn(async move {
            log::info!("Sweeper started, running every {:?}", SWEEP_INTERVAL);
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown_receiver => break,
                    _ = interval.tick() => {
                        // Failures have already been reported, the next tick will try again
                        let _ = self.sweep_once();
                    }
                }
            }
            log::info!("Sweeper stopped");
        });

        SweeperHandle {
            shutdown_sender,
            join_handle,
        }
    }
}


/// Controls a sweeper that runs in the background.
///
/// Dropping this handle stops the sweeper as well.
#[must_use = "dropping the handle stops the sweeper"]
pub struct SweeperHandle {
    shutdown_sender: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper, and wait until it has stopped.
    ///
    /// A sweep that is already running is completed first.
    pub async fn stop(self) {
        let _ = self.shutdown_sender.send(());
        if let Err(err) = self.join_handle.await {
            log::error!("Sweeper did not stop cleanly: {}", err);
        }
    }
}
