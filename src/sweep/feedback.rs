//! Utilities to track the sweeps, and to tell a presentation layer when to refresh

use std::fmt::{Display, Error, Formatter};

/// An event that happens during a sweep
#[derive(Clone, Debug, PartialEq)]
pub enum SweepEvent {
    /// No sweep has run yet
    NotStarted,
    /// A sweep has just started
    Started,
    /// A sweep is over. The current view should be recomputed.
    ///
    /// `promoted` counts the tasks moved to today in memory. When `success` is false, these
    /// moves have not been written yet: the next successful write will store them.
    Finished{ promoted: usize, success: bool },
}

impl Display for SweepEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            SweepEvent::NotStarted => write!(f, "Not started"),
            SweepEvent::Started => write!(f, "Sweep has started..."),
            SweepEvent::Finished{promoted, success} => match success {
                true => write!(f, "Sweep successfully finished, {} tasks moved to today", promoted),
                false => write!(f, "Sweep finished with errors, {} tasks moved to today but not saved", promoted),
            }
        }
    }
}

impl Default for SweepEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}



/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<SweepEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<SweepEvent>;

/// Create a feeback channel, that can be used to know when a sweep has changed the tasks
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(SweepEvent::default())
}




/// Tracks the errors of the current sweep, and tells the listener (if any) how it went
pub struct SweepProgress {
    n_errors: u32,
    feedback_channel: Option<FeedbackSender>
}
impl SweepProgress {
    pub fn new() -> Self {
        Self { n_errors: 0, feedback_channel: None }
    }
    pub fn new_with_feedback_channel(channel: FeedbackSender) -> Self {
        Self { n_errors: 0, feedback_channel: Some(channel) }
    }

    /// Reset the error count, and tell the listener a new sweep starts
    pub fn start(&mut self) {
        self.n_errors = 0;
        self.send(SweepEvent::Started);
    }

    pub fn is_success(&self) -> bool {
        self.n_errors == 0
    }

    /// Log an error of the current sweep
    pub fn error(&mut self, text: &str) {
        log::error!("{}", text);
        self.n_errors += 1;
    }

    /// Tell the listener the current sweep is over, and return what has been sent
    pub fn finish(&mut self, promoted: usize) -> SweepEvent {
        let event = SweepEvent::Finished{ promoted, success: self.is_success() };
        log::debug!("{}", event);
        self.send(event.clone());
        event
    }

    fn send(&self, event: SweepEvent) {
        if let Some(sender) = self.feedback_channel.as_ref() {
            // Nobody listening anymore is not an error
            let _ = sender.send(event);
        }
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new()
    }
}
