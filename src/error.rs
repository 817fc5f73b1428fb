//! Errors returned by this crate
//!
//! Every error belongs to one of the stable categories of [`ErrorKind`], so that callers (e.g. a GUI)
//! can decide how to report it without parsing its description.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::task::TaskId;

/// A convenient alias for results of this crate
pub type Result<T> = std::result::Result<T, Error>;

/// The stable category of an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected before anything was changed
    InvalidInput,
    /// The request referenced a task that does not exist
    NotFound,
    /// The change could not be written to the backing store
    PersistenceFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PersistenceFailure => "persistence_failure",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no task with id {0}")]
    NotFound(TaskId),

    /// Note that the in-memory state has already been changed when this is returned by a mutating operation
    #[error("unable to persist tasks: {0}")]
    Persistence(#[from] StorageError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }

    pub(crate) fn invalid<S: ToString>(reason: S) -> Self {
        Error::InvalidInput(reason.to_string())
    }
}

/// Errors raised by a [`TaskBackend`](crate::traits::TaskBackend)
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to (de)serialize tasks: {0}")]
    Serde(#[from] serde_json::Error),

    /// The stored data can be read, but it breaks an invariant (duplicate ids, empty text...)
    #[error("corrupted task data: {0}")]
    Corrupted(String),

    /// Used by mocked backends that have been told to fail
    #[error("{0}")]
    Mocked(String),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StorageError::Io { path: path.to_path_buf(), source }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let id = TaskId::random();
        assert_eq!(Error::invalid("empty").kind().as_str(), "invalid_input");
        assert_eq!(Error::NotFound(id).kind().as_str(), "not_found");
        let err = Error::from(StorageError::Mocked("disk full".to_string()));
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(err.kind().to_string(), "persistence_failure");
    }

    #[test]
    fn descriptions() {
        let id = TaskId::random();
        assert_eq!(Error::NotFound(id).to_string(), format!("no task with id {}", id));
        assert_eq!(Error::invalid("task text is empty").to_string(), "invalid input: task text is empty");
    }
}
