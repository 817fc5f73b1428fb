//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Beginning of the name of exported archive files (example of a full name: `todo-archive-2026-10-19.csv`).
/// Feel free to override it when initing this library.
pub static EXPORT_FILE_PREFIX: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("todo-archive".to_string())));

/// Name of the task file created by [`JsonFile::in_folder`](crate::storage::JsonFile::in_folder).
/// Feel free to override it when initing this library.
pub static TASK_FILE_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("tasks.json".to_string())));

pub(crate) fn read(setting: &Lazy<Arc<Mutex<String>>>) -> String {
    setting.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}
