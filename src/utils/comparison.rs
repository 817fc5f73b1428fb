//! Utilities to compare tasks
//!
//! These can be used to sort results, e.g. with `sort_by`

use std::cmp::Ordering;

use crate::task::Task;

/// Compare by archive date, oldest first. Tasks that are not archived come last.
pub fn compare_archived_at(left: &Task, right: &Task) -> Ordering {
    match (left.archived_at(), right.archived_at()) {
        (Some(l), Some(r)) => l.cmp(r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare by priority, most important first
pub fn compare_priority(left: &Task, right: &Task) -> Ordering {
    Ord::cmp(&left.priority(), &right.priority())
}
