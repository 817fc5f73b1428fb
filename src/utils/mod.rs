//! Some utility functions

pub mod comparison;

use crate::task::{Task, TaskStatus};
use crate::view::Projection;

/// A debug utility that pretty-prints both lists of a projection, most important tasks first
pub fn print_projection(projection: &Projection) {
    println!("{}", projection.title());
    let mut primary = projection.primary.clone();
    primary.sort_by(comparison::compare_priority);
    for task in &primary {
        print_task(task);
    }

    println!("Unscheduled");
    let mut unscheduled = projection.unscheduled.clone();
    unscheduled.sort_by(comparison::compare_priority);
    for task in &unscheduled {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    let status = match task.status() {
        TaskStatus::Unscheduled => ".".to_string(),
        TaskStatus::Today => "!".to_string(),
        TaskStatus::Scheduled(date) => date.format("%m-%d").to_string(),
        TaskStatus::Archived(_) => "x".to_string(),
    };
    println!("    {}{} [{}] {}\t{}", completion, status, task.priority(), task.text(), task.id());
}
