//! Lists of tasks, as a presentation layer wants to display them

use chrono::NaiveDate;

use crate::task::{Task, TaskStatus};

/// The two lists to display for a given view date
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    /// `None` for today's view
    pub view_date: Option<NaiveDate>,
    /// Today's tasks, or the tasks scheduled for `view_date`
    pub primary: Vec<Task>,
    /// Tasks that are not planned yet
    pub unscheduled: Vec<Task>,
}

impl Projection {
    /// The heading of the primary list
    pub fn title(&self) -> String {
        match self.view_date {
            None => "Today".to_string(),
            Some(date) => format!("Date: {}", date.format("%Y-%m-%d")),
        }
    }
}

/// Compute what to display for `view_date` (or for today, if `None`).
///
/// Tasks keep the order they were created in. Sorting them is up to the caller.
pub fn project<'a, I>(tasks: I, view_date: Option<NaiveDate>) -> Projection
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut primary = Vec::new();
    let mut unscheduled = Vec::new();

    for task in tasks {
        let in_primary = match (view_date, task.status()) {
            (None, TaskStatus::Today) => true,
            (Some(wanted), TaskStatus::Scheduled(date)) => wanted == *date,
            _ => false,
        };
        if in_primary {
            primary.push(task.clone());
        } else if task.status() == &TaskStatus::Unscheduled {
            unscheduled.push(task.clone());
        }
    }

    Projection { view_date, primary, unscheduled }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn task(text: &str, status: TaskStatus) -> Task {
        let mut task = Task::new(text.to_string(), Priority::default());
        task.set_status(status);
        task
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text()).collect()
    }

    #[test]
    fn today_view() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let tasks = vec![
            task("B", TaskStatus::Today),
            task("U1", TaskStatus::Unscheduled),
            task("S", TaskStatus::Scheduled(day)),
            task("A", TaskStatus::Today),
            task("U2", TaskStatus::Unscheduled),
        ];

        let projection = project(&tasks, None);
        assert_eq!(texts(&projection.primary), vec!["B", "A"]);
        assert_eq!(texts(&projection.unscheduled), vec!["U1", "U2"]);
        assert_eq!(projection.title(), "Today");
    }

    #[test]
    fn dated_view() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let tasks = vec![
            task("T", TaskStatus::Today),
            task("S1", TaskStatus::Scheduled(day)),
            task("S2", TaskStatus::Scheduled(other_day)),
            task("U", TaskStatus::Unscheduled),
            task("S3", TaskStatus::Scheduled(day)),
        ];

        let projection = project(&tasks, Some(day));
        assert_eq!(texts(&projection.primary), vec!["S1", "S3"]);
        assert_eq!(texts(&projection.unscheduled), vec!["U"]);
        assert_eq!(projection.title(), "Date: 2026-10-19");
    }

    #[test]
    fn empty_view() {
        let projection = project(&Vec::new(), None);
        assert!(projection.primary.is_empty());
        assert!(projection.unscheduled.is_empty());
    }
}
