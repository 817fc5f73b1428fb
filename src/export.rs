//! Export of archived tasks, e.g. to a CSV file

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::StorageError;
use crate::task::{Priority, Task};
use crate::utils::comparison::compare_archived_at;

const CSV_HEADER: &str = "Task,Priority,Completed,Archived At";

/// One exported archived task
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArchiveRow {
    pub text: String,
    pub priority: Priority,
    pub completed: bool,
    pub archived_at: DateTime<Utc>,
}

/// One row per archived task, oldest archive first.
///
/// Tasks archived at the same instant keep their store order. An empty archive gives an empty list.
pub fn export_rows<'a, I>(tasks: I) -> Vec<ArchiveRow>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut archived: Vec<&Task> = tasks.into_iter()
        .filter(|t| t.status().is_archived())
        .collect();
    archived.sort_by(|l, r| compare_archived_at(l, r));

    archived.into_iter()
        .filter_map(|t| {
            t.archived_at().map(|at| ArchiveRow {
                text: t.text().to_string(),
                priority: t.priority(),
                completed: t.completed(),
                archived_at: *at,
            })
        })
        .collect()
}

/// Render rows as CSV text, with a header line
pub fn to_csv(rows: &[ArchiveRow]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            csv_escape(&row.text),
            row.priority,
            row.completed,
            row.archived_at.to_rfc3339(),
        ));
    }
    csv
}

/// The suggested name of an export made on `date`, e.g. `todo-archive-2026-10-19.csv`
///
/// The prefix can be changed with [`crate::config::EXPORT_FILE_PREFIX`].
pub fn default_file_name(date: NaiveDate) -> String {
    let prefix = crate::config::read(&crate::config::EXPORT_FILE_PREFIX);
    sanitize_filename::sanitize(format!("{}-{}.csv", prefix, date.format("%Y-%m-%d")))
}

/// Write the rows as a CSV file
pub fn save_csv(path: &Path, rows: &[ArchiveRow]) -> Result<(), StorageError> {
    std::fs::write(path, to_csv(rows)).map_err(|err| StorageError::io(path, err))?;
    log::info!("Exported {} archived tasks to {:?}", rows.len(), path);
    Ok(())
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
