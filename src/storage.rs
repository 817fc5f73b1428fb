//! This module stores the task list in a local JSON file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::task::Task;
use crate::traits::TaskBackend;

/// Version of the file layout written by this crate
const FILE_FORMAT_VERSION: u32 = 1;


/// A backend that stores its tasks in a local file
#[derive(Debug, PartialEq)]
pub struct JsonFile {
    backing_file: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredData {
    version: u32,
    tasks: Vec<Task>,
}

impl JsonFile {
    /// Use `path` as the backing file. It does not have to exist yet.
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: PathBuf::from(path),
        }
    }

    /// Use the default file name (see [`crate::config::TASK_FILE_NAME`]) inside `folder`
    pub fn in_folder(folder: &Path) -> Self {
        Self::new(&folder.join(crate::config::read(&crate::config::TASK_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.backing_file
    }

    fn temporary_file(&self) -> PathBuf {
        let mut name = self.backing_file.file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.backing_file.with_file_name(name)
    }
}

impl TaskBackend for JsonFile {
    /// A file that does not exist yet is an empty task list
    fn load_all(&mut self) -> Result<Vec<Task>, StorageError> {
        let path = &self.backing_file;
        let file = match std::fs::File::open(path) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No task file at {:?} yet, starting with an empty list", path);
                return Ok(Vec::new());
            },
            Err(err) => return Err(StorageError::io(path, err)),
            Ok(file) => file,
        };

        let data: StoredData = serde_json::from_reader(std::io::BufReader::new(file))?;
        if data.version != FILE_FORMAT_VERSION {
            return Err(StorageError::Corrupted(format!(
                "unsupported file format version {} in {:?}", data.version, path
            )));
        }
        log::debug!("Loaded {} tasks from {:?}", data.tasks.len(), path);
        Ok(data.tasks)
    }

    /// The data is written and synced to a temporary file first, then moved over the backing file,
    /// so that a crash in the middle of a write leaves the previous version intact.
    fn save_all(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        #[derive(Serialize)]
        struct StoredDataRef<'a> {
            version: u32,
            tasks: &'a [Task],
        }

        let path = self.backing_file.clone();
        if let Some(folder) = path.parent() {
            if folder.as_os_str().is_empty() == false {
                std::fs::create_dir_all(folder).map_err(|err| StorageError::io(folder, err))?;
            }
        }

        let tmp_path = self.temporary_file();
        let file = std::fs::File::create(&tmp_path).map_err(|err| StorageError::io(&tmp_path, err))?;
        let data = StoredDataRef { version: FILE_FORMAT_VERSION, tasks };
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &data)?;
        let file = writer.into_inner().map_err(|err| StorageError::io(&tmp_path, err.into_error()))?;
        // The data must be on disk before the rename makes it the current version
        file.sync_all().map_err(|err| StorageError::io(&tmp_path, err))?;

        std::fs::rename(&tmp_path, &path).map_err(|err| StorageError::io(&path, err))?;
        log::trace!("Saved {} tasks to {:?}", tasks.len(), path);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    #[test]
    fn serde_task_file() {
        let folder = tempfile::tempdir().unwrap();
        let mut backend = JsonFile::in_folder(folder.path());
        assert!(backend.load_all().unwrap().is_empty());

        let tasks = vec![
            Task::new("Write report".to_string(), Priority::HIGHEST),
            Task::new("Call dentist".to_string(), Priority::LOWEST),
        ];
        backend.save_all(&tasks).unwrap();
        assert!(backend.temporary_file().exists() == false);

        let mut reopened = JsonFile::new(backend.path());
        let retrieved = reopened.load_all().unwrap();
        assert_eq!(tasks, retrieved);
    }

    #[test]
    fn garbage_is_an_error() {
        let folder = tempfile::tempdir().unwrap();
        let path = folder.path().join("tasks.json");
        std::fs::write(&path, "this is not json").unwrap();

        let mut backend = JsonFile::new(&path);
        match backend.load_all() {
            Err(StorageError::Serde(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unknown_version_is_an_error() {
        let folder = tempfile::tempdir().unwrap();
        let path = folder.path().join("tasks.json");
        std::fs::write(&path, r#"{"version": 42, "tasks": []}"#).unwrap();

        let mut backend = JsonFile::new(&path);
        match backend.load_all() {
            Err(StorageError::Corrupted(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn overwriting_keeps_only_the_last_version() {
        let folder = tempfile::tempdir().unwrap();
        let mut backend = JsonFile::in_folder(folder.path());

        let first = vec![Task::new("Buy milk".to_string(), Priority::default())];
        backend.save_all(&first).unwrap();
        let second = vec![
            first[0].clone(),
            Task::new("Water plants".to_string(), Priority::LOWEST),
        ];
        backend.save_all(&second).unwrap();

        let entries: Vec<_> = std::fs::read_dir(folder.path()).unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("tasks.json")]);
        assert_eq!(JsonFile::new(backend.path()).load_all().unwrap(), second);
    }
}
