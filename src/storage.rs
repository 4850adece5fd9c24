use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::error;

pub const SCORES_KEY: &str = "scores";
pub const TASKS_KEY: &str = "tasks";

/// String blobs addressed by key, the way browser local storage works.
///
/// Writes are fire-and-forget: an implementation reports its own failures
/// and the caller carries on with the in-memory state.
pub trait Storage: Send {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!("failed to read {}: {err}", path.display());
                None
            }
        }
    }

    /// Writes a sibling `.tmp` file and renames it over the blob, so a crash
    /// mid-write leaves the previous contents in place.
    fn set_item(&mut self, key: &str, value: &str) {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let result = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        if let Err(err) = result {
            error!("failed to write {}: {err}", path.display());
            let _ = fs::remove_file(&tmp);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_reads_back_what_it_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        assert_eq!(storage.get_item(SCORES_KEY), None);
        storage.set_item(SCORES_KEY, r#"{"2024-07-17":100.0}"#);

        assert!(dir.path().join("scores.json").exists());
        assert_eq!(
            storage.get_item(SCORES_KEY).as_deref(),
            Some(r#"{"2024-07-17":100.0}"#)
        );
    }

    #[test]
    fn file_storage_replaces_blob_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        storage.set_item(TASKS_KEY, r#"{"2024-07-17":[]}"#);
        storage.set_item(TASKS_KEY, "{}");

        assert_eq!(storage.get_item(TASKS_KEY).as_deref(), Some("{}"));
        assert!(!dir.path().join("tasks.json.tmp").exists());
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn stale_temp_file_does_not_shadow_blob() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set_item(SCORES_KEY, r#"{"2024-07-17":50.0}"#);
        fs::write(dir.path().join("scores.json.tmp"), "{trunc").unwrap();

        assert_eq!(
            storage.get_item(SCORES_KEY).as_deref(),
            Some(r#"{"2024-07-17":50.0}"#)
        );
    }

    #[test]
    fn file_storage_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("missing").join("nested"));
        storage.set_item(TASKS_KEY, "{}");
        assert_eq!(storage.get_item(TASKS_KEY), None);
    }
}
