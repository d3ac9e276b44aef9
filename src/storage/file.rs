use super::KeyValueStore;
use crate::error::{RecetarioError, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key-value store backed by a single JSON object on disk.
///
/// Each key maps to the string it was set to. The whole file is rewritten on
/// every `set`, through a temporary file renamed into place. Concurrent
/// processes are not coordinated; the last writer wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            RecetarioError::Storage(format!("{} is not a key-value file: {}", self.path.display(), e))
        })
    }

    fn save_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&temp_path, &self.path)?;
        debug!("Saved {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut entries = self.load_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.save_all(&entries)
    }
}
