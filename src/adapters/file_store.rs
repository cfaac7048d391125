//! File-backed key-value store.
//!
//! All keys live in one JSON object at `<data_dir>/storage.json`, the local
//! counterpart of the browser storage the console state was designed around.
//! A file that cannot be read or decoded counts as empty, and the next write
//! replaces it.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

const STORE_FILE: &str = "storage.json";

/// Key-value store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileStore {
    /// Store inside `data_dir`. The directory is created on first write.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Cannot open {:?}, starting empty: {}", self.path, e);
                return BTreeMap::new();
            }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Discarding unreadable {:?}: {}", self.path, e);
                BTreeMap::new()
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_err = |source: std::io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        // Written beside the target and renamed over it, so a crash leaves
        // either the old document or the new one.
        let temp = self.temp_path();
        let file = File::create(&temp).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries).map_err(|source| {
            StorageError::Corrupt {
                key: STORE_FILE.to_string(),
                source,
            }
        })?;
        writer.flush().map_err(write_err)?;
        drop(writer);
        fs::rename(&temp, &self.path).map_err(write_err)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // The file is re-read on every call, so a poisoned lock is harmless.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard();
        Ok(self.read_all().remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        debug!("Persisting key {} to {:?}", key, self.path);
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut entries = self.read_all();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
