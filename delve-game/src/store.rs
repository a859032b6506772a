//! Reference [`CharacterStore`] implementations: in-memory and a JSON document on disk.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::persistence::{CharacterRecord, CharacterStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store document is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

/// Shared in-memory store. Clones point at the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, CharacterRecord>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CharacterStore for MemoryStore {
    type Error = StoreError;

    fn read(&self, user_id: &str) -> Result<Option<CharacterRecord>, Self::Error> {
        Ok(lock(&self.records)?.get(user_id).cloned())
    }

    fn write(&self, user_id: &str, record: &CharacterRecord) -> Result<(), Self::Error> {
        lock(&self.records)?.insert(user_id.to_string(), record.clone());
        Ok(())
    }

    fn remove(&self, user_id: &str) -> Result<bool, Self::Error> {
        Ok(lock(&self.records)?.remove(user_id).is_some())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    characters: BTreeMap<String, CharacterRecord>,
}

/// Every character in one JSON file, rewritten on each change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_document(&self) -> Result<StoreDocument, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(StoreDocument::default()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn write_document(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let json = serde_json::to_string_pretty(document)?;
        // Replace the document in one rename so a failed write leaves the old file intact.
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|err| self.io_error(err))?;
        fs::rename(&temp_path, &self.path).map_err(|err| self.io_error(err))
    }
}

impl CharacterStore for JsonFileStore {
    type Error = StoreError;

    fn read(&self, user_id: &str) -> Result<Option<CharacterRecord>, Self::Error> {
        let _guard = lock(&self.guard)?;
        Ok(self.read_document()?.characters.remove(user_id))
    }

    fn write(&self, user_id: &str, record: &CharacterRecord) -> Result<(), Self::Error> {
        let _guard = lock(&self.guard)?;
        let mut document = self.read_document()?;
        document
            .characters
            .insert(user_id.to_string(), record.clone());
        self.write_document(&document)
    }

    fn remove(&self, user_id: &str) -> Result<bool, Self::Error> {
        let _guard = lock(&self.guard)?;
        let mut document = self.read_document()?;
        let removed = document.characters.remove(user_id).is_some();
        if removed {
            self.write_document(&document)?;
        }
        Ok(removed)
    }
}
