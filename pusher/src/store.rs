//! Persistence backends for integration records.
//!
//! [`DirectoryStore`] keeps one folder per integration under the registry
//! directory; [`MemoryStore`] keeps records in a map for tests. Neither backend
//! locks anything, so two processes editing one registry race.

use crate::error::{PusherError, Result};
use crate::integration_name::{INTEGRATION_PREFIX, IntegrationName, TargetPath};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// A registered integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationRecord {
    /// Integration name.
    pub name: IntegrationName,
    /// Folder under `Assets` receiving the published artifacts.
    pub target_path: TargetPath,
}

/// Key-value storage for integration records.
pub trait IntegrationStore {
    /// Return the record stored under `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidRecord`] when an entry exists but cannot
    /// be decoded, or I/O errors from the backend.
    fn read(&self, name: &IntegrationName) -> Result<Option<IntegrationRecord>>;

    /// Return `true` when an entry exists under `name`, readable or not.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the backend.
    fn contains(&self, name: &IntegrationName) -> Result<bool>;

    /// Store `record`, replacing any entry with the same name.
    ///
    /// # Errors
    ///
    /// Returns I/O or serialisation errors from the backend.
    fn write(&mut self, record: &IntegrationRecord) -> Result<()>;

    /// Remove the entry under `name` with everything stored alongside it.
    /// Returns `false` when there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the backend.
    fn remove(&mut self, name: &IntegrationName) -> Result<bool>;

    /// Names of all stored entries, sorted.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the backend.
    fn names(&self) -> Result<Vec<IntegrationName>>;

    /// Directory holding the integration's build project.
    fn workspace_dir(&self, name: &IntegrationName) -> Utf8PathBuf;
}

/// On-disk shape of a record; the name is implied by the directory.
#[derive(Debug, Serialize, Deserialize)]
struct RecordFile {
    #[serde(alias = "unityPath")]
    target_path: String,
}

/// Store backed by `integration.<name>` directories under a root.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: Utf8PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root` (normally `<project>/.tn`).
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the JSON record for `name`.
    #[must_use]
    pub fn record_path(&self, name: &IntegrationName) -> Utf8PathBuf {
        self.workspace_dir(name)
            .join(format!("{}.config.json", name.directory_name()))
    }

    fn invalid_record(path: &Utf8Path, reason: impl Into<String>) -> PusherError {
        PusherError::InvalidRecord {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}

impl IntegrationStore for DirectoryStore {
    fn read(&self, name: &IntegrationName) -> Result<Option<IntegrationRecord>> {
        if !self.contains(name)? {
            return Ok(None);
        }

        let path = self.record_path(name);
        if !path.is_file() {
            return Err(Self::invalid_record(&path, "record file is missing"));
        }

        let contents = fs::read_to_string(&path)?;
        let file: RecordFile = serde_json::from_str(&contents)
            .map_err(|err| Self::invalid_record(&path, err.to_string()))?;
        let target_path = TargetPath::new(file.target_path)
            .map_err(|err| Self::invalid_record(&path, err.to_string()))?;

        Ok(Some(IntegrationRecord {
            name: name.clone(),
            target_path,
        }))
    }

    fn contains(&self, name: &IntegrationName) -> Result<bool> {
        Ok(self.workspace_dir(name).is_dir())
    }

    fn write(&mut self, record: &IntegrationRecord) -> Result<()> {
        let dir = self.workspace_dir(&record.name);
        fs::create_dir_all(&dir)?;

        let file = RecordFile {
            target_path: record.target_path.as_str().to_owned(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(std::io::Error::other)?;
        let path = self.record_path(&record.name);
        fs::write(&path, json)?;
        debug!("wrote integration record {path}");
        Ok(())
    }

    fn remove(&mut self, name: &IntegrationName) -> Result<bool> {
        let dir = self.workspace_dir(name);
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)?;
        debug!("removed integration directory {dir}");
        Ok(true)
    }

    fn names(&self) -> Result<Vec<IntegrationName>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(dir_name) = entry.file_name().into_string() else {
                warn!("skipping registry entry with a non-UTF-8 name");
                continue;
            };
            let Some(raw) = dir_name.strip_prefix(INTEGRATION_PREFIX) else {
                continue;
            };
            match IntegrationName::new(raw) {
                Ok(name) => names.push(name),
                Err(err) => warn!("skipping registry directory {dir_name}: {err}"),
            }
        }
        names.sort();
        Ok(names)
    }

    fn workspace_dir(&self, name: &IntegrationName) -> Utf8PathBuf {
        self.root.join(name.directory_name())
    }
}

/// In-memory store for tests.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    root: Utf8PathBuf,
    records: BTreeMap<IntegrationName, IntegrationRecord>,
}

impl MemoryStore {
    /// Create an empty store whose workspace directories live under `root`.
    ///
    /// Nothing is created on disk.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            records: BTreeMap::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(".tn")
    }
}

impl IntegrationStore for MemoryStore {
    fn read(&self, name: &IntegrationName) -> Result<Option<IntegrationRecord>> {
        Ok(self.records.get(name).cloned())
    }

    fn contains(&self, name: &IntegrationName) -> Result<bool> {
        Ok(self.records.contains_key(name))
    }

    fn write(&mut self, record: &IntegrationRecord) -> Result<()> {
        self.records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn remove(&mut self, name: &IntegrationName) -> Result<bool> {
        Ok(self.records.remove(name).is_some())
    }

    fn names(&self) -> Result<Vec<IntegrationName>> {
        Ok(self.records.keys().cloned().collect())
    }

    fn workspace_dir(&self, name: &IntegrationName) -> Utf8PathBuf {
        self.root.join(name.directory_name())
    }
}
