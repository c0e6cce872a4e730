//! Integration registry.
//!
//! The registry validates names and paths and enforces uniqueness; storage is
//! delegated to an [`IntegrationStore`]. Every call goes straight to the store.

use crate::error::{PusherError, Result};
use crate::integration_name::{IntegrationName, TargetPath};
use crate::project::ProjectLayout;
use crate::store::{DirectoryStore, IntegrationRecord, IntegrationStore};
use camino::Utf8PathBuf;
use log::info;

/// Create, list, load and delete integrations.
#[derive(Debug, Clone)]
pub struct Registry<S> {
    store: S,
}

impl Registry<DirectoryStore> {
    /// Open the on-disk registry of an initialised project.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialised`] when `init` has not been run.
    pub fn open(layout: &ProjectLayout) -> Result<Self> {
        layout.require_initialised()?;
        Ok(Self::new(DirectoryStore::new(layout.registry_dir())))
    }
}

impl<S: IntegrationStore> Registry<S> {
    /// Wrap `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Register a new integration.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidName`] or [`PusherError::InvalidPath`]
    /// when validation fails, and [`PusherError::AlreadyExists`] when the name
    /// is taken. Nothing is stored in any of these cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups_pusher::registry::Registry;
    /// use toitnups_pusher::store::MemoryStore;
    ///
    /// let mut registry = Registry::new(MemoryStore::default());
    /// registry.create("Serilog", "Plugins/Serilog")?;
    /// assert!(registry.create("Serilog", "Plugins").is_err());
    /// assert_eq!(registry.list()?.len(), 1);
    /// # Ok::<(), toitnups_pusher::error::PusherError>(())
    /// ```
    pub fn create(&mut self, name: &str, target_path: &str) -> Result<IntegrationRecord> {
        let name = IntegrationName::new(name)?;
        let target_path = TargetPath::new(target_path)?;
        if self.store.contains(&name)? {
            return Err(PusherError::AlreadyExists { name });
        }

        let record = IntegrationRecord { name, target_path };
        self.store.write(&record)?;
        info!("registered integration {} -> {}", record.name, record.target_path);
        Ok(record)
    }

    /// Remove an integration and everything stored for it.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidName`] for a malformed name and
    /// [`PusherError::NotFound`] when no such integration exists.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let name = IntegrationName::new(name)?;
        if !self.store.remove(&name)? {
            return Err(PusherError::NotFound { name });
        }
        info!("removed integration {name}");
        Ok(())
    }

    /// All integrations, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidRecord`] when any entry is corrupt, or
    /// I/O errors from the store.
    pub fn list(&self) -> Result<Vec<IntegrationRecord>> {
        self.store
            .names()?
            .into_iter()
            .map(|name| self.load_valid(name))
            .collect()
    }

    /// Load a single integration.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidName`] for a malformed name and
    /// [`PusherError::NotFound`] when no such integration exists.
    pub fn load(&self, name: &str) -> Result<IntegrationRecord> {
        self.load_valid(IntegrationName::new(name)?)
    }

    /// Directory holding the integration's build project.
    #[must_use]
    pub fn workspace_dir(&self, name: &IntegrationName) -> Utf8PathBuf {
        self.store.workspace_dir(name)
    }

    fn load_valid(&self, name: IntegrationName) -> Result<IntegrationRecord> {
        self.store
            .read(&name)?
            .ok_or(PusherError::NotFound { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> Registry<MemoryStore> {
        Registry::new(MemoryStore::default())
    }

    #[rstest]
    fn create_then_load(mut registry: Registry<MemoryStore>) {
        let created = registry.create("Serilog", "Plugins\\Serilog").expect("create");
        let loaded = registry.load("Serilog").expect("load");

        assert_eq!(created, loaded);
        assert_eq!(loaded.target_path.as_str(), "Plugins/Serilog");
    }

    #[rstest]
    fn duplicate_create_is_rejected(mut registry: Registry<MemoryStore>) {
        registry.create("x", "Plugins").expect("first create");
        let err = registry.create("x", "Other").expect_err("duplicate");

        assert!(matches!(err, PusherError::AlreadyExists { name } if name.as_str() == "x"));
        let records = registry.list().expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target_path.as_str(), "Plugins");
    }

    #[rstest]
    #[case::bad_name("a/b", "Plugins")]
    #[case::bad_path("ok", "/abs")]
    fn invalid_input_stores_nothing(
        mut registry: Registry<MemoryStore>,
        #[case] name: &str,
        #[case] target: &str,
    ) {
        let err = registry.create(name, target).expect_err("invalid input");
        assert!(matches!(
            err,
            PusherError::InvalidName { .. } | PusherError::InvalidPath { .. }
        ));
        assert!(registry.list().expect("list").is_empty());
    }

    #[rstest]
    fn delete_unknown_leaves_state_unchanged(mut registry: Registry<MemoryStore>) {
        registry.create("kept", "Plugins").expect("create");

        let err = registry.delete("missing").expect_err("unknown integration");
        assert!(matches!(err, PusherError::NotFound { .. }));
        assert_eq!(registry.list().expect("list").len(), 1);
    }

    #[rstest]
    fn delete_then_load_is_not_found(mut registry: Registry<MemoryStore>) {
        registry.create("gone", "Plugins").expect("create");
        registry.delete("gone").expect("delete");

        assert!(matches!(
            registry.load("gone"),
            Err(PusherError::NotFound { .. })
        ));
    }

    #[rstest]
    fn list_is_sorted_by_name(mut registry: Registry<MemoryStore>) {
        for name in ["Polly", "Autofac", "Serilog"] {
            registry.create(name, "Plugins").expect("create");
        }

        let names: Vec<String> = registry
            .list()
            .expect("list")
            .into_iter()
            .map(|record| record.name.to_string())
            .collect();
        assert_eq!(names, vec!["Autofac", "Polly", "Serilog"]);
    }
}
