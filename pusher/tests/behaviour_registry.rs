//! Behaviour-driven tests for the on-disk integration registry.
//!
//! These scenarios cover creation, path normalisation, duplicate rejection,
//! and removal.

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;
use toitnups_pusher::error::PusherError;
use toitnups_pusher::registry::Registry;
use toitnups_pusher::store::DirectoryStore;

// ---------------------------------------------------------------------------
// Registry world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryWorld {
    dir: RefCell<Option<TempDir>>,
    registry: RefCell<Option<Registry<DirectoryStore>>>,
    error: RefCell<Option<PusherError>>,
}

#[fixture]
fn registry_world() -> RegistryWorld {
    RegistryWorld::default()
}

impl RegistryWorld {
    fn with_registry<T>(&self, f: impl FnOnce(&mut Registry<DirectoryStore>) -> T) -> T {
        let mut registry = self.registry.borrow_mut();
        f(registry.as_mut().expect("registry not set up"))
    }

    fn record_error<T>(&self, result: Result<T, PusherError>) {
        if let Err(err) = result {
            self.error.replace(Some(err));
        }
    }

    fn listed_names(&self) -> Vec<String> {
        self.with_registry(|registry| {
            registry
                .list()
                .expect("list integrations")
                .into_iter()
                .map(|record| record.name.as_str().to_owned())
                .collect()
        })
    }
}

fn error_kind(err: &PusherError) -> &'static str {
    match err {
        PusherError::InvalidName { .. } => "InvalidName",
        PusherError::InvalidPath { .. } => "InvalidPath",
        PusherError::AlreadyExists { .. } => "AlreadyExists",
        PusherError::NotFound { .. } => "NotFound",
        _ => "other",
    }
}

#[given("an empty registry")]
fn given_empty_registry(registry_world: &RegistryWorld) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join(".tn")).expect("utf-8 tempdir");
    std::fs::create_dir_all(&root).expect("create registry directory");
    registry_world
        .registry
        .replace(Some(Registry::new(DirectoryStore::new(root))));
    registry_world.dir.replace(Some(dir));
}

#[given("integration \"{name}\" is created with target \"{target}\"")]
fn given_integration_created(registry_world: &RegistryWorld, name: String, target: String) {
    registry_world
        .with_registry(|registry| registry.create(&name, &target))
        .expect("create integration");
}

#[when("integration \"{name}\" is created with target \"{target}\"")]
fn when_integration_created(registry_world: &RegistryWorld, name: String, target: String) {
    let result = registry_world.with_registry(|registry| registry.create(&name, &target));
    registry_world.record_error(result);
}

#[when("integration \"{name}\" is removed")]
fn when_integration_removed(registry_world: &RegistryWorld, name: String) {
    let result = registry_world.with_registry(|registry| registry.delete(&name));
    registry_world.record_error(result);
}

#[then("the registry lists exactly \"{names}\"")]
fn then_registry_lists(registry_world: &RegistryWorld, names: String) {
    let expected: Vec<String> = names.split(',').map(str::to_owned).collect();
    assert_eq!(registry_world.listed_names(), expected);
}

#[then("the registry is empty")]
fn then_registry_empty(registry_world: &RegistryWorld) {
    assert!(registry_world.listed_names().is_empty());
}

#[then("integration \"{name}\" targets \"{target}\"")]
fn then_integration_targets(registry_world: &RegistryWorld, name: String, target: String) {
    let record = registry_world
        .with_registry(|registry| registry.load(&name))
        .expect("load integration");
    assert_eq!(record.target_path.as_str(), target);
}

#[then("the operation fails with \"{kind}\"")]
fn then_operation_fails(registry_world: &RegistryWorld, kind: String) {
    let error = registry_world.error.borrow();
    let error = error.as_ref().expect("expected the operation to fail");
    assert_eq!(error_kind(error), kind, "unexpected error: {error}");
}

#[then("no workspace directory remains for \"{name}\"")]
fn then_no_workspace(registry_world: &RegistryWorld, name: String) {
    let dir = registry_world.dir.borrow();
    let dir = dir.as_ref().expect("registry not set up");
    assert!(!dir.path().join(".tn").join(format!("integration.{name}")).exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/registry.feature", index = 0)]
fn scenario_create_then_list(registry_world: RegistryWorld) {
    let _ = registry_world;
}

#[scenario(path = "tests/features/registry.feature", index = 1)]
fn scenario_target_paths_normalised(registry_world: RegistryWorld) {
    let _ = registry_world;
}

#[scenario(path = "tests/features/registry.feature", index = 2)]
fn scenario_escaping_path_rejected(registry_world: RegistryWorld) {
    let _ = registry_world;
}

#[scenario(path = "tests/features/registry.feature", index = 3)]
fn scenario_duplicate_create_rejected(registry_world: RegistryWorld) {
    let _ = registry_world;
}

#[scenario(path = "tests/features/registry.feature", index = 4)]
fn scenario_remove_unknown_not_found(registry_world: RegistryWorld) {
    let _ = registry_world;
}

#[scenario(path = "tests/features/registry.feature", index = 5)]
fn scenario_remove_deletes_workspace(registry_world: RegistryWorld) {
    let _ = registry_world;
}
