//! Behaviour-driven tests for the publish pipeline.
//!
//! These scenarios drive `publish_all` against a temporary Unity project with
//! a fake build collaborator, covering manifest creation, failed builds,
//! corrupt manifests, single-integration pushes, and repeated pushes.

mod support;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::fs;
use support::{FakeBuilder, UnityProject};
use toitnups::PreserveMode;
use toitnups_pusher::config::PushConfig;
use toitnups_pusher::error::PusherError;
use toitnups_pusher::manifest_file::load_manifest;
use toitnups_pusher::pipeline::{ManifestUpdate, PushContext, PushReport, publish_all};
use toitnups_pusher::registry::Registry;

const CORRUPT_MANIFEST: &str = "<linker>\n\t<assembly fullname=\"A\" />\n\t<assembly fullname=\"A\" />\n</linker>";

// ---------------------------------------------------------------------------
// Push world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PushWorld {
    project: RefCell<Option<UnityProject>>,
    builder: RefCell<FakeBuilder>,
    manifest_text: RefCell<Option<String>>,
    report: RefCell<Option<PushReport>>,
    error: RefCell<Option<PusherError>>,
}

#[fixture]
fn push_world() -> PushWorld {
    PushWorld::default()
}

impl PushWorld {
    fn with_project<T>(&self, f: impl FnOnce(&UnityProject) -> T) -> T {
        let project = self.project.borrow();
        f(project.as_ref().expect("project not set up"))
    }

    fn register(&self, name: &str) {
        self.with_project(|project| {
            let mut registry = Registry::open(&project.layout).expect("open registry");
            registry
                .create(name, &format!("Plugins/{name}"))
                .expect("register integration");
        });
    }

    fn write_manifest(&self, contents: &str) {
        self.with_project(|project| {
            fs::write(project.manifest_path(), contents).expect("write manifest");
        });
        self.manifest_text.replace(Some(contents.to_owned()));
    }

    fn push(&self, only: Option<&str>, mode: &str) {
        let preserve: PreserveMode = mode.parse().expect("known preserve mode");
        let config = PushConfig::default();
        let builder = self.builder.borrow();

        let result = self.with_project(|project| {
            let registry = Registry::open(&project.layout).expect("open registry");
            let context = PushContext {
                layout: &project.layout,
                config: &config,
                preserve: &preserve,
                quiet: true,
            };
            publish_all(&context, &registry, &*builder, only, &mut Vec::new())
        });

        match result {
            Ok(report) => {
                self.report.replace(Some(report));
            }
            Err(err) => {
                self.error.replace(Some(err));
            }
        }
    }

    fn manifest_names(&self) -> Vec<String> {
        self.with_project(|project| {
            load_manifest(&project.manifest_path())
                .expect("load manifest")
                .expect("manifest should exist")
                .names()
                .map(str::to_owned)
                .collect()
        })
    }
}

#[given("an initialised Unity project")]
fn given_project(push_world: &PushWorld) {
    push_world.project.replace(Some(UnityProject::new()));
}

#[given("integration \"{name}\" publishing \"{files}\"")]
fn given_integration_publishing(push_world: &PushWorld, name: String, files: String) {
    push_world.register(&name);
    let files: Vec<&str> = files.split(',').collect();
    push_world.builder.borrow_mut().publishes(&name, &files);
}

#[given("integration \"{name}\" whose build fails")]
fn given_integration_failing(push_world: &PushWorld, name: String) {
    push_world.register(&name);
    push_world.builder.borrow_mut().fails(&name);
}

#[given("a manifest listing \"{name}\"")]
fn given_manifest_listing(push_world: &PushWorld, name: String) {
    push_world.write_manifest(&format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<linker>\n  <assembly fullname=\"{name}\" preserve=\"all\" />\n</linker>\n"
    ));
}

#[given("a corrupt manifest")]
fn given_corrupt_manifest(push_world: &PushWorld) {
    push_world.write_manifest(CORRUPT_MANIFEST);
}

#[when("every integration is pushed with preserve mode \"{mode}\"")]
fn when_everything_pushed(push_world: &PushWorld, mode: String) {
    push_world.push(None, &mode);
}

#[when("integration \"{name}\" is pushed with preserve mode \"{mode}\"")]
fn when_one_pushed(push_world: &PushWorld, name: String, mode: String) {
    push_world.push(Some(&name), &mode);
}

#[then("the manifest lists exactly \"{names}\"")]
fn then_manifest_lists(push_world: &PushWorld, names: String) {
    let expected: Vec<String> = names.split(',').map(str::to_owned).collect();
    assert_eq!(push_world.manifest_names(), expected);
}

#[then("\"{path}\" exists under Assets")]
fn then_asset_exists(push_world: &PushWorld, path: String) {
    push_world.with_project(|project| {
        assert!(project.layout.assets_dir().join(&path).is_file(), "{path} missing");
    });
}

#[then("\"{path}\" does not exist under Assets")]
fn then_asset_absent(push_world: &PushWorld, path: String) {
    push_world.with_project(|project| {
        assert!(!project.layout.assets_dir().join(&path).exists(), "{path} present");
    });
}

#[then("the push reports {count} failure")]
fn then_push_reports_failures(push_world: &PushWorld, count: usize) {
    let report = push_world.report.borrow();
    let report = report.as_ref().expect("push did not complete");
    assert_eq!(report.failures.len(), count);
    assert!(matches!(
        report.check(),
        Err(PusherError::PushFailed { failed, .. }) if failed == count
    ));
}

#[then("every integration was built once")]
fn then_every_integration_built(push_world: &PushWorld) {
    assert_eq!(push_world.builder.borrow().built(), vec!["Polly", "Serilog"]);
}

#[then("the push fails with a manifest parse error")]
fn then_push_fails_with_parse_error(push_world: &PushWorld) {
    let error = push_world.error.borrow();
    let error = error.as_ref().expect("push should have failed");
    assert!(
        matches!(error, PusherError::ManifestParseFailed { .. }),
        "unexpected error: {error}"
    );
}

#[then("nothing was built")]
fn then_nothing_built(push_world: &PushWorld) {
    assert!(push_world.builder.borrow().built().is_empty());
}

#[then("the manifest is unchanged")]
fn then_manifest_unchanged(push_world: &PushWorld) {
    let expected = push_world.manifest_text.borrow().clone();
    let actual = push_world.with_project(|project| fs::read_to_string(project.manifest_path()).ok());
    assert_eq!(actual, expected);
}

#[then("only \"{name}\" was built")]
fn then_only_built(push_world: &PushWorld, name: String) {
    assert_eq!(push_world.builder.borrow().built(), vec![name]);
}

#[then("the last push left the manifest unchanged")]
fn then_last_push_unchanged(push_world: &PushWorld) {
    let report = push_world.report.borrow();
    let report = report.as_ref().expect("push did not complete");
    assert_eq!(report.manifest, ManifestUpdate::Unchanged);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/push.feature", index = 0)]
fn scenario_push_creates_manifest(push_world: PushWorld) {
    let _ = push_world;
}

#[scenario(path = "tests/features/push.feature", index = 1)]
fn scenario_failed_build_contributes_nothing(push_world: PushWorld) {
    let _ = push_world;
}

#[scenario(path = "tests/features/push.feature", index = 2)]
fn scenario_corrupt_manifest_aborts(push_world: PushWorld) {
    let _ = push_world;
}

#[scenario(path = "tests/features/push.feature", index = 3)]
fn scenario_push_single_integration(push_world: PushWorld) {
    let _ = push_world;
}

#[scenario(path = "tests/features/push.feature", index = 4)]
fn scenario_push_twice_is_idempotent(push_world: PushWorld) {
    let _ = push_world;
}

#[scenario(path = "tests/features/push.feature", index = 5)]
fn scenario_shared_dependency_listed_once(push_world: PushWorld) {
    let _ = push_world;
}
