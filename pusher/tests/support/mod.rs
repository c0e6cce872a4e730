//! Test support utilities for pusher behavioural tests.
//!
//! This module provides a throwaway Unity project and a fake build
//! collaborator that writes deterministic publish output.

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tempfile::TempDir;
use toitnups_pusher::builder::{BuildInvoker, BuildOutput, BuildRequest};
use toitnups_pusher::error::{PusherError, Result};
use toitnups_pusher::project::ProjectLayout;

/// A Unity project in a temporary directory, already initialised.
pub struct UnityProject {
    _dir: TempDir,
    /// Layout rooted at the temporary directory.
    pub layout: ProjectLayout,
}

impl UnityProject {
    /// Create the project skeleton and run `init`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf-8 tempdir");
        let layout = ProjectLayout::new(root);
        fs::create_dir_all(layout.assets_dir()).expect("create Assets");
        fs::create_dir_all(layout.project_settings_dir()).expect("create ProjectSettings");
        fs::write(layout.version_file(), "m_EditorVersion: 2020.3.48f1\n")
            .expect("write ProjectVersion.txt");
        layout.init().expect("init project");
        Self { _dir: dir, layout }
    }

    /// Path of the default link manifest.
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.layout.assets_dir().join("link.xml")
    }
}

/// Build collaborator that writes a fixed set of files per integration.
#[derive(Default)]
pub struct FakeBuilder {
    outputs: BTreeMap<String, Vec<String>>,
    failing: BTreeSet<String>,
    built: RefCell<Vec<String>>,
}

impl FakeBuilder {
    /// Publish `files` whenever `name` is built.
    pub fn publishes(&mut self, name: &str, files: &[&str]) {
        self.outputs.insert(
            name.to_owned(),
            files.iter().map(|file| (*file).to_owned()).collect(),
        );
    }

    /// Fail every build of `name`.
    pub fn fails(&mut self, name: &str) {
        self.failing.insert(name.to_owned());
    }

    /// Names built so far, in order.
    pub fn built(&self) -> Vec<String> {
        self.built.borrow().clone()
    }

    fn write_outputs(output_dir: &Utf8Path, files: &[String]) -> Result<()> {
        fs::create_dir_all(output_dir)?;
        for file in files {
            fs::write(output_dir.join(file), file.as_bytes())?;
        }
        Ok(())
    }
}

impl BuildInvoker for FakeBuilder {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutput> {
        let name = request.name.as_str().to_owned();
        self.built.borrow_mut().push(name.clone());

        if self.failing.contains(&name) {
            return Err(PusherError::BuildFailed {
                name: request.name.clone(),
                reason: "error CS0246: type or namespace not found".to_owned(),
            });
        }

        let output_dir = request.workspace_dir.join("publish");
        let files = self.outputs.get(&name).cloned().unwrap_or_default();
        Self::write_outputs(&output_dir, &files)?;
        Ok(BuildOutput { output_dir })
    }
}
