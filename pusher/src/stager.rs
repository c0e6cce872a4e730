//! Copying artifacts into the Unity asset tree.
//!
//! Existing files are overwritten. A failed copy stops the integration but
//! files already copied stay in place.

use crate::collector::Artifact;
use crate::error::{PusherError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Copies artifacts into one target directory.
pub struct Stager {
    target_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager writing into `target_dir`.
    #[must_use]
    pub fn new(target_dir: Utf8PathBuf) -> Self {
        Self { target_dir }
    }

    /// Return the target directory.
    #[must_use]
    pub fn target_dir(&self) -> &Utf8Path {
        &self.target_dir
    }

    /// Ensure the target directory exists before copying from `source_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::CopyFailed`] from `source_dir` to the target
    /// directory when the directory cannot be created.
    pub fn prepare(&self, source_dir: &Utf8Path) -> Result<()> {
        fs::create_dir_all(&self.target_dir).map_err(|source| PusherError::CopyFailed {
            from: source_dir.to_owned(),
            to: self.target_dir.clone(),
            source,
        })
    }

    /// Copy one artifact, keeping its file name.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::CopyFailed`] when the copy fails.
    pub fn stage(&self, artifact: &Artifact) -> Result<Utf8PathBuf> {
        let dest_path = self.target_dir.join(artifact.file_name());

        fs::copy(&artifact.path, &dest_path).map_err(|source| PusherError::CopyFailed {
            from: artifact.path.clone(),
            to: dest_path.clone(),
            source,
        })?;

        debug!("copied {} to {dest_path}", artifact.path);
        Ok(dest_path)
    }

    /// Copy all artifacts, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::CopyFailed`] for the first copy that fails.
    pub fn stage_all(&self, artifacts: &[Artifact]) -> Result<Vec<Utf8PathBuf>> {
        artifacts.iter().map(|a| self.stage(a)).collect()
    }
}
