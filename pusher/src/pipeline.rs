//! Publish pipeline orchestration.
//!
//! A push builds each integration in turn, collects its publishable output,
//! copies it under `Assets`, and gathers the artifact names. Once every
//! integration has been processed the names are merged into the link manifest
//! in a single read-modify-write.
//!
//! Builds are sequential and have no timeout, so a hung build hangs the push.
//! The manifest is not locked; concurrent pushes against one project race.

use crate::builder::{BuildInvoker, BuildRequest};
use crate::collector::{ArtifactName, ExcludeFilter, collect};
use crate::config::PushConfig;
use crate::error::{PusherError, Result};
use crate::integration_name::IntegrationName;
use crate::manifest_file::{load_manifest, save_manifest};
use crate::output::write_stderr_line;
use crate::project::ProjectLayout;
use crate::registry::Registry;
use crate::stager::Stager;
use crate::store::{IntegrationRecord, IntegrationStore};
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use std::io::Write;
use toitnups::{PreserveMode, merge};

/// Context for a push run.
pub struct PushContext<'a> {
    /// Project being pushed into.
    pub layout: &'a ProjectLayout,
    /// Loaded project configuration.
    pub config: &'a PushConfig,
    /// Preserve mode for newly added manifest entries.
    pub preserve: &'a PreserveMode,
    /// Suppress progress output.
    pub quiet: bool,
}

impl PushContext<'_> {
    /// Location of the link manifest.
    #[must_use]
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.layout
            .assets_dir()
            .join(self.config.manifest.path.as_path())
    }
}

/// An integration whose artifacts were copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedIntegration {
    /// Integration name.
    pub name: IntegrationName,
    /// Directory the artifacts were copied into.
    pub target_dir: Utf8PathBuf,
    /// Distinct names of the copied artifacts, in file name order.
    ///
    /// `Polly.dll` and `Polly.xml` both contribute `Polly`, listed once.
    pub artifacts: Vec<ArtifactName>,
    /// Number of files copied.
    pub files: usize,
}

/// An integration that failed to build or copy.
#[derive(Debug)]
pub struct PushFailure {
    /// Integration name.
    pub name: IntegrationName,
    /// What went wrong.
    pub error: PusherError,
}

/// What the push did to the link manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestUpdate {
    /// No manifest existed; one was written.
    Created {
        /// Number of entries written.
        entries: usize,
    },
    /// New entries were appended to the existing manifest.
    Updated {
        /// Number of entries appended.
        added: usize,
    },
    /// Every name was already listed; the file was left untouched.
    Unchanged,
}

/// Outcome of [`publish_all`].
#[derive(Debug)]
pub struct PushReport {
    /// Integrations published successfully, in processing order.
    pub published: Vec<PublishedIntegration>,
    /// Integrations that failed; they contributed no manifest entries.
    pub failures: Vec<PushFailure>,
    /// Path of the link manifest.
    pub manifest_path: Utf8PathBuf,
    /// What happened to the manifest.
    pub manifest: ManifestUpdate,
}

impl PushReport {
    /// Artifact names from every published integration, in order.
    pub fn artifact_names(&self) -> impl Iterator<Item = &ArtifactName> {
        self.published
            .iter()
            .flat_map(|integration| integration.artifacts.iter())
    }

    /// Fail when any integration failed.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::PushFailed`] with the failure count.
    pub fn check(&self) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(PusherError::PushFailed {
            failed: self.failures.len(),
            total: self.failures.len() + self.published.len(),
        })
    }
}

/// Build, collect and copy one integration.
///
/// # Errors
///
/// Returns [`PusherError::BuildFailed`] when the build fails and
/// [`PusherError::CopyFailed`] when the target directory cannot be created or
/// an artifact cannot be copied. Files copied before a failure are left in
/// place.
pub fn publish_one(
    context: &PushContext<'_>,
    builder: &dyn BuildInvoker,
    record: &IntegrationRecord,
    workspace_dir: &Utf8Path,
) -> Result<PublishedIntegration> {
    let request = BuildRequest {
        name: record.name.clone(),
        workspace_dir: workspace_dir.to_owned(),
    };
    let output = builder.build(&request)?;

    let filter = ExcludeFilter::new(
        &context.config.collect.extra_exclude_extensions,
        record.name.primary_module(),
    );
    let artifacts = collect(&output.output_dir, &filter)?;

    let stager = Stager::new(
        context
            .layout
            .assets_dir()
            .join(record.target_path.as_path()),
    );
    stager.prepare(&output.output_dir)?;
    stager.stage_all(&artifacts)?;

    info!(
        "published {} artifact(s) for {} to {}",
        artifacts.len(),
        record.name,
        stager.target_dir()
    );
    let files = artifacts.len();
    let mut names: Vec<ArtifactName> = Vec::with_capacity(files);
    for artifact in artifacts {
        if !names.contains(&artifact.name) {
            names.push(artifact.name);
        }
    }
    Ok(PublishedIntegration {
        name: record.name.clone(),
        target_dir: stager.target_dir().to_owned(),
        artifacts: names,
        files,
    })
}

/// Publish one integration, or all of them, and update the link manifest.
///
/// The manifest is parsed before anything is built so that a corrupt file
/// stops the push early. Failed integrations are recorded in the report and
/// the remaining ones still run; the manifest is merged once at the end with
/// the names of every successful integration. An absent manifest is always
/// created; an existing one is rewritten only when entries were added.
///
/// # Errors
///
/// Returns [`PusherError::NotFound`] when `only` names an unknown
/// integration, [`PusherError::ManifestParseFailed`] for a corrupt manifest,
/// and [`PusherError::ManifestWriteFailed`] when the merged manifest cannot be
/// saved. Per-integration failures are reported in [`PushReport::failures`].
pub fn publish_all<S: IntegrationStore>(
    context: &PushContext<'_>,
    registry: &Registry<S>,
    builder: &dyn BuildInvoker,
    only: Option<&str>,
    stderr: &mut dyn Write,
) -> Result<PushReport> {
    let records = match only {
        Some(name) => vec![registry.load(name)?],
        None => registry.list()?,
    };

    let manifest_path = context.manifest_path();
    let existing = load_manifest(&manifest_path)?;

    if !context.quiet {
        write_stderr_line(
            stderr,
            format!("Pushing {} integration(s)...", records.len()),
        );
    }

    let mut published = Vec::new();
    let mut failures = Vec::new();
    for record in &records {
        if !context.quiet {
            write_stderr_line(
                stderr,
                format!("  - {} -> Assets/{}", record.name, record.target_path),
            );
        }

        let workspace_dir = registry.workspace_dir(&record.name);
        match publish_one(context, builder, record, &workspace_dir) {
            Ok(integration) => published.push(integration),
            Err(error) => {
                warn!("push of {} failed: {error}", record.name);
                write_stderr_line(stderr, format!("    failed: {error}"));
                failures.push(PushFailure {
                    name: record.name.clone(),
                    error,
                });
            }
        }
    }

    let mut report = PushReport {
        published,
        failures,
        manifest_path,
        manifest: ManifestUpdate::Unchanged,
    };
    report.manifest = update_manifest(context, &report, existing)?;
    Ok(report)
}

fn update_manifest(
    context: &PushContext<'_>,
    report: &PushReport,
    existing: Option<toitnups::LinkManifest>,
) -> Result<ManifestUpdate> {
    let existed = existing.is_some();
    let before = existing.as_ref().map_or(0, toitnups::LinkManifest::len);

    let merged = merge(existing, report.artifact_names(), context.preserve);
    let added = merged.len().saturating_sub(before);

    let update = if !existed {
        ManifestUpdate::Created {
            entries: merged.len(),
        }
    } else if added > 0 {
        ManifestUpdate::Updated { added }
    } else {
        return Ok(ManifestUpdate::Unchanged);
    };

    save_manifest(&report.manifest_path, &merged)?;
    Ok(update)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
