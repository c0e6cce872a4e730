//! .NET build orchestration for integration projects.
//!
//! Each integration is a class library whose published output holds the
//! NuGet dependencies to copy into Unity. Builds run one at a time and block
//! until `dotnet` exits.

use crate::config::BuildSettings;
use crate::error::{PusherError, Result};
use crate::executor::{CommandExecutor, failure_reason};
use crate::integration_name::IntegrationName;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;

/// File the `classlib` template creates and the integration never needs.
const TEMPLATE_PLACEHOLDER: &str = "Class1.cs";

/// What to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Integration being built.
    pub name: IntegrationName,
    /// Directory holding its project file.
    pub workspace_dir: Utf8PathBuf,
}

/// Where a successful build left its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Directory containing the published files.
    pub output_dir: Utf8PathBuf,
}

/// Runs the external build for one integration.
#[cfg_attr(test, mockall::automock)]
pub trait BuildInvoker {
    /// Build `request` and wait for completion.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::BuildFailed`] when the build reports failure or
    /// produces no output directory.
    fn build(&self, request: &BuildRequest) -> Result<BuildOutput>;
}

/// Builds and scaffolds integrations with the `dotnet` CLI.
pub struct DotnetBuilder<'a> {
    executor: &'a dyn CommandExecutor,
    settings: BuildSettings,
}

impl<'a> DotnetBuilder<'a> {
    /// Create a builder running commands through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, settings: BuildSettings) -> Self {
        Self { executor, settings }
    }

    /// Directory `dotnet publish` writes to for `workspace_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use toitnups_pusher::builder::DotnetBuilder;
    /// use toitnups_pusher::config::BuildSettings;
    /// use toitnups_pusher::executor::SystemCommandExecutor;
    ///
    /// let builder = DotnetBuilder::new(&SystemCommandExecutor, BuildSettings::default());
    /// assert_eq!(
    ///     builder.publish_dir(Utf8Path::new(".tn/integration.Polly")),
    ///     ".tn/integration.Polly/bin/Release/netstandard2.0/publish"
    /// );
    /// ```
    #[must_use]
    pub fn publish_dir(&self, workspace_dir: &Utf8Path) -> Utf8PathBuf {
        workspace_dir
            .join("bin")
            .join(&self.settings.configuration)
            .join(&self.settings.framework)
            .join("publish")
    }

    /// Create the class library project for a new integration in
    /// `workspace_dir`, which must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::ScaffoldFailed`] when `dotnet new` fails or the
    /// template placeholder cannot be removed.
    pub fn scaffold(&self, name: &IntegrationName, workspace_dir: &Utf8Path) -> Result<()> {
        let args = [
            "new".to_owned(),
            "classlib".to_owned(),
            "--framework".to_owned(),
            self.settings.framework.clone(),
        ];
        let output = self
            .executor
            .run(&self.settings.command, &args, workspace_dir)
            .map_err(|err| scaffold_failed(name, err.to_string()))?;

        if !output.status.success() {
            return Err(scaffold_failed(name, failure_reason(&output)));
        }

        let placeholder = workspace_dir.join(TEMPLATE_PLACEHOLDER);
        match fs::remove_file(&placeholder) {
            Ok(()) => debug!("removed template placeholder {placeholder}"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(scaffold_failed(
                    name,
                    format!("cannot remove {placeholder}: {err}"),
                ));
            }
        }

        info!("scaffolded integration project in {workspace_dir}");
        Ok(())
    }
}

fn scaffold_failed(name: &IntegrationName, reason: String) -> PusherError {
    PusherError::ScaffoldFailed {
        name: name.clone(),
        reason,
    }
}

impl BuildInvoker for DotnetBuilder<'_> {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutput> {
        let args = [
            "publish".to_owned(),
            "-c".to_owned(),
            self.settings.configuration.clone(),
        ];
        let output = self
            .executor
            .run(&self.settings.command, &args, &request.workspace_dir)?;

        if !output.status.success() {
            return Err(PusherError::BuildFailed {
                name: request.name.clone(),
                reason: failure_reason(&output),
            });
        }

        let output_dir = self.publish_dir(&request.workspace_dir);
        if !output_dir.is_dir() {
            return Err(PusherError::BuildFailed {
                name: request.name.clone(),
                reason: format!(
                    "expected publish output in {output_dir}; does the project target {}?",
                    self.settings.framework
                ),
            });
        }

        debug!("{} published to {output_dir}", request.name);
        Ok(BuildOutput { output_dir })
    }
}
