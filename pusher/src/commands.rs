//! Subcommand implementations.
//!
//! Each command takes the resolved [`ProjectLayout`] and writes its messages to
//! the writers it is given, so the binary only parses arguments and maps the
//! result to an exit code.

use crate::builder::DotnetBuilder;
use crate::cli::{AddArgs, PushArgs, RemoveArgs};
use crate::config::PushConfig;
use crate::error::{PusherError, Result};
use crate::executor::CommandExecutor;
use crate::output::{format_listing, manifest_message, push_summary, write_stderr_line};
use crate::pipeline::{PushContext, publish_all};
use crate::project::{InitOutcome, ProjectLayout};
use crate::registry::Registry;
use crate::store::{IntegrationRecord, IntegrationStore};
use log::warn;
use std::fs;
use std::io::Write;

/// Check for a Unity project and create the registry directory.
///
/// # Errors
///
/// Returns [`PusherError::ProjectNotFound`] or
/// [`PusherError::UnsupportedEditorVersion`] when the directory is not a
/// supported Unity project.
pub fn run_init(layout: &ProjectLayout, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let outcome = layout.init()?;
    if quiet {
        return Ok(());
    }

    match outcome {
        InitOutcome::Created { version } => write_stderr_line(
            stderr,
            format!(
                "Initialised toitnups in {} (Unity {})",
                layout.root(),
                version.raw
            ),
        ),
        InitOutcome::AlreadyInitialised => write_stderr_line(
            stderr,
            format!("toitnups is already initialised in {}", layout.root()),
        ),
    }
    Ok(())
}

/// Register an integration and scaffold its build project.
///
/// The record is removed again when scaffolding fails, so a failed `add` can
/// be retried with the same name.
///
/// # Errors
///
/// Returns the registry validation errors from [`Registry::create`], or
/// [`PusherError::ScaffoldFailed`] when the project cannot be generated.
pub fn add_integration<S: IntegrationStore>(
    registry: &mut Registry<S>,
    builder: &DotnetBuilder<'_>,
    args: &AddArgs,
) -> Result<IntegrationRecord> {
    let record = registry.create(&args.name, &args.target_path)?;
    let workspace_dir = registry.workspace_dir(&record.name);

    let scaffolded = fs::create_dir_all(&workspace_dir)
        .map_err(PusherError::from)
        .and_then(|()| builder.scaffold(&record.name, &workspace_dir));
    if let Err(err) = scaffolded {
        if let Err(rollback) = registry.delete(record.name.as_str()) {
            warn!("could not remove partially created {}: {rollback}", record.name);
        }
        return Err(err);
    }

    Ok(record)
}

/// `toitnups add`.
///
/// # Errors
///
/// Returns [`PusherError::NotInitialised`] before `init`, a configuration
/// error, or any error from [`add_integration`].
pub fn run_add(
    layout: &ProjectLayout,
    executor: &dyn CommandExecutor,
    args: &AddArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let mut registry = Registry::open(layout)?;
    let config = PushConfig::load(&layout.config_path())?;
    let builder = DotnetBuilder::new(executor, config.build);

    if !quiet {
        write_stderr_line(stderr, format!("Scaffolding integration {}...", args.name));
    }
    let record = add_integration(&mut registry, &builder, args)?;

    if !quiet {
        write_stderr_line(
            stderr,
            format!(
                "Added integration {} -> Assets/{}",
                record.name, record.target_path
            ),
        );
        write_stderr_line(
            stderr,
            format!(
                "Add package references in {} then run: toitnups push {}",
                registry.workspace_dir(&record.name),
                record.name
            ),
        );
    }
    Ok(())
}

/// `toitnups remove`.
///
/// Files already copied into `Assets` and entries in the link manifest are
/// left alone.
///
/// # Errors
///
/// Returns [`PusherError::NotFound`] when no such integration exists.
pub fn run_remove(
    layout: &ProjectLayout,
    args: &RemoveArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let mut registry = Registry::open(layout)?;
    registry.delete(&args.name)?;

    if !quiet {
        write_stderr_line(stderr, format!("Removed integration {}", args.name));
    }
    Ok(())
}

/// `toitnups push`.
///
/// The summary is printed even when some integrations failed.
///
/// # Errors
///
/// Returns any error from [`publish_all`], or [`PusherError::PushFailed`] when
/// one or more integrations failed.
pub fn run_push(
    layout: &ProjectLayout,
    executor: &dyn CommandExecutor,
    args: &PushArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let registry = Registry::open(layout)?;
    let config = PushConfig::load(&layout.config_path())?;
    let preserve = args
        .preserve
        .clone()
        .unwrap_or_else(|| config.manifest.preserve.clone());
    let builder = DotnetBuilder::new(executor, config.build.clone());

    let context = PushContext {
        layout,
        config: &config,
        preserve: &preserve,
        quiet,
    };
    let report = publish_all(&context, &registry, &builder, args.name.as_deref(), stderr)?;

    if !quiet {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, push_summary(&report));
        write_stderr_line(
            stderr,
            manifest_message(&report.manifest, &report.manifest_path),
        );
    }
    report.check()
}

/// `toitnups list`.
///
/// # Errors
///
/// Returns registry errors, or [`PusherError::WriteFailed`] when stdout
/// cannot be written.
pub fn run_list(
    layout: &ProjectLayout,
    quiet: bool,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    let registry = Registry::open(layout)?;
    let records = registry.list()?;

    if records.is_empty() {
        if !quiet {
            write_stderr_line(stderr, "No integrations registered.");
        }
        return Ok(());
    }

    stdout
        .write_all(format_listing(&records).as_bytes())
        .map_err(|source| PusherError::WriteFailed { source })
}
