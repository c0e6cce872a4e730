//! User-facing output for the toitnups CLI.
//!
//! Progress and status go to stderr; listings go to stdout so they can be
//! piped.

use crate::pipeline::{ManifestUpdate, PushReport};
use crate::store::IntegrationRecord;
use camino::Utf8Path;
use std::io::Write;

/// Write a line, ignoring failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Describe what happened to the manifest during a push.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use toitnups_pusher::output::manifest_message;
/// use toitnups_pusher::pipeline::ManifestUpdate;
///
/// let message = manifest_message(&ManifestUpdate::Updated { added: 1 }, Utf8Path::new("Assets/link.xml"));
/// assert_eq!(message, "Added 1 assembly to Assets/link.xml");
/// ```
#[must_use]
pub fn manifest_message(update: &ManifestUpdate, path: &Utf8Path) -> String {
    match update {
        ManifestUpdate::Created { entries } => {
            format!("Created {path} with {entries} {}", assemblies(*entries))
        }
        ManifestUpdate::Updated { added } => {
            format!("Added {added} {} to {path}", assemblies(*added))
        }
        ManifestUpdate::Unchanged => format!("{path} is already up to date"),
    }
}

const fn assemblies(count: usize) -> &'static str {
    if count == 1 { "assembly" } else { "assemblies" }
}

/// Summarise a finished push.
#[must_use]
pub fn push_summary(report: &PushReport) -> String {
    let published = report.published.len();
    let plural = if published == 1 {
        "integration"
    } else {
        "integrations"
    };
    let artifacts: usize = report
        .published
        .iter()
        .map(|integration| integration.files)
        .sum();

    if report.failures.is_empty() {
        format!("Pushed {published} {plural} ({artifacts} files) to their targets.")
    } else {
        format!(
            "Pushed {published} {plural} ({artifacts} files); {} failed.",
            report.failures.len()
        )
    }
}

/// Render registered integrations as aligned `name  target` lines.
///
/// # Examples
///
/// ```
/// use toitnups_pusher::output::format_listing;
/// use toitnups_pusher::registry::Registry;
/// use toitnups_pusher::store::MemoryStore;
///
/// let mut registry = Registry::new(MemoryStore::default());
/// registry.create("Polly", "Plugins/Polly")?;
/// registry.create("Serilog", "Plugins/Serilog")?;
///
/// let listing = format_listing(&registry.list()?);
/// assert_eq!(listing, "Polly    Assets/Plugins/Polly\nSerilog  Assets/Plugins/Serilog\n");
/// # Ok::<(), toitnups_pusher::error::PusherError>(())
/// ```
#[must_use]
pub fn format_listing(records: &[IntegrationRecord]) -> String {
    let width = records
        .iter()
        .map(|record| record.name.as_str().chars().count())
        .max()
        .unwrap_or(0);

    records
        .iter()
        .map(|record| {
            format!(
                "{:<width$}  Assets/{}\n",
                record.name.as_str(),
                record.target_path
            )
        })
        .collect()
}
