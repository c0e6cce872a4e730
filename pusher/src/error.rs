//! Error types for the toitnups pusher.
//!
//! Each variant names the failing step and, where the user can do something
//! about it, says what to run next.

use crate::integration_name::IntegrationName;
use camino::Utf8PathBuf;
use thiserror::Error;
use toitnups::ManifestParseError;

/// Errors that can occur while managing or publishing integrations.
#[derive(Debug, Error)]
pub enum PusherError {
    /// An integration name failed validation.
    #[error("invalid integration name \"{name}\": {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Which rule the name broke.
        reason: &'static str,
    },

    /// A target path failed validation.
    #[error("invalid target path \"{path}\": {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Which rule the path broke.
        reason: &'static str,
    },

    /// An integration with this name is already registered.
    #[error("integration {name} already exists")]
    AlreadyExists {
        /// Name of the existing integration.
        name: IntegrationName,
    },

    /// No integration with this name is registered.
    #[error("integration {name} not found; run `toitnups list` to see registered integrations")]
    NotFound {
        /// Name that was looked up.
        name: IntegrationName,
    },

    /// The external build reported failure.
    #[error("build failed for {name}: {reason}")]
    BuildFailed {
        /// Integration whose build failed.
        name: IntegrationName,
        /// Build output or a description of the failure.
        reason: String,
    },

    /// The existing link manifest could not be parsed.
    #[error("failed to parse link manifest {path}: {source}")]
    ManifestParseFailed {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: ManifestParseError,
    },

    /// An artifact could not be copied into the asset tree.
    #[error("failed to copy {from} to {to}: {source}")]
    CopyFailed {
        /// Source artifact path.
        from: Utf8PathBuf,
        /// Destination path.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The registry directory does not exist yet.
    #[error("toitnups is not initialised in {project}; run `toitnups init` first")]
    NotInitialised {
        /// Project directory that was checked.
        project: Utf8PathBuf,
    },

    /// The directory does not look like a Unity project.
    #[error("{project} is not a Unity project: {reason}")]
    ProjectNotFound {
        /// Directory that was checked.
        project: Utf8PathBuf,
        /// What was missing or unreadable.
        reason: String,
    },

    /// The Unity editor version is older than 2018.
    #[error("Unity {version} is not supported; 2018.1 or later is required")]
    UnsupportedEditorVersion {
        /// Version string read from `ProjectVersion.txt`.
        version: String,
    },

    /// A registry entry exists but its record is missing or malformed.
    #[error("integration record {path} is invalid: {reason}")]
    InvalidRecord {
        /// Path to the record file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The .NET project for a new integration could not be created.
    #[error("failed to scaffold integration {name}: {reason}")]
    ScaffoldFailed {
        /// Integration being scaffolded.
        name: IntegrationName,
        /// Description of the failure.
        reason: String,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration {path}: {reason}")]
    ConfigInvalid {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The link manifest could not be written.
    #[error("failed to write link manifest {path}: {source}")]
    ManifestWriteFailed {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// One or more integrations failed during a push.
    #[error("{failed} of {total} integration(s) failed to publish")]
    PushFailed {
        /// Number of failed integrations.
        failed: usize,
        /// Number of integrations attempted.
        total: usize,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PusherError`].
pub type Result<T> = std::result::Result<T, PusherError>;
