//! Artifact collection from build output.
//!
//! Only the top level of the publish directory is scanned; the publish step
//! flattens dependencies there.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use log::{trace, warn};
use std::fmt;
use std::fs;

/// Build output filename without its final extension.
///
/// This is the key under which the artifact appears in the link manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Derive the name from a file path, or `None` for paths without a
    /// file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use toitnups_pusher::collector::ArtifactName;
    ///
    /// let name = ArtifactName::from_path(Utf8Path::new("publish/Newtonsoft.Json.dll"));
    /// assert_eq!(name.map(|n| n.to_string()).as_deref(), Some("Newtonsoft.Json"));
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.file_stem().map(|stem| Self(stem.to_owned()))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A publishable file found in build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Manifest key.
    pub name: ArtifactName,
    /// Full path of the file.
    pub path: Utf8PathBuf,
}

impl Artifact {
    /// File name including extension, used as the copy destination name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_else(|| self.name.as_str())
    }
}

/// Extensions that are never published, whatever the configuration adds.
pub const ALWAYS_EXCLUDED: [&str; 2] = ["pdb", "json"];

/// Decides which build outputs are not published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeFilter {
    extensions: Vec<String>,
    primary_module: String,
}

impl ExcludeFilter {
    /// Exclude [`ALWAYS_EXCLUDED`] files, files with any of the `extra`
    /// extensions (a leading dot is optional, case is ignored) and the
    /// integration's own `primary_module`.
    #[must_use]
    pub fn new<I, S>(extra: I, primary_module: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> =
            ALWAYS_EXCLUDED.iter().map(|ext| (*ext).to_owned()).collect();
        for ext in extra {
            let ext = ext.as_ref().trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        Self {
            extensions,
            primary_module: primary_module.into(),
        }
    }

    /// Return `true` when `path` must not be published.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use toitnups_pusher::collector::ExcludeFilter;
    ///
    /// let filter = ExcludeFilter::new(["xml"], "integration.Polly");
    /// assert!(filter.excludes(Utf8Path::new("Polly.pdb")));
    /// assert!(filter.excludes(Utf8Path::new("Polly.xml")));
    /// assert!(filter.excludes(Utf8Path::new("integration.Polly.dll")));
    /// assert!(!filter.excludes(Utf8Path::new("Polly.dll")));
    /// ```
    #[must_use]
    pub fn excludes(&self, path: &Utf8Path) -> bool {
        let by_extension = path.extension().is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(ext))
        });
        by_extension || path.file_stem() == Some(self.primary_module.as_str())
    }
}

/// Collect the publishable files in `output_dir`, sorted by file name.
///
/// Subdirectories and excluded files are skipped.
///
/// # Errors
///
/// Returns I/O errors from reading the directory.
pub fn collect(output_dir: &Utf8Path, filter: &ExcludeFilter) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            warn!("skipping build output with a non-UTF-8 name in {output_dir}");
            continue;
        };
        if filter.excludes(&path) {
            trace!("excluding {path}");
            continue;
        }
        if let Some(name) = ArtifactName::from_path(&path) {
            artifacts.push(Artifact { name, path });
        }
    }

    artifacts.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(artifacts)
}
