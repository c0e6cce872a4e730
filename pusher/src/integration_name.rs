//! Validated names and paths for integrations.
//!
//! [`IntegrationName`] doubles as a directory name inside the registry and as
//! part of the primary module filename, so it must be safe on every platform
//! Unity runs on. [`TargetPath`] is always interpreted relative to the asset
//! root and may not escape it.

use crate::error::{PusherError, Result};
use camino::Utf8Path;
use std::fmt;
use std::str::FromStr;

/// Prefix shared by integration directories and primary module names.
pub const INTEGRATION_PREFIX: &str = "integration.";

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// A validated integration name.
///
/// Names are non-empty, carry no leading or trailing whitespace, and contain
/// no path separators, control characters, or characters Windows reserves in
/// filenames.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntegrationName(String);

impl IntegrationName {
    /// Validate and wrap `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidName`] when the name breaks any rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups_pusher::integration_name::IntegrationName;
    ///
    /// let name = IntegrationName::new("Serilog").expect("valid name");
    /// assert_eq!(name.directory_name(), "integration.Serilog");
    ///
    /// assert!(IntegrationName::new("../escape").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        match name_violation(&name) {
            Some(reason) => Err(PusherError::InvalidName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory holding this integration inside the registry.
    #[must_use]
    pub fn directory_name(&self) -> String {
        format!("{INTEGRATION_PREFIX}{}", self.0)
    }

    /// Base name of the assembly the integration project itself produces.
    ///
    /// The scaffolded project is named after its directory, so the primary
    /// module shares the directory name.
    #[must_use]
    pub fn primary_module(&self) -> String {
        self.directory_name()
    }
}

fn name_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name must not be empty");
    }
    if name.trim() != name {
        return Some("name must not start or end with whitespace");
    }
    if name == "." || name == ".." {
        return Some("name must not be a relative directory reference");
    }
    if name.contains(['/', '\\']) {
        return Some("name must not contain path separators");
    }
    if name.chars().any(char::is_control) {
        return Some("name must not contain control characters");
    }
    if name.contains(RESERVED_CHARS) {
        return Some("name must not contain any of < > : \" | ? *");
    }
    None
}

impl AsRef<str> for IntegrationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for IntegrationName {
    type Err = PusherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for IntegrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated path relative to the asset root.
///
/// Either separator is accepted on input; the stored form uses `/` and drops
/// empty and `.` segments, so `Plugins\\Json` and `./Plugins/Json/` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPath(String);

impl TargetPath {
    /// Validate and normalise `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::InvalidPath`] when the path is empty, absolute,
    /// escapes the asset root, or contains forbidden characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups_pusher::integration_name::TargetPath;
    ///
    /// let path = TargetPath::new("Plugins\\Serilog").expect("valid path");
    /// assert_eq!(path.as_str(), "Plugins/Serilog");
    ///
    /// assert!(TargetPath::new("../Outside").is_err());
    /// ```
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let raw = path.into();
        match normalise_target(&raw) {
            Ok(normalised) => Ok(Self(normalised)),
            Err(reason) => Err(PusherError::InvalidPath { path: raw, reason }),
        }
    }

    /// Wrap a path literal that is already relative and normalised.
    pub(crate) fn from_normalised(path: &str) -> Self {
        Self(path.to_owned())
    }

    /// Get the normalised path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the normalised path as a UTF-8 path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        Utf8Path::new(&self.0)
    }
}

fn normalise_target(raw: &str) -> std::result::Result<String, &'static str> {
    if raw.trim().is_empty() {
        return Err("path must not be empty");
    }
    if raw.starts_with(['/', '\\']) || has_drive_prefix(raw) {
        return Err("path must be relative to the Assets folder");
    }
    if raw.chars().any(char::is_control) {
        return Err("path must not contain control characters");
    }
    if raw.contains(RESERVED_CHARS) {
        return Err("path must not contain any of < > : \" | ? *");
    }

    let mut segments = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err("path must not leave the Assets folder"),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err("path must name a folder inside Assets");
    }
    Ok(segments.join("/"))
}

fn has_drive_prefix(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

impl FromStr for TargetPath {
    type Err = PusherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
