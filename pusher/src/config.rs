//! Project configuration loaded from `.tn/toitnups.toml`.
//!
//! Every table and key is optional; an absent file is the same as an empty
//! one. Unknown keys are rejected so that typos surface immediately instead of
//! being silently ignored.

use crate::error::{PusherError, Result};
use crate::integration_name::TargetPath;
use camino::Utf8Path;
use log::debug;
use serde::{Deserialize, Deserializer};
use toitnups::PreserveMode;

/// Name of the configuration file inside the registry directory.
pub const CONFIG_FILE_NAME: &str = "toitnups.toml";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PushConfig {
    /// How integrations are built and scaffolded.
    pub build: BuildSettings,
    /// Which build outputs are published.
    pub collect: CollectSettings,
    /// Where the link manifest lives and how new entries are written.
    pub manifest: ManifestSettings,
}

/// Settings for the external .NET toolchain.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    /// Program used for `new` and `publish`.
    pub command: String,
    /// Build configuration passed as `-c`.
    pub configuration: String,
    /// Target framework moniker; selects the publish output folder.
    pub framework: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            command: "dotnet".to_owned(),
            configuration: "Release".to_owned(),
            framework: "netstandard2.0".to_owned(),
        }
    }
}

/// Settings for artifact collection.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CollectSettings {
    /// File extensions excluded in addition to `pdb` and `json`, which are
    /// never published.
    pub extra_exclude_extensions: Vec<String>,
}

/// Settings for the link manifest.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestSettings {
    /// Manifest location relative to the `Assets` folder.
    #[serde(deserialize_with = "deserialize_target_path")]
    pub path: TargetPath,
    /// Preserve mode written on newly added entries.
    #[serde(deserialize_with = "deserialize_preserve")]
    pub preserve: PreserveMode,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            path: TargetPath::from_normalised("link.xml"),
            preserve: PreserveMode::Full,
        }
    }
}

fn deserialize_preserve<'de, D>(deserializer: D) -> std::result::Result<PreserveMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn deserialize_target_path<'de, D>(deserializer: D) -> std::result::Result<TargetPath, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    TargetPath::new(raw).map_err(serde::de::Error::custom)
}

impl PushConfig {
    /// Load the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::ConfigInvalid`] when the file cannot be parsed,
    /// or [`PusherError::Io`] when it exists but cannot be read.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.is_file() {
            debug!("no configuration at {path}; using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|reason| PusherError::ConfigInvalid {
            path: path.to_owned(),
            reason,
        })
    }

    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// Returns the parser's message when the text is not valid configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups::PreserveMode;
    /// use toitnups_pusher::config::PushConfig;
    ///
    /// let config = PushConfig::parse("[manifest]\npreserve = \"all\"\n").expect("valid config");
    /// assert_eq!(config.manifest.preserve, PreserveMode::All);
    /// assert_eq!(config.build.configuration, "Release");
    /// ```
    pub fn parse(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|err| err.to_string())
    }
}
