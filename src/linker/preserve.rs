//! Retention levels for manifest entries.

use std::fmt;
use std::str::FromStr;

/// How aggressively the stripping step may remove code from an entry.
///
/// The named variants cover the values toitnups writes itself. Values found in
/// an existing manifest that are not recognised are kept as
/// [`PreserveMode::Other`] so the merge can write them back untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PreserveMode {
    /// Preserve everything in the assembly.
    All,
    /// Preserve the full assembly. This is the toitnups default.
    #[default]
    Full,
    /// Preserve fields only.
    Fields,
    /// Preserve methods only.
    Methods,
    /// Preserve nothing beyond what is referenced.
    Nothing,
    /// A value written by another tool, retained verbatim.
    Other(String),
}

impl PreserveMode {
    /// The values accepted from users, in documentation order.
    pub const KNOWN: &'static [&'static str] = &["all", "full", "fields", "methods", "nothing"];

    /// Interpret an attribute value read from a manifest.
    ///
    /// Never fails: unknown values become [`PreserveMode::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups::PreserveMode;
    ///
    /// assert_eq!(PreserveMode::from_attribute("all"), PreserveMode::All);
    /// assert_eq!(
    ///     PreserveMode::from_attribute("Custom"),
    ///     PreserveMode::Other("Custom".to_owned())
    /// );
    /// ```
    #[must_use]
    pub fn from_attribute(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Self::Other(value.to_owned()))
    }

    /// Return the attribute value for this mode.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Full => "full",
            Self::Fields => "fields",
            Self::Methods => "methods",
            Self::Nothing => "nothing",
            Self::Other(value) => value,
        }
    }
}

/// A user-supplied preserve mode outside [`PreserveMode::KNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown preserve mode \"{}\"; expected one of: {}",
    .value,
    PreserveMode::KNOWN.join(", ")
)]
pub struct UnknownPreserveMode {
    /// The rejected value.
    pub value: String,
}

impl FromStr for PreserveMode {
    type Err = UnknownPreserveMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "full" => Ok(Self::Full),
            "fields" => Ok(Self::Fields),
            "methods" => Ok(Self::Methods),
            "nothing" => Ok(Self::Nothing),
            other => Err(UnknownPreserveMode {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PreserveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
