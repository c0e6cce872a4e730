//! Folding artifact names into a manifest.
//!
//! The merge only ever appends: entries already present keep their position,
//! preserve mode and nested types, whatever mode the caller asks for now.
//! Names are deduplicated against the manifest and against each other, so
//! merging the same names again is a no-op.

use super::{AssemblyEntry, LinkManifest, PreserveMode};
use log::{debug, trace};
use std::collections::HashSet;

impl LinkManifest {
    /// Append an entry with `preserve` for every name not yet present.
    ///
    /// Blank names are skipped. Returns the names that were appended, in the
    /// order they were added; an empty result means the manifest is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups::{LinkManifest, PreserveMode};
    ///
    /// let mut manifest = LinkManifest::new();
    /// let added = manifest.append_missing(["A", "B", "A"], &PreserveMode::Full);
    /// assert_eq!(added, vec!["A".to_owned(), "B".to_owned()]);
    ///
    /// let again = manifest.append_missing(["B"], &PreserveMode::All);
    /// assert!(again.is_empty());
    /// ```
    pub fn append_missing<I, S>(&mut self, names: I, preserve: &PreserveMode) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = self.names().map(str::to_owned).collect();
        let mut added = Vec::new();

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                trace!("skipping blank artifact name");
                continue;
            }
            if !seen.insert(name.to_owned()) {
                trace!("{name} already listed; leaving entry untouched");
                continue;
            }
            self.assemblies
                .push(AssemblyEntry::new(name, Some(preserve.clone())));
            added.push(name.to_owned());
        }

        debug!(
            "merged {} new assembly entries into manifest of {}",
            added.len(),
            self.len()
        );
        added
    }
}

/// Merge `new_names` into an existing manifest, or a fresh one when absent.
///
/// # Examples
///
/// ```
/// use toitnups::{AssemblyEntry, LinkManifest, PreserveMode, merge};
///
/// let mut existing = LinkManifest::new();
/// existing.insert(AssemblyEntry::new("A", Some(PreserveMode::Full)));
///
/// let merged = merge(Some(existing), ["A", "B"], &PreserveMode::All);
/// assert_eq!(merged.get("A").and_then(|e| e.preserve.clone()), Some(PreserveMode::Full));
/// assert_eq!(merged.get("B").and_then(|e| e.preserve.clone()), Some(PreserveMode::All));
/// ```
#[must_use]
pub fn merge<I, S>(existing: Option<LinkManifest>, new_names: I, preserve: &PreserveMode) -> LinkManifest
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut manifest = existing.unwrap_or_default();
    manifest.append_missing(new_names, preserve);
    manifest
}
