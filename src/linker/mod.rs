//! Unity `link.xml` manifest model.
//!
//! A manifest is a `<linker>` root holding `<assembly>` entries, each keyed by
//! its `fullname` attribute and optionally carrying a `preserve` level and
//! nested `<type>` entries. Other children that Unity understands, such as
//! `<namespace>` under an assembly or `<method>` and `<field>` under a type,
//! are kept as opaque [`XmlElement`] trees. Entries keep their insertion
//! order so that the serialised form is stable across runs.
//!
//! # Sub-modules
//!
//! - [`merge`] - Folding artifact names into an existing manifest.
//! - [`parser`] - XML parsing into [`LinkManifest`].
//! - [`preserve`] - The [`PreserveMode`] retention level.
//! - [`writer`] - Deterministic serialisation.

pub mod merge;
pub mod parser;
pub mod preserve;
pub mod writer;

pub use merge::merge;
pub use parser::{ManifestParseError, parse_manifest, parse_manifest_bytes};
pub use preserve::{PreserveMode, UnknownPreserveMode};

use std::str::FromStr;

/// A child element the manifest model does not interpret.
///
/// Parsed elements are written back with the same name, attributes and
/// children, in canonical layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name, including any namespace prefix.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create a childless element with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A `<type>` entry nested inside an assembly.
///
/// Type entries are only ever read from an existing manifest and written back
/// unchanged; the merge never creates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Fully qualified type name.
    pub full_name: String,
    /// Retention level, when the manifest specifies one.
    pub preserve: Option<PreserveMode>,
    /// Additional attributes in document order, carried through verbatim.
    pub extra_attributes: Vec<(String, String)>,
    /// Member elements such as `<method>` and `<field>`.
    pub elements: Vec<XmlElement>,
}

impl TypeEntry {
    /// Create a type entry with no extra attributes.
    #[must_use]
    pub fn new(full_name: impl Into<String>, preserve: Option<PreserveMode>) -> Self {
        Self {
            full_name: full_name.into(),
            preserve,
            extra_attributes: Vec::new(),
            elements: Vec::new(),
        }
    }
}

/// An `<assembly>` entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyEntry {
    /// Assembly name; unique within a manifest.
    pub full_name: String,
    /// Retention level, when the manifest specifies one.
    pub preserve: Option<PreserveMode>,
    /// Additional attributes in document order, carried through verbatim.
    pub extra_attributes: Vec<(String, String)>,
    /// Nested type entries.
    pub types: Vec<TypeEntry>,
    /// Other child elements, such as `<namespace>`, written after the types.
    pub elements: Vec<XmlElement>,
}

impl AssemblyEntry {
    /// Create an assembly entry without nested types.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups::{AssemblyEntry, PreserveMode};
    ///
    /// let entry = AssemblyEntry::new("Newtonsoft.Json", Some(PreserveMode::Full));
    /// assert_eq!(entry.full_name, "Newtonsoft.Json");
    /// assert!(entry.types.is_empty());
    /// ```
    #[must_use]
    pub fn new(full_name: impl Into<String>, preserve: Option<PreserveMode>) -> Self {
        Self {
            full_name: full_name.into(),
            preserve,
            extra_attributes: Vec::new(),
            types: Vec::new(),
            elements: Vec::new(),
        }
    }
}

/// An ordered, duplicate-free list of assembly entries.
///
/// The only way to add an entry is [`LinkManifest::insert`] (or the merge
/// helpers built on it), which refuses duplicates, so no two entries ever
/// share a `full_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkManifest {
    assemblies: Vec<AssemblyEntry>,
}

impl LinkManifest {
    /// Create an empty manifest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            assemblies: Vec::new(),
        }
    }

    /// Return the entries in insertion order.
    #[must_use]
    pub fn assemblies(&self) -> &[AssemblyEntry] {
        &self.assemblies
    }

    /// Return the number of assembly entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    /// Return `true` when the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Look up an entry by its `full_name`.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&AssemblyEntry> {
        self.assemblies
            .iter()
            .find(|entry| entry.full_name == full_name)
    }

    /// Return `true` when an entry with `full_name` exists.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.get(full_name).is_some()
    }

    /// Iterate over entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assemblies.iter().map(|entry| entry.full_name.as_str())
    }

    /// Append `entry` unless its name is already present.
    ///
    /// Returns `false`, leaving the manifest unchanged, for a duplicate.
    pub fn insert(&mut self, entry: AssemblyEntry) -> bool {
        if self.contains(&entry.full_name) {
            return false;
        }
        self.assemblies.push(entry);
        true
    }

    /// Serialise the manifest to its canonical text form.
    ///
    /// See [`writer::write_manifest`].
    #[must_use]
    pub fn to_xml(&self) -> String {
        writer::write_manifest(self)
    }
}

impl FromStr for LinkManifest {
    type Err = ManifestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_manifest(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicate_names() {
        let mut manifest = LinkManifest::new();
        assert!(manifest.insert(AssemblyEntry::new("A", Some(PreserveMode::Full))));
        assert!(!manifest.insert(AssemblyEntry::new("A", Some(PreserveMode::All))));

        assert_eq!(manifest.len(), 1);
        assert_eq!(
            manifest.get("A").and_then(|e| e.preserve.clone()),
            Some(PreserveMode::Full)
        );
    }

    #[test]
    fn names_follow_insertion_order() {
        let mut manifest = LinkManifest::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            manifest.insert(AssemblyEntry::new(name, None));
        }

        let names: Vec<&str> = manifest.names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn from_str_delegates_to_parser() {
        let manifest: LinkManifest = "<linker>\n\t<assembly fullname=\"A\" preserve=\"all\" />\n</linker>"
            .parse()
            .expect("manifest should parse");
        assert!(manifest.contains("A"));
    }
}
