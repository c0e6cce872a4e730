//! Core toitnups library: the Unity `link.xml` manifest model.
//!
//! The manifest lists the assemblies that Unity's managed code stripping step
//! must preserve. This crate parses, merges, and serialises that manifest; it
//! performs no filesystem I/O so the pusher crate decides when and where the
//! file is read and written.

pub mod linker;

pub use linker::{
    AssemblyEntry, LinkManifest, ManifestParseError, PreserveMode, TypeEntry, XmlElement, merge,
    parse_manifest, parse_manifest_bytes,
};
