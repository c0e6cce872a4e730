//! Deterministic manifest serialisation.
//!
//! The output format is fixed so that merging the same names twice produces
//! byte-identical files:
//!
//! - no XML declaration;
//! - one tab of indentation per nesting level, `\n` line endings;
//! - attributes in the order `fullname`, `preserve`, then any extra attributes
//!   in the order they were read;
//! - childless elements self-close with ` />`;
//! - inside an assembly, `<type>` entries come before any other elements;
//! - no trailing newline.
//!
//! This matches the layout of manifests written by earlier releases, so those
//! files are rewritten without spurious diffs.

use super::{AssemblyEntry, LinkManifest, PreserveMode, TypeEntry, XmlElement};
use quick_xml::escape::escape;

const INDENT: char = '\t';

/// Serialise `manifest` to its canonical text form.
///
/// # Examples
///
/// ```
/// use toitnups::{AssemblyEntry, LinkManifest, PreserveMode};
/// use toitnups::linker::writer::write_manifest;
///
/// let mut manifest = LinkManifest::new();
/// manifest.insert(AssemblyEntry::new("A", Some(PreserveMode::Full)));
///
/// assert_eq!(
///     write_manifest(&manifest),
///     "<linker>\n\t<assembly fullname=\"A\" preserve=\"full\" />\n</linker>"
/// );
/// ```
#[must_use]
pub fn write_manifest(manifest: &LinkManifest) -> String {
    if manifest.is_empty() {
        return "<linker />".to_owned();
    }

    let mut out = String::from("<linker>\n");
    for assembly in manifest.assemblies() {
        write_assembly(&mut out, assembly);
    }
    out.push_str("</linker>");
    out
}

fn write_assembly(out: &mut String, assembly: &AssemblyEntry) {
    out.push(INDENT);
    write_open_tag(
        out,
        "assembly",
        &assembly.full_name,
        assembly.preserve.as_ref(),
        &assembly.extra_attributes,
    );

    if assembly.types.is_empty() && assembly.elements.is_empty() {
        out.push_str(" />\n");
        return;
    }

    out.push_str(">\n");
    for entry in &assembly.types {
        write_type(out, entry);
    }
    for element in &assembly.elements {
        write_element(out, element, 2);
    }
    out.push(INDENT);
    out.push_str("</assembly>\n");
}

fn write_type(out: &mut String, entry: &TypeEntry) {
    push_indent(out, 2);
    write_open_tag(
        out,
        "type",
        &entry.full_name,
        entry.preserve.as_ref(),
        &entry.extra_attributes,
    );

    if entry.elements.is_empty() {
        out.push_str(" />\n");
        return;
    }

    out.push_str(">\n");
    for element in &entry.elements {
        write_element(out, element, 3);
    }
    push_indent(out, 2);
    out.push_str("</type>\n");
}

fn write_element(out: &mut String, element: &XmlElement, level: usize) {
    push_indent(out, level);
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        write_attribute(out, key, value);
    }

    if element.children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    out.push_str(">\n");
    for child in &element.children {
        write_element(out, child, level + 1);
    }
    push_indent(out, level);
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}

fn push_indent(out: &mut String, level: usize) {
    out.extend(std::iter::repeat_n(INDENT, level));
}

/// Write `<name fullname=".." preserve=".." extra="..."` without closing it.
fn write_open_tag(
    out: &mut String,
    element: &str,
    full_name: &str,
    preserve: Option<&PreserveMode>,
    extra_attributes: &[(String, String)],
) {
    out.push('<');
    out.push_str(element);
    write_attribute(out, "fullname", full_name);
    if let Some(mode) = preserve {
        write_attribute(out, "preserve", mode.as_str());
    }
    for (key, value) in extra_attributes {
        write_attribute(out, key, value);
    }
}

fn write_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
