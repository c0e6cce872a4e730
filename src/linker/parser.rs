//! Manifest parsing.
//!
//! Parsing is strict about the parts the model interprets: the root must be
//! `<linker>`, only `<assembly>` may appear under it, and every assembly needs
//! a unique `fullname`. Below an assembly, elements other than `<type>` (and
//! everything below a type) are kept as opaque [`XmlElement`] trees, so
//! `<namespace>`, `<method>`, `<field>` and friends survive a rewrite. Text
//! content is rejected because the writer could not reproduce it. Unknown
//! attributes on `<assembly>` and `<type>` are kept verbatim.

use super::{AssemblyEntry, LinkManifest, PreserveMode, TypeEntry, XmlElement};
use log::trace;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Errors arising from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be decoded.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document contains no root element.
    #[error("manifest has no <linker> root element")]
    MissingRoot,

    /// The root element is not `<linker>`.
    #[error("expected root element <linker>, found <{found}>")]
    UnexpectedRoot {
        /// Name of the element found at the root.
        found: String,
    },

    /// An element appeared where the manifest format does not allow it.
    #[error("unsupported element <{element}> inside <{parent}>")]
    UnsupportedElement {
        /// Name of the rejected element.
        element: String,
        /// Name of the enclosing element.
        parent: &'static str,
    },

    /// Non-whitespace text appeared inside an element.
    #[error("unexpected text content inside <{parent}>")]
    UnexpectedText {
        /// Name of the enclosing element.
        parent: &'static str,
    },

    /// An `<assembly>` or `<type>` lacks its `fullname` attribute.
    #[error("<{element}> is missing the required fullname attribute")]
    MissingFullName {
        /// Name of the offending element.
        element: &'static str,
    },

    /// Two `<assembly>` entries share the same `fullname`.
    #[error("assembly \"{name}\" is listed more than once")]
    DuplicateAssembly {
        /// The repeated assembly name.
        name: String,
    },

    /// Elements or text follow the closing `</linker>` tag.
    #[error("unexpected content after </linker>")]
    TrailingContent,

    /// The document ended inside an open element.
    #[error("manifest ended before </linker> was closed")]
    Unterminated,

    /// The file is not UTF-8 text.
    #[error("manifest is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Parse a manifest read from disk.
///
/// The bytes must be UTF-8; a leading byte order mark is skipped.
///
/// # Errors
///
/// Returns [`ManifestParseError::Encoding`] for bytes that are not UTF-8, and
/// otherwise the errors of [`parse_manifest`].
///
/// # Examples
///
/// ```
/// use toitnups::{ManifestParseError, parse_manifest_bytes};
///
/// let manifest = parse_manifest_bytes(b"\xef\xbb\xbf<linker />").expect("valid manifest");
/// assert!(manifest.is_empty());
///
/// let err = parse_manifest_bytes(b"<linker>\xff\xfe</linker>").expect_err("not UTF-8");
/// assert!(matches!(err, ManifestParseError::Encoding(_)));
/// ```
pub fn parse_manifest_bytes(bytes: &[u8]) -> Result<LinkManifest, ManifestParseError> {
    let text = std::str::from_utf8(bytes)?;
    parse_manifest(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Parse manifest text into a [`LinkManifest`].
///
/// A leading XML declaration, comments and processing instructions are
/// accepted and discarded.
///
/// # Errors
///
/// Returns a [`ManifestParseError`] when the text is not well-formed XML, the
/// root is not `<linker>`, the root holds anything but `<assembly>`, a text
/// node appears, an assembly or type lacks `fullname`, or an assembly name is
/// repeated.
///
/// # Examples
///
/// ```
/// use toitnups::parse_manifest;
///
/// let text = "<linker>\n\t<assembly fullname=\"A\" preserve=\"full\" />\n</linker>";
/// let manifest = parse_manifest(text).expect("valid manifest");
/// assert_eq!(manifest.len(), 1);
/// assert!(manifest.contains("A"));
/// ```
pub fn parse_manifest(text: &str) -> Result<LinkManifest, ManifestParseError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut state = ParseState::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => state.open(&element, false)?,
            Event::Empty(element) => state.open(&element, true)?,
            Event::End(_) => state.close()?,
            Event::Text(content) => {
                if !content.unescape()?.trim().is_empty() {
                    return Err(state.unexpected_text());
                }
            }
            Event::CData(_) => return Err(state.unexpected_text()),
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    state.finish()
}

/// Where the parser currently is in the document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Depth {
    #[default]
    Document,
    Linker,
    Assembly,
    Type,
    Done,
}

impl Depth {
    const fn element(self) -> &'static str {
        match self {
            Self::Document | Self::Done => "document",
            Self::Linker => "linker",
            Self::Assembly => "assembly",
            Self::Type => "type",
        }
    }
}

#[derive(Debug, Default)]
struct ParseState {
    depth: Depth,
    manifest: Option<LinkManifest>,
    current: Option<AssemblyEntry>,
    /// Open opaque elements, innermost last.
    opaque: Vec<XmlElement>,
}

impl ParseState {
    fn open(&mut self, element: &BytesStart<'_>, is_empty: bool) -> Result<(), ManifestParseError> {
        match (self.depth, element.name().as_ref()) {
            (Depth::Assembly | Depth::Type, _) if !self.opaque.is_empty() => {
                self.open_opaque(element, is_empty)?;
            }
            (Depth::Document, b"linker") => {
                self.manifest = Some(LinkManifest::new());
                self.depth = if is_empty { Depth::Done } else { Depth::Linker };
            }
            (Depth::Document, _) => {
                return Err(ManifestParseError::UnexpectedRoot {
                    found: element_name(element),
                });
            }
            (Depth::Linker, b"assembly") => {
                let assembly = read_assembly(element)?;
                trace!("parsed assembly entry {}", assembly.full_name);
                if is_empty {
                    self.insert(assembly)?;
                } else {
                    self.current = Some(assembly);
                    self.depth = Depth::Assembly;
                }
            }
            (Depth::Assembly, b"type") => {
                let entry = read_type(element)?;
                if let Some(assembly) = self.current.as_mut() {
                    assembly.types.push(entry);
                }
                if !is_empty {
                    self.depth = Depth::Type;
                }
            }
            (Depth::Assembly | Depth::Type, _) => self.open_opaque(element, is_empty)?,
            (Depth::Done, _) => return Err(ManifestParseError::TrailingContent),
            (depth, _) => {
                return Err(ManifestParseError::UnsupportedElement {
                    element: element_name(element),
                    parent: depth.element(),
                });
            }
        }
        Ok(())
    }

    fn open_opaque(
        &mut self,
        element: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<(), ManifestParseError> {
        let node = read_element(element)?;
        trace!("keeping <{}> as an opaque element", node.name);
        if is_empty {
            self.attach(node);
        } else {
            self.opaque.push(node);
        }
        Ok(())
    }

    /// Hang a finished opaque element on its parent.
    fn attach(&mut self, node: XmlElement) {
        if let Some(parent) = self.opaque.last_mut() {
            parent.children.push(node);
            return;
        }
        let Some(assembly) = self.current.as_mut() else {
            return;
        };
        match (self.depth, assembly.types.last_mut()) {
            (Depth::Type, Some(entry)) => entry.elements.push(node),
            _ => assembly.elements.push(node),
        }
    }

    fn close(&mut self) -> Result<(), ManifestParseError> {
        if let Some(node) = self.opaque.pop() {
            self.attach(node);
            return Ok(());
        }

        self.depth = match self.depth {
            Depth::Type => Depth::Assembly,
            Depth::Assembly => {
                if let Some(assembly) = self.current.take() {
                    self.insert(assembly)?;
                }
                Depth::Linker
            }
            Depth::Linker => Depth::Done,
            Depth::Document | Depth::Done => return Err(ManifestParseError::TrailingContent),
        };
        Ok(())
    }

    fn insert(&mut self, assembly: AssemblyEntry) -> Result<(), ManifestParseError> {
        let manifest = self.manifest.get_or_insert_with(LinkManifest::new);
        let name = assembly.full_name.clone();
        if manifest.insert(assembly) {
            Ok(())
        } else {
            Err(ManifestParseError::DuplicateAssembly { name })
        }
    }

    fn unexpected_text(&self) -> ManifestParseError {
        match self.depth {
            Depth::Done => ManifestParseError::TrailingContent,
            depth => ManifestParseError::UnexpectedText {
                parent: depth.element(),
            },
        }
    }

    fn finish(self) -> Result<LinkManifest, ManifestParseError> {
        match (self.depth, self.manifest) {
            (Depth::Done, Some(manifest)) => Ok(manifest),
            (Depth::Document, _) => Err(ManifestParseError::MissingRoot),
            _ => Err(ManifestParseError::Unterminated),
        }
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Attributes shared by `<assembly>` and `<type>`.
struct EntryAttributes {
    full_name: String,
    preserve: Option<PreserveMode>,
    extra: Vec<(String, String)>,
}

fn read_attributes(
    element: &BytesStart<'_>,
    element_kind: &'static str,
) -> Result<EntryAttributes, ManifestParseError> {
    let mut full_name = None;
    let mut preserve = None;
    let mut extra = Vec::new();

    for attribute in element.attributes() {
        let attribute = attribute?;
        let value = attribute.unescape_value()?.into_owned();
        match attribute.key.as_ref() {
            b"fullname" => full_name = Some(value),
            b"preserve" => preserve = Some(PreserveMode::from_attribute(&value)),
            key => extra.push((String::from_utf8_lossy(key).into_owned(), value)),
        }
    }

    let full_name = full_name.ok_or(ManifestParseError::MissingFullName {
        element: element_kind,
    })?;

    Ok(EntryAttributes {
        full_name,
        preserve,
        extra,
    })
}

fn read_assembly(element: &BytesStart<'_>) -> Result<AssemblyEntry, ManifestParseError> {
    let attributes = read_attributes(element, "assembly")?;
    Ok(AssemblyEntry {
        full_name: attributes.full_name,
        preserve: attributes.preserve,
        extra_attributes: attributes.extra,
        types: Vec::new(),
        elements: Vec::new(),
    })
}

fn read_type(element: &BytesStart<'_>) -> Result<TypeEntry, ManifestParseError> {
    let attributes = read_attributes(element, "type")?;
    Ok(TypeEntry {
        full_name: attributes.full_name,
        preserve: attributes.preserve,
        extra_attributes: attributes.extra,
        elements: Vec::new(),
    })
}

fn read_element(element: &BytesStart<'_>) -> Result<XmlElement, ManifestParseError> {
    let mut node = XmlElement::new(element_name(element));
    for attribute in element.attributes() {
        let attribute = attribute?;
        node.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            attribute.unescape_value()?.into_owned(),
        ));
    }
    Ok(node)
}
