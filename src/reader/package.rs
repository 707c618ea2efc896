//! Access to the parts of an OOXML package.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::Metadata;

const ROOT_RELS: &str = "_rels/.rels";
const CORE_PROPS: &str = "docProps/core.xml";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// An opened ZIP package borrowing the input bytes.
pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    /// Open the archive.
    pub(crate) fn open(data: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::InvalidDocument(format!("cannot open archive: {}", e)))?;
        Ok(Self { archive })
    }

    /// Read a part as UTF-8 text, `None` if it does not exist.
    pub(crate) fn read_part(&mut self, name: &str) -> Result<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(Error::InvalidDocument(format!("cannot read {}: {}", name, e)));
            }
        };
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| Error::InvalidDocument(format!("cannot read {}: {}", name, e)))?;
        Ok(Some(xml))
    }

    /// Read a part that must exist.
    pub(crate) fn require_part(&mut self, name: &str) -> Result<String> {
        self.read_part(name)?
            .ok_or_else(|| Error::InvalidDocument(format!("missing part {}", name)))
    }

    /// Path of the main document part.
    ///
    /// Follows the `officeDocument` relationship in `_rels/.rels` and falls
    /// back to `word/document.xml` when the relationship is absent.
    pub(crate) fn main_document_path(&mut self) -> Result<String> {
        let Some(rels) = self.read_part(ROOT_RELS)? else {
            return Ok(DEFAULT_MAIN_PART.to_string());
        };
        Ok(office_document_target(&rels)?.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Read core properties. Missing or malformed metadata is not an error.
    pub(crate) fn metadata(&mut self, format: impl Into<String>) -> Metadata {
        let mut metadata = Metadata::with_format(format);
        match self.read_part(CORE_PROPS) {
            Ok(Some(xml)) => {
                if let Err(e) = read_core_properties(&xml, &mut metadata) {
                    log::warn!("Ignoring malformed {}: {}", CORE_PROPS, e);
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring unreadable {}: {}", CORE_PROPS, e),
        }
        metadata
    }
}

/// Directory of a part path, including the trailing slash (`word/`).
pub(crate) fn part_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Read an attribute by local name.
pub(crate) fn attr_value(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn office_document_target(rels: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let is_office = attr_value(&e, b"Type")?
                    .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL));
                if is_office {
                    if let Some(target) = attr_value(&e, b"Target")? {
                        return Ok(Some(target.trim_start_matches('/').to_string()));
                    }
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn read_core_properties(xml: &str, metadata: &mut Metadata) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut current: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Text(t) => {
                if let Some(name) = current.as_deref() {
                    metadata.set_property(name, &t.unescape()?);
                }
            }
            Event::End(_) => current = None,
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}
