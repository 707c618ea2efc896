//! Word document format detection and validation.
//!
//! Detection looks at content, never at the file extension: the ZIP
//! local-header signature first, then the main-part content type declared in
//! `[Content_Types].xml`.

use crate::error::{Error, Result};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Kind of WordprocessingML package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocxKind {
    /// Regular document (`.docx`)
    Document,
    /// Macro-enabled document (`.docm`)
    MacroEnabled,
    /// Template (`.dotx`)
    Template,
}

/// Word document format information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocxFormat {
    /// Package kind
    pub kind: DocxKind,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DocxKind::Document => write!(f, "Word document"),
            DocxKind::MacroEnabled => write!(f, "Word macro-enabled document"),
            DocxKind::Template => write!(f, "Word template"),
        }
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE2 compound file magic used by legacy `.doc` files.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const CONTENT_TYPES: &str = "[Content_Types].xml";

const MAIN_CONTENT_TYPES: &[(&str, DocxKind)] = &[
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        DocxKind::Document,
    ),
    (
        "application/vnd.ms-word.document.macroEnabled.main+xml",
        DocxKind::MacroEnabled,
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
        DocxKind::Template,
    ),
];

/// Detect the Word format of a file.
///
/// # Example
/// ```no_run
/// use scopesheet::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("proposal.docx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let data = fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect the Word format of in-memory content.
///
/// # Returns
/// * `Ok(DocxFormat)` for WordprocessingML packages
/// * `Err(Error::UnsupportedFormat)` when the signature is not a Word package
/// * `Err(Error::InvalidDocument)` when the ZIP container is corrupt or lacks
///   `[Content_Types].xml`
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnsupportedFormat(describe_signature(data).into()));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::InvalidDocument(format!("cannot open archive: {}", e)))?;

    let content_types = {
        let mut entry = archive.by_name(CONTENT_TYPES).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                Error::InvalidDocument(format!("missing {}", CONTENT_TYPES))
            }
            other => Error::InvalidDocument(format!("cannot read {}: {}", CONTENT_TYPES, other)),
        })?;
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| Error::InvalidDocument(format!("cannot read {}: {}", CONTENT_TYPES, e)))?;
        xml
    };

    classify_content_types(&content_types)
}

/// Pick the package kind from the declared content types.
fn classify_content_types(xml: &str) -> Result<DocxFormat> {
    if let Some((_, kind)) = MAIN_CONTENT_TYPES.iter().find(|(ct, _)| xml.contains(ct)) {
        return Ok(DocxFormat { kind: *kind });
    }

    let other = if xml.contains("spreadsheetml") {
        "spreadsheet package"
    } else if xml.contains("presentationml") {
        "presentation package"
    } else {
        "ZIP archive without a Word document part"
    };
    Err(Error::UnsupportedFormat(other.into()))
}

/// Human-readable name for a non-ZIP signature.
fn describe_signature(data: &[u8]) -> &'static str {
    if data.is_empty() {
        "empty input"
    } else if data.starts_with(OLE_MAGIC) {
        "legacy Word 97-2003 document (.doc)"
    } else if data.starts_with(b"%PDF-") {
        "PDF document"
    } else if data.starts_with(b"{\\rtf") {
        "RTF document"
    } else {
        "unrecognized content"
    }
}

/// Check if a file is a Word document.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes hold a Word document.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
