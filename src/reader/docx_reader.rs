//! Word document reader producing a lazy block stream.

use std::fs;
use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use unicode_normalization::UnicodeNormalization;

use crate::detect::{detect_format_from_bytes, DocxFormat};
use crate::error::Result;
use crate::model::{Block, Metadata};

use super::options::ReadOptions;
use super::package::{attr_value, part_dir, Package};
use super::styles::StyleMap;

/// Level given to headings recognised by bold formatting alone.
const BOLD_HEADING_LEVEL: u8 = 1;

/// Word document reader.
///
/// Opening validates the container and loads the parts needed for block
/// extraction; [`DocxReader::blocks`] then parses the main document lazily.
/// Each call to `blocks` starts again from the first block.
#[derive(Debug, Clone)]
pub struct DocxReader {
    document_xml: String,
    styles: StyleMap,
    metadata: Metadata,
    format: DocxFormat,
    options: ReadOptions,
}

impl DocxReader {
    /// Open a Word file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    /// Open a Word file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Read a Word document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ReadOptions::default())
    }

    /// Read a Word document from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ReadOptions) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;

        let mut package = Package::open(data)?;
        let main_path = package.main_document_path()?;
        let document_xml = package.require_part(&main_path)?;

        let styles_path = format!("{}styles.xml", part_dir(&main_path));
        let styles = match package.read_part(&styles_path)? {
            Some(xml) => StyleMap::parse(&xml)?,
            None => StyleMap::new(),
        };

        let metadata = package.metadata(format.to_string());

        log::debug!(
            "DocxReader: opened {} ({} bytes of XML, {} styles)",
            main_path,
            document_xml.len(),
            styles.len()
        );

        Ok(Self {
            document_xml,
            styles,
            metadata,
            format,
            options,
        })
    }

    /// Read a Word document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ReadOptions::default())
    }

    /// Read a Word document from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ReadOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Iterate over the document's blocks in document order.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            reader: Reader::from_str(&self.document_xml),
            styles: &self.styles,
            options: &self.options,
            state: ParseState::default(),
            next_order: 0,
            done: false,
        }
    }

    /// Document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Detected package format.
    pub fn format(&self) -> DocxFormat {
        self.format
    }

    /// Paragraph styles.
    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// Reading options.
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }
}

/// Paragraph being collected.
#[derive(Debug, Default)]
struct ParagraphState {
    text: String,
    style_id: Option<String>,
    outline_level: Option<u8>,
    run_bold: bool,
    all_bold: bool,
    has_text: bool,
}

impl ParagraphState {
    fn new() -> Self {
        Self {
            all_bold: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct ParseState {
    /// Open paragraphs; text boxes nest a paragraph inside its host.
    paragraphs: Vec<ParagraphState>,
    /// Depth inside `mc:Fallback`, which repeats the preferred content.
    fallback_depth: usize,
    in_text: bool,
    in_paragraph_props: bool,
    in_run_props: bool,
    table_depth: usize,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

/// Lazy iterator over the blocks of a [`DocxReader`].
///
/// Yields `Err(Error::InvalidDocument)` once for malformed XML and then ends.
pub struct Blocks<'a> {
    reader: Reader<&'a [u8]>,
    styles: &'a StyleMap,
    options: &'a ReadOptions,
    state: ParseState,
    next_order: usize,
    done: bool,
}

impl<'a> Blocks<'a> {
    /// Advance the XML stream until a block completes or the input ends.
    fn advance(&mut self) -> Result<Option<Block>> {
        loop {
            let event = self.reader.read_event()?;
            if self.in_fallback(&event) {
                continue;
            }
            let block = match event {
                Event::Start(e) => {
                    self.on_start(&e)?;
                    None
                }
                Event::Empty(e) => {
                    // A self-closing <w:p/> is an empty paragraph.
                    if e.local_name().as_ref() != b"p" {
                        self.on_leaf(&e)?;
                    }
                    None
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    self.on_text(&text);
                    None
                }
                Event::CData(t) => {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    self.on_text(&text);
                    None
                }
                Event::End(e) => self.on_end(e.local_name().as_ref()),
                Event::Eof => return Ok(None),
                _ => None,
            };
            if block.is_some() {
                return Ok(block);
            }
        }
    }

    /// Track `mc:Fallback` nesting; true while the event should be skipped.
    fn in_fallback(&mut self, event: &Event<'_>) -> bool {
        let depth = &mut self.state.fallback_depth;
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"Fallback" => {
                *depth += 1;
                true
            }
            Event::End(e) if *depth > 0 && e.local_name().as_ref() == b"Fallback" => {
                *depth -= 1;
                true
            }
            Event::Eof => false,
            _ => *depth > 0,
        }
    }

    fn on_start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let state = &mut self.state;
        match e.local_name().as_ref() {
            b"p" => state.paragraphs.push(ParagraphState::new()),
            b"pPr" => state.in_paragraph_props = true,
            b"rPr" if !state.in_paragraph_props => state.in_run_props = true,
            b"r" => {
                if let Some(p) = state.paragraphs.last_mut() {
                    p.run_bold = false;
                }
            }
            b"t" => state.in_text = !state.paragraphs.is_empty(),
            b"tbl" => state.table_depth += 1,
            b"tr" if state.table_depth == 1 => state.row = Some(Vec::new()),
            b"tc" if state.table_depth == 1 => state.cell = Some(String::new()),
            _ => self.on_leaf(e)?,
        }
        Ok(())
    }

    /// Elements that carry data in their attributes or stand for characters.
    fn on_leaf(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let state = &mut self.state;
        let Some(p) = state.paragraphs.last_mut() else {
            return Ok(());
        };
        match e.local_name().as_ref() {
            b"pStyle" if state.in_paragraph_props => p.style_id = attr_value(e, b"val")?,
            b"outlineLvl" if state.in_paragraph_props => {
                p.outline_level = attr_value(e, b"val")?.and_then(|v| v.trim().parse().ok());
            }
            b"b" if state.in_run_props => {
                p.run_bold = attr_value(e, b"val")?
                    .map_or(true, |v| !matches!(v.as_str(), "0" | "false" | "off"));
            }
            // Tab stops inside <w:pPr><w:tabs> share the element name.
            b"tab" if !state.in_paragraph_props => p.text.push('\t'),
            b"br" | b"cr" if !state.in_paragraph_props => p.text.push('\n'),
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, text: &str) {
        if !self.state.in_text {
            return;
        }
        if let Some(p) = self.state.paragraphs.last_mut() {
            p.text.push_str(text);
            if !text.trim().is_empty() {
                p.has_text = true;
                if !p.run_bold {
                    p.all_bold = false;
                }
            }
        }
    }

    fn on_end(&mut self, local_name: &[u8]) -> Option<Block> {
        let state = &mut self.state;
        match local_name {
            b"t" => state.in_text = false,
            b"pPr" => state.in_paragraph_props = false,
            b"rPr" => state.in_run_props = false,
            b"p" => {
                let paragraph = state.paragraphs.pop()?;
                let text = normalize_text(&paragraph.text);
                // Text-box paragraphs become blocks of their own ahead of the
                // host paragraph, except inside tables where they join the cell.
                if state.table_depth > 0 {
                    if let Some(cell) = state.cell.as_mut() {
                        if !text.is_empty() {
                            if !cell.is_empty() {
                                cell.push(' ');
                            }
                            cell.push_str(&text);
                        }
                    }
                    return None;
                }
                if text.is_empty() {
                    return None;
                }
                let level = self.heading_level(&paragraph, &text);
                return Some(self.emit(|order| match level {
                    Some(level) => Block::heading(text, level, order),
                    None => Block::body(text, order),
                }));
            }
            b"tc" if state.table_depth == 1 => {
                if let (Some(cell), Some(row)) = (state.cell.take(), state.row.as_mut()) {
                    row.push(cell);
                }
            }
            b"tr" if state.table_depth == 1 => {
                let row = state.row.take()?;
                if !self.options.include_tables {
                    return None;
                }
                let text = row
                    .into_iter()
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join(&self.options.cell_separator);
                if !text.is_empty() {
                    return Some(self.emit(|order| Block::table_row(text, order)));
                }
            }
            b"tbl" => state.table_depth = state.table_depth.saturating_sub(1),
            _ => {}
        }
        None
    }

    fn heading_level(&self, paragraph: &ParagraphState, text: &str) -> Option<u8> {
        if let Some(level) = paragraph.outline_level {
            // Direct outline level overrides the style; 9 is body text.
            return (level < 9).then(|| level + 1);
        }
        if let Some(level) = paragraph
            .style_id
            .as_deref()
            .and_then(|id| self.styles.heading_level(id))
        {
            return Some(level);
        }
        let is_bold_heading = self.options.bold_headings
            && paragraph.has_text
            && paragraph.all_bold
            && text.split_whitespace().count() <= self.options.max_bold_heading_words
            && !text.ends_with(['.', '!', '?', ',', ';']);
        is_bold_heading.then_some(BOLD_HEADING_LEVEL)
    }

    fn emit(&mut self, build: impl FnOnce(usize) -> Block) -> Block {
        let block = build(self.next_order);
        self.next_order += 1;
        block
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// NFC-normalize, collapse whitespace runs to single spaces, trim.
pub(crate) fn normalize_text(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleHint;

    fn blocks_from(document_xml: &str, options: ReadOptions) -> Vec<Block> {
        let reader = DocxReader {
            document_xml: document_xml.to_string(),
            styles: StyleMap::new(),
            metadata: Metadata::default(),
            format: DocxFormat {
                kind: crate::detect::DocxKind::Document,
            },
            options,
        };
        reader.blocks().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Kitchen</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Install new </w:t></w:r><w:r><w:t>cabinets &amp; sink.</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>   </w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::heading("Kitchen", 1, 0));
        assert_eq!(blocks[1], Block::body("Install new cabinets & sink.", 1));
    }

    #[test]
    fn test_outline_level_heading() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:p><w:pPr><w:outlineLvl w:val="1"/></w:pPr><w:r><w:t>Bathroom</w:t></w:r></w:p>
<w:p><w:pPr><w:pStyle w:val="Heading2"/><w:outlineLvl w:val="9"/></w:pPr><w:r><w:t>Body</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(blocks[0].heading_level, Some(2));
        assert_eq!(blocks[1].style_hint, StyleHint::Body);
    }

    #[test]
    fn test_out_of_range_outline_level_is_body() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:p><w:pPr><w:outlineLvl w:val="255"/></w:pPr><w:r><w:t>Kitchen</w:t></w:r></w:p>
<w:p><w:pPr><w:outlineLvl w:val="8"/></w:pPr><w:r><w:t>Deep</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(blocks[0], Block::body("Kitchen", 0));
        assert_eq!(blocks[1].heading_level, Some(9));
    }

    #[test]
    fn test_text_box_keeps_host_paragraph() {
        let xml = r#"<w:document xmlns:w="w" xmlns:mc="mc" xmlns:wps="wps" xmlns:v="v"><w:body>
<w:p><w:r><w:t xml:space="preserve">Install new cabinets for $5000. </w:t></w:r><w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wps:txbx><w:txbxContent><w:p><w:r><w:t>Label</w:t></w:r></w:p></w:txbxContent></wps:txbx></w:drawing></mc:Choice><mc:Fallback><w:pict><v:textbox><w:txbxContent><w:p><w:r><w:t>Label</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict></mc:Fallback></mc:AlternateContent></w:r><w:r><w:t>Replace the sink for $800.</w:t></w:r></w:p>
<w:p><w:r><w:pict><v:textbox><w:txbxContent><w:p><w:r><w:t>Note</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict></w:r><w:r><w:t>After.</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(
            blocks,
            vec![
                Block::body("Label", 0),
                Block::body("Install new cabinets for $5000. Replace the sink for $800.", 1),
                Block::body("Note", 2),
                Block::body("After.", 3),
            ]
        );
    }

    #[test]
    fn test_tabs_breaks_and_tab_stops() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(blocks[0].text, "A B C");
    }

    #[test]
    fn test_deleted_text_and_field_codes_ignored() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:p><w:del><w:r><w:delText>Old text.</w:delText></w:r></w:del><w:r><w:instrText>PAGE</w:instrText></w:r><w:r><w:t>Kept.</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(blocks[0].text, "Kept.");
    }

    #[test]
    fn test_table_rows() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:tbl>
<w:tr><w:tc><w:p><w:r><w:t>Replace vanity</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>$1,200</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>
<w:tr><w:tc><w:p><w:r><w:t>Outer</w:t></w:r></w:p>
  <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:tc></w:tr>
</w:tbl>
<w:p><w:r><w:t>After.</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], Block::table_row("Replace vanity; $1,200", 0));
        assert_eq!(blocks[1].text, "Outer inner");
        assert_eq!(blocks[2], Block::body("After.", 2));

        let blocks = blocks_from(xml, ReadOptions::new().without_tables());
        assert_eq!(blocks, vec![Block::body("After.", 0)]);
    }

    #[test]
    fn test_bold_headings() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Electrical Work</w:t></w:r></w:p>
<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r><w:r><w:t> and plain</w:t></w:r></w:p>
<w:p><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>Not bold</w:t></w:r></w:p>
</w:body></w:document>"#;
        let blocks = blocks_from(xml, ReadOptions::default());
        assert!(blocks.iter().all(|b| !b.is_heading()));

        let blocks = blocks_from(xml, ReadOptions::new().with_bold_headings(true));
        assert!(blocks[0].is_heading());
        assert!(!blocks[1].is_heading());
        assert!(!blocks[2].is_heading());
    }

    #[test]
    fn test_blocks_restart() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>One.</w:t></w:r></w:p></w:body></w:document>"#;
        let reader = DocxReader {
            document_xml: xml.to_string(),
            styles: StyleMap::new(),
            metadata: Metadata::default(),
            format: DocxFormat {
                kind: crate::detect::DocxKind::Document,
            },
            options: ReadOptions::default(),
        };
        let first: Vec<_> = reader.blocks().collect::<Result<_>>().unwrap();
        let second: Vec<_> = reader.blocks().collect::<Result<_>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_xml_yields_error_once() {
        let reader = DocxReader {
            document_xml: "<w:document><w:body><w:p></w:body>".to_string(),
            styles: StyleMap::new(),
            metadata: Metadata::default(),
            format: DocxFormat {
                kind: crate::detect::DocxKind::Document,
            },
            options: ReadOptions::default(),
        };
        let items: Vec<_> = reader.blocks().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(crate::Error::InvalidDocument(_))));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \t b\u{00A0}c \n"), "a b c");
        assert_eq!(normalize_text("cafe\u{0301}"), "caf\u{00E9}");
    }
}
