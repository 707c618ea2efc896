//! Spreadsheet (`.xlsx`) rendering of an extraction result.
//!
//! The workbook is written by hand as SpreadsheetML parts inside a ZIP
//! container. Part order, ZIP timestamps and string storage (inline strings)
//! are fixed, so identical results always produce identical bytes.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{Amount, ExtractionResult, TaskRecord};

use super::options::{WorkbookOptions, COLUMN_COUNT};

/// Maximum rows in a worksheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Maximum characters in a cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Header row labels.
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Category",
    "Task Description",
    "Budget",
    "Proposed",
    "Comment",
    "Drawing Ref",
    "Lead",
];

/// Label of the trailing totals row.
pub const TOTAL_LABEL: &str = "TOTAL";

const COLUMNS: [char; COLUMN_COUNT] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

// Cell style indexes into cellXfs.
const STYLE_BOLD: u8 = 1;
const STYLE_MONEY: u8 = 2;
const STYLE_BOLD_MONEY: u8 = 3;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES_XML: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const STYLES_XML: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font><font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/><xf numFmtId="4" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="4" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" applyNumberFormat="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const APP_XML: &str = r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>scopesheet</Application></Properties>"#;

/// Convert an extraction result to workbook bytes.
pub fn to_xlsx(result: &ExtractionResult, options: &WorkbookOptions) -> Result<Vec<u8>> {
    WorkbookBuilder::new(options.clone()).build(result)
}

/// One cell value.
#[derive(Debug, Clone, Copy)]
enum Cell<'a> {
    Text(&'a str),
    Money(Amount),
}

/// Row of cells in column order, with the style applied to every cell.
struct Row<'a> {
    cells: [Option<Cell<'a>>; COLUMN_COUNT],
    bold: bool,
}

impl<'a> Row<'a> {
    fn header() -> Self {
        Self {
            cells: HEADERS.map(|h| Some(Cell::Text(h))),
            bold: true,
        }
    }

    fn record(record: &'a TaskRecord) -> Self {
        Self {
            cells: [
                Some(Cell::Text(&record.category)),
                Some(Cell::Text(&record.description)),
                Some(Cell::Money(record.budget)),
                Some(Cell::Text(&record.proposed)),
                Some(Cell::Text(&record.comment)),
                Some(Cell::Text(&record.drawing_ref)),
                Some(Cell::Text(&record.lead)),
            ],
            bold: false,
        }
    }

    fn total(label: &'a str, amount: Amount) -> Self {
        let mut cells = [None; COLUMN_COUNT];
        cells[0] = Some(Cell::Text(label));
        cells[2] = Some(Cell::Money(amount));
        Self { cells, bold: true }
    }
}

/// Workbook renderer.
#[derive(Debug, Clone)]
pub struct WorkbookBuilder {
    options: WorkbookOptions,
    max_rows: usize,
}

impl Default for WorkbookBuilder {
    fn default() -> Self {
        Self::new(WorkbookOptions::default())
    }
}

impl WorkbookBuilder {
    /// Create a new workbook builder.
    pub fn new(options: WorkbookOptions) -> Self {
        Self {
            options,
            max_rows: MAX_ROWS,
        }
    }

    /// Lower the row limit below the worksheet maximum.
    #[cfg(test)]
    pub(crate) fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.min(MAX_ROWS);
        self
    }

    /// Render the result into `.xlsx` bytes.
    pub fn build(&self, result: &ExtractionResult) -> Result<Vec<u8>> {
        validate_sheet_name(&self.options.sheet_name)?;

        let subtotal_labels: Vec<String> = if self.options.subtotal_rows {
            result
                .groups
                .iter()
                .map(|g| format!("{} Subtotal", g.category))
                .collect()
        } else {
            Vec::new()
        };

        let mut rows = vec![Row::header()];
        for (idx, group) in result.groups.iter().enumerate() {
            rows.extend(group.records.iter().map(Row::record));
            if let Some(label) = subtotal_labels.get(idx) {
                rows.push(Row::total(label, group.subtotal));
            }
        }
        rows.push(Row::total(TOTAL_LABEL, result.grand_total));

        if rows.len() > self.max_rows {
            return Err(Error::Serialization(format!(
                "{} rows exceed the worksheet limit of {}",
                rows.len(),
                self.max_rows
            )));
        }

        let sheet = self.sheet_xml(&rows)?;
        let title = self
            .options
            .title
            .as_deref()
            .or(result.metadata.title.as_deref());

        let parts: [(&str, String); 8] = [
            ("[Content_Types].xml", with_decl(CONTENT_TYPES_XML)),
            ("_rels/.rels", root_rels_xml()),
            ("docProps/core.xml", core_xml(title)),
            ("docProps/app.xml", with_decl(APP_XML)),
            ("xl/workbook.xml", self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
            ("xl/styles.xml", with_decl(STYLES_XML)),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let bytes = write_package(&parts)?;
        log::debug!(
            "WorkbookBuilder: {} rows, {} bytes",
            rows.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn workbook_xml(&self) -> String {
        format!(
            r#"{XML_DECL}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            escape(self.options.sheet_name.as_str())
        )
    }

    fn sheet_xml(&self, rows: &[Row<'_>]) -> Result<String> {
        let mut xml = String::with_capacity(rows.len() * 256);
        let _ = write!(
            xml,
            r#"{XML_DECL}<worksheet xmlns="{NS_MAIN}"><dimension ref="A1:G{}"/>"#,
            rows.len()
        );

        if self.options.freeze_header {
            xml.push_str(r#"<sheetViews><sheetView workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/></sheetView></sheetViews>"#);
        } else {
            xml.push_str(r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#);
        }
        xml.push_str(r#"<sheetFormatPr defaultRowHeight="15"/><cols>"#);
        for (idx, width) in self.options.column_widths.iter().enumerate() {
            let _ = write!(
                xml,
                r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
                n = idx + 1
            );
        }
        xml.push_str("</cols><sheetData>");

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;
            let _ = write!(xml, r#"<row r="{}">"#, row_number);
            for (col, cell) in row.cells.iter().enumerate() {
                let Some(cell) = cell else { continue };
                let reference = format!("{}{}", COLUMNS[col], row_number);
                write_cell(&mut xml, &reference, *cell, row.bold)?;
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        Ok(xml)
    }
}

fn write_cell(xml: &mut String, reference: &str, cell: Cell<'_>, bold: bool) -> Result<()> {
    match cell {
        Cell::Text(text) => {
            if text.is_empty() {
                return Ok(());
            }
            let chars = text.chars().count();
            if chars > MAX_CELL_CHARS {
                return Err(Error::Serialization(format!(
                    "cell {} has {} characters, more than the limit of {}",
                    reference, chars, MAX_CELL_CHARS
                )));
            }
            let style = if bold {
                format!(r#" s="{}""#, STYLE_BOLD)
            } else {
                String::new()
            };
            let space = if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
            {
                r#" xml:space="preserve""#
            } else {
                ""
            };
            let _ = write!(
                xml,
                r#"<c r="{reference}" t="inlineStr"{style}><is><t{space}>{}</t></is></c>"#,
                escape(xml_chars(text).as_str())
            );
        }
        Cell::Money(amount) => {
            let style = if bold { STYLE_BOLD_MONEY } else { STYLE_MONEY };
            let _ = write!(xml, r#"<c r="{reference}" s="{style}"><v>{amount}</v></c>"#);
        }
    }
    Ok(())
}

/// Drop characters that XML 1.0 cannot carry.
fn xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .filter(|&c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect()
}

fn validate_sheet_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length == 0 || length > 31 {
        return Err(Error::Serialization(format!(
            "sheet name must be 1 to 31 characters, got {}",
            length
        )));
    }
    if let Some(c) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
        return Err(Error::Serialization(format!(
            "sheet name contains invalid character '{}'",
            c
        )));
    }
    Ok(())
}

fn with_decl(body: &str) -> String {
    format!("{XML_DECL}{body}")
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="{NS_PKG_REL}/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{NS_REL}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn workbook_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{NS_REL}/styles" Target="styles.xml"/></Relationships>"#
    )
}

fn core_xml(title: Option<&str>) -> String {
    let title = title
        .map(|t| format!("<dc:title>{}</dc:title>", escape(xml_chars(t).as_str())))
        .unwrap_or_default();
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">{title}</cp:coreProperties>"#
    )
}

fn write_package(parts: &[(&str, String)]) -> Result<Vec<u8>> {
    let zip_error = |e: zip::result::ZipError| Error::Serialization(format!("ZIP error: {}", e));
    let io_error = |e: std::io::Error| Error::Serialization(format!("ZIP write error: {}", e));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(*name, options).map_err(zip_error)?;
        writer.write_all(content.as_bytes()).map_err(io_error)?;
    }
    Ok(writer.finish().map_err(zip_error)?.into_inner())
}
