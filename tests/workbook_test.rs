//! Workbook and JSON output of real documents.

mod common;

use std::io::{Cursor, Read};

use common::{sample_scope, DocxBuilder};
use scopesheet::render::{to_json, to_xlsx, HEADERS, TOTAL_LABEL};
use scopesheet::{
    extract_bytes, Error, ExtractionResult, JsonFormat, Pipeline, PipelineOptions, Scopesheet,
    WorkbookOptions,
};

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn test_workbook_layout() {
    let output = Scopesheet::new()
        .process_bytes(&sample_scope().build(), Some("smith.docx"))
        .unwrap();
    let sheet = read_part(&output.bytes, "xl/worksheets/sheet1.xml");

    for header in HEADERS {
        assert!(sheet.contains(&format!("<t>{}</t>", header)), "missing {}", header);
    }
    // header, three tasks, total
    assert!(sheet.contains(r#"<dimension ref="A1:G5"/>"#));
    assert!(sheet.contains(r#"<c r="A2" t="inlineStr"><is><t>Kitchen</t></is></c>"#));
    assert!(sheet.contains(r#"<c r="C2" s="2"><v>5000.00</v></c>"#));
    assert!(sheet.contains(r#"<c r="A4" t="inlineStr"><is><t>Bathroom</t></is></c>"#));
    assert!(sheet.contains(&format!(
        r#"<c r="A5" t="inlineStr" s="1"><is><t>{}</t></is></c>"#,
        TOTAL_LABEL
    )));
    assert!(sheet.contains(r#"<c r="C5" s="3"><v>7500.00</v></c>"#));

    let core = read_part(&output.bytes, "docProps/core.xml");
    assert!(core.contains("<dc:title>Smith Residence</dc:title>"));
}

#[test]
fn test_workbook_with_subtotals() {
    let output = Scopesheet::new()
        .with_subtotal_rows()
        .with_sheet_name("Bid")
        .process_bytes(&sample_scope().build(), None)
        .unwrap();
    assert_eq!(output.file_name, "scope_of_work.xlsx");

    let sheet = read_part(&output.bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<t>Kitchen Subtotal</t>"));
    assert!(sheet.contains("<t>Bathroom Subtotal</t>"));
    assert!(sheet.contains(r#"<dimension ref="A1:G7"/>"#));

    let workbook = read_part(&output.bytes, "xl/workbook.xml");
    assert!(workbook.contains(r#"<sheet name="Bid""#));
}

#[test]
fn test_special_characters_escaped() {
    let docx = DocxBuilder::new()
        .heading(1, "Kitchen & Pantry")
        .paragraph("Install 36\" <shaker> cabinets for $900.")
        .build();
    let output = Scopesheet::new().process_bytes(&docx, None).unwrap();
    let sheet = read_part(&output.bytes, "xl/worksheets/sheet1.xml");

    assert!(sheet.contains("<t>Kitchen &amp; Pantry</t>"));
    assert!(sheet.contains("36&quot; &lt;shaker&gt; cabinets"));
}

#[test]
fn test_invalid_sheet_name_is_serialization_error() {
    let options = PipelineOptions::new()
        .with_workbook_options(WorkbookOptions::new().with_sheet_name("Scope/Work"));
    let err = Pipeline::new(options)
        .unwrap()
        .process(&sample_scope().build(), None)
        .unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_render_matches_pipeline_output() {
    let docx = sample_scope().build();
    let result = extract_bytes(&docx).unwrap();
    let direct = to_xlsx(&result, &WorkbookOptions::default()).unwrap();
    let processed = Scopesheet::new().process_bytes(&docx, None).unwrap();
    assert_eq!(direct, processed.bytes);
}

#[test]
fn test_json_shape_round_trip() {
    let result = extract_bytes(&sample_scope().build()).unwrap();
    let json = to_json(&result, JsonFormat::Compact).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["grand_total"], serde_json::json!(7500.0));
    assert_eq!(value["groups"][0]["category"], "Kitchen");
    assert_eq!(value["groups"][1]["records"][0]["proposed"], "Replace vanity");

    let back: ExtractionResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.groups, result.groups);
    assert_eq!(back.grand_total, result.grand_total);
    assert_eq!(back.metadata, result.metadata);
}
