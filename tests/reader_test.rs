//! Reading blocks and metadata from packaged documents.

mod common;

use std::fs::File;

use common::{sample_scope, DocxBuilder};
use scopesheet::segment::Segmenter;
use scopesheet::{
    detect_format_from_path, is_docx, Block, DocxKind, DocxReader, ReadOptions, Result,
    StyleHint,
};

fn blocks(reader: &DocxReader) -> Vec<Block> {
    reader.blocks().collect::<Result<Vec<_>>>().unwrap()
}

#[test]
fn test_blocks_in_document_order() {
    let reader = DocxReader::from_bytes(&sample_scope().build()).unwrap();
    let blocks = blocks(&reader);

    let summary: Vec<(StyleHint, &str)> = blocks
        .iter()
        .map(|b| (b.style_hint, b.text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (StyleHint::Heading, "Kitchen"),
            (
                StyleHint::Body,
                "Install new cabinets for $5,000. Paint the ceiling white."
            ),
            (StyleHint::Heading, "Bathroom"),
            (StyleHint::Body, "Replace the vanity, budget $2,500."),
        ]
    );
    let orders: Vec<usize> = blocks.iter().map(|b| b.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    assert_eq!(blocks[0].heading_level, Some(1));
}

#[test]
fn test_styles_and_metadata_loaded() {
    let reader = DocxReader::from_bytes(&sample_scope().build()).unwrap();

    assert_eq!(reader.format().kind, DocxKind::Document);
    assert_eq!(reader.styles().heading_level("Heading2"), Some(2));
    assert_eq!(reader.styles().heading_level("Normal"), None);

    let metadata = reader.metadata();
    assert_eq!(metadata.title.as_deref(), Some("Smith Residence"));
    assert_eq!(metadata.format, "Word document");
}

#[test]
fn test_open_and_from_reader_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scope.docx");
    std::fs::write(&path, sample_scope().build()).unwrap();

    assert!(is_docx(&path));
    assert_eq!(detect_format_from_path(&path).unwrap().kind, DocxKind::Document);

    let opened = DocxReader::open(&path).unwrap();
    let streamed = DocxReader::from_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(blocks(&opened), blocks(&streamed));
}

#[test]
fn test_blocks_can_be_iterated_twice() {
    let reader = DocxReader::from_bytes(&sample_scope().build()).unwrap();
    assert_eq!(blocks(&reader), blocks(&reader));
}

#[test]
fn test_table_rows_and_options() {
    let docx = DocxBuilder::new()
        .table(&[&["Demo wall", "", "$800"], &["", ""]])
        .build();

    let reader = DocxReader::from_bytes(&docx).unwrap();
    let rows = blocks(&reader);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].style_hint, StyleHint::TableCell);
    assert_eq!(rows[0].text, "Demo wall; $800");

    let reader =
        DocxReader::from_bytes_with_options(&docx, ReadOptions::new().without_tables()).unwrap();
    assert!(blocks(&reader).is_empty());
}

#[test]
fn test_segmenting_read_blocks() {
    let reader = DocxReader::from_bytes(&sample_scope().build()).unwrap();
    let blocks = blocks(&reader);
    let segmenter = Segmenter::default();

    let sentences: Vec<&str> = segmenter.segment(&blocks[1]).map(|s| s.text).collect();
    assert_eq!(
        sentences,
        vec!["Install new cabinets for $5,000.", "Paint the ceiling white."]
    );

    let anchors: Vec<bool> = segmenter.segment(&blocks[0]).map(|s| s.is_anchor).collect();
    assert_eq!(anchors, vec![true]);
}
