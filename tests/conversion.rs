//! End-to-end conversion tests over synthetic in-memory documents.

use std::io::{Cursor, Write};

use rehue::{BodyConverter, BodyHtml, ContextKind, Converter, DocxPackage};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn docx_with_body(body: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    docx_with_parts(&[("word/document.xml", xml.as_bytes())])
}

fn docx_with_parts(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn colored_run_is_recovered() {
    let bytes = docx_with_body(
        r#"<w:p><w:r><w:rPr><w:color w:val="FF0000"/></w:rPr><w:t>Hello</w:t></w:r></w:p>"#,
    );
    let result = rehue::convert_bytes(&bytes);

    assert!(result.success);
    assert!(result.html.contains("color: #FF0000"));
    assert!(result.html.contains("data-text-color-applied=\"FF0000\""));

    let debug = result.debug_info.unwrap();
    assert_eq!(debug.color_contexts, 1);
    assert_eq!(debug.match_summary.success_count, 1);
    assert!(result
        .logs
        .iter()
        .any(|l| l.contains("Found text with color #FF0000")));
}

#[test]
fn shaded_cell_is_recovered() {
    let bytes = docx_with_body(
        r#"<w:tbl><w:tr><w:tc><w:tcPr><w:shd w:fill="CCCCCC"/></w:tcPr><w:p><w:r><w:t>Total</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>42</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    );
    let result = rehue::convert_bytes(&bytes);

    assert!(result.success);
    assert!(result
        .html
        .contains("<td style=\"background-color: #CCCCCC\" data-bg-color-applied=\"CCCCCC\">"));
}

#[test]
fn auto_shading_produces_no_contexts() {
    let bytes = docx_with_body(
        r#"<w:p><w:pPr><w:shd w:fill="auto"/></w:pPr><w:r><w:t>Plain</w:t></w:r></w:p>"#,
    );
    let result = rehue::convert_bytes(&bytes);

    assert!(result.success);
    assert_eq!(result.debug_info.unwrap().color_contexts, 0);
    assert!(result.html.contains("Plain"));
}

#[test]
fn duplicate_anchors_color_distinct_runs() {
    let bytes = docx_with_body(
        r#"<w:p><w:r><w:rPr><w:color w:val="112233"/></w:rPr><w:t>Note</w:t></w:r><w:r><w:t> and another </w:t></w:r><w:r><w:rPr><w:color w:val="445566"/></w:rPr><w:t>Note</w:t></w:r></w:p>"#,
    );
    let result = rehue::convert_bytes(&bytes);

    assert!(result.success);
    assert!(result.html.contains("color: #112233"));
    assert!(result.html.contains("color: #445566"));
    let debug = result.debug_info.unwrap();
    assert_eq!(debug.color_contexts, 2);
    assert_eq!(debug.match_summary.success_count, 2);
}

#[test]
fn malformed_xml_does_not_panic_extraction() {
    let extraction = rehue::extract_color_contexts("<w:document><w:body><w:p><w:r><unclosed");
    assert!(extraction.contexts.is_empty());
    assert!(!extraction.logs.is_empty());
}

struct FixedHtml(&'static str);

impl BodyConverter for FixedHtml {
    fn convert(&self, _package: &DocxPackage) -> rehue::Result<BodyHtml> {
        Ok(BodyHtml {
            html: self.0.to_string(),
            warnings: Vec::new(),
        })
    }
}

#[test]
fn malformed_xml_still_succeeds_with_tolerant_body_converter() {
    // Truncated body: extraction returns nothing, but as long as the
    // body converter copes, the conversion succeeds.
    let bytes = docx_with_parts(&[(
        "word/document.xml",
        b"<w:document><w:body><w:p><w:r><unclosed" as &[u8],
    )]);
    let converter = Converter::with_body_converter(Box::new(FixedHtml("<p>recovered</p>")));
    let result = converter.convert_bytes(&bytes);

    assert!(result.success);
    assert!(result.html.contains("<p>recovered</p>"));
    assert_eq!(result.debug_info.unwrap().color_contexts, 0);
}

#[test]
fn sentinels_never_become_contexts() {
    let bytes = docx_with_body(
        r#"<w:p><w:r><w:rPr><w:color w:val="000000"/></w:rPr><w:t>Black</w:t></w:r></w:p><w:p><w:pPr><w:shd w:fill="auto"/></w:pPr><w:r><w:t>Auto</w:t></w:r></w:p><w:p><w:r><w:rPr><w:color w:val="00AA00"/></w:rPr><w:t>Green</w:t></w:r></w:p>"#,
    );
    let package = DocxPackage::from_bytes(bytes).unwrap();
    let extraction = rehue::extract_color_contexts(&package.document_xml().unwrap());

    assert_eq!(extraction.contexts.len(), 1);
    for context in &extraction.contexts {
        assert_ne!(context.color_value, "000000");
        assert_ne!(context.color_value, "auto");
    }
}

#[test]
fn reruns_yield_identical_output() {
    let bytes = docx_with_body(
        r#"<w:tbl><w:tr><w:trPr><w:shd w:fill="DDEEFF"/></w:trPr><w:tc><w:p><w:r><w:t>Quarterly revenue</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    );
    let first = rehue::convert_bytes(&bytes);
    let second = rehue::convert_bytes(&bytes);

    assert!(first.success);
    assert_eq!(first.html, second.html);
    assert_eq!(first.logs, second.logs);
}

#[test]
fn no_element_double_colored() {
    // A shaded cell whose anchor also appears in a shaded paragraph:
    // each context must land on a different element.
    let bytes = docx_with_body(
        r#"<w:p><w:pPr><w:shd w:fill="FFEE00"/></w:pPr><w:r><w:t>Summary</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:tcPr><w:shd w:fill="00EEFF"/></w:tcPr><w:p><w:r><w:t>Summary</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    );
    let result = rehue::convert_bytes(&bytes);

    assert!(result.success);
    assert!(result.html.contains("background-color: #FFEE00"));
    assert!(result.html.contains("background-color: #00EEFF"));
}

#[test]
fn unmatched_contexts_keep_success_true() {
    let bytes = docx_with_body(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:shd w:fill="FFFF00"/></w:pPr><w:r><w:t>Shaded heading</w:t></w:r></w:p>"#,
    );
    let result = rehue::convert_bytes(&bytes);

    assert!(result.success);
    let debug = result.debug_info.unwrap();
    assert_eq!(debug.match_summary.not_found_count, 1);
    assert_eq!(
        debug.match_summary.success_count + debug.match_summary.not_found_count,
        debug.color_contexts
    );
    assert!(result.logs.iter().any(|l| l.contains("❌ Not Found")));
}

#[test]
fn row_without_text_gets_synthetic_anchor() {
    let bytes = docx_with_body(
        r#"<w:tbl><w:tr><w:trPr><w:shd w:fill="ABCDEF"/></w:trPr><w:tc><w:p/></w:tc></w:tr></w:tbl>"#,
    );
    let package = DocxPackage::from_bytes(bytes).unwrap();
    let extraction = rehue::extract_color_contexts(&package.document_xml().unwrap());

    let rows: Vec<_> = extraction
        .contexts
        .iter()
        .filter(|c| c.kind == ContextKind::RowBackground)
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].anchor_text, "Row 1");
}

#[test]
fn convert_file_round_trip() {
    let bytes = docx_with_body(
        r#"<w:p><w:r><w:rPr><w:color w:val="FF0000"/></w:rPr><w:t>Hello</w:t></w:r></w:p>"#,
    );
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.docx");
    std::fs::write(&path, &bytes).unwrap();

    let from_file = rehue::convert_file(&path);
    let from_bytes = rehue::convert_bytes(&bytes);

    assert!(from_file.success);
    assert_eq!(from_file.html, from_bytes.html);
}

#[test]
fn result_json_shape() {
    let bytes = docx_with_body(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#);
    let result = rehue::convert_bytes(&bytes);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], true);
    assert!(json["debugInfo"]["matchSummary"]["successCount"].is_number());
    assert!(json.get("error").is_none());
}
