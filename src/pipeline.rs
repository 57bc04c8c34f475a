//! Conversion pipeline orchestration.
//!
//! Three steps per call: recover color contexts from the raw document
//! XML, convert the body to plain HTML, then re-apply the recovered
//! colors onto that HTML by text matching. Each call is stateless and
//! independent; every intermediate structure is allocated fresh.

use std::path::Path;

use log::debug;

use crate::apply::apply_colors;
use crate::assemble::{assemble, ConversionResult, DebugInfo};
use crate::body::{BodyConverter, BuiltinBodyConverter};
use crate::error::Result;
use crate::extract::extract_color_contexts;
use crate::package::DocxPackage;

/// The conversion pipeline with a pluggable body converter.
pub struct Converter {
    body: Box<dyn BodyConverter>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// A converter using the built-in body conversion backend.
    pub fn new() -> Self {
        Self {
            body: Box::new(BuiltinBodyConverter::new()),
        }
    }

    /// A converter delegating body conversion to the given backend.
    pub fn with_body_converter(body: Box<dyn BodyConverter>) -> Self {
        Self { body }
    }

    /// Convert an in-memory document.
    ///
    /// Never returns an error: failures come back as a
    /// `ConversionResult` with `success` false and an error message.
    pub fn convert_bytes(&self, bytes: &[u8]) -> ConversionResult {
        let mut logs = vec![format!("Processing document ({} bytes)", bytes.len())];
        match self.run(bytes, &mut logs) {
            Ok(result) => result,
            Err(e) => {
                debug!("conversion failed: {e}");
                ConversionResult::failure(e.to_string(), logs)
            }
        }
    }

    /// Convert a document read from disk.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> ConversionResult {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => self.convert_bytes(&bytes),
            Err(e) => ConversionResult::failure(
                format!("Failed to read {}: {}", path.display(), e),
                Vec::new(),
            ),
        }
    }

    /// Download a document and convert it. A failed fetch or a
    /// non-success HTTP status fails the conversion; the pipeline is
    /// otherwise identical to `convert_bytes`.
    #[cfg(feature = "fetch")]
    pub fn convert_url(&self, url: &str) -> ConversionResult {
        match fetch(url) {
            Ok(bytes) => self.convert_bytes(&bytes),
            Err(e) => ConversionResult::failure(e.to_string(), Vec::new()),
        }
    }

    fn run(&self, bytes: &[u8], logs: &mut Vec<String>) -> Result<ConversionResult> {
        let package = DocxPackage::from_bytes(bytes.to_vec())?;

        // STEP 1 never fails on its own; only a missing document part
        // is fatal, and that would fail body conversion anyway.
        let xml = package.document_xml()?;
        let extraction = extract_color_contexts(&xml);
        logs.extend(extraction.logs.iter().cloned());

        logs.push("STEP 2: Converting DOCX to HTML".to_string());
        let body = self.body.convert(&package)?;
        logs.push(format!(
            "STEP 2 COMPLETE: Generated HTML with {} characters",
            body.html.len()
        ));
        if !body.warnings.is_empty() {
            logs.push("Conversion messages:".to_string());
            for warning in &body.warnings {
                logs.push(format!("- {warning}"));
            }
        }

        let applied = apply_colors(&body.html, &extraction.contexts)?;
        logs.extend(applied.logs.iter().cloned());

        Ok(ConversionResult {
            success: true,
            html: assemble(&applied.html),
            logs: std::mem::take(logs),
            error: None,
            debug_info: Some(DebugInfo {
                conversion_success: true,
                content_length: applied.html.len(),
                color_contexts: extraction.contexts.len(),
                match_summary: applied.summary,
            }),
        })
    }
}

#[cfg(feature = "fetch")]
fn fetch(url: &str) -> Result<Vec<u8>> {
    use crate::error::Error;

    let response = reqwest::blocking::get(url).map_err(|e| Error::Download(e.to_string()))?;
    if !response.status().is_success() {
        return Err(Error::Download(format!(
            "{} returned status {}",
            url,
            response.status()
        )));
    }
    let bytes = response.bytes().map_err(|e| Error::Download(e.to_string()))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_colored_run_end_to_end() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:rPr><w:color w:val="FF0000"/></w:rPr><w:t>Hello</w:t></w:r></w:p>"#,
        );
        let result = Converter::new().convert_bytes(&bytes);
        assert!(result.success);
        assert!(result.html.contains("color: #FF0000"));
        assert!(result.html.contains("data-text-color-applied=\"FF0000\""));
        assert!(result.html.contains("class=\"docx-content\""));
        let debug = result.debug_info.unwrap();
        assert_eq!(debug.color_contexts, 1);
        assert_eq!(debug.match_summary.success_count, 1);
    }

    #[test]
    fn test_invalid_bytes_fail_cleanly() {
        let result = Converter::new().convert_bytes(b"not a zip archive");
        assert!(!result.success);
        assert!(result.html.is_empty());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_missing_document_part_fails() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/other.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let result = Converter::new().convert_bytes(&bytes);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("word/document.xml"));
    }

    #[test]
    fn test_unmatched_contexts_do_not_fail() {
        // The shaded paragraph renders as a heading, so the
        // paragraph-shading context finds no <p> to match.
        let bytes = docx_with_body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:shd w:fill="FFFF00"/></w:pPr><w:r><w:t>Shaded heading</w:t></w:r></w:p>"#,
        );
        let result = Converter::new().convert_bytes(&bytes);
        assert!(result.success);
        assert!(result.html.contains("<h2"));
        let debug = result.debug_info.unwrap();
        assert_eq!(debug.match_summary.not_found_count, 1);
        assert_eq!(
            debug.match_summary.success_count + debug.match_summary.not_found_count,
            debug.color_contexts
        );
    }

    #[test]
    fn test_reruns_are_identical() {
        let bytes = docx_with_body(
            r#"<w:p><w:pPr><w:shd w:fill="DDEEFF"/></w:pPr><w:r><w:t>Shaded</w:t></w:r></w:p>"#,
        );
        let converter = Converter::new();
        let first = converter.convert_bytes(&bytes);
        let second = converter.convert_bytes(&bytes);
        assert_eq!(first.html, second.html);
        assert_eq!(first.logs, second.logs);
    }

    #[test]
    fn test_missing_file_fails() {
        let result = Converter::new().convert_file("/nonexistent/input.docx");
        assert!(!result.success);
        assert!(result.error.unwrap().contains("/nonexistent/input.docx"));
    }
}
