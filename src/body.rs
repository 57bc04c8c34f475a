//! The body conversion seam.
//!
//! The pipeline treats body conversion as a pluggable collaborator: it
//! hands over the package and takes back HTML plus warnings, without
//! caring how the HTML was produced. `BuiltinBodyConverter` is the
//! default implementation, built on the crate's own parser and renderer.

use log::debug;

use crate::docx::BodyParser;
use crate::error::{Error, Result};
use crate::package::DocxPackage;
use crate::render::{to_html, EmbeddedImage, HtmlOptions, ImageMap};

/// The output of body conversion: an HTML fragment with no color
/// annotations, plus any non-fatal conversion warnings.
#[derive(Debug, Clone, Default)]
pub struct BodyHtml {
    pub html: String,
    pub warnings: Vec<String>,
}

/// Converts a document package to plain HTML.
///
/// Implementations must tolerate any package a caller hands them; a
/// returned error fails the whole conversion.
pub trait BodyConverter {
    fn convert(&self, package: &DocxPackage) -> Result<BodyHtml>;
}

/// The built-in converter: parses the body XML into the document model
/// and renders it with the default style mapping and embedded images.
#[derive(Default)]
pub struct BuiltinBodyConverter {
    options: HtmlOptions,
}

impl BuiltinBodyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: HtmlOptions) -> Self {
        Self { options }
    }
}

impl BodyConverter for BuiltinBodyConverter {
    fn convert(&self, package: &DocxPackage) -> Result<BodyHtml> {
        let xml = package.document_xml()?;
        let parser = BodyParser::new(package);
        let body = parser
            .parse_body(&xml)
            .map_err(|e| Error::BodyConversion(e.to_string()))?;
        let images = load_images(package);
        let rendered = to_html(&body, &images, &self.options);
        Ok(BodyHtml {
            html: rendered.html,
            warnings: rendered.warnings,
        })
    }
}

/// Read every image part referenced from the document relationships.
/// Unreadable parts are skipped; the renderer reports them as warnings
/// when a paragraph actually references them.
fn load_images(package: &DocxPackage) -> ImageMap {
    let mut images = ImageMap::new();
    for rel in package.document_relationships().iter() {
        if rel.external || !rel.rel_type.ends_with("/image") {
            continue;
        }
        let path = DocxPackage::resolve_target(&rel.target);
        match package.read_binary(&path) {
            Ok(data) => {
                images.insert(
                    rel.id.clone(),
                    EmbeddedImage {
                        content_type: content_type_for(&path).to_string(),
                        data,
                    },
                );
            }
            Err(e) => debug!("image part {} unreadable: {}", path, e),
        }
    }
    images
}

fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn package_with(parts: &[(&str, &[u8])]) -> DocxPackage {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        let cursor = zip.finish().unwrap();
        DocxPackage::from_bytes(cursor.into_inner()).unwrap()
    }

    const DOC_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_builtin_converter_produces_html() {
        let package = package_with(&[("word/document.xml", DOC_XML.as_bytes())]);
        let result = BuiltinBodyConverter::new().convert(&package).unwrap();
        assert_eq!(result.html, "<p>Hello</p>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_document_part_fails() {
        let package = package_with(&[("word/other.xml", b"<x/>")]);
        let err = BuiltinBodyConverter::new().convert(&package).unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(content_type_for("media/image1.png"), "image/png");
        assert_eq!(content_type_for("media/photo.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("media/blob"), "application/octet-stream");
    }
}
