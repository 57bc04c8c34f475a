//! DOCX package access over a ZIP archive.
//!
//! A DOCX file is a zip archive of XML parts. The converter only needs a
//! handful of them: the main body at `word/document.xml`, the style table,
//! the document relationships, and any referenced image parts.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Archive path of the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// A relationship entry from a .rels part, used to resolve image references.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId4")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the owning part
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// Relationships keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Iterate over all relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.by_id.values()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }
}

/// Read-only view of a DOCX package.
pub struct DocxPackage {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl DocxPackage {
    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Open a package from an in-memory byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Open a package from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read the main document XML, the only mandatory part.
    pub fn document_xml(&self) -> Result<String> {
        self.read_xml(DOCUMENT_PART)
    }

    /// Read an XML part as a string, handling UTF-8 and UTF-16 encodings.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary part (images and the like).
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingPart(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check whether a part exists in the package.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// List all part names.
    pub fn list_parts(&self) -> Vec<String> {
        self.archive.borrow().file_names().map(String::from).collect()
    }

    /// Parse the relationships of the main document part.
    ///
    /// A missing or empty .rels part is not an error; image lookups just
    /// come up empty.
    pub fn document_relationships(&self) -> Relationships {
        self.parse_relationships("word/_rels/document.xml.rels")
    }

    fn parse_relationships(&self, rels_path: &str) -> Relationships {
        let content = match self.read_xml(rels_path) {
            Ok(c) => c,
            Err(_) => return Relationships::default(),
        };
        if content.trim().is_empty() {
            return Relationships::default();
        }

        let mut rels = Relationships::default();
        let mut reader = quick_xml::Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"TargetMode" => {
                                external = attr.value.eq_ignore_ascii_case(b"external");
                            }
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        rels
    }

    /// Resolve a relationship target relative to the main document part.
    pub fn resolve_target(target: &str) -> String {
        if let Some(stripped) = target.strip_prefix('/') {
            return stripped.to_string();
        }

        let mut result = std::path::PathBuf::from("word");
        for component in Path::new(target).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }
        result.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("parts", &self.list_parts().len())
            .finish()
    }
}

/// Decode XML bytes, handling UTF-8 and UTF-16 LE/BE with or without BOM.
///
/// OOXML parts are typically UTF-8, but documents produced by older tools
/// occasionally ship UTF-16 parts.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 3 && bytes[..3] == [0xEF, 0xBB, 0xBF] {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::XmlParse(e.to_string()));
    }

    if bytes.len() >= 2 && bytes[..2] == [0xFF, 0xFE] {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_encoding_declaration(&content));
    }

    if bytes.len() >= 2 && bytes[..2] == [0xFE, 0xFF] {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // BOM-less UTF-16 shows up as null bytes interleaved with ASCII
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len)
        .step_by(2)
        .map(|i| from_bytes([bytes[i], bytes[i + 1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::XmlParse(e.to_string()))
}

/// Rewrite `encoding="UTF-16"` in the XML declaration after transcoding.
///
/// Once the part has been decoded into a Rust string, a stale UTF-16
/// declaration would make quick-xml reinterpret the text incorrectly.
fn fix_encoding_declaration(content: &str) -> String {
    if let Some(end) = content.find("?>") {
        if content.starts_with("<?xml") {
            let decl = &content[..end + 2];
            let rest = &content[end + 2..];
            let fixed = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");
            return format!("{}{}", fixed, rest);
        }
    }
    content.to_string()
}
