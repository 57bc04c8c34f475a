//! DOCX style table parsing.
//!
//! Only the style ID to style name mapping is needed here: the HTML
//! renderer maps paragraphs to block tags by style name.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// A parsed style definition.
#[derive(Debug, Clone, Default)]
pub struct Style {
    /// Style ID (e.g., "Heading1")
    pub id: String,
    /// Style name (e.g., "Heading 1")
    pub name: String,
}

/// Collection of styles from word/styles.xml.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    styles: HashMap<String, Style>,
}

impl StyleMap {
    /// Parse styles from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut map = StyleMap::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current_style: Option<Style> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => {
                    if e.name().as_ref() == b"w:style" {
                        let mut style = Style::default();
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"w:styleId" {
                                style.id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                        current_style = Some(style);
                    }
                }
                Ok(quick_xml::events::Event::Empty(e)) => {
                    if e.name().as_ref() == b"w:name" {
                        if let Some(ref mut style) = current_style {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"w:val" {
                                    style.name =
                                        String::from_utf8_lossy(&attr.value).to_string();
                                }
                            }
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(e)) => {
                    if e.name().as_ref() == b"w:style" {
                        if let Some(style) = current_style.take() {
                            if !style.id.is_empty() {
                                map.styles.insert(style.id.clone(), style);
                            }
                        }
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Get a style name by ID.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.styles.get(id).map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
