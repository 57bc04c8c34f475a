//! Event-driven parser for the main document body.

use crate::error::{Error, Result};
use crate::model::{
    Block, Cell, DocumentBody, InlineImage, Paragraph, Row, Table, TextRun, TextStyle,
};
use crate::package::{DocxPackage, Relationships};

use super::styles::StyleMap;

/// Parser for the document body XML.
///
/// Styles and relationships are loaded up front (both best-effort: a
/// document without them still parses), then the body is scanned in one
/// streaming pass. Top-level paragraphs and tables are recaptured as XML
/// fragments and parsed individually, which keeps the state machines per
/// element small.
pub struct BodyParser {
    styles: StyleMap,
    relationships: Relationships,
}

impl BodyParser {
    /// Prepare a parser for the given package.
    pub fn new(package: &DocxPackage) -> Self {
        let styles = package
            .read_xml("word/styles.xml")
            .ok()
            .and_then(|xml| StyleMap::parse(&xml).ok())
            .unwrap_or_default();
        let relationships = package.document_relationships();
        Self {
            styles,
            relationships,
        }
    }

    /// Parse the body of `word/document.xml` into a document model.
    pub fn parse_body(&self, xml: &str) -> Result<DocumentBody> {
        let mut body = DocumentBody::new();

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_body = false;
        let mut fragment = String::new();
        let mut in_paragraph = false;
        let mut table_depth: u32 = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"w:body" => in_body = true,
                        b"w:p" if in_body && table_depth == 0 && !in_paragraph => {
                            in_paragraph = true;
                            fragment.clear();
                            push_start_tag(&mut fragment, e);
                        }
                        b"w:tbl" if in_body && !in_paragraph => {
                            if table_depth == 0 {
                                fragment.clear();
                            }
                            table_depth += 1;
                            push_start_tag(&mut fragment, e);
                        }
                        _ => {
                            if in_paragraph || table_depth > 0 {
                                push_start_tag(&mut fragment, e);
                            }
                        }
                    }
                }
                Ok(quick_xml::events::Event::Empty(ref e)) => {
                    if in_paragraph || table_depth > 0 {
                        push_empty_tag(&mut fragment, e);
                    }
                }
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_paragraph || table_depth > 0 {
                        let text = e.unescape().unwrap_or_default();
                        fragment.push_str(&escape_xml(&text));
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"w:body" => in_body = false,
                        b"w:p" if in_paragraph && table_depth == 0 => {
                            fragment.push_str("</w:p>");
                            in_paragraph = false;
                            if let Ok(para) = self.parse_paragraph(&fragment) {
                                if !para.is_empty() || para.style_id.is_some() {
                                    body.add_block(Block::Paragraph(para));
                                }
                            }
                        }
                        b"w:tbl" if table_depth > 0 => {
                            fragment.push_str("</w:tbl>");
                            table_depth -= 1;
                            if table_depth == 0 {
                                if let Ok(table) = self.parse_table(&fragment) {
                                    body.add_block(Block::Table(table));
                                }
                            }
                        }
                        _ => {
                            if in_paragraph || table_depth > 0 {
                                fragment.push_str("</");
                                fragment.push_str(&String::from_utf8_lossy(name.as_ref()));
                                fragment.push('>');
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

        Ok(body)
    }

    /// Parse a single recaptured paragraph fragment.
    fn parse_paragraph(&self, xml: &str) -> Result<Paragraph> {
        let mut para = Paragraph::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        // Preserve whitespace from xml:space="preserve" runs
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_ppr = false;
        let mut in_rpr = false;
        let mut in_run = false;
        let mut in_text = false;
        let mut in_instr_text = false;
        let mut in_drawing = false;
        let mut current_style = TextStyle::default();
        let mut current_hyperlink: Option<String> = None;
        let mut current_image_alt: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"w:pPr" => in_ppr = true,
                    b"w:rPr" => in_rpr = true,
                    b"w:r" => {
                        in_run = true;
                        current_style = TextStyle::default();
                    }
                    b"w:t" => in_text = true,
                    b"w:instrText" => in_instr_text = true,
                    b"w:drawing" => {
                        in_drawing = true;
                        current_image_alt = None;
                    }
                    b"w:hyperlink" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r:id" {
                                let rel_id = String::from_utf8_lossy(&attr.value);
                                if let Some(rel) = self.relationships.get(&rel_id) {
                                    current_hyperlink = Some(rel.target.clone());
                                }
                            }
                        }
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"w:pStyle" if in_ppr => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"w:val" {
                                let style_id = String::from_utf8_lossy(&attr.value).to_string();
                                para.style_name =
                                    self.styles.name_of(&style_id).map(String::from);
                                para.style_id = Some(style_id);
                            }
                        }
                    }
                    b"w:b" if in_rpr => {
                        current_style.bold = bool_attr(e, b"w:val").unwrap_or(true);
                    }
                    b"w:i" if in_rpr => {
                        current_style.italic = bool_attr(e, b"w:val").unwrap_or(true);
                    }
                    b"w:u" if in_rpr => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"w:val" {
                                let val = String::from_utf8_lossy(&attr.value);
                                current_style.underline = val != "none";
                            }
                        }
                    }
                    b"w:strike" if in_rpr => {
                        current_style.strikethrough = bool_attr(e, b"w:val").unwrap_or(true);
                    }
                    b"wp:docPr" if in_drawing => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"descr" {
                                current_image_alt =
                                    Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    b"a:blip" if in_drawing => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r:embed" {
                                para.images.push(InlineImage {
                                    resource_id: String::from_utf8_lossy(&attr.value)
                                        .to_string(),
                                    alt_text: current_image_alt.clone(),
                                });
                            }
                        }
                    }
                    b"w:br" if in_run => {
                        if let Some(last_run) = para.runs.last_mut() {
                            last_run.line_break = true;
                        } else {
                            para.runs.push(TextRun {
                                line_break: true,
                                ..Default::default()
                            });
                        }
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    // w:instrText holds field codes, not document text
                    if in_run && in_text && !in_instr_text {
                        let text = e.unescape().unwrap_or_default().to_string();
                        if !text.is_empty() {
                            para.runs.push(TextRun {
                                text,
                                style: current_style.clone(),
                                hyperlink: current_hyperlink.clone(),
                                line_break: false,
                            });
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"w:pPr" => in_ppr = false,
                    b"w:rPr" => in_rpr = false,
                    b"w:r" => in_run = false,
                    b"w:t" => in_text = false,
                    b"w:instrText" => in_instr_text = false,
                    b"w:hyperlink" => current_hyperlink = None,
                    b"w:drawing" => in_drawing = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(para)
    }

    /// Parse a recaptured table fragment.
    ///
    /// Nested tables are not modeled; their text is folded into the
    /// containing cell so anchor matching still sees it.
    fn parse_table(&self, xml: &str) -> Result<Table> {
        let mut table = Table::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_cell = false;
        let mut in_run = false;
        let mut in_rpr = false;
        let mut in_text = false;
        let mut in_instr_text = false;
        let mut current_row: Option<Row> = None;
        let mut cell_paragraphs: Vec<Paragraph> = Vec::new();
        let mut current_paragraph: Option<Paragraph> = None;
        let mut current_style = TextStyle::default();
        let mut is_header_row = false;
        let mut col_span = 1u32;
        let mut nested_depth: u32 = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => {
                    let name = e.name();
                    if nested_depth > 0 {
                        match name.as_ref() {
                            b"w:tbl" => nested_depth += 1,
                            b"w:t" => in_text = true,
                            _ => {}
                        }
                        buf.clear();
                        continue;
                    }
                    match name.as_ref() {
                        b"w:tbl" if in_cell => nested_depth = 1,
                        b"w:tr" => {
                            current_row = Some(Row::default());
                            is_header_row = false;
                        }
                        b"w:tc" => {
                            in_cell = true;
                            cell_paragraphs.clear();
                            col_span = 1;
                        }
                        b"w:p" if in_cell => {
                            current_paragraph = Some(Paragraph::new());
                        }
                        b"w:r" => {
                            in_run = true;
                            current_style = TextStyle::default();
                        }
                        b"w:rPr" if in_run => in_rpr = true,
                        b"w:t" => in_text = true,
                        b"w:instrText" => in_instr_text = true,
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Empty(ref e)) => {
                    if nested_depth > 0 {
                        buf.clear();
                        continue;
                    }
                    match e.name().as_ref() {
                        b"w:tblHeader" => is_header_row = true,
                        b"w:gridSpan" if in_cell => {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"w:val" {
                                    let val = String::from_utf8_lossy(&attr.value);
                                    col_span = val.parse().unwrap_or(1);
                                }
                            }
                        }
                        b"w:b" if in_rpr => {
                            current_style.bold = bool_attr(e, b"w:val").unwrap_or(true);
                        }
                        b"w:i" if in_rpr => {
                            current_style.italic = bool_attr(e, b"w:val").unwrap_or(true);
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if !(in_run || nested_depth > 0) || !in_text || in_instr_text {
                        buf.clear();
                        continue;
                    }
                    let text = e.unescape().unwrap_or_default().to_string();
                    if text.is_empty() {
                        buf.clear();
                        continue;
                    }
                    if nested_depth > 0 {
                        // Fold nested table text into the outer cell
                        cell_paragraphs.push(Paragraph::with_text(text));
                    } else if let Some(ref mut para) = current_paragraph {
                        para.runs.push(TextRun {
                            text,
                            style: current_style.clone(),
                            hyperlink: None,
                            line_break: false,
                        });
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => {
                    let name = e.name();
                    if nested_depth > 0 {
                        match name.as_ref() {
                            b"w:tbl" => nested_depth -= 1,
                            b"w:t" => in_text = false,
                            _ => {}
                        }
                        buf.clear();
                        continue;
                    }
                    match name.as_ref() {
                        b"w:tr" => {
                            if let Some(mut row) = current_row.take() {
                                row.is_header = is_header_row;
                                table.add_row(row);
                            }
                        }
                        b"w:tc" => {
                            let content = if cell_paragraphs.is_empty() {
                                vec![Paragraph::new()]
                            } else {
                                std::mem::take(&mut cell_paragraphs)
                            };
                            let cell = Cell {
                                content,
                                col_span,
                                is_header: is_header_row,
                            };
                            if let Some(ref mut row) = current_row {
                                row.cells.push(cell);
                            }
                            in_cell = false;
                        }
                        b"w:p" if in_cell => {
                            if let Some(para) = current_paragraph.take() {
                                if !para.is_empty() {
                                    cell_paragraphs.push(para);
                                }
                            }
                        }
                        b"w:r" => in_run = false,
                        b"w:rPr" => in_rpr = false,
                        b"w:t" => in_text = false,
                        b"w:instrText" => in_instr_text = false,
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(table)
    }
}

fn push_start_tag(out: &mut String, e: &quick_xml::events::BytesStart) {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    push_attrs(out, e);
    out.push('>');
}

fn push_empty_tag(out: &mut String, e: &quick_xml::events::BytesStart) {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    push_attrs(out, e);
    out.push_str("/>");
}

fn push_attrs(out: &mut String, e: &quick_xml::events::BytesStart) {
    for attr in e.attributes().flatten() {
        out.push_str(&format!(
            " {}=\"{}\"",
            String::from_utf8_lossy(attr.key.as_ref()),
            String::from_utf8_lossy(&attr.value)
        ));
    }
}

fn bool_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<bool> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            let val = String::from_utf8_lossy(&attr.value);
            return Some(val != "0" && val != "false");
        }
    }
    None
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
