//! Document body model used by the built-in body converter.
//!
//! This is a deliberately narrow slice of WordprocessingML: styled text
//! runs, paragraphs with a style name, simple tables, and inline images.
//! Color and shading are not modeled here — they are recovered separately
//! from the raw XML and reapplied onto the generated HTML.

use serde::{Deserialize, Serialize};

/// Character formatting for a text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
}

impl TextStyle {
    /// True when no formatting is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// The smallest styled unit of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
    /// Resolved hyperlink target, if the run sits inside a hyperlink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    /// Whether a line break follows this run.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub line_break: bool,
}

impl TextRun {
    /// Create an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// An inline image reference resolved through the document relationships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineImage {
    /// Relationship ID (e.g., "rId4") pointing at an image part.
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// A paragraph: a style reference plus a sequence of runs and images.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Style ID from w:pStyle (e.g., "Heading1").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    /// Human-readable style name resolved from the style table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    #[serde(default)]
    pub runs: Vec<TextRun>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<InlineImage>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding a single plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty()) && self.images.is_empty()
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub content: Vec<Paragraph>,
    /// Horizontal span from w:gridSpan.
    #[serde(default = "default_span")]
    pub col_span: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}

fn default_span() -> u32 {
    1
}

impl Cell {
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}

/// A table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| {
                r.cells
                    .iter()
                    .map(|c| c.plain_text())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A top-level content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// The parsed document body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentBody {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl DocumentBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Extract all text content as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(para) => {
                    text.push_str(&para.plain_text());
                    text.push('\n');
                }
                Block::Table(table) => {
                    text.push_str(&table.plain_text());
                    text.push('\n');
                }
            }
        }
        text.trim().to_string()
    }
}
