//! Color context extraction from raw document XML.
//!
//! A generic body converter discards run colors and shading fills. This
//! module scans `word/document.xml` directly and records every explicit
//! color annotation together with a text snippet from the same element,
//! so the colors can later be re-applied onto the generated HTML by text
//! matching.
//!
//! Four passes run in a fixed order, each over the whole document:
//! text-run colors, paragraph shading, table-row shading, table-cell
//! shading. Matching is tag-scoped: a color and its anchor text must sit
//! inside the same element, and the element's closing tag terminates the
//! region. Extraction is best-effort by contract — malformed XML ends a
//! pass early with whatever was collected, it never fails the pipeline.

use log::debug;
use serde::{Deserialize, Serialize};

/// Fill values meaning "no explicit color"; never emitted as contexts.
const SENTINEL_FILLS: [&str; 2] = ["000000", "auto"];

/// Maximum length of the diagnostic source snippet.
const RAW_SNIPPET_LEN: usize = 100;

/// Length of text previews in log messages.
const LOG_PREVIEW_LEN: usize = 30;

/// The kind of color annotation a context was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextKind {
    /// Explicit run color (w:color on a text run).
    TextColor,
    /// Paragraph shading fill (w:shd inside a paragraph).
    ParagraphShading,
    /// Table-row shading fill.
    RowBackground,
    /// Table-cell shading fill.
    CellBackground,
}

impl ContextKind {
    /// Stable kind name used in ids and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::TextColor => "text-color",
            ContextKind::ParagraphShading => "paragraph-shading",
            ContextKind::RowBackground => "row-background",
            ContextKind::CellBackground => "cell-background",
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recovered color annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorContext {
    pub kind: ContextKind,
    /// 6-hex-digit RGB value, never a sentinel.
    pub color_value: String,
    /// Trimmed text snippet from the same XML region, the matching key.
    pub anchor_text: String,
    /// Per-kind sequence id ("text-color-0"), diagnostics only.
    pub id: String,
    /// First ~100 chars of the source XML region, diagnostics only.
    pub raw_snippet: String,
}

/// The result of an extraction run.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub contexts: Vec<ColorContext>,
    pub logs: Vec<String>,
}

/// Per-pass configuration: which element to scope to and where its color
/// property lives.
struct PassConfig {
    kind: ContextKind,
    /// The scoping element tag (w:r, w:p, w:tr, w:tc).
    target_tag: &'static [u8],
    /// The element carrying the color (w:color or w:shd).
    color_tag: &'static [u8],
    /// The attribute carrying the value (w:val or w:fill).
    color_attr: &'static [u8],
    /// Anchor is the first text anywhere in the element (rows), rather
    /// than the first text after the color property.
    anchor_anywhere: bool,
    /// Whether a context is emitted even when the element has no text
    /// (rows get a synthetic "Row N" anchor).
    synthesize_anchor: bool,
}

const PASSES: [PassConfig; 4] = [
    PassConfig {
        kind: ContextKind::TextColor,
        target_tag: b"w:r",
        color_tag: b"w:color",
        color_attr: b"w:val",
        anchor_anywhere: false,
        synthesize_anchor: false,
    },
    PassConfig {
        kind: ContextKind::ParagraphShading,
        target_tag: b"w:p",
        color_tag: b"w:shd",
        color_attr: b"w:fill",
        anchor_anywhere: false,
        synthesize_anchor: false,
    },
    PassConfig {
        kind: ContextKind::RowBackground,
        target_tag: b"w:tr",
        color_tag: b"w:shd",
        color_attr: b"w:fill",
        anchor_anywhere: true,
        synthesize_anchor: true,
    },
    PassConfig {
        kind: ContextKind::CellBackground,
        target_tag: b"w:tc",
        color_tag: b"w:shd",
        color_attr: b"w:fill",
        anchor_anywhere: false,
        synthesize_anchor: false,
    },
];

/// Extract all color contexts from the document XML.
///
/// Never fails: an empty context list with an explanatory log entry is a
/// valid outcome.
pub fn extract_color_contexts(xml: &str) -> Extraction {
    let mut out = Extraction::default();
    out.logs
        .push("STEP 1: Extracting color context from DOCX".to_string());

    for pass in &PASSES {
        run_pass(xml, pass, &mut out);
    }

    out.logs.push(format!(
        "STEP 1 COMPLETE: Found {} items with color context",
        out.contexts.len()
    ));
    debug!("extracted {} color contexts", out.contexts.len());
    out
}

/// State of one currently-open target element during a pass.
struct OpenElement {
    /// Byte offset of the element's start tag in the source.
    start: usize,
    /// First color value seen inside the element.
    color: Option<String>,
    /// First text seen after the color property.
    anchor_after_color: Option<String>,
    /// First text seen anywhere inside the element.
    first_text: Option<String>,
}

fn run_pass(xml: &str, pass: &PassConfig, out: &mut Extraction) {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    // Elements of the target tag can nest (rows and cells of nested
    // tables); properties and text are assigned to the innermost one.
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut in_text = false;
    let mut counter: usize = 0;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                if name.as_ref() == pass.target_tag {
                    stack.push(OpenElement {
                        start: pos,
                        color: None,
                        anchor_after_color: None,
                        first_text: None,
                    });
                } else if name.as_ref() == b"w:t" && !stack.is_empty() {
                    in_text = true;
                } else if name.as_ref() == pass.color_tag {
                    record_color(e, pass, stack.last_mut());
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == pass.color_tag {
                    record_color(e, pass, stack.last_mut());
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(open) = stack.last_mut() {
                        let text = e.unescape().unwrap_or_default().to_string();
                        if !text.is_empty() {
                            if open.first_text.is_none() {
                                open.first_text = Some(text.clone());
                            }
                            if open.color.is_some() && open.anchor_after_color.is_none() {
                                open.anchor_after_color = Some(text);
                            }
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                if name.as_ref() == b"w:t" {
                    in_text = false;
                } else if name.as_ref() == pass.target_tag {
                    if let Some(open) = stack.pop() {
                        let end = reader.buffer_position() as usize;
                        finish_element(xml, pass, open, end, &mut counter, out);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                // Best-effort contract: keep what was collected so far
                out.logs.push(format!(
                    "Stopped {} scan early on malformed XML: {}",
                    pass.kind, e
                ));
                debug!("{} pass aborted: {}", pass.kind, e);
                break;
            }
            _ => {}
        }
    }
}

fn record_color(
    e: &quick_xml::events::BytesStart,
    pass: &PassConfig,
    open: Option<&mut OpenElement>,
) {
    let Some(open) = open else { return };
    if open.color.is_some() {
        return;
    }
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == pass.color_attr {
            open.color = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
}

fn finish_element(
    xml: &str,
    pass: &PassConfig,
    open: OpenElement,
    end: usize,
    counter: &mut usize,
    out: &mut Extraction,
) {
    let Some(color) = open.color else { return };
    if SENTINEL_FILLS.contains(&color.as_str()) {
        return;
    }

    let anchor = if pass.anchor_anywhere {
        open.first_text
    } else {
        open.anchor_after_color
    };

    let anchor = match anchor {
        Some(text) => text.trim().to_string(),
        None if pass.synthesize_anchor => format!("Row {}", *counter + 1),
        None => return,
    };

    let region = &xml[open.start..end.min(xml.len())];
    let raw_snippet: String = region.chars().take(RAW_SNIPPET_LEN).collect();

    let id = format!("{}-{}", pass.kind, *counter);
    *counter += 1;

    out.logs.push(match pass.kind {
        ContextKind::TextColor => format!(
            "Found text with color #{}: \"{}...\"",
            color,
            preview(&anchor)
        ),
        ContextKind::ParagraphShading => format!(
            "Found paragraph with shading #{}: \"{}...\"",
            color,
            preview(&anchor)
        ),
        ContextKind::RowBackground => format!(
            "Found table row with background #{} containing text: \"{}...\"",
            color,
            preview(&anchor)
        ),
        ContextKind::CellBackground => format!(
            "Found table cell with background #{} containing text: \"{}...\"",
            color,
            preview(&anchor)
        ),
    });

    out.contexts.push(ColorContext {
        kind: pass.kind,
        color_value: color,
        anchor_text: anchor,
        id,
        raw_snippet,
    });
}

/// First characters of a string for log output.
fn preview(s: &str) -> String {
    s.chars().take(LOG_PREVIEW_LEN).collect()
}
