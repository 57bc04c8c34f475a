//! Final result assembly.
//!
//! Styling is a two-layer contract. The base stylesheet makes every
//! descendant inherit its color and background, so uncolored content
//! adapts to whatever light or dark surface hosts it. The reapplier's
//! inline styles are the second layer: inline declarations outrank the
//! stylesheet, so explicitly recovered colors always win.

use serde::Serialize;

use crate::apply::MatchSummary;

/// Container stylesheet emitted ahead of the converted content.
pub const BASE_STYLESHEET: &str = "\
.docx-content {
  font-family: Arial, sans-serif;
  line-height: 1.6;
  max-width: 100%;
  padding: 20px;
  background: inherit;
  color: inherit;
}
.docx-content * {
  max-width: 100%;
  word-wrap: break-word;
  color: inherit;
  background-color: inherit;
}
.docx-content h1 { font-size: 2em; margin: 1em 0; }
.docx-content h2 { font-size: 1.5em; margin: 0.83em 0; }
.docx-content h3 { font-size: 1.17em; margin: 1em 0; }
.docx-content p { margin: 1em 0; }
.docx-content img {
  max-width: 100%;
  height: auto;
  margin: 1em 0;
  display: block;
}
.docx-content table {
  border-collapse: collapse;
  width: 100%;
  margin: 1em 0;
  border-color: currentColor;
}
.docx-content td, .docx-content th {
  border: 1px solid currentColor;
  padding: 8px;
}
.docx-content blockquote {
  margin: 1em 0;
  padding: 1em;
  border-left: 4px solid currentColor;
}
.docx-content ul, .docx-content ol {
  margin: 1em 0;
  padding-left: 2em;
}
.docx-content .docx-colored {
  display: inline;
}";

/// Wrap the colored HTML fragment in the styled container.
pub fn assemble(colored_html: &str) -> String {
    format!(
        "<style>\n{BASE_STYLESHEET}\n</style>\n<div class=\"docx-content\">\n{colored_html}\n</div>"
    )
}

/// Diagnostic snapshot carried alongside a successful conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub conversion_success: bool,
    /// Length of the colored HTML fragment, before container wrapping.
    pub content_length: usize,
    /// Number of color contexts recovered from the document XML.
    pub color_contexts: usize,
    pub match_summary: MatchSummary,
}

/// The public output of one conversion call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    /// Final styled HTML; empty when `success` is false.
    pub html: String,
    /// Ordered human-readable trace of every extraction and matching
    /// decision, for troubleshooting rather than machine parsing.
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl ConversionResult {
    /// A failed conversion: empty HTML, the error message appended to
    /// the log trace.
    pub fn failure(error: impl Into<String>, mut logs: Vec<String>) -> Self {
        let error = error.into();
        logs.push(format!("Error: {error}"));
        Self {
            success: false,
            html: String::new(),
            logs,
            error: Some(error),
            debug_info: None,
        }
    }
}
