//! DOCX to styled HTML conversion with color recovery.
//!
//! Generic DOCX-to-HTML converters discard run colors and shading
//! fills. This crate recovers them: it scans the raw WordprocessingML
//! for color annotations, converts the body to plain HTML, then
//! re-applies each recovered color onto the generated tree by matching
//! the text that originally carried it.
//!
//! # Example
//!
//! ```no_run
//! let result = rehue::convert_file("report.docx");
//! if result.success {
//!     println!("{}", result.html);
//! } else {
//!     eprintln!("conversion failed: {}", result.error.unwrap_or_default());
//! }
//! ```
//!
//! Conversion never returns a `Result`: failures come back inside
//! [`ConversionResult`] with `success` false, and the `logs` field
//! carries a human-readable trace of every extraction and matching
//! decision.

pub mod apply;
pub mod assemble;
pub mod body;
pub mod docx;
pub mod dom;
pub mod error;
pub mod extract;
pub mod model;
pub mod package;
pub mod pipeline;
pub mod render;

pub use apply::{apply_colors, AppliedColors, MatchOutcome, MatchSummary};
pub use assemble::{ConversionResult, DebugInfo};
pub use body::{BodyConverter, BodyHtml, BuiltinBodyConverter};
pub use error::{Error, Result};
pub use extract::{extract_color_contexts, ColorContext, ContextKind, Extraction};
pub use package::DocxPackage;
pub use pipeline::Converter;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert an in-memory DOCX document.
pub fn convert_bytes(bytes: &[u8]) -> ConversionResult {
    Converter::new().convert_bytes(bytes)
}

/// Convert a DOCX file from disk.
pub fn convert_file(path: impl AsRef<std::path::Path>) -> ConversionResult {
    Converter::new().convert_file(path)
}

/// Download and convert a DOCX document.
#[cfg(feature = "fetch")]
pub fn convert_url(url: &str) -> ConversionResult {
    Converter::new().convert_url(url)
}
