//! DOCX body parsing.
//!
//! Parses the narrow WordprocessingML subset the built-in body converter
//! renders: paragraphs, styled runs, hyperlinks, inline images, and
//! simple tables.

mod parser;
pub mod styles;

pub use parser::BodyParser;
pub use styles::StyleMap;
