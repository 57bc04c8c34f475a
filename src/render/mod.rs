//! HTML rendering for the parsed document body.
//!
//! This is the built-in body converter backend: it turns the document
//! model into plain HTML with a configurable style-name mapping, leaving
//! all color recovery to the reapplication stage.
//!
//! # Example
//!
//! ```no_run
//! use rehue::render::{to_html, HtmlOptions};
//! # let body = rehue::model::DocumentBody::new();
//! # let images = Default::default();
//!
//! let rendered = to_html(&body, &images, &HtmlOptions::default());
//! println!("{}", rendered.html);
//! ```

mod html;
mod options;
mod style_mapping;

pub use html::{to_html, EmbeddedImage, ImageMap, RenderedHtml};
pub use options::HtmlOptions;
pub use style_mapping::{BlockTag, StyleMapping};
