//! HTML rendering options.

use super::style_mapping::StyleMapping;

/// Options for rendering the document body to HTML.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Paragraph style mapping (Title, headings, Quote)
    pub style_mapping: StyleMapping,

    /// Embed images as base64 data URIs
    pub embed_images: bool,

    /// Include empty paragraphs in output
    pub include_empty_paragraphs: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            style_mapping: StyleMapping::with_defaults(),
            embed_images: true,
            include_empty_paragraphs: false,
        }
    }
}

impl HtmlOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the style mapping.
    pub fn with_style_mapping(mut self, mapping: StyleMapping) -> Self {
        self.style_mapping = mapping;
        self
    }

    /// Set whether images are embedded as data URIs.
    pub fn with_embed_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Set whether empty paragraphs are kept.
    pub fn with_empty_paragraphs(mut self, include: bool) -> Self {
        self.include_empty_paragraphs = include;
        self
    }
}
