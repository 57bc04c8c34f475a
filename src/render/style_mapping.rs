//! Style name to HTML block tag mapping.
//!
//! Paragraph styles are matched by human-readable style name
//! (case-insensitive) or by style ID (exact), name first. Unmapped
//! styles render as plain paragraphs.

use std::collections::HashMap;

/// The block-level tag a paragraph style maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    H1,
    H2,
    H3,
    H4,
    Blockquote,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::H1 => "h1",
            BlockTag::H2 => "h2",
            BlockTag::H3 => "h3",
            BlockTag::H4 => "h4",
            BlockTag::Blockquote => "blockquote",
        }
    }
}

/// Mapping from style names/IDs to block tags.
#[derive(Debug, Clone, Default)]
pub struct StyleMapping {
    /// Mapping from style name (case-insensitive) to tag
    name_to_tag: HashMap<String, BlockTag>,
    /// Mapping from style ID to tag
    id_to_tag: HashMap<String, BlockTag>,
}

impl StyleMapping {
    /// Create a new empty style mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a style mapping with the default document patterns.
    ///
    /// "Title" becomes the page heading, so "Heading 1" shifts down to
    /// `h2` and the deeper levels follow.
    pub fn with_defaults() -> Self {
        let mut mapping = Self::new();

        mapping.add_name_mapping("Title", BlockTag::H1);
        mapping.add_name_mapping("Heading 1", BlockTag::H2);
        mapping.add_name_mapping("Heading 2", BlockTag::H3);
        mapping.add_name_mapping("Heading 3", BlockTag::H4);
        mapping.add_name_mapping("Quote", BlockTag::Blockquote);

        mapping.add_id_mapping("Title", BlockTag::H1);
        mapping.add_id_mapping("Heading1", BlockTag::H2);
        mapping.add_id_mapping("Heading2", BlockTag::H3);
        mapping.add_id_mapping("Heading3", BlockTag::H4);
        mapping.add_id_mapping("Quote", BlockTag::Blockquote);

        mapping
    }

    /// Add a name-based mapping (case-insensitive).
    pub fn add_name_mapping(&mut self, name: impl Into<String>, tag: BlockTag) {
        self.name_to_tag.insert(name.into().to_lowercase(), tag);
    }

    /// Add an ID-based mapping (exact match).
    pub fn add_id_mapping(&mut self, id: impl Into<String>, tag: BlockTag) {
        self.id_to_tag.insert(id.into(), tag);
    }

    /// Get the tag by style name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<BlockTag> {
        self.name_to_tag.get(&name.to_lowercase()).copied()
    }

    /// Get the tag by style ID (exact match).
    pub fn get_by_id(&self, id: &str) -> Option<BlockTag> {
        self.id_to_tag.get(id).copied()
    }

    /// Get the tag by either style name or ID. Style name takes
    /// precedence.
    pub fn get(&self, style_id: Option<&str>, style_name: Option<&str>) -> Option<BlockTag> {
        if let Some(name) = style_name {
            if let Some(tag) = self.get_by_name(name) {
                return Some(tag);
            }
        }
        if let Some(id) = style_id {
            if let Some(tag) = self.get_by_id(id) {
                return Some(tag);
            }
        }
        None
    }

    /// Check if the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.name_to_tag.is_empty() && self.id_to_tag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mappings() {
        let mapping = StyleMapping::with_defaults();

        assert_eq!(mapping.get_by_name("Title"), Some(BlockTag::H1));
        assert_eq!(mapping.get_by_name("title"), Some(BlockTag::H1));
        assert_eq!(mapping.get_by_name("Heading 1"), Some(BlockTag::H2));
        assert_eq!(mapping.get_by_name("Quote"), Some(BlockTag::Blockquote));
        assert_eq!(mapping.get_by_name("Heading 7"), None);
    }

    #[test]
    fn test_id_mappings() {
        let mapping = StyleMapping::with_defaults();

        assert_eq!(mapping.get_by_id("Heading1"), Some(BlockTag::H2));
        assert_eq!(mapping.get_by_id("heading1"), None);
        assert_eq!(mapping.get_by_id("Unknown"), None);
    }

    #[test]
    fn test_combined_lookup() {
        let mapping = StyleMapping::with_defaults();

        // Name takes precedence
        assert_eq!(
            mapping.get(Some("Heading1"), Some("Title")),
            Some(BlockTag::H1)
        );

        // Fall back to ID
        assert_eq!(mapping.get(Some("Heading2"), None), Some(BlockTag::H3));

        // Neither matches
        assert_eq!(mapping.get(Some("Unknown"), Some("Unknown")), None);
    }

    #[test]
    fn test_custom_mapping() {
        let mut mapping = StyleMapping::new();
        mapping.add_name_mapping("Callout", BlockTag::Blockquote);

        assert_eq!(mapping.get_by_name("callout"), Some(BlockTag::Blockquote));
        assert_eq!(mapping.get_by_name("Title"), None);
    }
}
