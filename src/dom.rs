//! HTML tree utilities for the color reapplier.
//!
//! Wraps html5ever's rcdom with the small surface the reapplier needs:
//! parse a markup fragment into a detached tree, walk its elements into
//! an indexed table, read text content, mutate attributes, splice in new
//! inline elements, and serialize back to a string.

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, namespace_url, parse_document, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

use crate::error::{Error, Result};

/// A parsed HTML fragment, detached from any other content.
///
/// The tree is rooted at the synthetic `body` element html5ever creates
/// around fragment input; mutations stay inside it.
pub struct HtmlFragment {
    #[allow(dead_code)]
    dom: RcDom,
    body: Handle,
}

impl HtmlFragment {
    /// Parse markup into a detached tree.
    pub fn parse(html: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let body = find_element(&dom.document, "body")
            .ok_or_else(|| Error::XmlParse("no body element in parsed HTML".to_string()))?;
        Ok(Self { dom, body })
    }

    /// The fragment container holding the parsed content.
    pub fn container(&self) -> &Handle {
        &self.body
    }

    /// Serialize the fragment content (children of the container).
    pub fn to_html(&self) -> Result<String> {
        let mut bytes = Vec::new();
        let handle: SerializableHandle = self.body.clone().into();
        serialize(
            &mut bytes,
            &handle,
            SerializeOpts {
                traversal_scope: TraversalScope::ChildrenOnly(None),
                ..Default::default()
            },
        )
        .map_err(Error::Io)?;
        String::from_utf8(bytes).map_err(|e| Error::XmlParse(e.to_string()))
    }
}

/// An indexed table of the elements in a fragment.
///
/// The reapplier marks elements as "owned" by index rather than by node
/// identity; elements created during reapplication are appended and get
/// fresh indices.
pub struct ElementTable {
    elements: Vec<Handle>,
}

impl ElementTable {
    /// Build the table with a pre-order walk of the container's content.
    pub fn build(container: &Handle) -> Self {
        let mut elements = Vec::new();
        collect_elements(container, &mut elements);
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Handle> {
        self.elements.get(index)
    }

    /// Indices and handles in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Handle)> {
        self.elements.iter().enumerate()
    }

    /// Register a newly created element, returning its index.
    pub fn push(&mut self, handle: Handle) -> usize {
        self.elements.push(handle);
        self.elements.len() - 1
    }
}

fn collect_elements(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) {
            out.push(child.clone());
        }
        collect_elements(child, out);
    }
}

fn find_element(node: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: q, .. } = &node.data {
        if q.local.as_ref().eq_ignore_ascii_case(name) {
            return Some(node.clone());
        }
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, name) {
            return Some(found);
        }
    }
    None
}

/// Lowercase tag name of an element node.
pub fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

/// Concatenated descendant text of a node.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    append_text(node, &mut out);
    out
}

fn append_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                append_text(child, out);
            }
        }
    }
}

/// Get an attribute value of an element.
pub fn get_attr(node: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { attrs, .. } = &node.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref().eq_ignore_ascii_case(name) {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Set (or replace) an attribute on an element.
pub fn set_attr(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        for attr in attrs.iter_mut() {
            if attr.name.local.as_ref().eq_ignore_ascii_case(name) {
                attr.value = value.into();
                return;
            }
        }
        attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        });
    }
}

/// Create a detached HTML element.
pub fn create_element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Create a detached text node.
pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(text.into()),
    })
}

/// Append a child to a parent element.
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Replace one child of `parent` with a sequence of replacement nodes.
///
/// Used to split a text node around an anchor substring and splice in a
/// synthetic colored span. No-op if `old` is not a child of `parent`.
pub fn replace_child(parent: &Handle, old: &Handle, replacements: Vec<Handle>) {
    let mut children = parent.children.borrow_mut();
    let Some(pos) = children.iter().position(|c| Rc::ptr_eq(c, old)) else {
        return;
    };
    old.parent.set(None);
    for r in &replacements {
        r.parent.set(Some(Rc::downgrade(parent)));
    }
    children.splice(pos..pos + 1, replacements);
}

/// Collect the direct and descendant text nodes of a container, paired
/// with their parent elements, in document order.
pub fn text_nodes_with_parents(container: &Handle) -> Vec<(Handle, Handle)> {
    let mut out = Vec::new();
    collect_text_nodes(container, &mut out);
    out
}

fn collect_text_nodes(parent: &Handle, out: &mut Vec<(Handle, Handle)>) {
    for child in parent.children.borrow().iter() {
        match &child.data {
            NodeData::Text { .. } => out.push((parent.clone(), child.clone())),
            NodeData::Element { .. } => collect_text_nodes(child, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_roundtrip() {
        let fragment = HtmlFragment::parse("<p>Hello <strong>World</strong></p>").unwrap();
        let html = fragment.to_html().unwrap();
        assert!(html.contains("<p>Hello <strong>World</strong></p>"));
    }

    #[test]
    fn test_element_table_order() {
        let fragment =
            HtmlFragment::parse("<p>one</p><table><tr><td>cell</td></tr></table>").unwrap();
        let table = ElementTable::build(fragment.container());
        let tags: Vec<_> = table
            .iter()
            .filter_map(|(_, h)| tag_name(h))
            .collect();
        assert_eq!(tags[0], "p");
        assert!(tags.contains(&"table".to_string()));
        assert!(tags.contains(&"td".to_string()));
    }

    #[test]
    fn test_text_content() {
        let fragment = HtmlFragment::parse("<p>Hello <em>nested</em> text</p>").unwrap();
        let table = ElementTable::build(fragment.container());
        let (_, p) = table.iter().find(|(_, h)| tag_name(h).as_deref() == Some("p")).unwrap();
        assert_eq!(text_content(p), "Hello nested text");
    }

    #[test]
    fn test_set_and_get_attr() {
        let fragment = HtmlFragment::parse("<p>x</p>").unwrap();
        let table = ElementTable::build(fragment.container());
        let (_, p) = table.iter().next().unwrap();
        set_attr(p, "style", "color: #FF0000");
        assert_eq!(get_attr(p, "style").as_deref(), Some("color: #FF0000"));
        set_attr(p, "style", "color: #00FF00");
        assert_eq!(get_attr(p, "style").as_deref(), Some("color: #00FF00"));

        let html = fragment.to_html().unwrap();
        assert!(html.contains("style=\"color: #00FF00\""));
    }

    #[test]
    fn test_replace_child_splices_nodes() {
        let fragment = HtmlFragment::parse("<p>before anchor after</p>").unwrap();
        let nodes = text_nodes_with_parents(fragment.container());
        assert_eq!(nodes.len(), 1);
        let (parent, text) = &nodes[0];

        let span = create_element("span");
        append_child(&span, create_text("anchor"));
        replace_child(
            parent,
            text,
            vec![create_text("before "), span, create_text(" after")],
        );

        let html = fragment.to_html().unwrap();
        assert!(html.contains("before <span>anchor</span> after"));
    }
}
