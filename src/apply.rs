//! Color reapplication onto converter-generated HTML.
//!
//! The body converter knows nothing about the recovered color contexts,
//! so this module re-locates each context's anchor text in the generated
//! HTML and mutates the matching elements' inline styles. Contexts are
//! processed longest-anchor-first, and every element that receives a
//! color is excluded from all later contexts.

use std::collections::HashSet;

use log::debug;
use markup5ever_rcdom::Handle;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::dom::{self, ElementTable, HtmlFragment};
use crate::error::Result;
use crate::extract::{ColorContext, ContextKind};

/// Anchors shorter than this must match on a word boundary during
/// substring-containment fallbacks. Tunable; the value matches the
/// behavior the matching heuristics were calibrated against.
pub const WORD_BOUNDARY_MAX_LEN: usize = 10;

/// Length of anchor previews in logs and match outcomes.
const PREVIEW_LEN: usize = 30;

/// Inline tags tried first for exact text-color matches.
const INLINE_TAGS: [&str; 5] = ["span", "strong", "em", "b", "i"];

/// Per-context result of reapplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub id: String,
    pub matched: bool,
    pub element_count: usize,
    pub anchor_text_preview: String,
}

/// Aggregated reapplication accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub success_count: usize,
    pub not_found_count: usize,
    pub details: Vec<MatchOutcome>,
}

/// The reapplier's output: mutated HTML plus accounting and a log trace.
#[derive(Debug, Clone)]
pub struct AppliedColors {
    pub html: String,
    pub summary: MatchSummary,
    pub logs: Vec<String>,
}

/// The explicit style layer written onto a matched element.
///
/// Rendered as an inline `style` attribute and merged after any existing
/// declarations for the same properties, so the override always wins over
/// both prior inline styles and the container stylesheet's inherited
/// defaults.
#[derive(Debug, Clone, Default)]
struct StyleOverride {
    color: Option<String>,
    background_color: Option<String>,
    padding: Option<&'static str>,
}

impl StyleOverride {
    fn for_context(kind: ContextKind, color: &str) -> Self {
        match kind {
            ContextKind::TextColor => Self {
                color: Some(format!("#{color}")),
                ..Default::default()
            },
            ContextKind::ParagraphShading => Self {
                background_color: Some(format!("#{color}")),
                padding: Some("8px"),
                ..Default::default()
            },
            ContextKind::RowBackground | ContextKind::CellBackground => Self {
                background_color: Some(format!("#{color}")),
                ..Default::default()
            },
        }
    }

    fn properties(&self) -> Vec<(&'static str, &str)> {
        let mut props = Vec::new();
        if let Some(c) = &self.color {
            props.push(("color", c.as_str()));
        }
        if let Some(b) = &self.background_color {
            props.push(("background-color", b.as_str()));
        }
        if let Some(p) = self.padding {
            props.push(("padding", p));
        }
        props
    }

    /// Merge into the element's `style` attribute. Existing declarations
    /// for the same properties are dropped; the override comes last.
    fn apply_to(&self, element: &Handle) {
        let props = self.properties();
        let existing = dom::get_attr(element, "style").unwrap_or_default();
        let mut declarations: Vec<String> = existing
            .split(';')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .filter(|d| {
                let name = d.split(':').next().unwrap_or("").trim();
                !props.iter().any(|(p, _)| name.eq_ignore_ascii_case(p))
            })
            .map(str::to_string)
            .collect();
        for (name, value) in &props {
            declarations.push(format!("{name}: {value}"));
        }
        dom::set_attr(element, "style", &declarations.join("; "));
    }
}

/// Apply the extracted color contexts to the generated HTML.
///
/// Contexts that match no element are logged and counted as not found,
/// never returned as errors. The only error here is unparseable HTML,
/// which the body converter should never produce.
pub fn apply_colors(html: &str, contexts: &[ColorContext]) -> Result<AppliedColors> {
    if contexts.is_empty() {
        return Ok(AppliedColors {
            html: html.to_string(),
            summary: MatchSummary::default(),
            logs: vec!["No color contexts to apply".to_string()],
        });
    }

    let fragment = HtmlFragment::parse(html)?;
    let mut table = ElementTable::build(fragment.container());
    let mut colored: HashSet<usize> = HashSet::new();

    let mut logs = vec!["STEP 3: Matching and applying colors to HTML elements".to_string()];
    let mut summary = MatchSummary::default();

    // Longer anchors are more specific and get first pick; the sort is
    // stable, so equal-length anchors keep extraction order.
    let mut sorted: Vec<&ColorContext> = contexts.iter().collect();
    sorted.sort_by_key(|c| std::cmp::Reverse(c.anchor_text.chars().count()));

    for context in sorted {
        let anchor = context.anchor_text.trim();
        let mut targets = find_targets(
            context.kind,
            anchor,
            fragment.container(),
            &mut table,
            &mut colored,
            &context.color_value,
        );

        if targets.is_empty() {
            debug!("no elements matched {} anchor {:?}", context.kind, anchor);
            logs.push(format!(
                "❌ Not Found: Could not find elements for {} with text \"{}...\"",
                context.kind,
                preview(anchor)
            ));
            summary.not_found_count += 1;
            summary.details.push(MatchOutcome {
                id: context.id.clone(),
                matched: false,
                element_count: 0,
                anchor_text_preview: format!("{}...", preview(anchor)),
            });
            continue;
        }

        targets.sort_unstable();
        targets.dedup();
        let style = StyleOverride::for_context(context.kind, &context.color_value);
        for &index in &targets {
            colored.insert(index);
            if let Some(element) = table.get(index) {
                style.apply_to(element);
                if context.kind == ContextKind::TextColor {
                    dom::set_attr(element, "data-text-color-applied", &context.color_value);
                } else {
                    dom::set_attr(element, "data-bg-color-applied", &context.color_value);
                }
            }
        }

        logs.push(format!(
            "✅ Success: Applied {} #{} to {} elements matching \"{}...\"",
            context.kind,
            context.color_value,
            targets.len(),
            preview(anchor)
        ));
        summary.success_count += 1;
        summary.details.push(MatchOutcome {
            id: context.id.clone(),
            matched: true,
            element_count: targets.len(),
            anchor_text_preview: format!("{}...", preview(anchor)),
        });
    }

    logs.push(format!(
        "STEP 3 COMPLETE: Successfully applied {} colors, failed to find elements for {} contexts",
        summary.success_count, summary.not_found_count
    ));

    Ok(AppliedColors {
        html: fragment.to_html()?,
        summary,
        logs,
    })
}

/// Candidate element indices for one context, with per-kind graduated
/// fallbacks.
fn find_targets(
    kind: ContextKind,
    anchor: &str,
    container: &Handle,
    table: &mut ElementTable,
    colored: &mut HashSet<usize>,
    color: &str,
) -> Vec<usize> {
    match kind {
        ContextKind::TextColor => {
            let mut found = find_exact(table, colored, anchor, Some(&INLINE_TAGS));
            if found.is_empty() {
                found = find_exact(table, colored, anchor, None);
            }
            if found.is_empty() {
                found = wrap_text_occurrences(container, table, colored, anchor, color);
            }
            found
        }
        ContextKind::ParagraphShading => {
            let mut found = find_exact(table, colored, anchor, Some(&["p"]));
            if found.is_empty() {
                found = find_containing(table, colored, anchor, &["p"]);
            }
            found
        }
        ContextKind::RowBackground => find_containing(table, colored, anchor, &["tr"]),
        ContextKind::CellBackground => {
            let mut found = find_exact(table, colored, anchor, Some(&["td", "th"]));
            if found.is_empty() {
                found = find_containing(table, colored, anchor, &["td", "th"]);
            }
            found
        }
    }
}

fn normalize(text: &str) -> String {
    text.nfc().collect()
}

fn tag_matches(element: &Handle, tags: Option<&[&str]>) -> bool {
    let Some(name) = dom::tag_name(element) else {
        return false;
    };
    match tags {
        Some(tags) => tags.contains(&name.as_str()),
        None => true,
    }
}

/// Elements whose trimmed text content equals the anchor exactly.
fn find_exact(
    table: &ElementTable,
    colored: &HashSet<usize>,
    anchor: &str,
    tags: Option<&[&str]>,
) -> Vec<usize> {
    let anchor = normalize(anchor);
    table
        .iter()
        .filter(|(index, _)| !colored.contains(index))
        .filter(|(_, element)| tag_matches(element, tags))
        .filter(|(_, element)| normalize(dom::text_content(element).trim()) == anchor)
        .map(|(index, _)| index)
        .collect()
}

/// Elements whose text content contains the anchor. Short anchors must
/// additionally appear on a word boundary, case-insensitively, to avoid
/// false positives inside longer words.
fn find_containing(
    table: &ElementTable,
    colored: &HashSet<usize>,
    anchor: &str,
    tags: &[&str],
) -> Vec<usize> {
    let anchor = normalize(anchor);
    let boundary = if anchor.chars().count() < WORD_BOUNDARY_MAX_LEN {
        Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&anchor))).ok()
    } else {
        None
    };
    table
        .iter()
        .filter(|(index, _)| !colored.contains(index))
        .filter(|(_, element)| tag_matches(element, Some(tags)))
        .filter(|(_, element)| {
            let text = normalize(&dom::text_content(element));
            match &boundary {
                Some(re) => re.is_match(&text),
                None => text.contains(&anchor),
            }
        })
        .map(|(index, _)| index)
        .collect()
}

/// Last-resort text-color fallback: wrap the anchor substring of each
/// matching raw text node in a fresh inline span carrying the color.
///
/// New spans are registered in the element table and marked colored on
/// creation so later contexts cannot re-match them.
fn wrap_text_occurrences(
    container: &Handle,
    table: &mut ElementTable,
    colored: &mut HashSet<usize>,
    anchor: &str,
    color: &str,
) -> Vec<usize> {
    let mut created = Vec::new();
    for (parent, text_node) in dom::text_nodes_with_parents(container) {
        let text = dom::text_content(&text_node);
        let Some(offset) = text.find(anchor) else {
            continue;
        };

        let span = dom::create_element("span");
        dom::set_attr(&span, "class", "docx-colored");
        dom::set_attr(&span, "data-color", color);
        dom::append_child(&span, dom::create_text(anchor));

        let mut replacements = Vec::new();
        if offset > 0 {
            replacements.push(dom::create_text(&text[..offset]));
        }
        replacements.push(span.clone());
        let rest = &text[offset + anchor.len()..];
        if !rest.is_empty() {
            replacements.push(dom::create_text(rest));
        }
        dom::replace_child(&parent, &text_node, replacements);

        let index = table.push(span);
        colored.insert(index);
        created.push(index);
        debug!("wrapped anchor {:?} in a synthetic span", anchor);
    }
    created
}

fn preview(s: &str) -> String {
    s.chars().take(PREVIEW_LEN).collect()
}
