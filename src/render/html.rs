//! Document model to HTML rendering.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::debug;

use crate::model::{Block, Cell, DocumentBody, Paragraph, Table, TextRun};

use super::options::HtmlOptions;

/// Image bytes resolved from the package, keyed by relationship ID.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

pub type ImageMap = HashMap<String, EmbeddedImage>;

/// Rendered HTML plus non-fatal conversion warnings.
#[derive(Debug, Clone, Default)]
pub struct RenderedHtml {
    pub html: String,
    pub warnings: Vec<String>,
}

/// Render the document body to an HTML fragment.
pub fn to_html(body: &DocumentBody, images: &ImageMap, options: &HtmlOptions) -> RenderedHtml {
    let mut out = RenderedHtml::default();
    for block in &body.blocks {
        match block {
            Block::Paragraph(para) => render_paragraph(para, images, options, &mut out),
            Block::Table(table) => render_table(table, images, options, &mut out),
        }
    }
    debug!("rendered {} blocks to {} chars", body.blocks.len(), out.html.len());
    out
}

fn render_paragraph(
    para: &Paragraph,
    images: &ImageMap,
    options: &HtmlOptions,
    out: &mut RenderedHtml,
) {
    if para.is_empty() && !options.include_empty_paragraphs {
        return;
    }

    let tag = options
        .style_mapping
        .get(para.style_id.as_deref(), para.style_name.as_deref());
    if tag.is_none() {
        if let Some(name) = para.style_name.as_deref().or(para.style_id.as_deref()) {
            warn_once(
                out,
                format!(
                    "Unrecognised paragraph style: '{}' (Style ID: {})",
                    name,
                    para.style_id.as_deref().unwrap_or("none")
                ),
            );
        }
    }
    let tag = tag.map(|t| t.as_str()).unwrap_or("p");

    out.html.push_str(&format!("<{tag}>"));
    render_runs(&para.runs, &mut out.html);
    for image in &para.images {
        render_image(&image.resource_id, image.alt_text.as_deref(), images, options, out);
    }
    out.html.push_str(&format!("</{tag}>"));
}

fn render_runs(runs: &[TextRun], html: &mut String) {
    for run in runs {
        let mut piece = escape_text(&run.text);
        if run.style.strikethrough {
            piece = format!("<s>{piece}</s>");
        }
        if run.style.underline {
            piece = format!("<u>{piece}</u>");
        }
        if run.style.italic {
            piece = format!("<em>{piece}</em>");
        }
        if run.style.bold {
            piece = format!("<strong>{piece}</strong>");
        }
        if let Some(href) = &run.hyperlink {
            piece = format!("<a href=\"{}\">{piece}</a>", escape_attr(href));
        }
        html.push_str(&piece);
        if run.line_break {
            html.push_str("<br />");
        }
    }
}

fn render_image(
    resource_id: &str,
    alt_text: Option<&str>,
    images: &ImageMap,
    options: &HtmlOptions,
    out: &mut RenderedHtml,
) {
    if !options.embed_images {
        return;
    }
    let Some(image) = images.get(resource_id) else {
        warn_once(out, format!("Could not embed image {resource_id}"));
        return;
    };
    let encoded = BASE64.encode(&image.data);
    out.html.push_str(&format!(
        "<img src=\"data:{};base64,{}\" style=\"max-width: 100%; height: auto;\"",
        image.content_type, encoded
    ));
    if let Some(alt) = alt_text {
        out.html.push_str(&format!(" alt=\"{}\"", escape_attr(alt)));
    }
    out.html.push_str(" />");
}

fn render_table(
    table: &Table,
    images: &ImageMap,
    options: &HtmlOptions,
    out: &mut RenderedHtml,
) {
    out.html.push_str("<table>");
    for row in &table.rows {
        out.html.push_str("<tr>");
        for cell in &row.cells {
            render_cell(cell, row.is_header, images, options, out);
        }
        out.html.push_str("</tr>");
    }
    out.html.push_str("</table>");
}

fn render_cell(
    cell: &Cell,
    row_is_header: bool,
    images: &ImageMap,
    options: &HtmlOptions,
    out: &mut RenderedHtml,
) {
    let tag = if cell.is_header || row_is_header { "th" } else { "td" };
    out.html.push_str(&format!("<{tag}"));
    if cell.col_span > 1 {
        out.html.push_str(&format!(" colspan=\"{}\"", cell.col_span));
    }
    out.html.push('>');
    for para in &cell.content {
        render_paragraph(para, images, options, out);
    }
    out.html.push_str(&format!("</{tag}>"));
}

fn warn_once(out: &mut RenderedHtml, message: String) {
    if !out.warnings.contains(&message) {
        out.warnings.push(message);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
