//! Document to HTML serialization.
//!
//! # Responsibility
//! - Produce the preview and persisted `html` field from a document.
//!
//! # Invariants
//! - Output is a pure function of the document.
//! - Text content and attribute values are always escaped.
//! - Link targets outside the allowed schemes are emitted as `#`.

use crate::model::document::{Align, Block, BlockKind, Document, Link, Node, Text};

const ALLOWED_URL_PREFIXES: [&str; 4] = ["http://", "https://", "mailto:", "tel:"];
const LINK_CLASS: &str = "text-primary underline";
const EMPTY_PARAGRAPH_BODY: &str = "<br />";

/// Serializes `document` to HTML.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    for block in document.blocks() {
        write_block(&mut out, block);
    }
    out
}

/// Escapes `& < > " '` for text and attribute positions.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Returns the trimmed url when its scheme is allowed, `#` otherwise.
pub fn sanitize_url(raw: &str) -> String {
    let url = raw.trim();
    let lower = url.to_ascii_lowercase();
    if ALLOWED_URL_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        url.to_string()
    } else {
        "#".to_string()
    }
}

fn align_class(align: Option<Align>) -> &'static str {
    match align.unwrap_or_default() {
        Align::Left => "text-left",
        Align::Center => "text-center",
        Align::Right => "text-right",
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block.kind {
        BlockKind::Paragraph => {
            out.push_str(&format!("<p class=\"{}\">", align_class(block.align)));
            if block.text().is_empty() {
                out.push_str(EMPTY_PARAGRAPH_BODY);
            } else {
                write_children(out, &block.children);
            }
            out.push_str("</p>");
        }
        BlockKind::HeadingTwo => write_aligned(out, "h2", block),
        BlockKind::HeadingThree => write_aligned(out, "h3", block),
        BlockKind::BlockQuote => write_aligned(out, "blockquote", block),
        BlockKind::BulletedList => write_plain(out, "ul", block),
        BlockKind::NumberedList => write_plain(out, "ol", block),
        BlockKind::ListItem => write_plain(out, "li", block),
        BlockKind::CodeBlock => {
            let lines: Vec<&str> = block
                .children
                .iter()
                .filter_map(|child| match child {
                    Node::Text(text) => Some(text.text.as_str()),
                    _ => None,
                })
                .collect();
            out.push_str("<pre><code>");
            out.push_str(&escape_html(&lines.join("\n")));
            out.push_str("</code></pre>");
        }
    }
}

fn write_aligned(out: &mut String, tag: &str, block: &Block) {
    out.push_str(&format!("<{tag} class=\"{}\">", align_class(block.align)));
    write_children(out, &block.children);
    out.push_str(&format!("</{tag}>"));
}

fn write_plain(out: &mut String, tag: &str, block: &Block) {
    out.push_str(&format!("<{tag}>"));
    write_children(out, &block.children);
    out.push_str(&format!("</{tag}>"));
}

fn write_children(out: &mut String, children: &[Node]) {
    for child in children {
        match child {
            Node::Text(text) => write_text(out, text),
            Node::Link(link) => write_link(out, link),
            Node::Block(block) => write_block(out, block),
        }
    }
}

fn write_link(out: &mut String, link: &Link) {
    out.push_str(&format!(
        "<a href=\"{}\" class=\"{LINK_CLASS}\">",
        escape_html(&sanitize_url(&link.url))
    ));
    for text in &link.children {
        write_text(out, text);
    }
    out.push_str("</a>");
}

fn write_text(out: &mut String, text: &Text) {
    if text.is_empty() {
        return;
    }
    let mut html = escape_html(&text.text);
    if text.marks.code {
        html = format!("<code>{html}</code>");
    }
    if text.marks.bold {
        html = format!("<strong>{html}</strong>");
    }
    if text.marks.italic {
        html = format!("<em>{html}</em>");
    }
    if text.marks.underline {
        html = format!("<u>{html}</u>");
    }
    out.push_str(&html);
}
