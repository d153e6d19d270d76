use std::fmt::Write as _;

use crate::ast::{AstNode, DocumentNode, HeaderNode, InlineSpanNode, ParagraphNode, WikiLinkNode};

/// Controls how the AST is turned into display markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Namespace for emitted class names (`md` yields `md-heading-2` etc.).
    pub css_prefix: String,
    /// When false, the raw markdown markers stay visible inside
    /// `{prefix}-syntax` spans instead of being hidden.
    pub hide_syntax: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            css_prefix: "md".to_string(),
            hide_syntax: true,
        }
    }
}

/// Renders a document to display markup.
///
/// Pure function of the AST: headers become heading elements with
/// level-scoped classes, paragraphs wrap their interleaved children, inline
/// nodes become semantically tagged spans and all text is HTML-escaped.
/// Wikilinks render as non-navigating placeholders carrying the target in a
/// `data-target` attribute; resolution belongs to the host.
pub(crate) fn render_document(doc: &DocumentNode, opts: &RenderOptions) -> String {
    let mut out = String::new();
    for (i, child) in doc.children.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_node(&mut out, child, opts);
    }
    out
}

fn render_node(out: &mut String, node: &AstNode, opts: &RenderOptions) {
    match node {
        AstNode::Header(h) => render_header(out, h, opts),
        AstNode::Paragraph(p) => render_paragraph(out, p, opts),
        AstNode::Text(t) => {
            out.push_str(&html_escape::encode_text(&t.text));
        }
        AstNode::WikiLink(link) => render_wikilink(out, link, opts),
        AstNode::Bold(n) => render_inline(out, n, "strong", "bold", "**", opts),
        AstNode::Italic(n) => render_inline(out, n, "em", "italic", "*", opts),
        AstNode::Code(n) => render_inline(out, n, "code", "inline-code", "`", opts),
        // A nested document has no display form of its own; render what it
        // contains.
        AstNode::Document(d) => out.push_str(&render_document(d, opts)),
    }
}

fn render_header(out: &mut String, h: &HeaderNode, opts: &RenderOptions) {
    let p = &opts.css_prefix;
    let level = h.level.clamp(1, 6);
    let _ = write!(
        out,
        "<h{level} class=\"{p}-heading {p}-heading-{level}\">"
    );
    if !opts.hide_syntax {
        let _ = write!(
            out,
            "<span class=\"{p}-syntax\">{} </span>",
            html_escape::encode_text(&h.raw_syntax)
        );
    }
    out.push_str(&html_escape::encode_text(&h.content));
    let _ = write!(out, "</h{level}>");
}

fn render_paragraph(out: &mut String, p: &ParagraphNode, opts: &RenderOptions) {
    let prefix = &opts.css_prefix;
    let _ = write!(out, "<p class=\"{prefix}-paragraph\">");
    for child in &p.children {
        render_node(out, child, opts);
    }
    out.push_str("</p>");
}

fn render_wikilink(out: &mut String, link: &WikiLinkNode, opts: &RenderOptions) {
    let p = &opts.css_prefix;
    let _ = write!(
        out,
        "<span class=\"{p}-wikilink\" data-target=\"{}\">",
        html_escape::encode_double_quoted_attribute(&link.target)
    );
    if !opts.hide_syntax {
        let _ = write!(out, "<span class=\"{p}-syntax\">[[</span>");
    }
    out.push_str(&html_escape::encode_text(&link.display_text));
    if !opts.hide_syntax {
        let _ = write!(out, "<span class=\"{p}-syntax\">]]</span>");
    }
    out.push_str("</span>");
}

fn render_inline(
    out: &mut String,
    node: &InlineSpanNode,
    tag: &str,
    class: &str,
    marker: &str,
    opts: &RenderOptions,
) {
    let p = &opts.css_prefix;
    let _ = write!(out, "<{tag} class=\"{p}-{class}\">");
    if !opts.hide_syntax {
        let _ = write!(out, "<span class=\"{p}-syntax\">{marker}</span>");
    }
    out.push_str(&html_escape::encode_text(&node.content));
    if !opts.hide_syntax {
        let _ = write!(out, "<span class=\"{p}-syntax\">{marker}</span>");
    }
    let _ = write!(out, "</{tag}>");
}
