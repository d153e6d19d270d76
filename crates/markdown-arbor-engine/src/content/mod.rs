pub(crate) mod parser;
pub(crate) mod render;
pub(crate) mod sanitize;
pub(crate) mod wikilink;
pub(crate) mod writer;

pub use render::RenderOptions;
pub use sanitize::{
    CONTENT_SIZE_WARNING_THRESHOLD, IssueKind, ValidationIssue, ValidationReport,
};
pub use wikilink::{PreparedContent, WikiLink};

use std::sync::OnceLock;

use regex::Regex;

use crate::ast::DocumentNode;

fn header_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("invalid header line regex"))
}

/// Splits a header line into `(marker, content)`, or `None` when the line is
/// not a header. Content has trailing whitespace trimmed.
pub(crate) fn header_marker(line: &str) -> Option<(&str, &str)> {
    let caps = header_line_re().captures(line)?;
    let marker = caps.get(1).expect("header marker group").as_str();
    let content = caps.get(2).expect("header content group").as_str().trim_end();
    Some((marker, content))
}

/// Header level of a line, 1-6, or 0 when the line is not a header.
pub fn parse_header_level(content: &str) -> u8 {
    header_marker(content).map_or(0, |(marker, _)| marker.len() as u8)
}

/// Strips the leading header marker; non-header lines pass through
/// unchanged. Callers use this for header-level inheritance when splitting
/// nodes.
pub fn strip_header_syntax(content: &str) -> &str {
    header_marker(content).map_or(content, |(_, text)| text)
}

fn fence_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*(?:```|~~~)[^\n]*$").expect("invalid fence line regex"))
}

fn line_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:#{1,6}\s+|[-*+]\s+|>\s?)").expect("invalid line marker regex")
    })
}

fn bold_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("invalid bold marker regex"))
}

fn italic_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*\n]+)\*").expect("invalid italic marker regex"))
}

fn code_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("invalid code marker regex"))
}

fn wikilink_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\[\]\n]+)\]\]").expect("invalid wikilink marker regex"))
}

/// Removes markdown syntax, leaving readable prose for word counting.
pub(crate) fn strip_markdown_syntax(source: &str) -> String {
    let step = fence_line_re().replace_all(source, "");
    let step = line_marker_re().replace_all(&step, "");
    let step = bold_marker_re().replace_all(&step, "$1");
    let step = italic_marker_re().replace_all(&step, "$1");
    let step = code_marker_re().replace_all(&step, "$1");
    let step = wikilink_marker_re().replace_all(&step, "$1");
    step.into_owned()
}

/// Stateless service over a buffer: parse to AST, render to markup, write
/// back to source, validate, sanitize and extract wikilinks.
///
/// Constructed once per editor surface; compiled patterns are shared
/// process-wide statics, so instances are free to create. All methods are
/// pure functions of their input.
#[derive(Debug, Default)]
pub struct ContentProcessor;

impl ContentProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Parses a full buffer into a document tree. Never fails; empty input
    /// yields an empty document with zeroed metadata.
    pub fn parse_markdown(&self, source: &str) -> DocumentNode {
        parser::parse_document(source)
    }

    /// Renders the tree to display markup with default options.
    pub fn render_ast(&self, ast: &DocumentNode) -> String {
        render::render_document(ast, &RenderOptions::default())
    }

    /// Renders the tree to display markup with explicit options.
    pub fn render_ast_with(&self, ast: &DocumentNode, options: &RenderOptions) -> String {
        render::render_document(ast, options)
    }

    /// Reconstructs markdown source from the tree. Reparsing the result
    /// yields a structurally equal tree.
    pub fn ast_to_markdown(&self, ast: &DocumentNode) -> String {
        writer::write_document(ast)
    }

    pub fn validate_content(&self, content: &str) -> ValidationReport {
        sanitize::validate(content)
    }

    pub fn sanitize_content(&self, content: &str) -> String {
        sanitize::sanitize(content)
    }

    pub fn detect_wiki_links(&self, content: &str) -> Vec<WikiLink> {
        wikilink::detect_wiki_links(content)
    }

    pub fn prepare_backlink_syntax(&self, content: &str) -> PreparedContent {
        wikilink::prepare_backlink_syntax(content)
    }
}
