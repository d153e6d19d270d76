use std::sync::OnceLock;

use regex::Regex;

use crate::ast::Span;

/// Kind tag for a positional syntax match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Header,
    Bullet,
    Bold,
    Italic,
    InlineCode,
    Blockquote,
    CodeFence,
}

/// Bullet marker character of a list line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletMarker {
    Dash,
    Asterisk,
    Plus,
}

impl BulletMarker {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(BulletMarker::Dash),
            '*' => Some(BulletMarker::Asterisk),
            '+' => Some(BulletMarker::Plus),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            BulletMarker::Dash => '-',
            BulletMarker::Asterisk => '*',
            BulletMarker::Plus => '+',
        }
    }
}

/// A positional, type-tagged match of markdown syntax, independent of the
/// AST. Used for live decoration and bullet classification.
///
/// Patterns are independent and may overlap conceptually (a bold span inside
/// a bullet's content yields both a `Bullet` and a `Bold` pattern); ordering
/// and overlap resolution are left to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownPattern {
    pub kind: PatternKind,
    /// Byte span of the pattern in the whole buffer.
    pub span: Span,
    /// The marker text (`###`, `-`, `**`, `` ` ``, `>`, ` ``` `).
    pub syntax: String,
    /// Matched content text (title, bullet text, emphasized text, fence
    /// language, quoted text). Empty for partially-typed markers.
    pub content: String,
    /// 0-based line number.
    pub line: usize,
    /// Byte column of the pattern start within its line. For bullets this is
    /// the indent width, used later for depth inference.
    pub column: usize,
    pub bullet: Option<BulletMarker>,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("invalid header regex"))
}

fn header_stub_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s*$").expect("invalid header stub regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([-*+])\s(.+)$").expect("invalid bullet regex"))
}

fn bullet_stub_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([-*+])\s?$").expect("invalid bullet stub regex"))
}

fn blockquote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)>\s?(.*)$").expect("invalid blockquote regex"))
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)(```|~~~)\s*([A-Za-z0-9_+#.-]*)\s*$").expect("invalid fence regex")
    })
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("invalid bold regex"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*\n]+)\*").expect("invalid italic regex"))
}

fn inline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("invalid inline code regex"))
}

/// Stateless scanner producing positioned markdown pattern matches from a
/// text buffer and cursor offset.
///
/// Every call builds fresh match iterators over the compiled patterns, so
/// there is no matcher state carried between calls.
#[derive(Debug, Default)]
pub struct PatternDetector;

impl PatternDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scans `content` line by line and returns all pattern matches with
    /// buffer-absolute byte offsets.
    ///
    /// The cursor matters on its own line: a marker the user is still typing
    /// (`- ` or `## ` with no content yet) is reported there with empty
    /// `content`, so live decoration does not flicker mid-keystroke.
    pub fn detect(&self, content: &str, cursor_position: usize) -> Vec<MarkdownPattern> {
        let cursor = cursor_position.min(content.len());
        let mut out = Vec::new();

        for (line_no, line_start, line) in lines_with_offsets(content) {
            let cursor_on_line =
                cursor >= line_start && cursor <= line_start + line.len();

            self.detect_line_pattern(line, line_no, line_start, cursor_on_line, &mut out);
            self.detect_inline_patterns(line, line_no, line_start, &mut out);
        }

        out
    }

    /// Matches the line-level pattern (header, bullet, blockquote, fence),
    /// if any. At most one of these applies per line.
    fn detect_line_pattern(
        &self,
        line: &str,
        line_no: usize,
        line_start: usize,
        cursor_on_line: bool,
        out: &mut Vec<MarkdownPattern>,
    ) {
        if let Some(caps) = header_re().captures(line) {
            let marker = caps.get(1).expect("header marker group");
            let title = caps.get(2).expect("header title group");
            out.push(MarkdownPattern {
                kind: PatternKind::Header,
                span: Span::new(line_start, line_start + line.len()),
                syntax: marker.as_str().to_string(),
                content: title.as_str().to_string(),
                line: line_no,
                column: 0,
                bullet: None,
            });
            return;
        }

        if let Some(caps) = bullet_re().captures(line) {
            let indent = caps.get(1).expect("bullet indent group");
            let marker = caps.get(2).expect("bullet marker group");
            let text = caps.get(3).expect("bullet content group");
            out.push(MarkdownPattern {
                kind: PatternKind::Bullet,
                span: Span::new(line_start + marker.start(), line_start + line.len()),
                syntax: marker.as_str().to_string(),
                content: text.as_str().to_string(),
                line: line_no,
                column: indent.as_str().len(),
                bullet: BulletMarker::from_char(
                    marker.as_str().chars().next().expect("bullet marker char"),
                ),
            });
            return;
        }

        if let Some(caps) = fence_re().captures(line) {
            let indent = caps.get(1).expect("fence indent group");
            let marker = caps.get(2).expect("fence marker group");
            let language = caps.get(3).expect("fence language group");
            out.push(MarkdownPattern {
                kind: PatternKind::CodeFence,
                span: Span::new(line_start + marker.start(), line_start + line.len()),
                syntax: marker.as_str().to_string(),
                content: language.as_str().to_string(),
                line: line_no,
                column: indent.as_str().len(),
                bullet: None,
            });
            return;
        }

        if let Some(caps) = blockquote_re().captures(line) {
            let indent = caps.get(1).expect("quote indent group");
            let text = caps.get(2).expect("quote content group");
            out.push(MarkdownPattern {
                kind: PatternKind::Blockquote,
                span: Span::new(line_start + indent.as_str().len(), line_start + line.len()),
                syntax: ">".to_string(),
                content: text.as_str().to_string(),
                line: line_no,
                column: indent.as_str().len(),
                bullet: None,
            });
            return;
        }

        if !cursor_on_line {
            return;
        }

        // Partially-typed markers on the cursor's line.
        if let Some(caps) = header_stub_re().captures(line) {
            let marker = caps.get(1).expect("header stub marker group");
            out.push(MarkdownPattern {
                kind: PatternKind::Header,
                span: Span::new(line_start, line_start + line.len()),
                syntax: marker.as_str().to_string(),
                content: String::new(),
                line: line_no,
                column: 0,
                bullet: None,
            });
        } else if let Some(caps) = bullet_stub_re().captures(line) {
            let indent = caps.get(1).expect("bullet stub indent group");
            let marker = caps.get(2).expect("bullet stub marker group");
            out.push(MarkdownPattern {
                kind: PatternKind::Bullet,
                span: Span::new(line_start + marker.start(), line_start + line.len()),
                syntax: marker.as_str().to_string(),
                content: String::new(),
                line: line_no,
                column: indent.as_str().len(),
                bullet: BulletMarker::from_char(
                    marker.as_str().chars().next().expect("bullet stub marker char"),
                ),
            });
        }
    }

    /// Scans a line for inline spans via [`scan_inline`]. Wikilinks are
    /// recognized there as a raw zone but are not themselves decoration
    /// patterns, so they are skipped on emission.
    fn detect_inline_patterns(
        &self,
        line: &str,
        line_no: usize,
        line_start: usize,
        out: &mut Vec<MarkdownPattern>,
    ) {
        for span in scan_inline(line) {
            let (kind, syntax) = match span.kind {
                InlineSpanKind::Code => (PatternKind::InlineCode, "`"),
                InlineSpanKind::Bold => (PatternKind::Bold, "**"),
                InlineSpanKind::Italic => (PatternKind::Italic, "*"),
                InlineSpanKind::WikiLink => continue,
            };
            out.push(MarkdownPattern {
                kind,
                span: Span::new(line_start + span.span.start, line_start + span.span.end),
                syntax: syntax.to_string(),
                content: span.content,
                line: line_no,
                column: span.span.start,
                bullet: None,
            });
        }
    }
}

/// Inline construct kinds shared between the pattern detector and the AST
/// parser's paragraph scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InlineSpanKind {
    Code,
    WikiLink,
    Bold,
    Italic,
}

/// An inline match with offsets local to the scanned text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InlineSpan {
    pub kind: InlineSpanKind,
    /// Full span including delimiters, local to the scanned text.
    pub span: Span,
    /// Inner content between the delimiters.
    pub content: String,
}

fn wikilink_inline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[\[([^\[\]\n]+)\]\]").expect("invalid wikilink regex")
    })
}

/// Scans `text` for inline constructs in precedence order
/// code > wikilink > bold > italic.
///
/// Higher-precedence matches are masked out (byte-for-byte, preserving
/// offsets) before the next pattern runs, so a raw zone like a code span
/// suppresses emphasis and wikilinks inside it, and the single-asterisk
/// interior of `**bold**` is never reported as italic. Results are sorted by
/// start offset and guaranteed disjoint.
pub(crate) fn scan_inline(text: &str) -> Vec<InlineSpan> {
    let mut masked: Vec<u8> = text.as_bytes().to_vec();
    let mut out = Vec::new();

    let passes: [(InlineSpanKind, &Regex); 4] = [
        (InlineSpanKind::Code, inline_code_re()),
        (InlineSpanKind::WikiLink, wikilink_inline_re()),
        (InlineSpanKind::Bold, bold_re()),
        (InlineSpanKind::Italic, italic_re()),
    ];

    for (kind, re) in passes {
        // The masked buffer only ever replaces whole matches with spaces, so
        // it stays valid UTF-8.
        let view = std::str::from_utf8(&masked)
            .expect("masking preserves utf-8")
            .to_string();
        for caps in re.captures_iter(&view) {
            let full = caps.get(0).expect("inline full match");
            let inner = caps.get(1).expect("inline inner match");
            out.push(InlineSpan {
                kind,
                span: Span::new(full.start(), full.end()),
                content: inner.as_str().to_string(),
            });
            for b in &mut masked[full.start()..full.end()] {
                *b = b' ';
            }
        }
    }

    out.sort_by_key(|s| s.span.start);
    out
}

/// Classifies a single line as a bullet, returning
/// `(indent, marker, content)`. Shared with the bullet-to-node conversion,
/// which needs the raw indent text for style inference.
pub(crate) fn bullet_line(line: &str) -> Option<(&str, BulletMarker, &str)> {
    let caps = bullet_re().captures(line)?;
    let indent = caps.get(1).expect("bullet indent group").as_str();
    let marker = caps.get(2).expect("bullet marker group").as_str();
    let content = caps.get(3).expect("bullet content group").as_str();
    Some((
        indent,
        BulletMarker::from_char(marker.chars().next().expect("bullet marker char"))
            .expect("marker group matches bullet characters"),
        content,
    ))
}

/// Iterates lines with their 0-based index and buffer-absolute start offset.
/// Line text excludes the trailing newline and any trailing `\r`.
pub(crate) fn lines_with_offsets(content: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    content.split('\n').enumerate().map(move |(i, raw)| {
        let start = offset;
        offset += raw.len() + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        (i, start, line)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect(content: &str) -> Vec<MarkdownPattern> {
        PatternDetector::new().detect(content, 0)
    }

    fn find(patterns: &[MarkdownPattern], kind: PatternKind) -> Vec<&MarkdownPattern> {
        patterns.iter().filter(|p| p.kind == kind).collect()
    }

    #[test]
    fn detect_header_with_level_and_offsets() {
        let patterns = detect("### Section Title");
        let headers = find(&patterns, PatternKind::Header);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].syntax, "###");
        assert_eq!(headers[0].content, "Section Title");
        assert_eq!(headers[0].span, Span::new(0, 17));
        assert_eq!(headers[0].line, 0);
    }

    #[test]
    fn detect_bullets_with_indent_column() {
        let patterns = detect("- top\n  - nested\n\t- tabbed");
        let bullets = find(&patterns, PatternKind::Bullet);
        assert_eq!(bullets.len(), 3);
        assert_eq!(bullets[0].column, 0);
        assert_eq!(bullets[0].content, "top");
        assert_eq!(bullets[0].bullet, Some(BulletMarker::Dash));
        assert_eq!(bullets[1].column, 2);
        assert_eq!(bullets[1].line, 1);
        assert_eq!(bullets[2].column, 1); // one tab
    }

    #[test]
    fn bullet_markers_classified() {
        let patterns = detect("- a\n* b\n+ c");
        let bullets = find(&patterns, PatternKind::Bullet);
        assert_eq!(bullets[0].bullet, Some(BulletMarker::Dash));
        assert_eq!(bullets[1].bullet, Some(BulletMarker::Asterisk));
        assert_eq!(bullets[2].bullet, Some(BulletMarker::Plus));
    }

    #[test]
    fn bold_inside_bullet_content_overlaps_conceptually() {
        let patterns = detect("- has **bold** inside");
        assert_eq!(find(&patterns, PatternKind::Bullet).len(), 1);
        let bold = find(&patterns, PatternKind::Bold);
        assert_eq!(bold.len(), 1);
        assert_eq!(bold[0].content, "bold");
        assert_eq!(bold[0].span, Span::new(6, 14));
    }

    #[test]
    fn bold_interior_not_reported_as_italic() {
        let patterns = detect("**strong** and *slanted*");
        assert_eq!(find(&patterns, PatternKind::Bold).len(), 1);
        let italics = find(&patterns, PatternKind::Italic);
        assert_eq!(italics.len(), 1);
        assert_eq!(italics[0].content, "slanted");
    }

    #[test]
    fn inline_code_wins_over_emphasis() {
        let patterns = detect("`*not italic*`");
        assert_eq!(find(&patterns, PatternKind::InlineCode).len(), 1);
        assert!(find(&patterns, PatternKind::Italic).is_empty());
    }

    #[test]
    fn detect_blockquote_and_fence_open() {
        let patterns = detect("> quoted text\n```rust");
        let quotes = find(&patterns, PatternKind::Blockquote);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].content, "quoted text");
        let fences = find(&patterns, PatternKind::CodeFence);
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].content, "rust");
        assert_eq!(fences[0].line, 1);
    }

    #[test]
    fn offsets_are_bytes_across_multibyte_text() {
        let content = "héllo **wörld**";
        let patterns = detect(content);
        let bold = find(&patterns, PatternKind::Bold);
        assert_eq!(bold.len(), 1);
        assert_eq!(
            &content[bold[0].span.start..bold[0].span.end],
            "**wörld**"
        );
    }

    #[test]
    fn partially_typed_bullet_reported_on_cursor_line_only() {
        let detector = PatternDetector::new();

        // Cursor at end of the "- " line: stub bullet reported.
        let with_cursor = detector.detect("- ", 2);
        let bullets: Vec<_> = with_cursor
            .iter()
            .filter(|p| p.kind == PatternKind::Bullet)
            .collect();
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].content, "");

        // Cursor elsewhere: the bare marker is not a pattern.
        let without_cursor = detector.detect("- \ntext here", 8);
        assert!(
            without_cursor
                .iter()
                .all(|p| p.kind != PatternKind::Bullet)
        );
    }

    #[test]
    fn partially_typed_header_reported_on_cursor_line() {
        let patterns = PatternDetector::new().detect("##", 2);
        let headers = find(&patterns, PatternKind::Header);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].syntax, "##");
        assert_eq!(headers[0].content, "");
    }

    #[test]
    fn cursor_past_end_is_clamped() {
        let patterns = PatternDetector::new().detect("# Title", 10_000);
        assert_eq!(find(&patterns, PatternKind::Header).len(), 1);
    }

    #[test]
    fn empty_input_yields_no_patterns() {
        assert!(detect("").is_empty());
    }

    #[test]
    fn scan_inline_orders_disjoint_spans() {
        let spans = scan_inline("**a** then `b` then *c* and [[d]]");
        let kinds: Vec<_> = spans.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InlineSpanKind::Bold,
                InlineSpanKind::Code,
                InlineSpanKind::Italic,
                InlineSpanKind::WikiLink,
            ]
        );
        for pair in spans.windows(2) {
            assert!(pair[0].span.end <= pair[1].span.start);
        }
    }

    #[test]
    fn scan_inline_code_suppresses_wikilink() {
        let spans = scan_inline("`[[not a link]]`");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, InlineSpanKind::Code);
    }

    #[test]
    fn scan_inline_unclosed_constructs_are_plain_text() {
        assert!(scan_inline("[[unclosed and `dangling").is_empty());
    }
}
