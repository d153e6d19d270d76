use std::time::SystemTime;

use crate::ast::{
    AstNode, ContentMetadata, DocumentNode, HeaderNode, InlineSpanNode, ParagraphNode, Span,
    TextNode, WikiLinkNode,
};
use crate::content::{header_marker, strip_markdown_syntax};
use crate::patterns::{InlineSpanKind, lines_with_offsets, scan_inline};

/// Parses a full buffer into a document tree.
///
/// Line-oriented outer pass: header lines become [`HeaderNode`]s, other
/// non-blank lines accumulate into a paragraph run; a header or blank line
/// flushes the run, which is then scanned as a unit for inline constructs.
pub(crate) fn parse_document(source: &str) -> DocumentNode {
    if source.is_empty() {
        return DocumentNode::empty();
    }

    let mut children: Vec<AstNode> = Vec::new();
    // Current paragraph run as a byte range into `source`.
    let mut run: Option<Span> = None;

    let flush_run = |run: &mut Option<Span>, children: &mut Vec<AstNode>| {
        if let Some(span) = run.take() {
            let text = &source[span.start..span.end];
            if !text.trim().is_empty() {
                children.push(AstNode::Paragraph(parse_paragraph(span.start, text)));
            }
        }
    };

    for (_, line_start, line) in lines_with_offsets(source) {
        let line_end = line_start + line.len();

        if let Some((marker, title)) = header_marker(line) {
            flush_run(&mut run, &mut children);
            children.push(AstNode::Header(HeaderNode {
                span: Span::new(line_start, line_end),
                level: marker.len() as u8,
                content: title.to_string(),
                raw_syntax: marker.to_string(),
            }));
        } else if line.trim().is_empty() {
            flush_run(&mut run, &mut children);
        } else {
            run = Some(Span::new(
                run.map_or(line_start, |r| r.start),
                line_end,
            ));
        }
    }
    flush_run(&mut run, &mut children);

    let metadata = build_metadata(source, &children);

    DocumentNode {
        span: Span::new(0, source.len()),
        children,
        metadata,
    }
}

/// Scans a paragraph run for inline constructs and interleaves them with
/// plain-text fragments, all at buffer-absolute offsets.
fn parse_paragraph(base: usize, text: &str) -> ParagraphNode {
    let mut children = Vec::new();
    let mut cursor = 0usize;

    let flush_text = |children: &mut Vec<AstNode>, from: usize, to: usize| {
        if to > from {
            children.push(AstNode::Text(TextNode {
                span: Span::new(base + from, base + to),
                text: text[from..to].to_string(),
            }));
        }
    };

    for inline in scan_inline(text) {
        flush_text(&mut children, cursor, inline.span.start);
        let span = Span::new(base + inline.span.start, base + inline.span.end);
        let raw_syntax = text[inline.span.start..inline.span.end].to_string();

        children.push(match inline.kind {
            InlineSpanKind::Code => AstNode::Code(InlineSpanNode {
                span,
                content: inline.content,
                raw_syntax,
            }),
            InlineSpanKind::Bold => AstNode::Bold(InlineSpanNode {
                span,
                content: inline.content,
                raw_syntax,
            }),
            InlineSpanKind::Italic => AstNode::Italic(InlineSpanNode {
                span,
                content: inline.content,
                raw_syntax,
            }),
            InlineSpanKind::WikiLink => {
                let (target, display_text) = match inline.content.split_once('|') {
                    Some((target, display)) => (target.trim(), display.trim()),
                    None => (inline.content.trim(), inline.content.trim()),
                };
                AstNode::WikiLink(WikiLinkNode {
                    span,
                    target: target.to_string(),
                    display_text: display_text.to_string(),
                    raw_syntax,
                })
            }
        });
        cursor = inline.span.end;
    }
    flush_text(&mut children, cursor, text.len());

    ParagraphNode {
        span: Span::new(base, base + text.len()),
        children,
    }
}

fn build_metadata(source: &str, children: &[AstNode]) -> ContentMetadata {
    let inline = scan_inline(source);
    let inline_format_count = inline
        .iter()
        .filter(|s| {
            matches!(
                s.kind,
                InlineSpanKind::Bold | InlineSpanKind::Italic | InlineSpanKind::Code
            )
        })
        .count();
    let has_wiki_links = inline.iter().any(|s| s.kind == InlineSpanKind::WikiLink);

    ContentMetadata {
        total_characters: source.chars().count(),
        word_count: strip_markdown_syntax(source).split_whitespace().count(),
        has_wiki_links,
        header_count: children
            .iter()
            .filter(|c| matches!(c, AstNode::Header(_)))
            .count(),
        inline_format_count,
        last_modified: SystemTime::now(),
    }
}
