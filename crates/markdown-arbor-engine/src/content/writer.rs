use crate::ast::{AstNode, DocumentNode};

/// Reconstructs markdown source from a document tree.
///
/// Inverse of rendering: every node contributes its `raw_syntax` plus
/// content, top-level blocks are joined by one blank line. Reparsing the
/// output yields a structurally equal tree; exact whitespace between blocks
/// may be normalized.
pub(crate) fn write_document(doc: &DocumentNode) -> String {
    doc.children
        .iter()
        .map(write_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn write_block(node: &AstNode) -> String {
    match node {
        AstNode::Header(h) => format!("{} {}", h.raw_syntax, h.content),
        AstNode::Paragraph(p) => p.children.iter().map(write_inline).collect(),
        AstNode::Document(d) => write_document(d),
        // Inline nodes at the top level have no block wrapper to restore.
        other => write_inline(other),
    }
}

fn write_inline(node: &AstNode) -> String {
    match node {
        AstNode::Text(t) => t.text.clone(),
        AstNode::WikiLink(link) => link.raw_syntax.clone(),
        AstNode::Bold(n) | AstNode::Italic(n) | AstNode::Code(n) => n.raw_syntax.clone(),
        AstNode::Header(h) => format!("{} {}", h.raw_syntax, h.content),
        AstNode::Paragraph(p) => p.children.iter().map(write_inline).collect(),
        AstNode::Document(d) => write_document(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parser::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_round_trips_exactly() {
        let doc = parse_document("### Deep Title");
        assert_eq!(write_document(&doc), "### Deep Title");
    }

    #[test]
    fn inline_syntax_is_reconstructed() {
        let source = "mix of **bold**, *italic*, `code` and [[Page|alias]]";
        let doc = parse_document(source);
        assert_eq!(write_document(&doc), source);
    }

    #[test]
    fn blocks_joined_by_blank_line() {
        let doc = parse_document("# A\n\n\n\npara one\npara one continued");
        assert_eq!(write_document(&doc), "# A\n\npara one\npara one continued");
    }

    #[test]
    fn empty_document_writes_empty_string() {
        let doc = parse_document("");
        assert_eq!(write_document(&doc), "");
    }
}
