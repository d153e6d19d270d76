use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::patterns::{InlineSpanKind, scan_inline};

/// A single extracted `[[...]]` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiLink {
    /// Full source text including delimiters.
    pub text: String,
    pub target: String,
    pub display_text: String,
    /// Byte offset of the opening `[[`.
    pub start: usize,
    /// Byte offset just past the closing `]]`.
    pub end: usize,
}

/// Extraction result grouping link offsets by target, for the host's
/// backlink indexing. Derived data, recomputed per call, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedContent {
    pub content: String,
    pub links: Vec<WikiLink>,
    /// Target → offsets of each occurrence, in document order.
    pub link_positions: BTreeMap<String, Vec<usize>>,
}

/// Extracts all wikilinks with their byte offsets. `[[target|display]]`
/// splits into target and display text; a bare `[[target]]` displays the
/// target itself. Code spans suppress extraction, unclosed delimiters are
/// plain text.
pub(crate) fn detect_wiki_links(content: &str) -> Vec<WikiLink> {
    scan_inline(content)
        .into_iter()
        .filter(|s| s.kind == InlineSpanKind::WikiLink)
        .map(|s| {
            let (target, display_text) = match s.content.split_once('|') {
                Some((target, display)) => (target.trim(), display.trim()),
                None => (s.content.trim(), s.content.trim()),
            };
            WikiLink {
                text: content[s.span.start..s.span.end].to_string(),
                target: target.to_string(),
                display_text: display_text.to_string(),
                start: s.span.start,
                end: s.span.end,
            }
        })
        .collect()
}

pub(crate) fn prepare_backlink_syntax(content: &str) -> PreparedContent {
    let links = detect_wiki_links(content);
    let mut link_positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for link in &links {
        link_positions
            .entry(link.target.clone())
            .or_default()
            .push(link.start);
    }
    PreparedContent {
        content: content.to_string(),
        links,
        link_positions,
    }
}

/// Counts unbalanced wikilink delimiters outside recognized links, for the
/// validation layer. Returns the number of stray `[[` and `]]` occurrences.
pub(crate) fn unbalanced_delimiters(content: &str) -> usize {
    // Delimiters inside recognized links or code raw zones are accounted for.
    let spans: Vec<_> = scan_inline(content)
        .into_iter()
        .filter(|s| matches!(s.kind, InlineSpanKind::WikiLink | InlineSpanKind::Code))
        .map(|s| s.span)
        .collect();
    let covered = |pos: usize| spans.iter().any(|sp| sp.contains(pos));

    let mut stray = 0;
    for (pos, _) in content.match_indices("[[") {
        if !covered(pos) {
            stray += 1;
        }
    }
    for (pos, _) in content.match_indices("]]") {
        if !covered(pos) {
            stray += 1;
        }
    }
    stray
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_aliased_and_plain_links() {
        let links = detect_wiki_links("See [[Project A|PA]] and [[Project B]]");
        assert_eq!(links.len(), 2);

        assert_eq!(links[0].target, "Project A");
        assert_eq!(links[0].display_text, "PA");
        assert_eq!(links[0].text, "[[Project A|PA]]");
        assert_eq!(links[1].target, "Project B");
        assert_eq!(links[1].display_text, "Project B");

        // Non-overlapping, in-order offsets.
        assert!(links[0].end <= links[1].start);
        assert_eq!(links[0].start, 4);
        assert_eq!(links[0].end, 20);
    }

    #[test]
    fn link_offsets_slice_back_to_source() {
        let content = "intro [[Notes/Alpha]] outro";
        let links = detect_wiki_links(content);
        assert_eq!(&content[links[0].start..links[0].end], "[[Notes/Alpha]]");
    }

    #[test]
    fn code_span_suppresses_links() {
        assert!(detect_wiki_links("`[[not a link]]`").is_empty());
    }

    #[test]
    fn backlink_positions_group_by_target() {
        let prepared =
            prepare_backlink_syntax("[[A]] then [[B]] then [[A|again]]");
        assert_eq!(prepared.links.len(), 3);
        assert_eq!(prepared.link_positions["A"], vec![0, 22]);
        assert_eq!(prepared.link_positions["B"], vec![11]);
    }

    #[test]
    fn unclosed_delimiters_counted_as_stray() {
        assert_eq!(unbalanced_delimiters("ok [[Linked]] here"), 0);
        assert_eq!(unbalanced_delimiters("broken [[link without close"), 1);
        assert_eq!(unbalanced_delimiters("stray close ]] and [[open"), 2);
    }

    #[test]
    fn delimiters_inside_code_spans_are_not_stray() {
        assert_eq!(unbalanced_delimiters("`[[raw zone]]`"), 0);
    }
}
