use std::time::Duration;

use markdown_arbor_engine::ast::{AstNode, span_invariants_hold};
use markdown_arbor_engine::blocks::MultilineBlockProcessor;
use markdown_arbor_engine::content::ContentProcessor;
use markdown_arbor_engine::outline::BulletToNodeConverter;
use markdown_arbor_engine::patterns::{PatternDetector, PatternKind};
use markdown_arbor_engine::wysiwyg::{ProcessorConfig, WysiwygProcessor};

use pretty_assertions::assert_eq;
use rstest::rstest;

const COMPOSITE_DOC: &str = "\
# Project Log

Intro paragraph with [[Project A|PA]], **bold** and `inline code`.

## Tasks

- Review [[Project B]]
  - Sub task *one*
  - Sub task two
- Ship release

> A quote to remember
> across two lines

```rust
fn main() {}
```";

#[rstest]
#[case("# Title\n\nplain paragraph")]
#[case("## Header\n\n**bold** and *italic* and `code`")]
#[case("[[A]] and [[B|bee]] in one paragraph")]
#[case(COMPOSITE_DOC)]
fn reparse_of_regenerated_source_is_structurally_equal(#[case] source: &str) {
    let processor = ContentProcessor::new();

    let first = processor.parse_markdown(source);
    let regenerated = processor.ast_to_markdown(&first);
    let second = processor.parse_markdown(&regenerated);

    assert!(
        AstNode::Document(first.clone()).structure_eq(&AstNode::Document(second)),
        "structure diverged after round-trip:\n{regenerated}"
    );
    assert!(span_invariants_hold(&AstNode::Document(first)));
}

#[test]
fn pattern_offsets_agree_with_the_source_buffer() {
    let detector = PatternDetector::new();
    for pattern in detector.detect(COMPOSITE_DOC, 0) {
        let slice = &COMPOSITE_DOC[pattern.span.start..pattern.span.end];
        match pattern.kind {
            PatternKind::Bold => assert_eq!(slice, format!("**{}**", pattern.content)),
            PatternKind::InlineCode => assert_eq!(slice, format!("`{}`", pattern.content)),
            PatternKind::Header => {
                assert!(slice.starts_with(&pattern.syntax));
                assert!(slice.ends_with(&pattern.content));
            }
            _ => assert!(!slice.is_empty()),
        }
    }
}

#[test]
fn bullet_conversion_and_detection_agree_on_the_same_lines() {
    let detector = PatternDetector::new();
    let converter = BulletToNodeConverter::new();

    let bullet_count = detector
        .detect(COMPOSITE_DOC, 0)
        .iter()
        .filter(|p| p.kind == PatternKind::Bullet)
        .count();
    let conversion = converter.convert(COMPOSITE_DOC, "root");

    assert_eq!(conversion.new_nodes.len(), bullet_count);
    // The residual content keeps everything that was not a bullet.
    assert!(conversion.cleaned_content.contains("# Project Log"));
    assert!(conversion.cleaned_content.contains("> A quote to remember"));
    assert!(!conversion.cleaned_content.contains("- Ship release"));
}

#[test]
fn converted_hierarchy_matches_indentation() {
    let conversion =
        BulletToNodeConverter::new().convert(COMPOSITE_DOC, "root");
    let nodes = &conversion.new_nodes;

    let review = nodes.iter().find(|n| n.title.starts_with("Review")).unwrap();
    let sub_one = nodes.iter().find(|n| n.title.starts_with("Sub task *one*")).unwrap();
    let ship = nodes.iter().find(|n| n.title == "Ship release").unwrap();

    assert_eq!(review.depth, 0);
    assert_eq!(review.parent_id, "root");
    assert_eq!(sub_one.depth, 1);
    assert_eq!(sub_one.parent_id, review.id);
    assert_eq!(ship.depth, 0);
    assert!(review.children.contains(&sub_one.id));
}

#[test]
fn multiline_blocks_found_inside_composite_document() {
    let blocks = MultilineBlockProcessor::new().detect_multiline_blocks(COMPOSITE_DOC, 0);
    assert_eq!(blocks.len(), 2);
    assert!(!blocks[0].incomplete);
    assert_eq!(blocks[1].language.as_deref(), Some("rust"));
    // The fence is closed by the final ``` line.
    assert!(!blocks[1].incomplete);
}

#[test]
fn wikilinks_extracted_across_the_document() {
    let prepared = ContentProcessor::new().prepare_backlink_syntax(COMPOSITE_DOC);
    let targets: Vec<_> = prepared.link_positions.keys().cloned().collect();
    assert_eq!(targets, vec!["Project A", "Project B"]);
    for link in &prepared.links {
        assert_eq!(&COMPOSITE_DOC[link.start..link.end], link.text);
    }
}

#[test]
fn pathological_buffer_degrades_gracefully() {
    // ~1MB of unterminated-fence-and-bullet soup.
    let chunk = "- item [[link]] **bold\n> quote\n```\nunding fence\n";
    let mut pathological = String::new();
    while pathological.len() < 1_000_000 {
        pathological.push_str(chunk);
    }

    let mut processor = WysiwygProcessor::with_config(ProcessorConfig {
        max_processing_time: Duration::ZERO,
        ..ProcessorConfig::default()
    });

    let result = processor.process(&pathological, pathological.len());
    assert!(!result.html.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("budget")));
}

#[test]
fn sanitized_content_still_parses() {
    let processor = ContentProcessor::new();
    let hostile = "# Notes\n\n<script>alert(1)</script> keep **this** text";

    let report = processor.validate_content(hostile);
    assert!(!report.is_valid);

    let cleaned = processor.sanitize_content(hostile);
    let doc = processor.parse_markdown(&cleaned);
    let html = processor.render_ast(&doc);
    assert!(html.contains("this"));
    assert!(!html.to_lowercase().contains("<script"));
}
