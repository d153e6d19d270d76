use std::sync::OnceLock;

use regex::Regex;

use crate::content::{parse_header_level, wikilink::unbalanced_delimiters};
use crate::patterns::lines_with_offsets;

/// Classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Malformed markdown structure; non-fatal.
    Syntax,
    /// Dangerous embedded content; fails validation (content can still be
    /// sanitized rather than rejected).
    Security,
    /// Inconsistent document structure such as header-level gaps;
    /// warning-only.
    Structure,
    /// Oversized buffers; warning-only.
    Performance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

/// Outcome of validating a buffer. `is_valid` holds iff no errors were
/// found; warnings never block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Character count above which a performance warning is raised.
pub const CONTENT_SIZE_WARNING_THRESHOLD: usize = 50_000;

fn script_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("invalid script block regex")
    })
}

fn script_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?script\b[^>]*>").expect("invalid script tag regex"))
}

fn event_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\son\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("invalid event attribute regex")
    })
}

fn dangerous_proto_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:javascript|vbscript)\s*:").expect("invalid protocol regex")
    })
}

fn base64_data_uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)data:[a-z0-9.+/-]*;base64[,a-z0-9+/=]*").expect("invalid data uri regex")
    })
}

fn dangerous_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)</?(?:iframe|object|embed|link|meta)\b[^>]*>")
            .expect("invalid dangerous tag regex")
    })
}

fn style_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\sstyle\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("invalid style attribute regex")
    })
}

/// Validates a buffer, reporting security/syntax errors and
/// structure/performance warnings. Validation never mutates content; pair it
/// with [`sanitize`] before persisting or rendering into a live surface.
pub(crate) fn validate(content: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if script_tag_re().is_match(content) {
        errors.push(ValidationIssue {
            kind: IssueKind::Security,
            message: "content contains a script tag".to_string(),
        });
    }
    if event_attr_re().is_match(content) {
        errors.push(ValidationIssue {
            kind: IssueKind::Security,
            message: "content contains an inline event handler attribute".to_string(),
        });
    }
    if dangerous_proto_re().is_match(content) {
        errors.push(ValidationIssue {
            kind: IssueKind::Security,
            message: "content contains a javascript: or vbscript: URI".to_string(),
        });
    }
    if base64_data_uri_re().is_match(content) {
        errors.push(ValidationIssue {
            kind: IssueKind::Security,
            message: "content contains a base64 data: URI".to_string(),
        });
    }

    let stray = unbalanced_delimiters(content);
    if stray > 0 {
        errors.push(ValidationIssue {
            kind: IssueKind::Syntax,
            message: format!("{stray} unbalanced wikilink delimiter(s)"),
        });
    }

    let char_count = content.chars().count();
    if char_count > CONTENT_SIZE_WARNING_THRESHOLD {
        warnings.push(ValidationIssue {
            kind: IssueKind::Performance,
            message: format!(
                "content is {char_count} characters, above the \
                 {CONTENT_SIZE_WARNING_THRESHOLD} character threshold"
            ),
        });
    }

    let mut prev_level = 0u8;
    for (_, _, line) in lines_with_offsets(content) {
        let level = parse_header_level(line);
        if level > 0 {
            if prev_level > 0 && level > prev_level + 1 {
                warnings.push(ValidationIssue {
                    kind: IssueKind::Structure,
                    message: format!(
                        "header level jumps from {prev_level} to {level} without intermediate \
                         levels"
                    ),
                });
            }
            prev_level = level;
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Strips dangerous constructs. Never rejects input; the result is always a
/// usable string.
pub(crate) fn sanitize(content: &str) -> String {
    let step = script_block_re().replace_all(content, "");
    let step = script_tag_re().replace_all(&step, "");
    let step = dangerous_tag_re().replace_all(&step, "");
    let step = event_attr_re().replace_all(&step, "");
    let step = style_attr_re().replace_all(&step, "");
    let step = dangerous_proto_re().replace_all(&step, "");
    let step = base64_data_uri_re().replace_all(&step, "");
    step.into_owned()
}
