/// Fence marker family; a fence closes only with the marker that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

/// Parsed facts about a fence marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceSig {
    pub kind: FenceKind,
    /// Leading whitespace width in bytes.
    pub indent: usize,
    /// Language tag after an opening marker, if any.
    pub language: Option<String>,
}

/// Code-fence line knowledge: opening/closing markers and language tags.
pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";

    /// Parses a fence marker line. `None` when the line is not a fence.
    pub fn sig(line: &str) -> Option<FenceSig> {
        let rest = line.trim_start_matches([' ', '\t']);
        let indent = line.len() - rest.len();

        let (kind, tail) = if let Some(tail) = rest.strip_prefix(Self::BACKTICKS) {
            (FenceKind::Backticks, tail)
        } else if let Some(tail) = rest.strip_prefix(Self::TILDES) {
            (FenceKind::Tildes, tail)
        } else {
            return None;
        };

        let language = tail.split_whitespace().next().map(str::to_string);
        Some(FenceSig {
            kind,
            indent,
            language,
        })
    }

    /// Whether `line` closes a fence opened with `open`. A closing marker
    /// carries no language tag.
    pub fn closes(open: FenceKind, line: &str) -> bool {
        matches!(Self::sig(line), Some(sig) if sig.kind == open && sig.language.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_fence_with_language() {
        let sig = CodeFence::sig("```rust").unwrap();
        assert_eq!(sig.kind, FenceKind::Backticks);
        assert_eq!(sig.language.as_deref(), Some("rust"));
        assert_eq!(sig.indent, 0);
    }

    #[test]
    fn tilde_fence_without_language() {
        let sig = CodeFence::sig("~~~").unwrap();
        assert_eq!(sig.kind, FenceKind::Tildes);
        assert_eq!(sig.language, None);
    }

    #[test]
    fn indented_fence_records_indent() {
        let sig = CodeFence::sig("  ```python").unwrap();
        assert_eq!(sig.indent, 2);
        assert_eq!(sig.language.as_deref(), Some("python"));
    }

    #[test]
    fn plain_line_is_not_a_fence() {
        assert_eq!(CodeFence::sig("hello"), None);
    }

    #[test]
    fn bare_matching_marker_closes() {
        assert!(CodeFence::closes(FenceKind::Backticks, "```"));
        assert!(CodeFence::closes(FenceKind::Backticks, "  ``` "));
        assert!(CodeFence::closes(FenceKind::Tildes, "~~~"));
    }

    #[test]
    fn mismatched_or_tagged_marker_does_not_close() {
        assert!(!CodeFence::closes(FenceKind::Backticks, "~~~"));
        assert!(!CodeFence::closes(FenceKind::Tildes, "```"));
        assert!(!CodeFence::closes(FenceKind::Backticks, "```rust"));
    }
}
