pub mod kinds;

use crate::ast::Span;
use crate::content::parse_header_level;
use crate::patterns::lines_with_offsets;

use kinds::{BlockQuote, CodeFence, FenceKind};

/// Kind tag for a multi-line construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultilineBlockKind {
    Blockquote,
    CodeBlock,
}

/// A blockquote or fenced-code span covering one or more source lines.
#[derive(Debug, Clone, PartialEq)]
pub struct MultilineBlock {
    pub kind: MultilineBlockKind,
    /// Language tag of a fenced code block, if one was given.
    pub language: Option<String>,
    /// Raw line text, markers included.
    pub lines: Vec<String>,
    /// The lines joined with `\n`.
    pub combined_content: String,
    /// 0-based line numbers covered by the block.
    pub line_numbers: Vec<usize>,
    /// Byte span from the first line start to the last line end.
    pub span: Span,
    /// Leading whitespace width of the opening line, in bytes.
    pub indent_level: usize,
    /// True iff the terminating condition was not observed before buffer
    /// end.
    pub incomplete: bool,
}

/// Cursor-relative view over the block containing the caret, answering what
/// Enter should do. Derived per call, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockContinuationContext {
    pub in_block: bool,
    pub current_block: Option<MultilineBlock>,
    /// False once the block's terminating condition is met at the cursor's
    /// current line.
    pub should_continue: bool,
    /// Text to auto-insert after the newline when continuing.
    pub expected_continuation: Option<String>,
}

impl BlockContinuationContext {
    fn outside() -> Self {
        Self {
            in_block: false,
            current_block: None,
            should_continue: false,
            expected_continuation: None,
        }
    }
}

/// Detects blockquote/code-fence spans and computes Enter-key continuation
/// behavior. Stateless between calls: every call rescans the buffer
/// snapshot.
#[derive(Debug, Default)]
pub struct MultilineBlockProcessor;

impl MultilineBlockProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Returns every multi-line block in the buffer, complete or not, in
    /// document order. The cursor does not narrow the scan; it is part of
    /// the per-edit call contract shared with [`continuation_context`].
    ///
    /// [`continuation_context`]: MultilineBlockProcessor::continuation_context
    pub fn detect_multiline_blocks(
        &self,
        content: &str,
        _cursor_position: usize,
    ) -> Vec<MultilineBlock> {
        let mut scanner = BlockScanner::default();
        for (line_no, line_start, line) in lines_with_offsets(content) {
            scanner.push(line_no, line_start, line);
        }
        scanner.finish()
    }

    /// Returns the block containing the cursor, if any, plus whether and
    /// with what prefix the block continues after Enter.
    pub fn continuation_context(
        &self,
        content: &str,
        cursor_position: usize,
    ) -> BlockContinuationContext {
        let cursor = cursor_position.min(content.len());

        let Some((cursor_line_no, cursor_line)) = line_at(content, cursor) else {
            return BlockContinuationContext::outside();
        };

        let blocks = self.detect_multiline_blocks(content, cursor);
        let Some(block) = blocks
            .into_iter()
            .find(|b| b.line_numbers.contains(&cursor_line_no))
        else {
            return BlockContinuationContext::outside();
        };

        let (should_continue, expected_continuation) = match block.kind {
            MultilineBlockKind::Blockquote => {
                if BlockQuote::split(cursor_line).is_some() {
                    (true, Some(BlockQuote::continuation(cursor_line)))
                } else {
                    // Cursor on a lazily-continued plain line: the quote is
                    // effectively over at this line.
                    (false, None)
                }
            }
            MultilineBlockKind::CodeBlock => {
                let on_closing_fence =
                    !block.incomplete && block.line_numbers.last() == Some(&cursor_line_no);
                if on_closing_fence {
                    (false, None)
                } else {
                    let indent = &block.lines[0]
                        [..block.lines[0].len() - block.lines[0].trim_start().len()];
                    (true, Some(indent.to_string()))
                }
            }
        };

        BlockContinuationContext {
            in_block: true,
            current_block: Some(block),
            should_continue,
            expected_continuation,
        }
    }
}

/// Finds the 0-based line number and text of the line containing `cursor`.
/// A cursor at the very end of a line (before its newline or at EOF) counts
/// as on that line.
fn line_at(content: &str, cursor: usize) -> Option<(usize, &str)> {
    lines_with_offsets(content)
        .find(|(_, start, line)| cursor >= *start && cursor <= start + line.len())
        .map(|(no, _, line)| (no, line))
}

/// Accumulator for the block currently being scanned.
#[derive(Debug)]
struct BlockAccum {
    language: Option<String>,
    lines: Vec<String>,
    line_numbers: Vec<usize>,
    start: usize,
    end: usize,
    indent_level: usize,
}

impl BlockAccum {
    fn open(line_no: usize, line_start: usize, line: &str, indent: usize) -> Self {
        Self {
            language: None,
            lines: vec![line.to_string()],
            line_numbers: vec![line_no],
            start: line_start,
            end: line_start + line.len(),
            indent_level: indent,
        }
    }

    fn extend(&mut self, line_no: usize, line_start: usize, line: &str) {
        self.lines.push(line.to_string());
        self.line_numbers.push(line_no);
        self.end = line_start + line.len();
    }

    fn into_block(self, kind: MultilineBlockKind, incomplete: bool) -> MultilineBlock {
        MultilineBlock {
            kind,
            language: self.language,
            combined_content: self.lines.join("\n"),
            span: Span::new(self.start, self.end),
            indent_level: self.indent_level,
            incomplete,
            lines: self.lines,
            line_numbers: self.line_numbers,
        }
    }
}

#[derive(Debug, Default)]
enum ScanState {
    #[default]
    Outside,
    Quote(BlockAccum),
    Fence {
        kind: FenceKind,
        accum: BlockAccum,
    },
}

/// Line-driven state machine over the buffer. Quote blocks end on a blank
/// line or another block opener (plain lines continue them lazily); fences
/// swallow everything until the matching bare marker; anything still open at
/// EOF flushes as incomplete.
#[derive(Debug, Default)]
struct BlockScanner {
    state: ScanState,
    out: Vec<MultilineBlock>,
}

impl BlockScanner {
    fn push(&mut self, line_no: usize, line_start: usize, line: &str) {
        match std::mem::take(&mut self.state) {
            ScanState::Outside => {
                self.open_from(line_no, line_start, line);
            }
            ScanState::Quote(mut accum) => {
                let is_blank = line.trim().is_empty();
                let opens_other =
                    parse_header_level(line) > 0 || CodeFence::sig(line).is_some();

                if !is_blank && !opens_other {
                    // Quote line or lazy continuation.
                    accum.extend(line_no, line_start, line);
                    self.state = ScanState::Quote(accum);
                } else {
                    self.out
                        .push(accum.into_block(MultilineBlockKind::Blockquote, false));
                    self.open_from(line_no, line_start, line);
                }
            }
            ScanState::Fence { kind, mut accum } => {
                accum.extend(line_no, line_start, line);
                if CodeFence::closes(kind, line) {
                    self.out
                        .push(accum.into_block(MultilineBlockKind::CodeBlock, false));
                    self.state = ScanState::Outside;
                } else {
                    self.state = ScanState::Fence { kind, accum };
                }
            }
        }
    }

    /// Dispatches a line from the outside state, opening a new block when it
    /// is a fence or quote opener.
    fn open_from(&mut self, line_no: usize, line_start: usize, line: &str) {
        if let Some(sig) = CodeFence::sig(line) {
            let mut accum = BlockAccum::open(line_no, line_start, line, sig.indent);
            accum.language = sig.language;
            self.state = ScanState::Fence {
                kind: sig.kind,
                accum,
            };
        } else if let Some((indent, _)) = BlockQuote::split(line) {
            self.state = ScanState::Quote(BlockAccum::open(line_no, line_start, line, indent));
        }
    }

    fn finish(mut self) -> Vec<MultilineBlock> {
        match self.state {
            ScanState::Outside => {}
            ScanState::Quote(accum) => {
                self.out
                    .push(accum.into_block(MultilineBlockKind::Blockquote, true));
            }
            ScanState::Fence { accum, .. } => {
                // Unterminated fence: still a block, just an open one.
                self.out
                    .push(accum.into_block(MultilineBlockKind::CodeBlock, true));
            }
        }
        self.out
    }
}
