/// Blockquote line knowledge: marker detection and Enter-key continuation.
pub struct BlockQuote;

impl BlockQuote {
    pub const PREFIX: char = '>';

    /// Splits a quote line into `(indent_width, content)`, where content is
    /// the text after the marker and one optional space. `None` when the
    /// line is not a quote line. A bare `>` is a quote line with empty
    /// content.
    pub fn split(line: &str) -> Option<(usize, &str)> {
        let rest = line.trim_start_matches([' ', '\t']);
        let indent = line.len() - rest.len();
        let after = rest.strip_prefix(Self::PREFIX)?;
        let content = after.strip_prefix(' ').unwrap_or(after);
        Some((indent, content))
    }

    /// Prefix to auto-insert after Enter on `line`: its leading whitespace
    /// plus `"> "`.
    pub fn continuation(line: &str) -> String {
        let rest = line.trim_start_matches([' ', '\t']);
        let indent = &line[..line.len() - rest.len()];
        format!("{indent}{} ", Self::PREFIX)
    }
}
