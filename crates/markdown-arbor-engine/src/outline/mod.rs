use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::parse_header_level;
use crate::patterns::bullet_line;

/// A node proposed for the external hierarchy store.
///
/// Ownership transfers to the store when the conversion result is returned;
/// the engine never mutates a node afterwards. The store remains responsible
/// for persisted ids/ordering sentinels and for triggering re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeData {
    /// Freshly assigned UUID v4.
    pub id: String,
    pub title: String,
    pub content: String,
    /// `"text"`, or `"header"` when the bullet text is itself a header line.
    pub node_type: String,
    /// Nesting level, 0 for top-level bullets.
    pub depth: usize,
    /// Parent bullet's id, or the converted node's own parent at depth 0.
    pub parent_id: String,
    /// Child ids in insertion order.
    pub children: Vec<String>,
    pub expanded: bool,
    pub has_children: bool,
}

/// Result of promoting bulleted lines into child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletConversion {
    /// The input with every bullet line removed.
    pub cleaned_content: String,
    /// New nodes in document order.
    pub new_nodes: Vec<TreeNodeData>,
}

/// Indentation style of a bullet run, inferred per conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IndentStyle {
    /// Spaces with the given width per level.
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    /// Infers the style from the bullet indents present. Tabs win when any
    /// bullet uses them; otherwise the smallest non-zero indent width is the
    /// unit, defaulting to 2.
    fn infer<'a>(indents: impl Iterator<Item = &'a str>) -> Self {
        let mut unit: Option<usize> = None;
        for indent in indents {
            if indent.contains('\t') {
                return IndentStyle::Tabs;
            }
            if !indent.is_empty() {
                unit = Some(unit.map_or(indent.len(), |u| u.min(indent.len())));
            }
        }
        IndentStyle::Spaces(unit.unwrap_or(2))
    }

    /// Maps an indent to its nominal depth. Widths that are not a multiple
    /// of the unit round down to the nearest valid level.
    fn depth_of(&self, indent: &str) -> usize {
        match self {
            IndentStyle::Tabs => indent.chars().filter(|&c| c == '\t').count(),
            IndentStyle::Spaces(unit) => indent.len() / unit,
        }
    }
}

/// Converts a block of bulleted lines into a hierarchy of new child nodes
/// plus the residual bullet-free content.
#[derive(Debug, Default)]
pub struct BulletToNodeConverter;

impl BulletToNodeConverter {
    pub fn new() -> Self {
        Self
    }

    /// Classifies each line as bullet or non-bullet and builds the node
    /// hierarchy with an indent stack: the first bullet of a run opens depth
    /// 0, deeper indent descends exactly one level, equal indent is a
    /// sibling, shallower indent pops to a matching-or-shallower level. A
    /// blank line terminates the run; non-bullet lines stay in
    /// `cleaned_content`. Without any bullets this is a no-op.
    pub fn convert(&self, content: &str, parent_node_id: &str) -> BulletConversion {
        let indent_style = IndentStyle::infer(
            content
                .lines()
                .filter_map(bullet_line)
                .map(|(indent, _, _)| indent),
        );

        let mut cleaned: Vec<&str> = Vec::new();
        let mut nodes: Vec<TreeNodeData> = Vec::new();
        // (depth, index into nodes) of the open bullet chain.
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for line in content.lines() {
            let Some((indent, _, text)) = bullet_line(line) else {
                if line.trim().is_empty() {
                    // A blank line ends the run; later bullets restart at
                    // depth 0.
                    stack.clear();
                }
                cleaned.push(line);
                continue;
            };

            let nominal_depth = indent_style.depth_of(indent);
            while let Some(&(top_depth, _)) = stack.last() {
                if top_depth >= nominal_depth {
                    stack.pop();
                } else {
                    break;
                }
            }

            let (depth, parent_id) = match stack.last() {
                Some(&(parent_depth, parent_index)) => {
                    (parent_depth + 1, nodes[parent_index].id.clone())
                }
                None => (0, parent_node_id.to_string()),
            };

            let node = TreeNodeData {
                id: Uuid::new_v4().to_string(),
                title: text.trim().to_string(),
                content: text.to_string(),
                node_type: if parse_header_level(text) > 0 {
                    "header".to_string()
                } else {
                    "text".to_string()
                },
                depth,
                parent_id,
                children: Vec::new(),
                expanded: true,
                has_children: false,
            };

            if let Some(&(_, parent_index)) = stack.last() {
                nodes[parent_index].children.push(node.id.clone());
                nodes[parent_index].has_children = true;
            }

            nodes.push(node);
            stack.push((depth, nodes.len() - 1));
        }

        if nodes.is_empty() {
            return BulletConversion {
                cleaned_content: content.to_string(),
                new_nodes: nodes,
            };
        }

        BulletConversion {
            cleaned_content: cleaned.join("\n"),
            new_nodes: nodes,
        }
    }
}
