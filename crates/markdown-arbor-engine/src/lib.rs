pub mod ast;
pub mod blocks;
pub mod content;
pub mod outline;
pub mod patterns;
pub mod wysiwyg;

// Re-export key types for easier usage
pub use ast::{AstNode, ContentMetadata, DocumentNode, Span};
pub use blocks::{BlockContinuationContext, MultilineBlock, MultilineBlockProcessor};
pub use content::{ContentProcessor, PreparedContent, ValidationReport, WikiLink};
pub use outline::{BulletConversion, BulletToNodeConverter, TreeNodeData};
pub use patterns::{MarkdownPattern, PatternDetector};
pub use wysiwyg::{ProcessedContent, ProcessorConfig, WysiwygProcessor};
