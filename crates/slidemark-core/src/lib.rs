//! slidemark-core - Markdown slides, one tree, many outputs
//!
//! Core library for slidemark: parses the slide markdown dialect into a
//! transit tree, builds the Document Model from it and renders the model
//! through the output visitors.
//!
//! # Example
//!
//! ```
//! use slidemark_ast::Node;
//! use slidemark_core::{build_slide, parse_markdown, MarkdownVisitor};
//!
//! let tree = parse_markdown("<!-- test: meta -->\ntext");
//! assert_eq!(tree["content"][0]["attributes"]["metadata"]["test"], "meta");
//!
//! let slide = build_slide(&tree).unwrap();
//! let markdown = slide.accept(&mut MarkdownVisitor::new());
//! assert_eq!(markdown, "<!--test: meta-->\n\ntext\n");
//! ```

pub mod builder;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod registry;
pub mod tokens;
pub mod transit;
pub mod visitors;

// Re-export main types and functions
pub use builder::{build_block, build_inline, build_lane, build_slide, build_slot};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{BuildError, Result};
pub use parser::{parse_document, parse_markdown, parse_with, split_slides};
pub use registry::{ImageRegistry, MetadataRegistry};
pub use visitors::{
    to_json_string, Analysis, AnalysisVisitor, HtmlVisitor, JsonVisitor, MarkdownVisitor,
    ReductionVisitor,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "1.0.0");
    }
}
