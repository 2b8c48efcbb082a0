//! slidemark-ast - Document Model definitions
//!
//! This crate provides the node types produced by the slidemark model
//! builder and the visitor protocol every output format is written against.

pub mod block;
pub mod document;
pub mod inline;
pub mod visit;

pub use block::{
    Block, BlockQuote, Heading, List, ListEntry, ListItem, ListType, Metadata, Paragraph, Section,
    Table, TableCell, TableData, TableHeading, TableRow,
};
pub use document::{Lane, Slide};
pub use inline::{plain_text, Bold, Code, Image, Inline, Italic, Link, Text};
pub use visit::{Node, Visitor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
