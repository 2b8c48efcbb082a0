//! Block-level (outer) elements for slide structure
//!
//! This module defines the elements that form a slide body: paragraphs,
//! headings, lists, block quotes, tables, sections and horizontal lines.
//! Every block except [`Block::HorizontalLine`] carries [`Metadata`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::inline::Inline;

/// The two metadata channels attached to an element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Names resolved against an externally supplied metadata registry
    pub global_tags: Vec<String>,
    /// Key/value pairs embedded directly in the source
    pub local: IndexMap<String, String>,
}

impl Metadata {
    /// Metadata with no tags and no local pairs
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.global_tags.push(tag.into());
        self
    }

    /// Add a local key/value pair
    pub fn with_local(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.local.insert(key.into(), value.into());
        self
    }

    /// Check if both channels are empty
    pub fn is_empty(&self) -> bool {
        self.global_tags.is_empty() && self.local.is_empty()
    }
}

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A paragraph of inline content
    Paragraph(Paragraph),
    /// A heading
    Heading(Heading),
    /// An ordered or unordered list
    List(List),
    /// A block quote
    BlockQuote(BlockQuote),
    /// A table
    Table(Table),
    /// A keyed section opened by `<!-- +KEY: VALUE -->`
    Section(Section),
    /// A horizontal rule
    HorizontalLine,
}

impl Block {
    /// Metadata of this block, if it carries any channel
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Block::Paragraph(p) => Some(&p.metadata),
            Block::Heading(h) => Some(&h.metadata),
            Block::List(l) => Some(&l.metadata),
            Block::BlockQuote(q) => Some(&q.metadata),
            Block::Table(t) => Some(&t.metadata),
            Block::Section(s) => Some(&s.metadata),
            Block::HorizontalLine => None,
        }
    }
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub content: Vec<Inline>,
    pub metadata: Metadata,
}

/// A heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (1-6, where 1 is the highest)
    pub level: u8,
    pub content: Vec<Inline>,
    pub metadata: Metadata,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            level: 1,
            content: Vec::new(),
            metadata: Metadata::default(),
        }
    }
}

/// List type variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListType {
    /// Bullet list
    Unordered,
    /// Numbered list
    Ordered,
}

impl ListType {
    /// Name used in the transit tree
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Unordered => "unordered",
            ListType::Ordered => "ordered",
        }
    }

    /// Parse the transit tree name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unordered" => Some(ListType::Unordered),
            "ordered" => Some(ListType::Ordered),
            _ => None,
        }
    }
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub list_type: ListType,
    /// Items and nested lists, in source order
    pub content: Vec<ListEntry>,
    pub metadata: Metadata,
}

/// An entry of a list: an item, or a list nested after an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListEntry {
    Item(ListItem),
    List(List),
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
}

/// A block quote
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockQuote {
    pub content: Vec<Block>,
    pub metadata: Metadata,
}

/// A table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    pub metadata: Metadata,
}

/// A table row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A table cell; its kind comes from the source syntax, not its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableCell {
    Heading(TableHeading),
    Data(TableData),
}

impl TableCell {
    /// Inline content of the cell regardless of kind
    pub fn content(&self) -> &[Inline] {
        match self {
            TableCell::Heading(h) => &h.content,
            TableCell::Data(d) => &d.content,
        }
    }
}

/// A header cell (`th`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableHeading {
    pub content: Vec<Inline>,
}

/// A data cell (`td`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    pub content: Vec<Inline>,
}

/// A keyed section scope
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    pub value: String,
    pub content: Vec<Block>,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_default() {
        let para = Paragraph::default();
        assert!(para.content.is_empty());
        assert!(para.metadata.is_empty());
    }

    #[test]
    fn test_heading_default_level() {
        assert_eq!(Heading::default().level, 1);
    }

    #[test]
    fn test_list_type_names() {
        assert_eq!(ListType::Ordered.as_str(), "ordered");
        assert_eq!(ListType::from_name("unordered"), Some(ListType::Unordered));
        assert_eq!(ListType::from_name("bulleted"), None);
    }

    #[test]
    fn test_horizontal_line_has_no_metadata() {
        assert!(Block::HorizontalLine.metadata().is_none());
        let para = Block::Paragraph(Paragraph {
            content: vec![],
            metadata: Metadata::new().with_tag("intro"),
        });
        assert_eq!(para.metadata().unwrap().global_tags, vec!["intro"]);
    }

    #[test]
    fn test_table_cell_kind_is_explicit() {
        let row = TableRow {
            cells: vec![
                TableCell::Data(TableData {
                    content: vec![Inline::text("a")],
                }),
                TableCell::Heading(TableHeading {
                    content: vec![Inline::text("b")],
                }),
            ],
        };
        assert!(matches!(row.cells[1], TableCell::Heading(_)));
        assert_eq!(row.cells[0].content(), &[Inline::text("a")]);
    }
}
