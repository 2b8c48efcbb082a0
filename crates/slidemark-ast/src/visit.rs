//! Double-dispatch visitor protocol
//!
//! Every node type implements [`Node::accept`], which calls back exactly one
//! `visit_*` method on the visitor. Visitors return a value per call and
//! parents fold the values returned for their children, so a visitor never
//! needs a shared result stack.
//!
//! # Example
//!
//! ```
//! use slidemark_ast::{Inline, Node, Visitor};
//! # use slidemark_ast::*;
//!
//! struct CountLinks;
//!
//! impl Visitor for CountLinks {
//!     type Output = usize;
//!     fn visit_text(&mut self, _: &Text) -> usize { 0 }
//!     fn visit_bold(&mut self, n: &Bold) -> usize { n.content.iter().map(|c| c.accept(self)).sum() }
//!     fn visit_italic(&mut self, n: &Italic) -> usize { n.content.iter().map(|c| c.accept(self)).sum() }
//!     fn visit_code(&mut self, _: &Code) -> usize { 0 }
//!     fn visit_link(&mut self, _: &Link) -> usize { 1 }
//!     fn visit_image(&mut self, _: &Image) -> usize { 0 }
//!     fn visit_paragraph(&mut self, n: &Paragraph) -> usize { n.content.iter().map(|c| c.accept(self)).sum() }
//!     fn visit_heading(&mut self, _: &Heading) -> usize { 0 }
//!     fn visit_list(&mut self, _: &List) -> usize { 0 }
//!     fn visit_list_item(&mut self, _: &ListItem) -> usize { 0 }
//!     fn visit_block_quote(&mut self, _: &BlockQuote) -> usize { 0 }
//!     fn visit_table(&mut self, _: &Table) -> usize { 0 }
//!     fn visit_table_row(&mut self, _: &TableRow) -> usize { 0 }
//!     fn visit_table_heading(&mut self, _: &TableHeading) -> usize { 0 }
//!     fn visit_table_data(&mut self, _: &TableData) -> usize { 0 }
//!     fn visit_section(&mut self, _: &Section) -> usize { 0 }
//!     fn visit_horizontal_line(&mut self) -> usize { 0 }
//!     fn visit_slide(&mut self, n: &Slide) -> usize { n.content.iter().map(|c| c.accept(self)).sum() }
//!     fn visit_lane(&mut self, _: &Lane) -> usize { 0 }
//! }
//!
//! let para = Paragraph { content: vec![Inline::link("a", "b")], ..Default::default() };
//! assert_eq!(para.accept(&mut CountLinks), 1);
//! ```

use crate::block::{
    Block, BlockQuote, Heading, List, ListEntry, ListItem, Paragraph, Section, Table, TableCell,
    TableData, TableHeading, TableRow,
};
use crate::document::{Lane, Slide};
use crate::inline::{Bold, Code, Image, Inline, Italic, Link, Text};

/// A consumer with one method per node variant
pub trait Visitor {
    /// Value produced for each visited node
    type Output;

    fn visit_text(&mut self, node: &Text) -> Self::Output;
    fn visit_bold(&mut self, node: &Bold) -> Self::Output;
    fn visit_italic(&mut self, node: &Italic) -> Self::Output;
    fn visit_code(&mut self, node: &Code) -> Self::Output;
    fn visit_link(&mut self, node: &Link) -> Self::Output;
    fn visit_image(&mut self, node: &Image) -> Self::Output;

    fn visit_paragraph(&mut self, node: &Paragraph) -> Self::Output;
    fn visit_heading(&mut self, node: &Heading) -> Self::Output;
    fn visit_list(&mut self, node: &List) -> Self::Output;
    fn visit_list_item(&mut self, node: &ListItem) -> Self::Output;
    fn visit_block_quote(&mut self, node: &BlockQuote) -> Self::Output;
    fn visit_table(&mut self, node: &Table) -> Self::Output;
    fn visit_table_row(&mut self, node: &TableRow) -> Self::Output;
    fn visit_table_heading(&mut self, node: &TableHeading) -> Self::Output;
    fn visit_table_data(&mut self, node: &TableData) -> Self::Output;
    fn visit_section(&mut self, node: &Section) -> Self::Output;
    fn visit_horizontal_line(&mut self) -> Self::Output;

    fn visit_slide(&mut self, node: &Slide) -> Self::Output;
    fn visit_lane(&mut self, node: &Lane) -> Self::Output;
}

/// A node that dispatches itself to a [`Visitor`]
pub trait Node {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output;
}

macro_rules! impl_node {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Node for $ty {
                fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
                    visitor.$method(self)
                }
            }
        )*
    };
}

impl_node! {
    Text => visit_text,
    Bold => visit_bold,
    Italic => visit_italic,
    Code => visit_code,
    Link => visit_link,
    Image => visit_image,
    Paragraph => visit_paragraph,
    Heading => visit_heading,
    List => visit_list,
    ListItem => visit_list_item,
    BlockQuote => visit_block_quote,
    Table => visit_table,
    TableRow => visit_table_row,
    TableHeading => visit_table_heading,
    TableData => visit_table_data,
    Section => visit_section,
    Slide => visit_slide,
    Lane => visit_lane,
}

impl Node for Inline {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Inline::Text(n) => visitor.visit_text(n),
            Inline::Bold(n) => visitor.visit_bold(n),
            Inline::Italic(n) => visitor.visit_italic(n),
            Inline::Code(n) => visitor.visit_code(n),
            Inline::Link(n) => visitor.visit_link(n),
            Inline::Image(n) => visitor.visit_image(n),
        }
    }
}

impl Node for Block {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Block::Paragraph(n) => visitor.visit_paragraph(n),
            Block::Heading(n) => visitor.visit_heading(n),
            Block::List(n) => visitor.visit_list(n),
            Block::BlockQuote(n) => visitor.visit_block_quote(n),
            Block::Table(n) => visitor.visit_table(n),
            Block::Section(n) => visitor.visit_section(n),
            Block::HorizontalLine => visitor.visit_horizontal_line(),
        }
    }
}

impl Node for ListEntry {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            ListEntry::Item(n) => visitor.visit_list_item(n),
            ListEntry::List(n) => visitor.visit_list(n),
        }
    }
}

impl Node for TableCell {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            TableCell::Heading(n) => visitor.visit_table_heading(n),
            TableCell::Data(n) => visitor.visit_table_data(n),
        }
    }
}
