//! Markdown Visitor
//!
//! Serializes the Document Model back into the slide dialect so that
//! parsing the output yields an equal model.
//!
//! Pipeline: Model → Comrak AST → Markdown string
//!
//! Standard markdown is written by comrak's CommonMark formatter. Metadata
//! comments and section tags become HTML blocks in that AST. Emphasis
//! delimiters are chosen here and inserted as raw inline HTML: the
//! formatter always writes `**`/`*`, which merges runs such as `**_x_**`
//! or `*a*_b_` into something that reads back differently.
//!
//! Slide layout:
//!
//! ```text
//! ---
//! layout: two_column
//! ---
//! [slide-tag]
//!
//! ...content...
//!
//! ->[next-slide]
//! ```
//!
//! Only the first slide tag has a source form; further slide-level tags
//! and slide-level local metadata are not written.

use std::cell::RefCell;
use std::fmt::Write;

use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType as ComrakListType, NodeCode, NodeHeading,
    NodeHtmlBlock, NodeLink, NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use tracing::debug;

use slidemark_ast::{
    Block, BlockQuote, Bold, Code, Heading, Image, Inline, Italic, Lane, Link, List, ListEntry,
    ListItem, ListType, Metadata, Paragraph, Section, Slide, Table, TableData, TableHeading,
    TableRow, Text, Visitor,
};

/// Line between two slides of a lane written as one document
///
/// No grammar rule claims it; see [`crate::parser::split_slides`].
pub const SLIDE_BREAK: &str = "<!-- slide break: -->";

/// Separator between slides when rendering a lane
pub const SLIDE_SEPARATOR: &str = "\n\n<!-- slide break: -->\n\n";

/// Written by comrak between two adjacent lists
const END_LIST: &str = "<!-- end list -->\n\n";

/// Empty inline comment; the parser drops it, so it only splits delimiter runs
const RUN_BREAK: &str = "<!-- -->";

/// Markdown serializer
#[derive(Debug, Default)]
pub struct MarkdownVisitor;

impl MarkdownVisitor {
    pub fn new() -> Self {
        Self
    }
}

fn commonmark_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.render.unsafe_ = true;
    options
}

/// Build a comrak document with `build` and format it as CommonMark
fn commonmark<F>(build: F) -> String
where
    F: for<'a> FnOnce(&CommonMarkTree<'a>, &'a AstNode<'a>),
{
    let arena = Arena::new();
    let tree = CommonMarkTree { arena: &arena };
    let root = tree.alloc(NodeValue::Document);
    build(&tree, root);

    let mut output = Vec::new();
    if let Err(err) = format_commonmark(root, &commonmark_options(), &mut output) {
        debug!(%err, "commonmark formatting failed");
    }
    String::from_utf8_lossy(&output)
        .replace(END_LIST, "")
        .trim_end_matches('\n')
        .to_string()
}

fn blocks_markdown(blocks: &[Block]) -> String {
    commonmark(|tree, root| tree.blocks(root, blocks))
}

fn inlines_markdown(content: &[Inline]) -> String {
    commonmark(|tree, root| {
        let paragraph = tree.append(root, NodeValue::Paragraph);
        tree.inlines(paragraph, content, None);
    })
}

/// Text escaped so it reads back as one literal run
fn escape_text(text: &str) -> String {
    commonmark(|tree, root| {
        let paragraph = tree.append(root, NodeValue::Paragraph);
        tree.text(paragraph, text);
    })
}

/// Metadata comments preceding a block, one per line
fn metadata_comments(metadata: &Metadata) -> String {
    let mut lines = Vec::new();
    for tag in &metadata.global_tags {
        lines.push(format!("<!-- {} -->", tag));
    }
    for (key, value) in &metadata.local {
        lines.push(format!("<!--{}: {}-->", key, value));
    }
    lines.join("\n")
}

/// Pointy-bracket link destination, for targets containing whitespace
fn bracketed_destination(target: &str) -> String {
    let mut out = String::with_capacity(target.len() + 2);
    out.push('<');
    for c in target.chars() {
        if matches!(c, '<' | '>' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('>');
    out
}

fn join_blocks(blocks: Vec<String>) -> String {
    blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn delimiter(self, underscore: bool) -> &'static str {
        match (self, underscore) {
            (Emphasis::Bold, false) => "**",
            (Emphasis::Bold, true) => "__",
            (Emphasis::Italic, false) => "*",
            (Emphasis::Italic, true) => "_",
        }
    }
}

/// An emphasis run already written: its kind and whether it used `*`
type Written = (Emphasis, bool);

/// Character next to an emphasis delimiter when `inline` is the neighbour
///
/// Only text can put a word character there; every other inline is
/// bounded by punctuation.
fn neighbour_char(inline: &Inline, from_end: bool) -> Option<char> {
    match inline {
        Inline::Text(text) if from_end => text.as_str().chars().last(),
        Inline::Text(text) => text.as_str().chars().next(),
        _ => None,
    }
}

/// `_` cannot open or close inside a word
fn underscore_fits(before: Option<char>, after: Option<char>) -> bool {
    ![before, after].into_iter().flatten().any(char::is_alphanumeric)
}

/// Builds comrak nodes for model content inside one arena
struct CommonMarkTree<'a> {
    arena: &'a Arena<AstNode<'a>>,
}

impl<'a> CommonMarkTree<'a> {
    fn alloc(&self, value: NodeValue) -> &'a AstNode<'a> {
        self.arena
            .alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
    }

    fn append(&self, parent: &'a AstNode<'a>, value: NodeValue) -> &'a AstNode<'a> {
        let node = self.alloc(value);
        parent.append(node);
        node
    }

    fn raw(&self, parent: &'a AstNode<'a>, literal: &str) {
        self.append(parent, NodeValue::HtmlInline(literal.to_string()));
    }

    fn html_block(&self, parent: &'a AstNode<'a>, literal: String) {
        self.append(
            parent,
            NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 2,
                literal,
            }),
        );
    }

    fn metadata(&self, parent: &'a AstNode<'a>, metadata: &Metadata) {
        if !metadata.is_empty() {
            self.html_block(parent, metadata_comments(metadata));
        }
    }

    fn blocks(&self, parent: &'a AstNode<'a>, blocks: &[Block]) {
        for block in blocks {
            self.block(parent, block);
        }
    }

    fn block(&self, parent: &'a AstNode<'a>, block: &Block) {
        if let Some(metadata) = block.metadata() {
            self.metadata(parent, metadata);
        }
        match block {
            Block::Paragraph(paragraph) => {
                let node = self.append(parent, NodeValue::Paragraph);
                self.inlines(node, &paragraph.content, None);
            }
            Block::Heading(heading) => {
                let node = self.append(
                    parent,
                    NodeValue::Heading(NodeHeading {
                        level: heading.level,
                        setext: false,
                    }),
                );
                self.inlines(node, &heading.content, None);
            }
            Block::List(list) => self.list(parent, list),
            Block::BlockQuote(quote) => {
                let node = self.append(parent, NodeValue::BlockQuote);
                self.blocks(node, &quote.content);
            }
            Block::Table(table) => self.table(parent, table),
            Block::Section(section) => {
                self.html_block(
                    parent,
                    format!("<!-- +{}: {} -->", section.key, section.value),
                );
                self.blocks(parent, &section.content);
                self.html_block(parent, "<!-- / -->".to_string());
            }
            Block::HorizontalLine => {
                self.append(parent, NodeValue::ThematicBreak);
            }
        }
    }

    fn list(&self, parent: &'a AstNode<'a>, list: &List) {
        let attributes = NodeList {
            list_type: match list.list_type {
                ListType::Ordered => ComrakListType::Ordered,
                ListType::Unordered => ComrakListType::Bullet,
            },
            start: 1,
            delimiter: ListDelimType::Period,
            bullet_char: b'-',
            tight: true,
            ..NodeList::default()
        };
        let node = self.append(parent, NodeValue::List(attributes));

        let mut item = None;
        for entry in &list.content {
            match entry {
                ListEntry::Item(list_item) => {
                    let host = self.append(node, NodeValue::Item(attributes));
                    if !list_item.content.is_empty() {
                        let paragraph = self.append(host, NodeValue::Paragraph);
                        self.inlines(paragraph, &list_item.content, None);
                    }
                    item = Some(host);
                }
                ListEntry::List(nested) => {
                    // Nested lists live inside the item before them
                    let host =
                        *item.get_or_insert_with(|| self.append(node, NodeValue::Item(attributes)));
                    self.metadata(host, &nested.metadata);
                    self.list(host, nested);
                }
            }
        }
    }

    fn table(&self, parent: &'a AstNode<'a>, table: &Table) {
        let columns = table.rows.first().map_or(0, |row| row.cells.len());
        if columns == 0 {
            debug!("table without header cells has no markdown form, skipping");
            return;
        }
        let node = self.append(
            parent,
            NodeValue::Table(NodeTable {
                alignments: vec![TableAlignment::None; columns],
                num_columns: columns,
                num_rows: table.rows.len(),
                num_nonempty_cells: 0,
            }),
        );
        for (index, row) in table.rows.iter().enumerate() {
            let row_node = self.append(node, NodeValue::TableRow(index == 0));
            for cell in &row.cells {
                let cell_node = self.append(row_node, NodeValue::TableCell);
                self.inlines(cell_node, cell.content(), None);
            }
        }
    }

    /// Append a run of inlines; `enclosing` is the emphasis they sit in
    fn inlines(&self, parent: &'a AstNode<'a>, content: &[Inline], enclosing: Option<Written>) {
        let mut previous: Option<Written> = None;

        for (index, inline) in content.iter().enumerate() {
            let (kind, children) = match inline {
                Inline::Bold(bold) => (Emphasis::Bold, &bold.content),
                Inline::Italic(italic) => (Emphasis::Italic, &italic.content),
                other => {
                    self.inline(parent, other);
                    previous = None;
                    continue;
                }
            };

            let first = index == 0;
            let last = index + 1 == content.len();
            // Same-character runs at the edge of the enclosing emphasis merge with it
            let nested = match enclosing {
                Some((outer, true)) => {
                    kind == outer || (outer == Emphasis::Bold && content.len() == 1)
                }
                _ => false,
            };
            let clash_before = (first && nested) || previous == Some((kind, true));
            let clash_after = last && nested;

            let before = index
                .checked_sub(1)
                .and_then(|i| neighbour_char(&content[i], true));
            let after = content.get(index + 1).and_then(|n| neighbour_char(n, false));
            let underscore = (clash_before || clash_after) && underscore_fits(before, after);
            let delimiter = kind.delimiter(underscore);

            if clash_before && !underscore {
                self.raw(parent, RUN_BREAK);
            }
            self.raw(parent, delimiter);
            self.inlines(parent, children, Some((kind, !underscore)));
            self.raw(parent, delimiter);
            if clash_after && !underscore {
                self.raw(parent, RUN_BREAK);
            }
            previous = Some((kind, !underscore));
        }
    }

    fn inline(&self, parent: &'a AstNode<'a>, inline: &Inline) {
        match inline {
            Inline::Text(text) => self.text(parent, text.as_str()),
            Inline::Code(code) => {
                let literal = slidemark_ast::plain_text(&code.content);
                if literal.is_empty() {
                    debug!("empty code span has no markdown form, skipping");
                    return;
                }
                self.append(
                    parent,
                    NodeValue::Code(NodeCode {
                        num_backticks: 1,
                        literal,
                    }),
                );
            }
            Inline::Link(link) => self.reference(parent, &link.target, &link.alias, false),
            Inline::Image(image) => self.reference(parent, &image.target, &image.alias, true),
            Inline::Bold(_) | Inline::Italic(_) => {
                self.inlines(parent, std::slice::from_ref(inline), None)
            }
        }
    }

    fn reference(&self, parent: &'a AstNode<'a>, target: &str, alias: &str, image: bool) {
        if target.chars().any(char::is_whitespace) {
            // The formatter percent-encodes whitespace in destinations
            self.raw(parent, if image { "![" } else { "[" });
            self.text(parent, alias);
            self.raw(parent, &format!("]({})", bracketed_destination(target)));
            return;
        }
        let link = NodeLink {
            url: target.to_string(),
            title: String::new(),
        };
        let value = if image {
            NodeValue::Image(link)
        } else {
            NodeValue::Link(link)
        };
        let node = self.append(parent, value);
        self.text(node, alias);
    }

    /// Text runs split at line breaks; table cells keep one line
    fn text(&self, parent: &'a AstNode<'a>, text: &str) {
        let in_cell = parent
            .ancestors()
            .any(|node| matches!(node.data.borrow().value, NodeValue::TableCell));
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                if in_cell {
                    self.append(parent, NodeValue::Text(" ".to_string()));
                } else {
                    self.append(parent, NodeValue::SoftBreak);
                }
            }
            if !line.is_empty() {
                self.append(parent, NodeValue::Text(line.to_string()));
            }
        }
    }
}

impl Visitor for MarkdownVisitor {
    type Output = String;

    fn visit_text(&mut self, node: &Text) -> String {
        escape_text(node.as_str())
    }

    fn visit_bold(&mut self, node: &Bold) -> String {
        inlines_markdown(&[Inline::Bold(node.clone())])
    }

    fn visit_italic(&mut self, node: &Italic) -> String {
        inlines_markdown(&[Inline::Italic(node.clone())])
    }

    fn visit_code(&mut self, node: &Code) -> String {
        inlines_markdown(&[Inline::Code(node.clone())])
    }

    fn visit_link(&mut self, node: &Link) -> String {
        inlines_markdown(&[Inline::Link(node.clone())])
    }

    fn visit_image(&mut self, node: &Image) -> String {
        inlines_markdown(&[Inline::Image(node.clone())])
    }

    fn visit_paragraph(&mut self, node: &Paragraph) -> String {
        blocks_markdown(&[Block::Paragraph(node.clone())])
    }

    fn visit_heading(&mut self, node: &Heading) -> String {
        blocks_markdown(&[Block::Heading(node.clone())])
    }

    fn visit_list(&mut self, node: &List) -> String {
        blocks_markdown(&[Block::List(node.clone())])
    }

    fn visit_list_item(&mut self, node: &ListItem) -> String {
        inlines_markdown(&node.content)
    }

    fn visit_block_quote(&mut self, node: &BlockQuote) -> String {
        blocks_markdown(&[Block::BlockQuote(node.clone())])
    }

    fn visit_table(&mut self, node: &Table) -> String {
        blocks_markdown(&[Block::Table(node.clone())])
    }

    fn visit_table_row(&mut self, node: &TableRow) -> String {
        let table = Table {
            rows: vec![node.clone()],
            metadata: Metadata::default(),
        };
        blocks_markdown(&[Block::Table(table)])
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn visit_table_heading(&mut self, node: &TableHeading) -> String {
        inlines_markdown(&node.content)
    }

    fn visit_table_data(&mut self, node: &TableData) -> String {
        inlines_markdown(&node.content)
    }

    fn visit_section(&mut self, node: &Section) -> String {
        blocks_markdown(&[Block::Section(node.clone())])
    }

    fn visit_horizontal_line(&mut self) -> String {
        blocks_markdown(&[Block::HorizontalLine])
    }

    fn visit_slide(&mut self, node: &Slide) -> String {
        if !node.active {
            return String::new();
        }

        let mut head = String::new();
        if !node.front_matter.is_empty() {
            head.push_str("---\n");
            for (key, value) in &node.front_matter {
                writeln!(head, "{}: {}", key, value).unwrap();
            }
            head.push_str("---\n");
        }
        if let Some(tag) = node.metadata.global_tags.first() {
            write!(head, "[{}]", escape_text(tag)).unwrap();
        }

        let mut parts = vec![
            head.trim_end().to_string(),
            blocks_markdown(&node.content),
        ];
        if !node.refs.is_empty() {
            let refs: Vec<String> = node
                .refs
                .iter()
                .map(|r| format!("->[{}]", escape_text(r)))
                .collect();
            parts.push(refs.join("\n"));
        }
        let mut out = join_blocks(parts);
        out.push('\n');
        out
    }

    fn visit_lane(&mut self, node: &Lane) -> String {
        node.slides
            .iter()
            .map(|slot| match slot {
                Some(slide) => self.visit_slide(slide).trim_end().to_string(),
                None => String::new(),
            })
            .collect::<Vec<_>>()
            .join(SLIDE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_slide;
    use crate::parser::parse_markdown;
    use slidemark_ast::Node;

    fn markdown(source: &str) -> String {
        let slide = build_slide(&parse_markdown(source)).unwrap();
        slide.accept(&mut MarkdownVisitor::new())
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            markdown("**bold *em*** and ``co`de`` [a](b) ![i](c)"),
            "**bold *em*** and ``co`de`` [a](b) ![i](c)\n"
        );
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(markdown("a \\*b\\* \\[c\\]"), "a \\*b\\* \\[c\\]\n");
        assert_eq!(markdown("\\- not a list"), "\\- not a list\n");
        assert_eq!(markdown("1\\. not a list"), "1\\. not a list\n");
    }

    #[test]
    fn test_bang_before_link_stays_text() {
        assert_eq!(markdown("Hello\\![a](b)"), "Hello\\![a](b)\n");
    }

    #[test]
    fn test_bold_around_italic() {
        assert_eq!(markdown("**_x_**"), "**_x_**\n");
        assert_eq!(markdown("***x***"), "***x***\n");
    }

    #[test]
    fn test_adjacent_emphasis_alternates_delimiter() {
        assert_eq!(markdown("*a*_b_"), "*a*_b_\n");
        assert_eq!(markdown("**a**__b__"), "**a**__b__\n");
    }

    #[test]
    fn test_adjacent_emphasis_before_word_is_split() {
        assert_eq!(markdown("*a*<!-- -->*b*c"), "*a*<!-- -->*b*c\n");
    }

    #[test]
    fn test_nested_lists() {
        assert_eq!(
            markdown("1. one\n2. two\n    - inner\n3. three"),
            "1.  one\n2.  two\n    - inner\n3.  three\n"
        );
    }

    #[test]
    fn test_nested_list_metadata_written_at_indent() {
        assert_eq!(
            markdown("- a\n  <!-- t -->\n  - b"),
            "- a\n  <!-- t -->\n  - b\n"
        );
    }

    #[test]
    fn test_block_quote_prefixes_every_line() {
        assert_eq!(
            markdown("> first\n>\n> second"),
            "> first\n> \n> second\n"
        );
    }

    #[test]
    fn test_metadata_before_element() {
        assert_eq!(
            markdown("<!-- hero -->\n<!--class: wide-->\n# Title"),
            "<!-- hero -->\n<!--class: wide-->\n\n# Title\n"
        );
    }

    #[test]
    fn test_slide_head_and_refs() {
        let out = markdown("---\nlayout: two\n---\n[intro]\nHello\n->[next]");
        assert_eq!(out, "---\nlayout: two\n---\n[intro]\n\nHello\n\n->[next]\n");
    }

    #[test]
    fn test_slide_tag_is_escaped() {
        assert_eq!(markdown("[\\*x\\*]\n\nbody"), "[\\*x\\*]\n\nbody\n");
    }

    #[test]
    fn test_section() {
        assert_eq!(
            markdown("<!-- +column: left -->\ntext\n<!-- / -->"),
            "<!-- +column: left -->\n\ntext\n\n<!-- / -->\n"
        );
    }

    #[test]
    fn test_code_span_fences() {
        assert_eq!(
            markdown("`x` and ``a`b`` and `` `a ``"),
            "`x` and ``a`b`` and `` `a ``\n"
        );
    }

    #[test]
    fn test_destination_with_spaces() {
        assert_eq!(markdown("[a](<my page.md>)"), "[a](<my page.md>)\n");
    }

    #[test]
    fn test_table_pipes_escaped() {
        assert_eq!(
            markdown("| a \\| b | c |\n|---|---|\n| 1 | 2 |"),
            "| a \\| b | c |\n| --- | --- |\n| 1 | 2 |\n"
        );
    }

    #[test]
    fn test_lane_uses_slide_break() {
        let mut lane = Lane::new("main");
        lane.push(Some(build_slide(&parse_markdown("one")).unwrap()));
        lane.push(Some(build_slide(&parse_markdown("two")).unwrap()));
        assert_eq!(
            lane.accept(&mut MarkdownVisitor::new()),
            "one\n\n<!-- slide break: -->\n\ntwo"
        );
        assert_eq!(SLIDE_SEPARATOR.trim(), SLIDE_BREAK);
    }

    #[test]
    fn test_placeholder_is_empty() {
        assert_eq!(Slide::placeholder().accept(&mut MarkdownVisitor::new()), "");
    }
}
