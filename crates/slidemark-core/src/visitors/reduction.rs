//! Reduction Visitor
//!
//! Decides whether a subtree is compliant with a filter: any text, link or
//! image containing one of the keywords, or any element carrying one of the
//! tags. The walk is depth-first and stops at the first match.

use slidemark_ast::{
    Block, BlockQuote, Bold, Code, Heading, Image, Italic, Lane, Link, List, ListItem, Metadata,
    Node, Paragraph, Section, Slide, Table, TableData, TableHeading, TableRow, Text, Visitor,
};

/// Keyword and tag filter over slides
#[derive(Debug, Clone, Default)]
pub struct ReductionVisitor {
    /// Lowercased, empty keywords removed
    keywords: Vec<String>,
    tags: Vec<String>,
}

impl ReductionVisitor {
    pub fn new<K, T>(keywords: K, tags: T) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Keep only the compliant slides of a lane, in order
    ///
    /// Absent and inactive slots never comply and are dropped.
    pub fn reduce(&mut self, lane: &Lane) -> Lane {
        let mut reduced = Lane::new(lane.name.clone());
        reduced.output_as_presentation = lane.output_as_presentation;
        for slide in lane.active_slides() {
            if slide.accept(self) {
                reduced.push(Some(slide.clone()));
            }
        }
        reduced
    }

    fn matches_text(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    fn matches_tags(&self, metadata: &Metadata) -> bool {
        metadata.global_tags.iter().any(|t| self.tags.contains(t))
    }

    fn any<N: Node>(&mut self, nodes: &[N]) -> bool {
        nodes.iter().any(|n| n.accept(self))
    }

    fn tagged_or_any<N: Node>(&mut self, metadata: &Metadata, nodes: &[N]) -> bool {
        self.matches_tags(metadata) || self.any(nodes)
    }
}

impl Visitor for ReductionVisitor {
    type Output = bool;

    fn visit_text(&mut self, node: &Text) -> bool {
        self.matches_text(node.as_str())
    }

    fn visit_bold(&mut self, node: &Bold) -> bool {
        self.any(&node.content)
    }

    fn visit_italic(&mut self, node: &Italic) -> bool {
        self.any(&node.content)
    }

    fn visit_code(&mut self, node: &Code) -> bool {
        self.any(&node.content)
    }

    fn visit_link(&mut self, node: &Link) -> bool {
        self.matches_text(&node.target) || self.matches_text(&node.alias)
    }

    fn visit_image(&mut self, node: &Image) -> bool {
        self.matches_text(&node.target) || self.matches_text(&node.alias)
    }

    fn visit_paragraph(&mut self, node: &Paragraph) -> bool {
        self.tagged_or_any(&node.metadata, &node.content)
    }

    fn visit_heading(&mut self, node: &Heading) -> bool {
        self.tagged_or_any(&node.metadata, &node.content)
    }

    fn visit_list(&mut self, node: &List) -> bool {
        self.tagged_or_any(&node.metadata, &node.content)
    }

    fn visit_list_item(&mut self, node: &ListItem) -> bool {
        self.any(&node.content)
    }

    fn visit_block_quote(&mut self, node: &BlockQuote) -> bool {
        self.tagged_or_any(&node.metadata, &node.content)
    }

    fn visit_table(&mut self, node: &Table) -> bool {
        self.tagged_or_any(&node.metadata, &node.rows)
    }

    fn visit_table_row(&mut self, node: &TableRow) -> bool {
        self.any(&node.cells)
    }

    fn visit_table_heading(&mut self, node: &TableHeading) -> bool {
        self.any(&node.content)
    }

    fn visit_table_data(&mut self, node: &TableData) -> bool {
        self.any(&node.content)
    }

    fn visit_section(&mut self, node: &Section) -> bool {
        self.tagged_or_any(&node.metadata, &node.content)
    }

    fn visit_horizontal_line(&mut self) -> bool {
        false
    }

    fn visit_slide(&mut self, node: &Slide) -> bool {
        node.active && self.tagged_or_any::<Block>(&node.metadata, &node.content)
    }

    fn visit_lane(&mut self, node: &Lane) -> bool {
        node.active_slides().any(|slide| slide.accept(self))
    }
}
