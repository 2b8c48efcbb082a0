//! Analysis Visitor
//!
//! Counts content statistics over any subtree.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use slidemark_ast::{
    BlockQuote, Bold, Code, Heading, Image, Italic, Lane, Link, List, ListItem, Node, Paragraph,
    Section, Slide, Table, TableData, TableHeading, TableRow, Text, Visitor,
};

/// Content statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub words: usize,
    /// Characters excluding line breaks
    pub characters: usize,
    pub images: usize,
    pub links: usize,
    pub headings: usize,
    pub bullet_points: usize,
    pub tables: usize,
}

impl Analysis {
    fn of_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().filter(|c| *c != '\n').count(),
            ..Self::default()
        }
    }
}

impl Add for Analysis {
    type Output = Analysis;

    fn add(self, other: Analysis) -> Analysis {
        Analysis {
            words: self.words + other.words,
            characters: self.characters + other.characters,
            images: self.images + other.images,
            links: self.links + other.links,
            headings: self.headings + other.headings,
            bullet_points: self.bullet_points + other.bullet_points,
            tables: self.tables + other.tables,
        }
    }
}

impl AddAssign for Analysis {
    fn add_assign(&mut self, other: Analysis) {
        *self = *self + other;
    }
}

impl Sum for Analysis {
    fn sum<I: Iterator<Item = Analysis>>(iter: I) -> Analysis {
        iter.fold(Analysis::default(), Add::add)
    }
}

/// Statistics collector
#[derive(Debug, Default)]
pub struct AnalysisVisitor;

impl AnalysisVisitor {
    pub fn new() -> Self {
        Self
    }

    fn children<N: Node>(&mut self, nodes: &[N]) -> Analysis {
        nodes.iter().map(|n| n.accept(self)).sum()
    }
}

impl Visitor for AnalysisVisitor {
    type Output = Analysis;

    fn visit_text(&mut self, node: &Text) -> Analysis {
        Analysis::of_text(node.as_str())
    }

    fn visit_bold(&mut self, node: &Bold) -> Analysis {
        self.children(&node.content)
    }

    fn visit_italic(&mut self, node: &Italic) -> Analysis {
        self.children(&node.content)
    }

    fn visit_code(&mut self, node: &Code) -> Analysis {
        self.children(&node.content)
    }

    fn visit_link(&mut self, node: &Link) -> Analysis {
        Analysis {
            links: 1,
            ..Analysis::of_text(&node.alias)
        }
    }

    fn visit_image(&mut self, _node: &Image) -> Analysis {
        Analysis {
            images: 1,
            ..Analysis::default()
        }
    }

    fn visit_paragraph(&mut self, node: &Paragraph) -> Analysis {
        self.children(&node.content)
    }

    fn visit_heading(&mut self, node: &Heading) -> Analysis {
        Analysis {
            headings: 1,
            ..Analysis::default()
        } + self.children(&node.content)
    }

    fn visit_list(&mut self, node: &List) -> Analysis {
        self.children(&node.content)
    }

    fn visit_list_item(&mut self, node: &ListItem) -> Analysis {
        Analysis {
            bullet_points: 1,
            ..Analysis::default()
        } + self.children(&node.content)
    }

    fn visit_block_quote(&mut self, node: &BlockQuote) -> Analysis {
        self.children(&node.content)
    }

    fn visit_table(&mut self, node: &Table) -> Analysis {
        Analysis {
            tables: 1,
            ..Analysis::default()
        } + self.children(&node.rows)
    }

    fn visit_table_row(&mut self, node: &TableRow) -> Analysis {
        self.children(&node.cells)
    }

    fn visit_table_heading(&mut self, node: &TableHeading) -> Analysis {
        self.children(&node.content)
    }

    fn visit_table_data(&mut self, node: &TableData) -> Analysis {
        self.children(&node.content)
    }

    fn visit_section(&mut self, node: &Section) -> Analysis {
        self.children(&node.content)
    }

    fn visit_horizontal_line(&mut self) -> Analysis {
        Analysis::default()
    }

    fn visit_slide(&mut self, node: &Slide) -> Analysis {
        self.children(&node.content)
    }

    fn visit_lane(&mut self, node: &Lane) -> Analysis {
        node.active_slides().map(|slide| slide.accept(self)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_slide;
    use crate::parser::parse_markdown;

    fn analyse(source: &str) -> Analysis {
        build_slide(&parse_markdown(source))
            .unwrap()
            .accept(&mut AnalysisVisitor::new())
    }

    #[test]
    fn test_table_counts() {
        assert_eq!(
            analyse("| 11 | 12 |\n|----|----|\n| 21 | 22 |"),
            Analysis {
                words: 4,
                characters: 8,
                tables: 1,
                ..Analysis::default()
            }
        );
    }

    #[test]
    fn test_links_contribute_alias_text() {
        let stats = analyse("see [the docs](https://example.com) ![logo](img:logo)");
        assert_eq!(stats.links, 1);
        assert_eq!(stats.images, 1);
        assert_eq!(stats.words, 3);
        assert_eq!(stats.characters, "see the docs ".len() + 1);
    }

    #[test]
    fn test_headings_and_bullets() {
        let stats = analyse("# One\n\n## Two\n\n- a\n- b\n    1. c");
        assert_eq!(stats.headings, 2);
        assert_eq!(stats.bullet_points, 3);
    }

    #[test]
    fn test_line_breaks_are_not_characters() {
        assert_eq!(analyse("ab\ncd").characters, 4);
    }

    #[test]
    fn test_sum_over_lane() {
        let mut lane = Lane::new("main");
        lane.push(Some(build_slide(&parse_markdown("one two")).unwrap()));
        lane.push(None);
        lane.push(Some(build_slide(&parse_markdown("three")).unwrap()));
        let stats = lane.accept(&mut AnalysisVisitor::new());
        assert_eq!(stats.words, 3);
    }
}
