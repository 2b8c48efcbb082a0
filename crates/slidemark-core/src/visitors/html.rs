//! HTML Visitor
//!
//! Renders the Document Model as an HTML fragment. Every block carries its
//! metadata as `data-*` attributes: local key/value pairs directly, global
//! tags through the [`MetadataRegistry`]. Image sources with the `img:`
//! prefix are inlined from the [`ImageRegistry`].
//!
//! # Example
//!
//! ```
//! use slidemark_ast::Node;
//! use slidemark_core::builder::build_slide;
//! use slidemark_core::parser::parse_markdown;
//! use slidemark_core::registry::{ImageRegistry, MetadataRegistry};
//! use slidemark_core::visitors::HtmlVisitor;
//!
//! let slide = build_slide(&parse_markdown("# Hi")).unwrap();
//! let (images, metadata) = (ImageRegistry::new(), MetadataRegistry::new());
//! let html = slide.accept(&mut HtmlVisitor::new(&images, &metadata));
//! assert_eq!(html, "<div class=\"slide\"><h1>Hi</h1></div>");
//! ```

use indexmap::IndexMap;

use slidemark_ast::{
    BlockQuote, Bold, Code, Heading, Image, Italic, Lane, Link, List, ListEntry, ListItem,
    ListType, Metadata, Node, Paragraph, Section, Slide, Table, TableData, TableHeading,
    TableRow, Text, Visitor,
};

use crate::registry::{ImageRegistry, MetadataRegistry};

const EMPTY_SLOT: &str = "<div class=\"slide empty\"></div>";

/// HTML renderer borrowing the caller's registries
pub struct HtmlVisitor<'r> {
    images: &'r ImageRegistry,
    metadata: &'r MetadataRegistry,
}

impl<'r> HtmlVisitor<'r> {
    pub fn new(images: &'r ImageRegistry, metadata: &'r MetadataRegistry) -> Self {
        Self { images, metadata }
    }

    /// `data-*` attributes for a metadata pair, registry entries first
    fn data_attributes(&self, metadata: &Metadata) -> String {
        let mut merged: IndexMap<&str, &str> = IndexMap::new();
        for tag in &metadata.global_tags {
            if let Some(entry) = self.metadata.get(tag) {
                for (key, value) in entry {
                    merged.insert(key, value);
                }
            }
        }
        for (key, value) in &metadata.local {
            merged.insert(key, value);
        }
        render_data(merged)
    }

    fn children<N: Node>(&mut self, nodes: &[N]) -> String {
        nodes.iter().map(|n| n.accept(self)).collect()
    }
}

fn render_data<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(key, value)| format!(" data-{}=\"{}\"", html_escape(key), html_escape(value)))
        .collect()
}

/// Basic HTML escaping for text and attribute values
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl Visitor for HtmlVisitor<'_> {
    type Output = String;

    fn visit_text(&mut self, node: &Text) -> String {
        html_escape(node.as_str())
    }

    fn visit_bold(&mut self, node: &Bold) -> String {
        format!("<b>{}</b>", self.children(&node.content))
    }

    fn visit_italic(&mut self, node: &Italic) -> String {
        format!("<i>{}</i>", self.children(&node.content))
    }

    fn visit_code(&mut self, node: &Code) -> String {
        format!("<code>{}</code>", self.children(&node.content))
    }

    fn visit_link(&mut self, node: &Link) -> String {
        format!(
            "<a href=\"{}\">{}</a>",
            html_escape(&node.target),
            html_escape(&node.alias)
        )
    }

    fn visit_image(&mut self, node: &Image) -> String {
        format!(
            "<img src=\"{}\" alt=\"{}\">",
            html_escape(&self.images.resolve(&node.target)),
            html_escape(&node.alias)
        )
    }

    fn visit_paragraph(&mut self, node: &Paragraph) -> String {
        format!(
            "<p{}>{}</p>",
            self.data_attributes(&node.metadata),
            self.children(&node.content)
        )
    }

    fn visit_heading(&mut self, node: &Heading) -> String {
        format!(
            "<h{level}{}>{}</h{level}>",
            self.data_attributes(&node.metadata),
            self.children(&node.content),
            level = node.level
        )
    }

    fn visit_list(&mut self, node: &List) -> String {
        let tag = match node.list_type {
            ListType::Ordered => "ol",
            ListType::Unordered => "ul",
        };
        let entries: String = node
            .content
            .iter()
            .map(|entry: &ListEntry| entry.accept(self))
            .collect();
        format!(
            "<{tag}{}>{entries}</{tag}>",
            self.data_attributes(&node.metadata)
        )
    }

    fn visit_list_item(&mut self, node: &ListItem) -> String {
        format!("<li>{}</li>", self.children(&node.content))
    }

    fn visit_block_quote(&mut self, node: &BlockQuote) -> String {
        format!(
            "<blockquote{}>{}</blockquote>",
            self.data_attributes(&node.metadata),
            self.children(&node.content)
        )
    }

    fn visit_table(&mut self, node: &Table) -> String {
        format!(
            "<table{}>{}</table>",
            self.data_attributes(&node.metadata),
            self.children(&node.rows)
        )
    }

    fn visit_table_row(&mut self, node: &TableRow) -> String {
        format!("<tr>{}</tr>", self.children(&node.cells))
    }

    fn visit_table_heading(&mut self, node: &TableHeading) -> String {
        format!("<th>{}</th>", self.children(&node.content))
    }

    fn visit_table_data(&mut self, node: &TableData) -> String {
        format!("<td>{}</td>", self.children(&node.content))
    }

    fn visit_section(&mut self, node: &Section) -> String {
        format!(
            "<div class=\"section\" data-section-key=\"{}\" data-section-value=\"{}\"{}>{}</div>",
            html_escape(&node.key),
            html_escape(&node.value),
            self.data_attributes(&node.metadata),
            self.children(&node.content)
        )
    }

    fn visit_horizontal_line(&mut self) -> String {
        "<hr>".to_string()
    }

    fn visit_slide(&mut self, node: &Slide) -> String {
        if !node.active {
            return EMPTY_SLOT.to_string();
        }
        let front_matter = render_data(
            node.front_matter
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        format!(
            "<div class=\"slide\"{front_matter}{}>{}</div>",
            self.data_attributes(&node.metadata),
            self.children(&node.content)
        )
    }

    fn visit_lane(&mut self, node: &Lane) -> String {
        let slots: String = node
            .slides
            .iter()
            .map(|slot| match slot {
                Some(slide) => slide.accept(self),
                None => EMPTY_SLOT.to_string(),
            })
            .collect();
        format!(
            "<div class=\"lane\" data-name=\"{}\">{slots}</div>",
            html_escape(&node.name)
        )
    }
}
