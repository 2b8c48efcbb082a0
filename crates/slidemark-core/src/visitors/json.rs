//! JSON Visitor
//!
//! Rebuilds the transit tree from a Document Model; the inverse of
//! [`crate::builder`]. Inside a lane, absent and inactive slides both
//! become `null` slots.

use serde_json::{Map, Value};

use slidemark_ast::{
    BlockQuote, Bold, Code, Heading, Image, Italic, Lane, Link, List, ListItem, Node, Paragraph,
    Section, Slide, Table, TableData, TableHeading, TableRow, Text, Visitor,
};

use crate::transit::{self, metadata_attributes, string_map};

/// Transit tree serializer
#[derive(Debug, Default)]
pub struct JsonVisitor;

impl JsonVisitor {
    pub fn new() -> Self {
        Self
    }

    fn children<N: Node>(&mut self, nodes: &[N]) -> Value {
        Value::Array(nodes.iter().map(|n| n.accept(self)).collect())
    }
}

/// Serialize any node as pretty-printed transit JSON
pub fn to_json_string<N: Node>(node: &N) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&node.accept(&mut JsonVisitor::new()))
}

impl Visitor for JsonVisitor {
    type Output = Value;

    fn visit_text(&mut self, node: &Text) -> Value {
        transit::text(node.as_str())
    }

    fn visit_bold(&mut self, node: &Bold) -> Value {
        transit::node(transit::BOLD, self.children(&node.content), Map::new())
    }

    fn visit_italic(&mut self, node: &Italic) -> Value {
        transit::node(transit::ITALIC, self.children(&node.content), Map::new())
    }

    fn visit_code(&mut self, node: &Code) -> Value {
        transit::node(transit::CODE, self.children(&node.content), Map::new())
    }

    fn visit_link(&mut self, node: &Link) -> Value {
        transit::reference(transit::LINK, node.target.as_str(), node.alias.as_str())
    }

    fn visit_image(&mut self, node: &Image) -> Value {
        transit::reference(transit::IMAGE, node.target.as_str(), node.alias.as_str())
    }

    fn visit_paragraph(&mut self, node: &Paragraph) -> Value {
        transit::node(
            transit::PARAGRAPH,
            self.children(&node.content),
            metadata_attributes(&node.metadata),
        )
    }

    fn visit_heading(&mut self, node: &Heading) -> Value {
        let mut attributes = metadata_attributes(&node.metadata);
        attributes.insert(transit::ATTR_LEVEL.to_string(), Value::from(node.level));
        transit::node(transit::HEADING, self.children(&node.content), attributes)
    }

    fn visit_list(&mut self, node: &List) -> Value {
        let mut attributes = metadata_attributes(&node.metadata);
        attributes.insert(
            transit::ATTR_LIST_TYPE.to_string(),
            Value::String(node.list_type.as_str().to_string()),
        );
        transit::node(transit::LIST, self.children(&node.content), attributes)
    }

    fn visit_list_item(&mut self, node: &ListItem) -> Value {
        transit::node(transit::LIST_ITEM, self.children(&node.content), Map::new())
    }

    fn visit_block_quote(&mut self, node: &BlockQuote) -> Value {
        transit::node(
            transit::BLOCK_QUOTE,
            self.children(&node.content),
            metadata_attributes(&node.metadata),
        )
    }

    fn visit_table(&mut self, node: &Table) -> Value {
        transit::node(
            transit::TABLE,
            self.children(&node.rows),
            metadata_attributes(&node.metadata),
        )
    }

    fn visit_table_row(&mut self, node: &TableRow) -> Value {
        transit::node(transit::TABLE_ROW, self.children(&node.cells), Map::new())
    }

    fn visit_table_heading(&mut self, node: &TableHeading) -> Value {
        transit::node(transit::TABLE_HEADING, self.children(&node.content), Map::new())
    }

    fn visit_table_data(&mut self, node: &TableData) -> Value {
        transit::node(transit::TABLE_DATA, self.children(&node.content), Map::new())
    }

    fn visit_section(&mut self, node: &Section) -> Value {
        let mut attributes = metadata_attributes(&node.metadata);
        attributes.insert(transit::ATTR_KEY.to_string(), Value::String(node.key.clone()));
        attributes.insert(
            transit::ATTR_VALUE.to_string(),
            Value::String(node.value.clone()),
        );
        transit::node(transit::SECTION, self.children(&node.content), attributes)
    }

    fn visit_horizontal_line(&mut self) -> Value {
        transit::node(transit::HORIZONTAL_LINE, Value::Array(Vec::new()), Map::new())
    }

    fn visit_slide(&mut self, node: &Slide) -> Value {
        if !node.active {
            return Value::Object(Map::new());
        }
        let mut attributes = Map::new();
        attributes.insert(
            transit::ATTR_REFS.to_string(),
            Value::Array(node.refs.iter().cloned().map(Value::String).collect()),
        );
        attributes.insert(
            transit::ATTR_FRONT_MATTER.to_string(),
            string_map(&node.front_matter),
        );
        attributes.extend(metadata_attributes(&node.metadata));
        transit::node(transit::SLIDE, self.children(&node.content), attributes)
    }

    fn visit_lane(&mut self, node: &Lane) -> Value {
        let slots = node
            .slides
            .iter()
            .map(|slot| match slot {
                Some(slide) if slide.active => slide.accept(self),
                _ => Value::Null,
            })
            .collect();

        let mut attributes = Map::new();
        attributes.insert(
            transit::ATTR_NAME.to_string(),
            Value::String(node.name.clone()),
        );
        attributes.insert(
            transit::ATTR_OUTPUT_AS_PRESENTATION.to_string(),
            Value::Bool(node.output_as_presentation),
        );
        transit::node(transit::LANE, Value::Array(slots), attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_lane, build_slide};
    use crate::parser::parse_markdown;
    use serde_json::json;

    #[test]
    fn test_parsed_tree_is_reproduced() {
        let source = "---\nlayout: x\n---\n[intro]\n<!--k: v-->\n# T\n\n- a\n    1. b\n\n> q\n\n| h |\n|---|\n| d |\n\n***\n\n<!-- +s: 1 -->\ntext ![i](img:x)\n<!-- / -->\n\n->[next]";
        let tree = parse_markdown(source);
        let slide = build_slide(&tree).unwrap();
        assert_eq!(slide.accept(&mut JsonVisitor::new()), tree);
    }

    #[test]
    fn test_inactive_slides_become_null_in_lane() {
        let mut lane = Lane::new("notes");
        lane.push(Some(Slide::placeholder()));
        lane.push(None);
        let value = lane.accept(&mut JsonVisitor::new());
        assert_eq!(
            value,
            json!({
                "type": "Lane",
                "content": [null, null],
                "attributes": {"name": "notes", "outputAsPresentation": false}
            })
        );
        let rebuilt = build_lane(&value).unwrap();
        assert_eq!(rebuilt.slides, vec![None, None]);
    }

    #[test]
    fn test_to_json_string() {
        let slide = build_slide(&parse_markdown("hi")).unwrap();
        let text = to_json_string(&slide).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["content"][0]["content"][0]["content"], "hi");
    }
}
