//! Transit tree
//!
//! The plain, JSON-serialisable form shared by the parser output, the
//! validator input and the JSON visitor output. Every node has the shape
//! `{ "type", "content", "attributes" }`; absent lane slots are `null` and
//! an empty object `{}` stands for an inactive placeholder slide.
//!
//! ```json
//! {
//!   "type": "Heading",
//!   "content": [{ "type": "Text", "content": "Title", "attributes": {} }],
//!   "attributes": { "level": 1, "globalMetadataTags": [], "metadata": {} }
//! }
//! ```

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use slidemark_ast::Metadata;

pub const TEXT: &str = "Text";
pub const BOLD: &str = "Bold";
pub const ITALIC: &str = "Italic";
pub const CODE: &str = "Code";
pub const LINK: &str = "Link";
pub const IMAGE: &str = "Image";
pub const PARAGRAPH: &str = "Paragraph";
pub const HEADING: &str = "Heading";
pub const LIST: &str = "List";
pub const LIST_ITEM: &str = "ListItem";
pub const BLOCK_QUOTE: &str = "BlockQuote";
pub const TABLE: &str = "Table";
pub const TABLE_ROW: &str = "TableRow";
pub const TABLE_HEADING: &str = "TableHeading";
pub const TABLE_DATA: &str = "TableData";
pub const SECTION: &str = "Section";
pub const HORIZONTAL_LINE: &str = "HorizontalLine";
pub const SLIDE: &str = "Slide";
pub const LANE: &str = "Lane";

/// Inline node types
pub const INLINE_TYPES: &[&str] = &[TEXT, BOLD, ITALIC, CODE, LINK, IMAGE];

/// Outer (block) node types
pub const BLOCK_TYPES: &[&str] = &[
    PARAGRAPH,
    HEADING,
    LIST,
    BLOCK_QUOTE,
    TABLE,
    SECTION,
    HORIZONTAL_LINE,
];

pub const ATTR_LEVEL: &str = "level";
pub const ATTR_LIST_TYPE: &str = "listType";
pub const ATTR_ALIAS: &str = "alias";
pub const ATTR_KEY: &str = "key";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_GLOBAL_TAGS: &str = "globalMetadataTags";
pub const ATTR_METADATA: &str = "metadata";
pub const ATTR_REFS: &str = "refs";
pub const ATTR_FRONT_MATTER: &str = "frontMatter";
pub const ATTR_NAME: &str = "name";
pub const ATTR_OUTPUT_AS_PRESENTATION: &str = "outputAsPresentation";

/// Build a node from its parts
pub fn node(node_type: &str, content: Value, attributes: Map<String, Value>) -> Value {
    json!({
        "type": node_type,
        "content": content,
        "attributes": Value::Object(attributes),
    })
}

/// A `Text` node
pub fn text(content: impl Into<String>) -> Value {
    node(TEXT, Value::String(content.into()), Map::new())
}

/// A node holding child nodes and no attributes
pub fn wrapper(node_type: &str, children: Vec<Value>) -> Value {
    node(node_type, Value::Array(children), Map::new())
}

/// A `Link` or `Image` leaf
pub fn reference(node_type: &str, target: impl Into<String>, alias: impl Into<String>) -> Value {
    let mut attributes = Map::new();
    attributes.insert(ATTR_ALIAS.to_string(), Value::String(alias.into()));
    node(node_type, Value::String(target.into()), attributes)
}

/// Attribute map with the two metadata channels filled in
pub fn metadata_attributes(metadata: &Metadata) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert(
        ATTR_GLOBAL_TAGS.to_string(),
        Value::Array(
            metadata
                .global_tags
                .iter()
                .map(|t| Value::String(t.clone()))
                .collect(),
        ),
    );
    attributes.insert(ATTR_METADATA.to_string(), string_map(&metadata.local));
    attributes
}

/// Serialise an ordered string map as a JSON object
pub fn string_map(map: &IndexMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// The `type` of a node, if present and a string
pub fn node_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

/// Child nodes of a node; empty when content is not an array
pub fn children(value: &Value) -> &[Value] {
    value
        .get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// An attribute of a node
pub fn attribute<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.get("attributes").and_then(|a| a.get(name))
}

/// Path of the root node in error messages
pub const ROOT_PATH: &str = "/";

/// Extend a JSON-pointer-like path with one segment
pub fn child_path(parent: &str, segment: impl std::fmt::Display) -> String {
    if parent == ROOT_PATH {
        format!("/{segment}")
    } else {
        format!("{parent}/{segment}")
    }
}

/// Check for the `{}` placeholder slide
pub fn is_placeholder(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}
