//! Structure validation for transit trees
//!
//! Walks every node of a Slide or Lane tree and reports each violation it
//! finds. The walk never stops early: children are visited even when their
//! parent is already broken, as long as they can be reached.

use serde_json::{Map, Value};
use slidemark_core::diagnostics::Diagnostic;
use slidemark_core::transit::{self, child_path, ROOT_PATH};

use crate::Validator;

/// Kinds of structural violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    MissingField,
    InvalidLevel,
    InvalidListType,
    InvalidElementType,
    NonStringTextContent,
    InvalidAttribute,
}

impl Violation {
    /// Diagnostic code
    pub fn code(self) -> &'static str {
        match self {
            Violation::MissingField => "SLD001",
            Violation::InvalidLevel => "SLD002",
            Violation::InvalidListType => "SLD003",
            Violation::InvalidElementType => "SLD004",
            Violation::NonStringTextContent => "SLD005",
            Violation::InvalidAttribute => "SLD006",
        }
    }

    /// Kebab-case kind name
    pub fn kind(self) -> &'static str {
        match self {
            Violation::MissingField => "missing-field",
            Violation::InvalidLevel => "invalid-level",
            Violation::InvalidListType => "invalid-list-type",
            Violation::InvalidElementType => "invalid-element-type",
            Violation::NonStringTextContent => "non-string-text-content",
            Violation::InvalidAttribute => "invalid-attribute",
        }
    }

    fn diagnostic(self, path: &str, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(message)
            .with_code(self.code())
            .with_path(path)
            .with_note(self.kind())
    }
}

/// What a content array may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Inline,
    Block,
    ListEntry,
    Row,
    Cell,
}

impl Expect {
    fn allows(self, node_type: &str) -> bool {
        match self {
            Expect::Inline => transit::INLINE_TYPES.contains(&node_type),
            Expect::Block => transit::BLOCK_TYPES.contains(&node_type),
            Expect::ListEntry => node_type == transit::LIST_ITEM || node_type == transit::LIST,
            Expect::Row => node_type == transit::TABLE_ROW,
            Expect::Cell => {
                node_type == transit::TABLE_HEADING || node_type == transit::TABLE_DATA
            }
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Expect::Inline => "an inline element",
            Expect::Block => "a block element",
            Expect::ListEntry => "ListItem or List",
            Expect::Row => "TableRow",
            Expect::Cell => "TableHeading or TableData",
        }
    }
}

/// Validates the shape of transit trees
#[derive(Debug, Default, Clone, Copy)]
pub struct StructureValidator;

impl Validator for StructureValidator {
    fn code(&self) -> &'static str {
        "SLD"
    }

    fn name(&self) -> &'static str {
        "structure"
    }

    fn validate(&self, tree: &Value) -> Vec<Diagnostic> {
        let mut walk = Walk::default();
        walk.root(tree);
        walk.diagnostics
    }
}

#[derive(Default)]
struct Walk {
    diagnostics: Vec<Diagnostic>,
}

impl Walk {
    fn report(&mut self, violation: Violation, path: &str, message: impl Into<String>) {
        self.diagnostics.push(violation.diagnostic(path, message));
    }

    fn root(&mut self, tree: &Value) {
        match transit::node_type(tree) {
            Some(transit::LANE) => self.lane(tree, ROOT_PATH),
            Some(transit::SLIDE) => self.slide(tree, ROOT_PATH),
            _ => {
                if let Some(node) = self.object(tree, ROOT_PATH) {
                    if let Some(node_type) = self.type_of(node, ROOT_PATH) {
                        self.report(
                            Violation::InvalidElementType,
                            ROOT_PATH,
                            format!("Root must be a Slide or Lane, found '{}'", node_type),
                        );
                    }
                }
            }
        }
    }

    /// The value as a node object with an `attributes` map
    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let Some(node) = value.as_object() else {
            self.report(
                Violation::InvalidElementType,
                path,
                format!("Expected a node object, found {}", value),
            );
            return None;
        };
        match node.get("attributes") {
            Some(Value::Object(_)) => {}
            Some(_) => self.report(
                Violation::InvalidAttribute,
                path,
                "Field 'attributes' must be an object",
            ),
            None => self.report(Violation::MissingField, path, "Missing field 'attributes'"),
        }
        Some(node)
    }

    fn type_of<'v>(&mut self, node: &'v Map<String, Value>, path: &str) -> Option<&'v str> {
        match node.get("type") {
            Some(Value::String(node_type)) => Some(node_type),
            Some(other) => {
                self.report(
                    Violation::InvalidElementType,
                    path,
                    format!("Field 'type' must be a string, found {}", other),
                );
                None
            }
            None => {
                self.report(Violation::MissingField, path, "Missing field 'type'");
                None
            }
        }
    }

    fn lane(&mut self, tree: &Value, path: &str) {
        let Some(node) = self.object(tree, path) else {
            return;
        };
        let attributes = attributes(node);
        match attributes.get(transit::ATTR_NAME) {
            Some(Value::String(_)) => {}
            Some(_) => self.report(
                Violation::InvalidAttribute,
                path,
                "Lane 'name' must be a string",
            ),
            None => self.report(Violation::MissingField, path, "Missing field 'name'"),
        }
        if let Some(flag) = attributes.get(transit::ATTR_OUTPUT_AS_PRESENTATION) {
            if !flag.is_boolean() {
                self.report(
                    Violation::InvalidAttribute,
                    path,
                    "Lane 'outputAsPresentation' must be a boolean",
                );
            }
        }

        let Some(slots) = self.content_array(node, path) else {
            return;
        };
        for (i, slot) in slots.iter().enumerate() {
            let slot_path = content_path(path, i);
            if slot.is_null() || transit::is_placeholder(slot) {
                continue;
            }
            match transit::node_type(slot) {
                Some(transit::SLIDE) => self.slide(slot, &slot_path),
                _ => self.report(
                    Violation::InvalidElementType,
                    &slot_path,
                    "Lane slots must be a Slide, null or {}",
                ),
            }
        }
    }

    fn slide(&mut self, tree: &Value, path: &str) {
        let Some(node) = self.object(tree, path) else {
            return;
        };
        let attributes = attributes(node);
        self.string_list(attributes, path, transit::ATTR_REFS);
        self.string_map(attributes, path, transit::ATTR_FRONT_MATTER);
        self.metadata(attributes, path);
        self.children(node, path, Expect::Block);
    }

    fn children(&mut self, node: &Map<String, Value>, path: &str, expect: Expect) {
        let Some(items) = self.content_array(node, path) else {
            return;
        };
        for (i, child) in items.iter().enumerate() {
            self.element(child, &content_path(path, i), expect);
        }
    }

    fn element(&mut self, value: &Value, path: &str, expect: Expect) {
        let Some(node) = self.object(value, path) else {
            return;
        };
        let Some(node_type) = self.type_of(node, path) else {
            return;
        };
        if !expect.allows(node_type) {
            self.report(
                Violation::InvalidElementType,
                path,
                format!("Unexpected '{}', expected {}", node_type, expect.describe()),
            );
            // Unknown types have no shape to check
            if !transit::INLINE_TYPES.contains(&node_type)
                && !transit::BLOCK_TYPES.contains(&node_type)
                && !matches!(
                    node_type,
                    transit::LIST_ITEM
                        | transit::TABLE_ROW
                        | transit::TABLE_HEADING
                        | transit::TABLE_DATA
                )
            {
                return;
            }
        }

        let attributes = attributes(node);
        match node_type {
            transit::TEXT => self.text(node, path),
            transit::LINK | transit::IMAGE => self.reference(node, attributes, path),
            transit::BOLD | transit::ITALIC | transit::CODE | transit::LIST_ITEM => {
                self.children(node, path, Expect::Inline)
            }
            transit::TABLE_HEADING | transit::TABLE_DATA => {
                self.children(node, path, Expect::Inline)
            }
            transit::TABLE_ROW => self.children(node, path, Expect::Cell),
            transit::PARAGRAPH => {
                self.metadata(attributes, path);
                self.children(node, path, Expect::Inline);
            }
            transit::HEADING => {
                self.metadata(attributes, path);
                self.level(attributes, path);
                self.children(node, path, Expect::Inline);
            }
            transit::LIST => {
                self.metadata(attributes, path);
                self.list_type(attributes, path);
                self.children(node, path, Expect::ListEntry);
            }
            transit::BLOCK_QUOTE => {
                self.metadata(attributes, path);
                self.children(node, path, Expect::Block);
            }
            transit::TABLE => {
                self.metadata(attributes, path);
                self.children(node, path, Expect::Row);
            }
            transit::SECTION => {
                self.metadata(attributes, path);
                self.required_string(attributes, path, transit::ATTR_KEY);
                self.required_string(attributes, path, transit::ATTR_VALUE);
                self.children(node, path, Expect::Block);
            }
            _ => {}
        }
    }

    fn text(&mut self, node: &Map<String, Value>, path: &str) {
        let valid = match node.get("content") {
            Some(Value::String(_)) => true,
            Some(Value::Array(parts)) => parts.iter().all(Value::is_string),
            Some(_) => false,
            None => {
                self.report(Violation::MissingField, path, "Missing field 'content'");
                return;
            }
        };
        if !valid {
            self.report(
                Violation::NonStringTextContent,
                path,
                "Text content must be a string or an array of strings",
            );
        }
    }

    fn reference(&mut self, node: &Map<String, Value>, attributes: &Map<String, Value>, path: &str) {
        match node.get("content") {
            Some(Value::String(_)) => {}
            Some(_) => self.report(
                Violation::InvalidAttribute,
                path,
                "Link and image targets must be strings",
            ),
            None => self.report(Violation::MissingField, path, "Missing field 'content'"),
        }
        self.required_string(attributes, path, transit::ATTR_ALIAS);
    }

    fn content_array<'v>(&mut self, node: &'v Map<String, Value>, path: &str) -> Option<&'v [Value]> {
        match node.get("content") {
            Some(Value::Array(items)) => Some(items.as_slice()),
            Some(_) => {
                self.report(
                    Violation::InvalidAttribute,
                    path,
                    "Field 'content' must be an array",
                );
                None
            }
            None => {
                self.report(Violation::MissingField, path, "Missing field 'content'");
                None
            }
        }
    }

    fn level(&mut self, attributes: &Map<String, Value>, path: &str) {
        match attributes.get(transit::ATTR_LEVEL) {
            Some(level) if level.as_u64().is_some_and(|l| (1..=6).contains(&l)) => {}
            Some(level) => self.report(
                Violation::InvalidLevel,
                path,
                format!("Heading level must be an integer from 1 to 6, found {}", level),
            ),
            None => self.report(Violation::MissingField, path, "Missing field 'level'"),
        }
    }

    fn list_type(&mut self, attributes: &Map<String, Value>, path: &str) {
        match attributes.get(transit::ATTR_LIST_TYPE) {
            Some(Value::String(t)) if t == "ordered" || t == "unordered" => {}
            Some(other) => self.report(
                Violation::InvalidListType,
                path,
                format!("List type must be \"ordered\" or \"unordered\", found {}", other),
            ),
            None => self.report(Violation::MissingField, path, "Missing field 'listType'"),
        }
    }

    fn required_string(&mut self, attributes: &Map<String, Value>, path: &str, name: &str) {
        match attributes.get(name) {
            Some(Value::String(_)) => {}
            Some(_) => self.report(
                Violation::InvalidAttribute,
                path,
                format!("Attribute '{}' must be a string", name),
            ),
            None => self.report(
                Violation::MissingField,
                path,
                format!("Missing field '{}'", name),
            ),
        }
    }

    fn metadata(&mut self, attributes: &Map<String, Value>, path: &str) {
        self.string_list(attributes, path, transit::ATTR_GLOBAL_TAGS);
        self.string_map(attributes, path, transit::ATTR_METADATA);
    }

    fn string_list(&mut self, attributes: &Map<String, Value>, path: &str, name: &str) {
        let valid = match attributes.get(name) {
            None => true,
            Some(Value::Array(items)) => items.iter().all(Value::is_string),
            Some(_) => false,
        };
        if !valid {
            self.report(
                Violation::InvalidAttribute,
                path,
                format!("Attribute '{}' must be an array of strings", name),
            );
        }
    }

    fn string_map(&mut self, attributes: &Map<String, Value>, path: &str, name: &str) {
        let valid = match attributes.get(name) {
            None => true,
            Some(Value::Object(entries)) => entries.values().all(Value::is_string),
            Some(_) => false,
        };
        if !valid {
            self.report(
                Violation::InvalidAttribute,
                path,
                format!("Attribute '{}' must map names to strings", name),
            );
        }
    }
}

fn content_path(path: &str, index: usize) -> String {
    child_path(&child_path(path, "content"), index)
}

fn attributes(node: &Map<String, Value>) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    node.get("attributes")
        .and_then(Value::as_object)
        .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slidemark_core::parse_markdown;

    fn codes(tree: &Value) -> Vec<String> {
        StructureValidator
            .validate(tree)
            .into_iter()
            .filter_map(|d| d.code)
            .collect()
    }

    #[test]
    fn test_parser_output_is_valid() {
        let tree = parse_markdown(
            "---\nlayout: x\n---\n[t]\n# H\n\n- a\n    - b\n\n| h |\n|---|\n| d |\n\n> q\n\n***",
        );
        assert!(codes(&tree).is_empty());
    }

    #[test]
    fn test_each_violation_kind() {
        let tree = json!({
            "type": "Slide",
            "content": [
                {"type": "Heading", "content": [], "attributes": {"level": 0}},
                {"type": "List", "content": [], "attributes": {"listType": "numbered"}},
                {"type": "Paragraph", "content": [
                    {"type": "Text", "content": 5, "attributes": {}}
                ], "attributes": {}},
                {"type": "Text", "content": "inline at block level", "attributes": {}},
                {"type": "Section", "content": [], "attributes": {"value": "v"}},
                {"type": "Paragraph", "content": [], "attributes": {"metadata": {"k": 1}}}
            ],
            "attributes": {}
        });
        assert_eq!(
            codes(&tree),
            vec!["SLD002", "SLD003", "SLD005", "SLD004", "SLD001", "SLD006"]
        );
    }

    #[test]
    fn test_walk_continues_below_broken_parent() {
        let tree = json!({
            "type": "Slide",
            "content": [{
                "type": "BlockQuote",
                "content": [
                    {"type": "Heading", "content": [], "attributes": {}},
                    {"type": "Heading", "content": [], "attributes": {"level": "2"}}
                ]
            }],
            "attributes": {}
        });
        let diagnostics = StructureValidator.validate(&tree);
        let paths: Vec<_> = diagnostics.iter().filter_map(|d| d.path.clone()).collect();
        assert_eq!(
            paths,
            vec!["/content/0", "/content/0/content/0", "/content/0/content/1"]
        );
    }

    #[test]
    fn test_lane_slots() {
        let tree = json!({
            "type": "Lane",
            "content": [null, {}, parse_markdown("x"), 7],
            "attributes": {"name": "main"}
        });
        let diagnostics = StructureValidator.validate(&tree);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path.as_deref(), Some("/content/3"));
    }

    #[test]
    fn test_root_must_be_slide_or_lane() {
        let tree = json!({"type": "Paragraph", "content": [], "attributes": {}});
        assert_eq!(codes(&tree), vec!["SLD004"]);
        assert_eq!(codes(&json!("nope")), vec!["SLD004"]);
    }

    #[test]
    fn test_text_array_content_is_accepted() {
        let tree = json!({
            "type": "Slide",
            "content": [{"type": "Paragraph", "content": [
                {"type": "Text", "content": ["a", "b"], "attributes": {}}
            ], "attributes": {}}],
            "attributes": {}
        });
        assert!(codes(&tree).is_empty());
    }
}
