//! Model Builder
//!
//! Pure conversion from a transit tree to the Document Model, one function
//! per node type. Input is expected to have passed the structure validator;
//! anything else is reported as a [`BuildError`] rather than a panic.
//!
//! Slot handling inside a lane:
//!
//! | transit   | model                         |
//! |-----------|-------------------------------|
//! | `null`    | `None` (absent slot)          |
//! | `{}`      | `Some(Slide::placeholder())`  |
//! | slide     | `Some(slide)` with `active`   |

use indexmap::IndexMap;
use serde_json::{Map, Value};

use slidemark_ast::{
    Block, BlockQuote, Bold, Code, Heading, Image, Inline, Italic, Lane, Link, List, ListEntry,
    ListItem, ListType, Metadata, Paragraph, Section, Slide, Table, TableCell, TableData,
    TableHeading, TableRow, Text,
};

use crate::error::{BuildError, Result};
use crate::transit::{self, child_path, ROOT_PATH};

/// Build a slide from a transit `Slide` node
pub fn build_slide(value: &Value) -> Result<Slide> {
    slide_at(value, ROOT_PATH)
}

/// Build one lane slot
pub fn build_slot(value: &Value) -> Result<Option<Slide>> {
    slot_at(value, ROOT_PATH)
}

/// Build a lane from a transit `Lane` node
pub fn build_lane(value: &Value) -> Result<Lane> {
    let node = expect_type(value, ROOT_PATH, &[transit::LANE])?;
    let attributes = attributes(node);

    let name = match attributes.get(transit::ATTR_NAME) {
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(BuildError::invalid_attribute(ROOT_PATH, transit::ATTR_NAME)),
        None => return Err(BuildError::missing_field(ROOT_PATH, transit::ATTR_NAME)),
    };
    let output_as_presentation = match attributes.get(transit::ATTR_OUTPUT_AS_PRESENTATION) {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            return Err(BuildError::invalid_attribute(
                ROOT_PATH,
                transit::ATTR_OUTPUT_AS_PRESENTATION,
            ))
        }
    };

    let mut lane = Lane::new(name);
    lane.output_as_presentation = output_as_presentation;
    for (i, slot) in content_array(node, ROOT_PATH)?.iter().enumerate() {
        lane.push(slot_at(slot, &content_path(ROOT_PATH, i))?);
    }
    Ok(lane)
}

/// Build any block-level element
pub fn build_block(value: &Value) -> Result<Block> {
    block_at(value, ROOT_PATH)
}

/// Build any inline element
pub fn build_inline(value: &Value) -> Result<Inline> {
    inline_at(value, ROOT_PATH)
}

fn content_path(path: &str, index: usize) -> String {
    child_path(&child_path(path, "content"), index)
}

fn slot_at(value: &Value, path: &str) -> Result<Option<Slide>> {
    if value.is_null() {
        Ok(None)
    } else if transit::is_placeholder(value) {
        Ok(Some(Slide::placeholder()))
    } else {
        slide_at(value, path).map(Some)
    }
}

fn slide_at(value: &Value, path: &str) -> Result<Slide> {
    let node = expect_type(value, path, &[transit::SLIDE])?;
    let attributes = attributes(node);

    let mut slide = Slide::new(blocks_at(node, path)?);
    slide.refs = string_list(attributes, path, transit::ATTR_REFS)?;
    slide.front_matter = string_map(attributes, path, transit::ATTR_FRONT_MATTER)?;
    slide.metadata = metadata(attributes, path)?;
    Ok(slide)
}

fn block_at(value: &Value, path: &str) -> Result<Block> {
    let node = expect_type(value, path, transit::BLOCK_TYPES)?;
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
    let attributes = attributes(node);

    let block = match node_type {
        transit::PARAGRAPH => Block::Paragraph(Paragraph {
            content: inlines_at(node, path)?,
            metadata: metadata(attributes, path)?,
        }),
        transit::HEADING => Block::Heading(Heading {
            level: level(attributes, path)?,
            content: inlines_at(node, path)?,
            metadata: metadata(attributes, path)?,
        }),
        transit::LIST => Block::List(list_at(node, path)?),
        transit::BLOCK_QUOTE => Block::BlockQuote(BlockQuote {
            content: blocks_at(node, path)?,
            metadata: metadata(attributes, path)?,
        }),
        transit::TABLE => {
            let mut rows = Vec::new();
            for (i, row) in content_array(node, path)?.iter().enumerate() {
                rows.push(row_at(row, &content_path(path, i))?);
            }
            Block::Table(Table {
                rows,
                metadata: metadata(attributes, path)?,
            })
        }
        transit::SECTION => Block::Section(Section {
            key: required_string(attributes, path, transit::ATTR_KEY)?,
            value: required_string(attributes, path, transit::ATTR_VALUE)?,
            content: blocks_at(node, path)?,
            metadata: metadata(attributes, path)?,
        }),
        _ => Block::HorizontalLine,
    };
    Ok(block)
}

fn list_at(node: &Map<String, Value>, path: &str) -> Result<List> {
    let attributes = attributes(node);
    let list_type = match attributes.get(transit::ATTR_LIST_TYPE) {
        Some(Value::String(name)) => {
            ListType::from_name(name).ok_or_else(|| BuildError::InvalidListType {
                path: path.to_string(),
                list_type: name.clone(),
            })?
        }
        Some(other) => {
            return Err(BuildError::InvalidListType {
                path: path.to_string(),
                list_type: other.to_string(),
            })
        }
        None => return Err(BuildError::missing_field(path, transit::ATTR_LIST_TYPE)),
    };

    let mut content = Vec::new();
    for (i, entry) in content_array(node, path)?.iter().enumerate() {
        let entry_path = content_path(path, i);
        let entry_node = expect_type(entry, &entry_path, &[transit::LIST_ITEM, transit::LIST])?;
        if entry_node.get("type").and_then(Value::as_str) == Some(transit::LIST) {
            content.push(ListEntry::List(list_at(entry_node, &entry_path)?));
        } else {
            content.push(ListEntry::Item(ListItem {
                content: inlines_at(entry_node, &entry_path)?,
            }));
        }
    }

    Ok(List {
        list_type,
        content,
        metadata: metadata(attributes, path)?,
    })
}

fn row_at(value: &Value, path: &str) -> Result<TableRow> {
    let node = expect_type(value, path, &[transit::TABLE_ROW])?;
    let mut cells = Vec::new();
    for (i, cell) in content_array(node, path)?.iter().enumerate() {
        let cell_path = content_path(path, i);
        let cell_node = expect_type(
            cell,
            &cell_path,
            &[transit::TABLE_HEADING, transit::TABLE_DATA],
        )?;
        let content = inlines_at(cell_node, &cell_path)?;
        if cell_node.get("type").and_then(Value::as_str) == Some(transit::TABLE_HEADING) {
            cells.push(TableCell::Heading(TableHeading { content }));
        } else {
            cells.push(TableCell::Data(TableData { content }));
        }
    }
    Ok(TableRow { cells })
}

fn inline_at(value: &Value, path: &str) -> Result<Inline> {
    let node = expect_type(value, path, transit::INLINE_TYPES)?;
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();

    let inline = match node_type {
        transit::TEXT => Inline::Text(text_at(node, path)?),
        transit::BOLD => Inline::Bold(Bold {
            content: inlines_at(node, path)?,
        }),
        transit::ITALIC => Inline::Italic(Italic {
            content: inlines_at(node, path)?,
        }),
        transit::CODE => Inline::Code(Code {
            content: inlines_at(node, path)?,
        }),
        transit::LINK => {
            let (target, alias) = reference_at(node, path)?;
            Inline::Link(Link { target, alias })
        }
        _ => {
            let (target, alias) = reference_at(node, path)?;
            Inline::Image(Image { target, alias })
        }
    };
    Ok(inline)
}

/// Text content is a string, or an array of strings joined in order
fn text_at(node: &Map<String, Value>, path: &str) -> Result<Text> {
    match node.get("content") {
        Some(Value::String(text)) => Ok(Text::new(text.as_str())),
        Some(Value::Array(parts)) => {
            let mut text = String::new();
            for part in parts {
                let part = part.as_str().ok_or_else(|| BuildError::NonStringText {
                    path: path.to_string(),
                })?;
                text.push_str(part);
            }
            Ok(Text::new(text))
        }
        Some(_) => Err(BuildError::NonStringText {
            path: path.to_string(),
        }),
        None => Err(BuildError::missing_field(path, "content")),
    }
}

fn reference_at(node: &Map<String, Value>, path: &str) -> Result<(String, String)> {
    let target = match node.get("content") {
        Some(Value::String(target)) => target.clone(),
        Some(_) => return Err(BuildError::invalid_attribute(path, "content")),
        None => return Err(BuildError::missing_field(path, "content")),
    };
    let alias = match attributes(node).get(transit::ATTR_ALIAS) {
        Some(Value::String(alias)) => alias.clone(),
        None => String::new(),
        Some(_) => return Err(BuildError::invalid_attribute(path, transit::ATTR_ALIAS)),
    };
    Ok((target, alias))
}

fn inlines_at(node: &Map<String, Value>, path: &str) -> Result<Vec<Inline>> {
    content_array(node, path)?
        .iter()
        .enumerate()
        .map(|(i, child)| inline_at(child, &content_path(path, i)))
        .collect()
}

fn blocks_at(node: &Map<String, Value>, path: &str) -> Result<Vec<Block>> {
    content_array(node, path)?
        .iter()
        .enumerate()
        .map(|(i, child)| block_at(child, &content_path(path, i)))
        .collect()
}

/// The node as an object whose `type` is one of `allowed`
fn expect_type<'v>(
    value: &'v Value,
    path: &str,
    allowed: &[&str],
) -> Result<&'v Map<String, Value>> {
    let node = value.as_object().ok_or_else(|| BuildError::NotANode {
        path: path.to_string(),
    })?;
    let node_type = match node.get("type") {
        Some(Value::String(node_type)) => node_type,
        Some(other) => {
            return Err(BuildError::unexpected_type(
                path,
                other.to_string(),
                allowed.join("|"),
            ))
        }
        None => return Err(BuildError::missing_field(path, "type")),
    };
    if !allowed.contains(&node_type.as_str()) {
        return Err(BuildError::unexpected_type(
            path,
            node_type.as_str(),
            allowed.join("|"),
        ));
    }
    Ok(node)
}

fn content_array<'v>(node: &'v Map<String, Value>, path: &str) -> Result<&'v [Value]> {
    match node.get("content") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(BuildError::invalid_attribute(path, "content")),
        None => Err(BuildError::missing_field(path, "content")),
    }
}

fn attributes(node: &Map<String, Value>) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    node.get("attributes")
        .and_then(Value::as_object)
        .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
}

fn level(attributes: &Map<String, Value>, path: &str) -> Result<u8> {
    let raw = attributes
        .get(transit::ATTR_LEVEL)
        .ok_or_else(|| BuildError::missing_field(path, transit::ATTR_LEVEL))?;
    raw.as_u64()
        .filter(|level| (1..=6).contains(level))
        .map(|level| level as u8)
        .ok_or_else(|| BuildError::InvalidLevel {
            path: path.to_string(),
            level: raw.to_string(),
        })
}

fn required_string(attributes: &Map<String, Value>, path: &str, name: &str) -> Result<String> {
    match attributes.get(name) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(BuildError::invalid_attribute(path, name)),
        None => Err(BuildError::missing_field(path, name)),
    }
}

fn string_list(attributes: &Map<String, Value>, path: &str, name: &str) -> Result<Vec<String>> {
    match attributes.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| BuildError::invalid_attribute(path, name))
            })
            .collect(),
        Some(_) => Err(BuildError::invalid_attribute(path, name)),
    }
}

fn string_map(
    attributes: &Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<IndexMap<String, String>> {
    match attributes.get(name) {
        None | Some(Value::Null) => Ok(IndexMap::new()),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(key, value)| {
                value
                    .as_str()
                    .map(|v| (key.clone(), v.to_string()))
                    .ok_or_else(|| BuildError::invalid_attribute(path, name))
            })
            .collect(),
        Some(_) => Err(BuildError::invalid_attribute(path, name)),
    }
}

fn metadata(attributes: &Map<String, Value>, path: &str) -> Result<Metadata> {
    Ok(Metadata {
        global_tags: string_list(attributes, path, transit::ATTR_GLOBAL_TAGS)?,
        local: string_map(attributes, path, transit::ATTR_METADATA)?,
    })
}
