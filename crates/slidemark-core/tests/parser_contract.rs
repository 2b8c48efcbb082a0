//! Contract tests for the AST Builder
//!
//! Each test pins the transit tree produced for one piece of source,
//! including the forgiving behavior on malformed input.

use serde_json::{json, Value};
use slidemark_core::parse_markdown;

fn text(s: &str) -> Value {
    json!({"type": "Text", "content": s, "attributes": {}})
}

fn no_metadata() -> Value {
    json!({"globalMetadataTags": [], "metadata": {}})
}

fn content(slide: &Value) -> &Vec<Value> {
    slide["content"].as_array().unwrap()
}

#[test]
fn test_plain_text_is_one_paragraph() {
    let slide = parse_markdown("text");
    assert_eq!(
        content(&slide),
        &vec![json!({
            "type": "Paragraph",
            "content": [text("text")],
            "attributes": no_metadata()
        })]
    );
}

#[test]
fn test_nested_emphasis() {
    let slide = parse_markdown("**bold *em***");
    assert_eq!(
        slide["content"][0]["content"],
        json!([{
            "type": "Bold",
            "content": [
                text("bold "),
                {"type": "Italic", "content": [text("em")], "attributes": {}}
            ],
            "attributes": {}
        }])
    );
}

#[test]
fn test_link_alias() {
    let slide = parse_markdown("[alias](link)");
    assert_eq!(
        slide["content"][0]["content"],
        json!([{"type": "Link", "content": "link", "attributes": {"alias": "alias"}}])
    );
}

#[test]
fn test_image_alias() {
    let slide = parse_markdown("![Logo](img:logo)");
    assert_eq!(
        slide["content"][0]["content"],
        json!([{"type": "Image", "content": "img:logo", "attributes": {"alias": "Logo"}}])
    );
}

#[test]
fn test_keyed_metadata_on_paragraph() {
    let slide = parse_markdown("<!-- test: meta -->\ntext");
    assert_eq!(
        content(&slide),
        &vec![json!({
            "type": "Paragraph",
            "content": [text("text")],
            "attributes": {"globalMetadataTags": [], "metadata": {"test": "meta"}}
        })]
    );
}

#[test]
fn test_front_matter_only() {
    let slide = parse_markdown("---\nlayout: column_2\n---\n");
    assert!(content(&slide).is_empty());
    assert_eq!(
        slide["attributes"]["frontMatter"],
        json!({"layout": "column_2"})
    );
}

#[test]
fn test_unterminated_front_matter_is_content() {
    let slide = parse_markdown("---\nlayout: column_2\n");
    assert_eq!(slide["attributes"]["frontMatter"], json!({}));
    // The dangling delimiter is a thematic break; the entry line is ordinary text
    assert_eq!(slide["content"][0]["type"], "HorizontalLine");
    assert_eq!(slide["content"][1]["content"][0]["content"], "layout: column_2");
}

#[test]
fn test_front_matter_after_content_is_not_front_matter() {
    let slide = parse_markdown("text\n\n---\nlayout: x\n---\n");
    assert_eq!(slide["attributes"]["frontMatter"], json!({}));
}

#[test]
fn test_global_tags_accumulate() {
    let slide = parse_markdown("<!-- a -->\n<!-- b -->\n> quote");
    assert_eq!(
        slide["content"][0]["attributes"]["globalMetadataTags"],
        json!(["a", "b"])
    );
}

#[test]
fn test_unmatched_section_close_is_noop() {
    let slide = parse_markdown("one\n\n<!-- / -->\n\ntwo");
    let types: Vec<&str> = content(&slide)
        .iter()
        .map(|b| b["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["Paragraph", "Paragraph"]);
}

#[test]
fn test_unknown_blocks_are_skipped() {
    let slide = parse_markdown("<div>raw</div>\n\n```rust\nfn main() {}\n```\n\nafter");
    assert_eq!(content(&slide).len(), 1);
    assert_eq!(slide["content"][0]["content"][0]["content"], "after");
}

#[test]
fn test_section_with_explicit_close() {
    let slide = parse_markdown("<!-- +column: left -->\ninside\n<!-- / -->\n\noutside");
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["type"], "Section");
    assert_eq!(blocks[0]["attributes"]["key"], "column");
    assert_eq!(blocks[0]["attributes"]["value"], "left");
    assert_eq!(blocks[0]["content"][0]["content"][0]["content"], "inside");
    assert_eq!(blocks[1]["type"], "Paragraph");
}

#[test]
fn test_section_runs_to_end_of_slide() {
    let slide = parse_markdown("<!-- +column: left -->\n\na\n\nb");
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["content"].as_array().unwrap().len(), 2);
}

#[test]
fn test_same_key_closes_previous_section() {
    let slide = parse_markdown(
        "<!-- +column: left -->\n\na\n\n<!-- +column: right -->\n\nb\n\n<!-- / -->",
    );
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["attributes"]["value"], "left");
    assert_eq!(blocks[1]["attributes"]["value"], "right");
}

#[test]
fn test_different_keys_nest() {
    let slide = parse_markdown(
        "<!-- +row: 1 -->\n\n<!-- +column: left -->\n\na\n\n<!-- / -->\n\nb\n\n<!-- / -->",
    );
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 1);
    let row = &blocks[0];
    assert_eq!(row["attributes"]["key"], "row");
    assert_eq!(row["content"][0]["attributes"]["key"], "column");
    assert_eq!(row["content"][1]["type"], "Paragraph");
}

#[test]
fn test_outer_key_reopened_inside_inner_section_nests() {
    // `row` differs from both the innermost key and `column`'s own key
    let slide = parse_markdown(
        "<!-- +row: 1 -->\n\n<!-- +column: a -->\n\nx\n\n<!-- +row: 2 -->\n\ny",
    );
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 1);
    let column = &blocks[0]["content"][0];
    assert_eq!(column["attributes"]["key"], "column");
    let inner = column["content"].as_array().unwrap();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[1]["attributes"]["key"], "row");
    assert_eq!(inner[1]["attributes"]["value"], "2");
}

#[test]
fn test_inner_key_reopened_closes_inner_only() {
    let slide = parse_markdown(
        "<!-- +row: 1 -->\n\n<!-- +column: a -->\n\nx\n\n<!-- +column: b -->\n\ny",
    );
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 1);
    let row = blocks[0]["content"].as_array().unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row[0]["attributes"]["value"], "a");
    assert_eq!(row[1]["attributes"]["value"], "b");
    assert_eq!(row[1]["content"][0]["content"][0]["content"], "y");
}

#[test]
fn test_misnested_close_inside_quote() {
    let slide = parse_markdown("<!-- +column: a -->\n\n> quoted\n> <!-- / -->\n\nafter");
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 1);
    let section = &blocks[0];
    assert_eq!(section["content"][0]["type"], "BlockQuote");
    assert_eq!(section["content"][1]["type"], "Paragraph");
}

#[test]
fn test_close_inside_quote_keeps_outer_sections_open() {
    let slide = parse_markdown(
        "<!-- +row: 1 -->\n\n<!-- +column: a -->\n\n> quoted\n> <!-- / -->\n\n<!-- +row: 2 -->\n\ntext",
    );
    let blocks = content(&slide);
    assert_eq!(blocks.len(), 1);
    let column = &blocks[0]["content"][0];
    assert_eq!(column["attributes"]["key"], "column");
    assert_eq!(column["content"][0]["type"], "BlockQuote");
    assert_eq!(column["content"][1]["type"], "Section");
    assert_eq!(column["content"][1]["attributes"]["value"], "2");
    assert_eq!(column["content"][1]["content"][0]["content"][0], text("text"));
}

#[test]
fn test_table_cell_kinds_follow_syntax() {
    let slide = parse_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
    let table = &slide["content"][0];
    assert_eq!(table["type"], "Table");
    assert_eq!(table["content"][0]["content"][0]["type"], "TableHeading");
    assert_eq!(table["content"][1]["content"][1]["type"], "TableData");
    assert_eq!(table["content"][1]["content"][1]["content"][0]["content"], "2");
}

#[test]
fn test_slide_tag_and_refs() {
    let slide = parse_markdown("[intro]\n\n# Title\n\n->[details]\n->[summary]");
    assert_eq!(slide["attributes"]["globalMetadataTags"], json!(["intro"]));
    assert_eq!(slide["attributes"]["refs"], json!(["details", "summary"]));
    assert_eq!(content(&slide).len(), 1);
}

#[test]
fn test_metadata_before_horizontal_line_is_dropped() {
    let slide = parse_markdown("<!-- lost -->\n***\n\ntext");
    assert_eq!(slide["content"][0]["type"], "HorizontalLine");
    assert_eq!(
        slide["content"][1]["attributes"]["globalMetadataTags"],
        json!([])
    );
}
