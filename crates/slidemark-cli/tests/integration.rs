//! Integration tests for the slidemark CLI
//!
//! These tests drive the command functions over real files:
//! markdown -> transit JSON -> markdown, checks and filtering.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use slidemark_cli::{
    check_command, convert_command, filter_command, load_deck, stats_command, Deck, OutputFormat,
    RenderFormat, Settings,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_convert_single_slide_to_html() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "intro.md", "# Hello\n\nSome **bold** text");

    let html = convert_command(&[input], RenderFormat::Html, None, &Settings::default()).unwrap();
    assert_eq!(
        html,
        "<div class=\"slide\"><h1>Hello</h1><p>Some <b>bold</b> text</p></div>"
    );
}

#[test]
fn test_convert_uses_registries_from_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("dot.gif"), b"GIF").unwrap();
    write(
        &dir,
        "slidemark.toml",
        "[images]\ndot = \"dot.gif\"\n\n[metadata.hero]\nclass = \"hero\"\n",
    );
    let input = write(&dir, "slide.md", "<!-- hero -->\n![Dot](img:dot)");

    let settings = Settings::discover(None, std::slice::from_ref(&input)).unwrap();
    let html = convert_command(&[input], RenderFormat::Html, None, &settings).unwrap();
    assert_eq!(
        html,
        "<div class=\"slide\"><p data-class=\"hero\"><img src=\"data:image/gif;base64,R0lG\" alt=\"Dot\"></p></div>"
    );
}

#[test]
fn test_lane_round_trip_through_json() {
    let dir = TempDir::new().unwrap();
    let one = write(&dir, "one.md", "[intro]\n\n# One\n\n->[two]");
    let two = write(&dir, "two.md", "- a\n- b");
    let settings = Settings::default();

    let json = convert_command(
        &[one.clone(), two.clone()],
        RenderFormat::Json,
        Some("talk"),
        &settings,
    )
    .unwrap();
    let tree: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(tree["type"], "Lane");
    assert_eq!(tree["attributes"]["name"], "talk");
    assert_eq!(tree["content"].as_array().unwrap().len(), 2);

    let stored = write(&dir, "talk.json", &json);
    let from_json = load_deck(&[stored], None, &settings).unwrap();
    let from_markdown = load_deck(&[one, two], Some("talk"), &settings).unwrap();
    assert_eq!(from_json, from_markdown);
}

#[test]
fn test_convert_lane_to_markdown() {
    let dir = TempDir::new().unwrap();
    let one = write(&dir, "one.md", "first");
    let two = write(&dir, "two.md", "second");

    let markdown =
        convert_command(&[one, two], RenderFormat::Markdown, None, &Settings::default()).unwrap();
    assert_eq!(markdown, "first\n\n<!-- slide break: -->\n\nsecond");
}

#[test]
fn test_lane_markdown_reads_back_as_lane() {
    let dir = TempDir::new().unwrap();
    let one = write(&dir, "one.md", "<!-- slide -->\nfirst");
    let two = write(&dir, "two.md", "[end]\n\nsecond");
    let settings = Settings::default();

    let markdown = convert_command(
        &[one.clone(), two.clone()],
        RenderFormat::Markdown,
        Some("deck"),
        &settings,
    )
    .unwrap();
    let deck = write(&dir, "deck.md", &markdown);

    let Deck::Lane(reloaded) = load_deck(&[deck], None, &settings).unwrap() else {
        panic!("a document with slide breaks loads as a lane");
    };
    let Deck::Lane(original) = load_deck(&[one, two], Some("deck"), &settings).unwrap() else {
        panic!("a named lane stays a lane");
    };
    assert_eq!(reloaded.name, "deck");
    assert_eq!(reloaded.slides, original.slides);
}

#[test]
fn test_convert_rejects_invalid_transit() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "bad.json",
        r#"{"type": "Slide", "content": [{"type": "Heading", "content": [], "attributes": {"level": 0}}], "attributes": {}}"#,
    );

    let err = convert_command(&[input], RenderFormat::Html, None, &Settings::default())
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Invalid input"));
    assert!(message.contains("SLD002"));
}

#[test]
fn test_check_reports_every_problem() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.md", "# fine");
    let bad = write(
        &dir,
        "bad.json",
        r#"{"type": "Slide", "content": [
            {"type": "List", "content": [], "attributes": {"listType": "dots"}},
            {"type": "Text", "content": "stray", "attributes": {}}
        ], "attributes": {}}"#,
    );

    let (report, has_errors) = check_command(&[good, bad], OutputFormat::Text).unwrap();
    assert!(has_errors);
    assert!(report.contains("✓ No issues found in"));
    assert!(report.contains("error[SLD003]"));
    assert!(report.contains("error[SLD004]"));
    assert!(report.contains("Found 2 error(s)"));
}

#[test]
fn test_check_json_format() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "slide.md", "plain");

    let (report, has_errors) = check_command(&[input], OutputFormat::Json).unwrap();
    assert!(!has_errors);
    let parsed: Value = serde_json::from_str(&report).unwrap();
    assert_eq!(parsed[0]["success"], true);
    assert_eq!(parsed[0]["diagnostics"], serde_json::json!([]));
}

#[test]
fn test_stats_sums_lane() {
    let dir = TempDir::new().unwrap();
    let one = write(&dir, "one.md", "# Two words");
    let two = write(&dir, "two.md", "- one\n- two\n\n[link](https://example.com)");

    let json = stats_command(&[one, two], &Settings::default()).unwrap();
    let stats: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(stats["headings"], 1);
    assert_eq!(stats["bullet_points"], 2);
    assert_eq!(stats["links"], 1);
    assert_eq!(stats["words"], 5);
}

#[test]
fn test_filter_by_keyword_and_tag() {
    let dir = TempDir::new().unwrap();
    let rust = write(&dir, "rust.md", "# Why Rust");
    let tagged = write(&dir, "tagged.md", "[summary]\n\nclosing words");
    let other = write(&dir, "other.md", "unrelated");
    let inputs = [rust, tagged, other];
    let settings = Settings::default();

    let kept = filter_command(
        &inputs,
        &["RUST".to_string()],
        &["summary".to_string()],
        RenderFormat::Markdown,
        &settings,
    )
    .unwrap();
    assert_eq!(
        kept,
        "# Why Rust\n\n<!-- slide break: -->\n\n[summary]\n\nclosing words"
    );

    let none = filter_command(
        &inputs,
        &["absent".to_string()],
        &[],
        RenderFormat::Json,
        &settings,
    )
    .unwrap();
    let tree: Value = serde_json::from_str(&none).unwrap();
    assert_eq!(tree["content"], serde_json::json!([]));
}

#[test]
fn test_single_input_stays_a_slide() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "one.md", "x");
    let deck = load_deck(&[input], None, &Settings::default()).unwrap();
    assert!(matches!(deck, Deck::Slide(_)));
}

#[test]
fn test_missing_input_file() {
    let err = convert_command(
        &[PathBuf::from("/nonexistent/slide.md")],
        RenderFormat::Html,
        None,
        &Settings::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Failed to read input file"));
}
