//! Round-trip properties across the pipeline
//!
//! - Markdown(Model(s)) parses back to Model(s)
//! - Model(Json(m)) equals m for active slides

use slidemark_ast::{Lane, Node, Slide};
use slidemark_core::{
    build_lane, build_slide, parse_document, parse_markdown, Analysis, AnalysisVisitor, JsonVisitor,
    MarkdownVisitor,
};

fn model(source: &str) -> Slide {
    build_slide(&parse_markdown(source)).expect("parser output builds")
}

fn assert_markdown_round_trip(source: &str) {
    let first = model(source);
    let markdown = first.accept(&mut MarkdownVisitor::new());
    let second = model(&markdown);
    assert_eq!(first, second, "re-parse of:\n{}", markdown);
}

const SAMPLES: &[&str] = &[
    "text",
    "**bold *em***",
    "[alias](link)",
    "<!-- test: meta -->\ntext",
    "---\nlayout: column_2\n---\n",
    "# Title\n\nSome *emphasis* and `code` and ![img](img:logo)",
    "[intro]\n\n## Agenda\n\n1. first\n2. second\n    - nested\n    - items\n3. third\n\n->[next]",
    "<!-- hero -->\n<!--class: wide-->\n### Heading\n\n> quoted **text**\n>\n> - in a list",
    "| a | b |\n|---|---|\n| 1 | *2* |",
    "<!-- +column: left -->\n\nleft side\n\n<!-- / -->\n\n<!-- +column: right -->\n\n***\n\nright\n\n<!-- / -->",
    "escapes: \\*not bold\\* 1\\. \\# \\[x\\] a\\_b",
    "line one\nline two",
    "- item with\n  continuation",
    "a `` ` `` tick and [link with spaces](<my page.md>)",
    "**_x_**",
    "***x***",
    "*a*_b_",
    "**a**__b__",
    "*a*<!-- -->*b*c",
    "Hello\\![a](b)",
    "- a\n  <!-- t -->\n  - b",
    "[\\*x\\*]\n\nbody",
];

#[test]
fn test_markdown_round_trip() {
    for source in SAMPLES {
        assert_markdown_round_trip(source);
    }
}

#[test]
fn test_json_round_trip() {
    for source in SAMPLES {
        let slide = model(source);
        let tree = slide.accept(&mut JsonVisitor::new());
        assert_eq!(build_slide(&tree).unwrap(), slide);
    }
}

#[test]
fn test_lane_json_round_trip() {
    let mut lane = Lane::new("speaker-notes");
    lane.output_as_presentation = true;
    lane.push(Some(model("# One")));
    lane.push(None);
    lane.push(Some(Slide::placeholder()));
    lane.push(Some(model("two")));

    let rebuilt = build_lane(&lane.accept(&mut JsonVisitor::new())).unwrap();
    assert_eq!(rebuilt.name, "speaker-notes");
    assert!(rebuilt.output_as_presentation);
    assert_eq!(rebuilt.slides[0], lane.slides[0]);
    // Absent and inactive slots both come back absent
    assert_eq!(rebuilt.slides[1], None);
    assert_eq!(rebuilt.slides[2], None);
    assert_eq!(rebuilt.slides[3], lane.slides[3]);
}

#[test]
fn test_lane_markdown_round_trip() {
    let mut lane = Lane::new("talk");
    lane.push(Some(model("[intro]\n\n# One\n\n->[two]")));
    lane.push(Some(model("<!-- slide -->\ntagged paragraph")));
    lane.push(Some(model("- a\n- b")));
    lane.push(Some(model("---\nlayout: wide\n---\nbody")));

    let markdown = lane.accept(&mut MarkdownVisitor::new());
    let rebuilt = build_lane(&parse_document(&markdown, "talk")).unwrap();
    assert_eq!(rebuilt.slides, lane.slides);
}

#[test]
fn test_table_analysis() {
    let slide = model("| 11 | 12 |\n|----|----|\n| 21 | 22 |");
    assert_eq!(
        slide.accept(&mut AnalysisVisitor::new()),
        Analysis {
            words: 4,
            characters: 8,
            tables: 1,
            ..Analysis::default()
        }
    );
}
