//! AST Builder
//!
//! Recursive-descent consumer of the token list produced by
//! [`TokenSource`]. One call to [`parse_markdown`] turns the source of one
//! slide into a transit `Slide` node.
//!
//! # Supported Syntax
//!
//! - Paragraphs, headings, bullet and ordered lists, block quotes, tables,
//!   horizontal rules
//! - `**bold**`, `*italic*`, `` `code` ``, `[alias](target)`, `![alias](src)`
//! - `---` front matter as the very first block
//! - `<!-- NAME -->` and `<!--KEY: VALUE-->` metadata for the next element
//! - `<!-- +KEY: VALUE -->` ... `<!-- / -->` sections
//! - `[NAME]` as the first run of the first paragraph tags the slide
//! - `->[SLIDE]` runs become outgoing slide references
//!
//! [`parse_document`] first cuts a document at `<!-- slide break: -->`
//! lines and parses each part as its own slide.
//!
//! Malformed input never fails: unterminated front matter is parsed as
//! ordinary content, an unmatched section close does nothing and
//! unrecognised blocks are skipped.
//!
//! # Example
//!
//! ```
//! use slidemark_core::parser::parse_markdown;
//!
//! let slide = parse_markdown("# Hello\n\nWorld");
//! assert_eq!(slide["type"], "Slide");
//! assert_eq!(slide["content"][0]["type"], "Heading");
//! ```

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::tokens::{InlineToken, Nesting, Token, TokenKind, TokenSource};
use crate::transit::{self, ATTR_FRONT_MATTER, ATTR_GLOBAL_TAGS, ATTR_METADATA, ATTR_REFS};
use crate::visitors::markdown::SLIDE_BREAK;

/// State for one parse call, threaded through every helper
struct ParseContext<'t> {
    tokens: &'t [Token],
    /// Shared cursor into `tokens`
    pos: usize,
    /// Keys of the sections currently open, innermost last
    section_stack: Vec<String>,
    pending_tags: Vec<String>,
    pending_metadata: IndexMap<String, String>,
    slide_tags: Vec<String>,
    refs: Vec<String>,
    seen_paragraph: bool,
}

impl<'t> ParseContext<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            section_stack: Vec::new(),
            pending_tags: Vec::new(),
            pending_metadata: IndexMap::new(),
            slide_tags: Vec::new(),
            refs: Vec::new(),
            seen_paragraph: false,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consume the close token of `kind` if it is next
    fn expect_close(&mut self, kind: &TokenKind) {
        if self.peek().is_some_and(|t| t.closes(kind)) {
            self.advance();
        }
    }

    /// Consume an `Inline` token if it is next and return its children
    fn take_inline(&mut self) -> &'t [InlineToken] {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Inline => {
                self.advance();
                &token.children
            }
            _ => &[],
        }
    }

    /// Skip the token at the cursor together with its subtree
    fn skip_subtree(&mut self) {
        let Some(first) = self.peek() else {
            return;
        };
        self.advance();
        if first.nesting != Nesting::Open {
            return;
        }
        let mut depth = 1usize;
        while let Some(token) = self.peek() {
            self.advance();
            if token.kind == first.kind {
                match token.nesting {
                    Nesting::Open => depth += 1,
                    Nesting::Close => depth -= 1,
                    Nesting::Leaf => {}
                }
                if depth == 0 {
                    break;
                }
            }
        }
    }

    /// Attach-and-clear: hand the pending buffers to a new element
    fn take_pending(&mut self) -> Map<String, Value> {
        let tags = std::mem::take(&mut self.pending_tags);
        let metadata = std::mem::take(&mut self.pending_metadata);
        let mut attributes = Map::new();
        attributes.insert(
            ATTR_GLOBAL_TAGS.to_string(),
            Value::Array(tags.into_iter().map(Value::String).collect()),
        );
        attributes.insert(ATTR_METADATA.to_string(), transit::string_map(&metadata));
        attributes
    }

    fn has_pending(&self) -> bool {
        !self.pending_tags.is_empty() || !self.pending_metadata.is_empty()
    }
}

fn slide_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(.*)\]$").unwrap())
}

fn slide_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^->\[(.*)\]$").unwrap())
}

/// Parse the source of one slide into a transit `Slide` node
pub fn parse_markdown(text: &str) -> Value {
    parse_with(&TokenSource::default(), text)
}

/// Cut a document into the source of its slides
///
/// A line holding only the slide break comment separates two slides; the
/// break line and the blank lines right after it belong to neither.
pub fn split_slides(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim() == SLIDE_BREAK {
            parts.push(&text[start..offset]);
            start = end;
        } else if start == offset && !parts.is_empty() && line.trim().is_empty() {
            start = end;
        }
        offset = end;
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a document that may hold several slides
///
/// Without a slide break this is [`parse_markdown`]. Otherwise the parts
/// become the slots of a `Lane` node called `name`.
pub fn parse_document(text: &str, name: &str) -> Value {
    let parts = split_slides(text);
    if parts.len() == 1 {
        return parse_markdown(text);
    }
    debug!(slides = parts.len(), lane = name, "splitting document at slide breaks");

    let slides = parts.into_iter().map(parse_markdown).collect();
    let mut attributes = Map::new();
    attributes.insert(
        transit::ATTR_NAME.to_string(),
        Value::String(name.to_string()),
    );
    attributes.insert(
        transit::ATTR_OUTPUT_AS_PRESENTATION.to_string(),
        Value::Bool(false),
    );
    transit::node(transit::LANE, Value::Array(slides), attributes)
}

/// Parse with a caller-supplied token source
pub fn parse_with(source: &TokenSource, text: &str) -> Value {
    let tokens = source.tokenize(text);
    let mut ctx = ParseContext::new(&tokens);

    let mut front_matter = IndexMap::new();
    if let Some(Token {
        kind: TokenKind::FrontMatter(entries),
        ..
    }) = ctx.peek()
    {
        front_matter.extend(entries.iter().cloned());
        ctx.advance();
    }

    let mut content = Vec::new();
    loop {
        content.extend(parse_blocks(&mut ctx));
        if ctx.at_end() {
            break;
        }
        // A close token with no matching open at this level
        ctx.advance();
    }

    if ctx.has_pending() {
        debug!(
            tags = ?ctx.pending_tags,
            metadata = ?ctx.pending_metadata,
            "discarding metadata with no element to attach to"
        );
    }

    let mut attributes = Map::new();
    attributes.insert(
        ATTR_REFS.to_string(),
        Value::Array(ctx.refs.into_iter().map(Value::String).collect()),
    );
    attributes.insert(
        ATTR_FRONT_MATTER.to_string(),
        transit::string_map(&front_matter),
    );
    attributes.insert(
        ATTR_GLOBAL_TAGS.to_string(),
        Value::Array(ctx.slide_tags.into_iter().map(Value::String).collect()),
    );
    attributes.insert(ATTR_METADATA.to_string(), Value::Object(Map::new()));

    transit::node(transit::SLIDE, Value::Array(content), attributes)
}

/// Parse blocks until the end of the stream or any close token
///
/// The close token is left for the caller.
fn parse_blocks(ctx: &mut ParseContext<'_>) -> Vec<Value> {
    let mut blocks = Vec::new();
    while let Some(token) = ctx.peek() {
        if token.nesting == Nesting::Close {
            break;
        }
        if let Some(block) = parse_block(ctx) {
            blocks.push(block);
        }
    }
    blocks
}

/// Parse the construct at the cursor; `None` for tokens that only change state
fn parse_block(ctx: &mut ParseContext<'_>) -> Option<Value> {
    let token = ctx.peek()?;

    match (&token.kind, token.nesting) {
        (TokenKind::Paragraph, Nesting::Open) => parse_paragraph(ctx),
        (TokenKind::Heading(level), Nesting::Open) => Some(parse_heading(ctx, *level)),
        (TokenKind::BulletList | TokenKind::OrderedList, Nesting::Open) => {
            Some(parse_list(ctx, token.kind.clone()))
        }
        (TokenKind::Blockquote, Nesting::Open) => Some(parse_blockquote(ctx)),
        (TokenKind::Table, Nesting::Open) => Some(parse_table(ctx)),
        (TokenKind::HorizontalRule, _) => {
            ctx.advance();
            if ctx.has_pending() {
                debug!("horizontal line carries no metadata, dropping pending buffers");
                ctx.take_pending();
            }
            Some(transit::node(
                transit::HORIZONTAL_LINE,
                Value::Array(Vec::new()),
                Map::new(),
            ))
        }
        (TokenKind::GlobalMetadata(name), _) => {
            ctx.pending_tags.push(name.clone());
            ctx.advance();
            None
        }
        (TokenKind::KeyedMetadata { key, value }, _) => {
            ctx.pending_metadata.insert(key.clone(), value.clone());
            ctx.advance();
            None
        }
        (TokenKind::SectionOpen { key, value }, _) => Some(parse_section(ctx, key, value)),
        (TokenKind::SectionClose, _) => {
            ctx.advance();
            // Sections only close at their own container level
            match ctx.section_stack.last() {
                Some(key) => debug!(key = key.as_str(), "section close outside its container"),
                None => debug!("section close without an open section"),
            }
            None
        }
        (kind, _) => {
            debug!(?kind, "skipping token");
            ctx.skip_subtree();
            None
        }
    }
}

fn parse_paragraph(ctx: &mut ParseContext<'_>) -> Option<Value> {
    ctx.advance();
    let attributes = ctx.take_pending();
    let children = ctx.take_inline();
    ctx.expect_close(&TokenKind::Paragraph);

    let mut content = extract_inlines(children);
    let mut extracted = false;

    if !ctx.seen_paragraph {
        ctx.seen_paragraph = true;
        if let Some(tag) = content.first().and_then(|first| match_text(first, slide_tag_re())) {
            ctx.slide_tags.push(tag);
            content.remove(0);
            extracted = true;
        }
    }

    content.retain(|run| match match_text(run, slide_ref_re()) {
        Some(name) => {
            ctx.refs.push(name);
            extracted = true;
            false
        }
        None => true,
    });

    if extracted {
        trim_breaks(&mut content);
        if content.is_empty() {
            return None;
        }
    }

    Some(transit::node(
        transit::PARAGRAPH,
        Value::Array(content),
        attributes,
    ))
}

/// The captured name if `run` is a text node whose whole content matches
fn match_text(run: &Value, re: &Regex) -> Option<String> {
    if transit::node_type(run) != Some(transit::TEXT) {
        return None;
    }
    let text = run.get("content")?.as_str()?;
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Drop line-break runs left at either end after extraction
fn trim_breaks(content: &mut Vec<Value>) {
    let is_break = |v: &Value| {
        transit::node_type(v) == Some(transit::TEXT)
            && v.get("content")
                .and_then(Value::as_str)
                .is_some_and(|s| s.trim().is_empty())
    };
    while content.first().is_some_and(is_break) {
        content.remove(0);
    }
    while content.last().is_some_and(is_break) {
        content.pop();
    }
    // Adjacent breaks collapse to one where a run was removed between them
    content.dedup_by(|b, a| is_break(a) && is_break(b));
}

fn parse_heading(ctx: &mut ParseContext<'_>, level: u8) -> Value {
    ctx.advance();
    let mut attributes = ctx.take_pending();
    let content = extract_inlines(ctx.take_inline());
    ctx.expect_close(&TokenKind::Heading(level));

    attributes.insert(transit::ATTR_LEVEL.to_string(), Value::from(level));
    transit::node(transit::HEADING, Value::Array(content), attributes)
}

fn parse_list(ctx: &mut ParseContext<'_>, kind: TokenKind) -> Value {
    ctx.advance();
    let mut attributes = ctx.take_pending();
    let mut entries = Vec::new();

    while let Some(token) = ctx.peek() {
        if token.closes(&kind) {
            ctx.advance();
            break;
        }
        match (&token.kind, token.nesting) {
            (TokenKind::ListItem, Nesting::Open) => parse_list_item(ctx, &mut entries),
            (_, Nesting::Close) => break,
            _ => ctx.skip_subtree(),
        }
    }

    let list_type = if kind == TokenKind::OrderedList {
        "ordered"
    } else {
        "unordered"
    };
    attributes.insert(
        transit::ATTR_LIST_TYPE.to_string(),
        Value::String(list_type.to_string()),
    );
    transit::node(transit::LIST, Value::Array(entries), attributes)
}

/// Parse one item; nested lists are appended after it as sibling entries
fn parse_list_item(ctx: &mut ParseContext<'_>, entries: &mut Vec<Value>) {
    ctx.advance();
    let mut content: Vec<Value> = Vec::new();
    let mut nested = Vec::new();

    while let Some(token) = ctx.peek() {
        if token.closes(&TokenKind::ListItem) {
            ctx.advance();
            break;
        }
        match (&token.kind, token.nesting) {
            (TokenKind::Paragraph, Nesting::Open) => {
                ctx.advance();
                if !content.is_empty() {
                    content.push(transit::text("\n"));
                }
                content.extend(extract_inlines(ctx.take_inline()));
                ctx.expect_close(&TokenKind::Paragraph);
            }
            (TokenKind::BulletList | TokenKind::OrderedList, Nesting::Open) => {
                nested.push(parse_list(ctx, token.kind.clone()));
            }
            (
                TokenKind::GlobalMetadata(_)
                | TokenKind::KeyedMetadata { .. }
                | TokenKind::SectionClose,
                _,
            ) => {
                parse_block(ctx);
            }
            (TokenKind::SectionOpen { key, .. }, _) => {
                debug!(key = key.as_str(), "section tag inside list item dropped");
                ctx.advance();
            }
            (_, Nesting::Close) => break,
            (kind, _) => {
                debug!(?kind, "skipping block inside list item");
                ctx.skip_subtree();
            }
        }
    }

    entries.push(transit::wrapper(transit::LIST_ITEM, content));
    entries.extend(nested);
}

fn parse_blockquote(ctx: &mut ParseContext<'_>) -> Value {
    ctx.advance();
    let attributes = ctx.take_pending();
    let content = parse_blocks(ctx);
    ctx.expect_close(&TokenKind::Blockquote);
    transit::node(transit::BLOCK_QUOTE, Value::Array(content), attributes)
}

fn parse_table(ctx: &mut ParseContext<'_>) -> Value {
    ctx.advance();
    let attributes = ctx.take_pending();
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut row = 0usize;
    let mut col = 0usize;

    while let Some(token) = ctx.peek() {
        if token.closes(&TokenKind::Table) {
            ctx.advance();
            break;
        }
        match (&token.kind, token.nesting) {
            (TokenKind::TableRow, Nesting::Open) => {
                ctx.advance();
                rows.push(Vec::new());
                row = rows.len() - 1;
                col = 0;
            }
            (TokenKind::TableRow, Nesting::Close) => ctx.advance(),
            (TokenKind::TableHeading | TokenKind::TableData, Nesting::Open) => {
                let kind = token.kind.clone();
                ctx.advance();
                let content = extract_inlines(ctx.take_inline());
                ctx.expect_close(&kind);

                let cell_type = if kind == TokenKind::TableHeading {
                    transit::TABLE_HEADING
                } else {
                    transit::TABLE_DATA
                };
                if rows.is_empty() {
                    rows.push(Vec::new());
                }
                rows[row].insert(col, transit::wrapper(cell_type, content));
                col += 1;
            }
            (_, Nesting::Close) => break,
            _ => ctx.skip_subtree(),
        }
    }

    let rows = rows
        .into_iter()
        .map(|cells| transit::wrapper(transit::TABLE_ROW, cells))
        .collect();
    transit::node(transit::TABLE, Value::Array(rows), attributes)
}

/// Parse a section from its open tag up to its termination
///
/// A section ends at an explicit close tag, at the end of the enclosing
/// container, or before a new open tag whose key equals either the
/// innermost open key or this section's own key.
fn parse_section(ctx: &mut ParseContext<'_>, key: &str, value: &str) -> Value {
    ctx.advance();
    let mut attributes = ctx.take_pending();
    ctx.section_stack.push(key.to_string());
    let depth = ctx.section_stack.len();
    let mut content = Vec::new();

    while let Some(token) = ctx.peek() {
        match &token.kind {
            _ if token.nesting == Nesting::Close => break,
            TokenKind::SectionClose => {
                ctx.advance();
                break;
            }
            TokenKind::SectionOpen { key: next, .. }
                if ctx.section_stack.last() == Some(next) || next == key =>
            {
                break;
            }
            _ => {
                if let Some(block) = parse_block(ctx) {
                    content.push(block);
                }
            }
        }
    }
    ctx.section_stack.truncate(depth - 1);

    attributes.insert(transit::ATTR_KEY.to_string(), Value::String(key.to_string()));
    attributes.insert(
        transit::ATTR_VALUE.to_string(),
        Value::String(value.to_string()),
    );
    transit::node(transit::SECTION, Value::Array(content), attributes)
}

/// Current insertion target: the innermost open wrapper, or the root
fn current<'a>(
    stack: &'a mut [(&'static str, Vec<Value>)],
    root: &'a mut Vec<Value>,
) -> &'a mut Vec<Value> {
    match stack.last_mut() {
        Some((_, content)) => content,
        None => root,
    }
}

/// Convert a flat inline token list into nested transit inline nodes
///
/// Single forward pass; open Bold/Italic wrappers live on a stack.
/// Link and image text following an open token is collected as the alias.
fn extract_inlines(tokens: &[InlineToken]) -> Vec<Value> {
    let mut root = Vec::new();
    let mut stack: Vec<(&'static str, Vec<Value>)> = Vec::new();
    // (node type, target, alias) while inside a link or image
    let mut reference: Option<(&'static str, String, String)> = None;

    for token in tokens {
        if let Some((node_type, target, alias)) = reference.as_mut() {
            match token {
                InlineToken::Text(text) | InlineToken::Code(text) => alias.push_str(text),
                InlineToken::Softbreak | InlineToken::Hardbreak => alias.push(' '),
                InlineToken::LinkClose | InlineToken::ImageClose => {
                    let node = transit::reference(*node_type, target.clone(), alias.clone());
                    current(&mut stack, &mut root).push(node);
                    reference = None;
                }
                _ => {}
            }
            continue;
        }

        match token {
            InlineToken::Text(text) => {
                current(&mut stack, &mut root).push(transit::text(text.as_str()))
            }
            InlineToken::Softbreak | InlineToken::Hardbreak => {
                current(&mut stack, &mut root).push(transit::text("\n"))
            }
            InlineToken::StrongOpen => stack.push((transit::BOLD, Vec::new())),
            InlineToken::EmOpen => stack.push((transit::ITALIC, Vec::new())),
            InlineToken::StrongClose | InlineToken::EmClose => {
                if let Some((node_type, content)) = stack.pop() {
                    current(&mut stack, &mut root).push(transit::wrapper(node_type, content));
                }
            }
            InlineToken::Code(text) => current(&mut stack, &mut root)
                .push(transit::wrapper(transit::CODE, vec![transit::text(text.as_str())])),
            InlineToken::LinkOpen { href } => {
                reference = Some((transit::LINK, href.clone(), String::new()));
            }
            InlineToken::ImageOpen { src } => {
                reference = Some((transit::IMAGE, src.clone(), String::new()));
            }
            InlineToken::LinkClose | InlineToken::ImageClose | InlineToken::Unknown => {}
        }
    }

    if let Some((node_type, target, alias)) = reference {
        current(&mut stack, &mut root).push(transit::reference(node_type, target, alias));
    }
    while let Some((node_type, content)) = stack.pop() {
        current(&mut stack, &mut root).push(transit::wrapper(node_type, content));
    }
    root
}
