//! Token Source
//!
//! Turns slide source text into a flat, ordered token list. Generic
//! markdown is tokenized by comrak and flattened into open/close pairs;
//! the [`Grammar`](crate::grammar::Grammar) extension rules claim the
//! non-standard syntax (front matter, metadata comments, section tags)
//! before comrak's generic handling is used.
//!
//! Pipeline: source → extension rules at position 0 → comrak AST → flat tokens

use comrak::nodes::{AstNode, ListType as ComrakListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use tracing::debug;

use crate::grammar::{Grammar, RuleInput, RuleMatch};

/// Whether a token opens, closes or stands alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    Leaf,
}

/// Block-level token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Paragraph,
    Heading(u8),
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    Table,
    TableRow,
    TableHeading,
    TableData,
    /// Inline content of the enclosing block, carried in `children`
    Inline,
    HorizontalRule,
    /// Slide-initial `---` block with its key/value lines
    FrontMatter(Vec<(String, String)>),
    /// `<!-- NAME -->`
    GlobalMetadata(String),
    /// `<!--KEY: VALUE-->`
    KeyedMetadata { key: String, value: String },
    /// `<!-- +KEY: VALUE -->`
    SectionOpen { key: String, value: String },
    /// `<!-- / -->`
    SectionClose,
    /// A block construct the builder does not handle
    Unknown(&'static str),
}

/// A block-level token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub nesting: Nesting,
    /// Inline children, only populated for [`TokenKind::Inline`]
    pub children: Vec<InlineToken>,
}

impl Token {
    pub fn open(kind: TokenKind) -> Self {
        Self {
            kind,
            nesting: Nesting::Open,
            children: Vec::new(),
        }
    }

    pub fn close(kind: TokenKind) -> Self {
        Self {
            kind,
            nesting: Nesting::Close,
            children: Vec::new(),
        }
    }

    pub fn leaf(kind: TokenKind) -> Self {
        Self {
            kind,
            nesting: Nesting::Leaf,
            children: Vec::new(),
        }
    }

    pub fn inline(children: Vec<InlineToken>) -> Self {
        Self {
            kind: TokenKind::Inline,
            nesting: Nesting::Leaf,
            children,
        }
    }

    /// Check whether this token closes a block of the given kind
    pub fn closes(&self, kind: &TokenKind) -> bool {
        self.nesting == Nesting::Close && &self.kind == kind
    }
}

/// Inline-level token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum InlineToken {
    Text(String),
    Softbreak,
    Hardbreak,
    StrongOpen,
    StrongClose,
    EmOpen,
    EmClose,
    Code(String),
    LinkOpen { href: String },
    LinkClose,
    ImageOpen { src: String },
    ImageClose,
    /// Inline HTML, footnote references and similar
    Unknown,
}

/// Tokenizer with a configurable set of grammar extensions
pub struct TokenSource {
    grammar: Grammar,
}

impl Default for TokenSource {
    fn default() -> Self {
        Self::new(Grammar::slide_extensions())
    }
}

impl TokenSource {
    /// Create a token source using the given grammar extensions
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    /// Tokenize source text into a flat token list
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let text = text.replace("\r\n", "\n");
        let lines: Vec<&str> = text.split('\n').collect();
        let mut tokens = Vec::new();

        // Rules that only fire at stream position 0 see the raw source
        let mut consumed_lines = 0;
        if let Some(RuleMatch { token, lines_consumed }) = self.grammar.apply_at_start(&RuleInput {
            lines: &lines,
            line: 0,
            position: 0,
        }) {
            tokens.push(token);
            consumed_lines = lines_consumed;
        }

        let rest = lines[consumed_lines.min(lines.len())..].join("\n");
        let arena = Arena::new();
        let options = default_comrak_options();
        let root = parse_document(&arena, &rest, &options);

        for child in root.children() {
            self.collect_block(child, &mut tokens);
        }
        tokens
    }

    /// Flatten one comrak block node into tokens
    fn collect_block<'a>(&self, node: &'a AstNode<'a>, tokens: &mut Vec<Token>) {
        let value = node.data.borrow().value.clone();

        match value {
            NodeValue::Paragraph => {
                tokens.push(Token::open(TokenKind::Paragraph));
                tokens.push(Token::inline(collect_inlines(node)));
                tokens.push(Token::close(TokenKind::Paragraph));
            }

            NodeValue::Heading(heading) => {
                let kind = TokenKind::Heading(heading.level);
                tokens.push(Token::open(kind.clone()));
                tokens.push(Token::inline(collect_inlines(node)));
                tokens.push(Token::close(kind));
            }

            NodeValue::List(list) => {
                let kind = match list.list_type {
                    ComrakListType::Bullet => TokenKind::BulletList,
                    ComrakListType::Ordered => TokenKind::OrderedList,
                };
                tokens.push(Token::open(kind.clone()));
                for child in node.children() {
                    self.collect_block(child, tokens);
                }
                tokens.push(Token::close(kind));
            }

            NodeValue::Item(_) => {
                tokens.push(Token::open(TokenKind::ListItem));
                for child in node.children() {
                    self.collect_block(child, tokens);
                }
                tokens.push(Token::close(TokenKind::ListItem));
            }

            NodeValue::BlockQuote => {
                tokens.push(Token::open(TokenKind::Blockquote));
                for child in node.children() {
                    self.collect_block(child, tokens);
                }
                tokens.push(Token::close(TokenKind::Blockquote));
            }

            NodeValue::Table(..) => {
                tokens.push(Token::open(TokenKind::Table));
                for row in node.children() {
                    let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                    let cell_kind = if header {
                        TokenKind::TableHeading
                    } else {
                        TokenKind::TableData
                    };
                    tokens.push(Token::open(TokenKind::TableRow));
                    for cell in row.children() {
                        tokens.push(Token::open(cell_kind.clone()));
                        tokens.push(Token::inline(collect_inlines(cell)));
                        tokens.push(Token::close(cell_kind.clone()));
                    }
                    tokens.push(Token::close(TokenKind::TableRow));
                }
                tokens.push(Token::close(TokenKind::Table));
            }

            NodeValue::ThematicBreak => {
                tokens.push(Token::leaf(TokenKind::HorizontalRule));
            }

            NodeValue::HtmlBlock(html) => {
                self.collect_html_block(&html.literal, tokens);
            }

            NodeValue::CodeBlock(_) => {
                tokens.push(Token::leaf(TokenKind::Unknown("code_block")));
            }

            _ => {
                tokens.push(Token::leaf(TokenKind::Unknown("block")));
            }
        }
    }

    /// Run the comment rules over each line of an HTML block
    fn collect_html_block(&self, literal: &str, tokens: &mut Vec<Token>) {
        let lines: Vec<&str> = literal.lines().collect();
        let mut line = 0;

        while line < lines.len() {
            if lines[line].trim().is_empty() {
                line += 1;
                continue;
            }
            let input = RuleInput {
                lines: &lines,
                line,
                position: tokens.len().max(1),
            };
            match self.grammar.apply(&input) {
                Some(RuleMatch { token, lines_consumed }) => {
                    tokens.push(token);
                    line += lines_consumed.max(1);
                }
                None => {
                    debug!(line = lines[line], "skipping unrecognised html line");
                    tokens.push(Token::leaf(TokenKind::Unknown("html")));
                    line += 1;
                }
            }
        }
    }
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options
}

/// Collect the inline children of a block node as a flat token list
fn collect_inlines<'a>(node: &'a AstNode<'a>) -> Vec<InlineToken> {
    let mut children = Vec::new();
    for child in node.children() {
        collect_inline(child, &mut children);
    }
    merge_text(children)
}

fn collect_inline<'a>(node: &'a AstNode<'a>, out: &mut Vec<InlineToken>) {
    let value = node.data.borrow().value.clone();

    match value {
        NodeValue::Text(text) => out.push(InlineToken::Text(text.to_string())),
        NodeValue::SoftBreak => out.push(InlineToken::Softbreak),
        NodeValue::LineBreak => out.push(InlineToken::Hardbreak),
        NodeValue::Code(code) => out.push(InlineToken::Code(code.literal.to_string())),
        NodeValue::Strong => {
            out.push(InlineToken::StrongOpen);
            for child in node.children() {
                collect_inline(child, out);
            }
            out.push(InlineToken::StrongClose);
        }
        NodeValue::Emph => {
            out.push(InlineToken::EmOpen);
            for child in node.children() {
                collect_inline(child, out);
            }
            out.push(InlineToken::EmClose);
        }
        NodeValue::Link(link) => {
            out.push(InlineToken::LinkOpen {
                href: link.url.to_string(),
            });
            for child in node.children() {
                collect_inline(child, out);
            }
            out.push(InlineToken::LinkClose);
        }
        NodeValue::Image(link) => {
            out.push(InlineToken::ImageOpen {
                src: link.url.to_string(),
            });
            for child in node.children() {
                collect_inline(child, out);
            }
            out.push(InlineToken::ImageClose);
        }
        _ => out.push(InlineToken::Unknown),
    }
}

/// Merge adjacent text runs; softbreaks stay separate
fn merge_text(tokens: Vec<InlineToken>) -> Vec<InlineToken> {
    let mut merged: Vec<InlineToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match (merged.last_mut(), token) {
            (Some(InlineToken::Text(prev)), InlineToken::Text(next)) => prev.push_str(&next),
            (_, token) => merged.push(token),
        }
    }
    merged
}
