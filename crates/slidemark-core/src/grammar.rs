//! Grammar extensions
//!
//! Block rules that recognise the slide dialect's non-standard syntax
//! before the generic markdown rules can claim it:
//!
//! - `---` front matter (stream position 0 only)
//! - `<!-- / -->` section close
//! - `<!--KEY: VALUE-->` keyed metadata
//! - `<!-- +KEY: VALUE -->` section open
//! - `<!-- NAME -->` global metadata tag
//!
//! Rules are tried in registration order; the first match wins.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::tokens::{Token, TokenKind};

/// The lines a rule may inspect and where it is being tried
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// Lines of the region being scanned
    pub lines: &'a [&'a str],
    /// Index of the line the rule starts at
    pub line: usize,
    /// Number of tokens emitted before this point
    pub position: usize,
}

impl<'a> RuleInput<'a> {
    /// The current line, trimmed
    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.line).map(|l| l.trim())
    }
}

/// A successful rule application
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub token: Token,
    pub lines_consumed: usize,
}

impl RuleMatch {
    fn single_line(kind: TokenKind) -> Self {
        Self {
            token: Token::leaf(kind),
            lines_consumed: 1,
        }
    }
}

/// A block-level recognition rule
pub trait BlockRule: Send + Sync {
    /// Unique rule name, used for ordered registration
    fn name(&self) -> &'static str;

    /// Whether the rule may only fire at token-stream position 0
    fn start_only(&self) -> bool {
        false
    }

    /// Try to recognise a block at `input.line`
    fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch>;
}

/// An ordered set of block rules
#[derive(Default)]
pub struct Grammar {
    rules: Vec<Box<dyn BlockRule>>,
}

impl Grammar {
    /// Create a grammar with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// The slide dialect's extension rules in precedence order
    pub fn slide_extensions() -> Self {
        let mut grammar = Self::new();
        grammar.push(Box::new(FrontMatterRule));
        grammar.push(Box::new(SectionOpenRule));
        grammar.push(Box::new(GlobalMetadataRule));
        // Keyed metadata must win over the section-open pattern, and the
        // close tag has no colon so it must precede the global tag rule.
        grammar.register_before("section_open", Box::new(KeyedMetadataRule));
        grammar.register_before("keyed_metadata", Box::new(SectionCloseRule));
        grammar
    }

    /// Append a rule with the lowest precedence
    pub fn push(&mut self, rule: Box<dyn BlockRule>) {
        self.rules.push(rule);
    }

    /// Insert a rule directly before the named rule
    ///
    /// Falls back to appending when no rule has that name.
    pub fn register_before(&mut self, before: &str, rule: Box<dyn BlockRule>) {
        match self.rules.iter().position(|r| r.name() == before) {
            Some(index) => self.rules.insert(index, rule),
            None => {
                debug!(rule = rule.name(), before, "anchor rule missing, appending");
                self.rules.push(rule);
            }
        }
    }

    /// Names of the registered rules, in precedence order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Try every applicable rule in order
    pub fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        self.rules
            .iter()
            .filter(|rule| !rule.start_only() || input.position == 0)
            .find_map(|rule| rule.apply(input))
    }

    /// Try only the rules anchored to the start of the stream
    pub fn apply_at_start(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        if input.position != 0 {
            return None;
        }
        self.rules
            .iter()
            .filter(|rule| rule.start_only())
            .find_map(|rule| rule.apply(input))
    }
}

fn front_matter_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9_-]+):\s(.*)$").unwrap())
}

fn section_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<!--\s*/\s*-->$").unwrap())
}

fn keyed_metadata_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<!--\s*([A-Za-z0-9_-]+):\s*(.*?)\s*-->$").unwrap())
}

fn section_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<!--\s*\+([A-Za-z0-9_-]+):\s*(.*?)\s*-->$").unwrap())
}

fn global_metadata_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<!--\s*([^:]*?)\s*-->$").unwrap())
}

/// `---` delimited key/value block at the very start of a slide
///
/// The scan runs to the end of the input; without a closing delimiter the
/// rule fails and nothing is consumed.
pub struct FrontMatterRule;

impl BlockRule for FrontMatterRule {
    fn name(&self) -> &'static str {
        "front_matter"
    }

    fn start_only(&self) -> bool {
        true
    }

    fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        if input.lines.get(input.line)?.trim_end() != "---" {
            return None;
        }

        let mut entries = Vec::new();
        for (offset, line) in input.lines[input.line + 1..].iter().enumerate() {
            if line.trim_end() == "---" {
                return Some(RuleMatch {
                    token: Token::leaf(TokenKind::FrontMatter(entries)),
                    lines_consumed: offset + 2,
                });
            }
            if let Some(caps) = front_matter_entry_re().captures(line) {
                entries.push((caps[1].to_string(), caps[2].trim_end().to_string()));
            }
        }

        debug!("front matter has no closing delimiter, treating as content");
        None
    }
}

/// `<!-- / -->`
pub struct SectionCloseRule;

impl BlockRule for SectionCloseRule {
    fn name(&self) -> &'static str {
        "section_close"
    }

    fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        section_close_re()
            .is_match(input.current()?)
            .then(|| RuleMatch::single_line(TokenKind::SectionClose))
    }
}

/// `<!--KEY: VALUE-->`
pub struct KeyedMetadataRule;

impl BlockRule for KeyedMetadataRule {
    fn name(&self) -> &'static str {
        "keyed_metadata"
    }

    fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        let caps = keyed_metadata_re().captures(input.current()?)?;
        Some(RuleMatch::single_line(TokenKind::KeyedMetadata {
            key: caps[1].to_string(),
            value: caps[2].to_string(),
        }))
    }
}

/// `<!-- +KEY: VALUE -->`
pub struct SectionOpenRule;

impl BlockRule for SectionOpenRule {
    fn name(&self) -> &'static str {
        "section_open"
    }

    fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        let caps = section_open_re().captures(input.current()?)?;
        Some(RuleMatch::single_line(TokenKind::SectionOpen {
            key: caps[1].to_string(),
            value: caps[2].to_string(),
        }))
    }
}

/// `<!-- NAME -->`
pub struct GlobalMetadataRule;

impl BlockRule for GlobalMetadataRule {
    fn name(&self) -> &'static str {
        "global_metadata"
    }

    fn apply(&self, input: &RuleInput<'_>) -> Option<RuleMatch> {
        let caps = global_metadata_re().captures(input.current()?)?;
        let name = caps[1].to_string();
        if name.is_empty() {
            return None;
        }
        Some(RuleMatch::single_line(TokenKind::GlobalMetadata(name)))
    }
}
