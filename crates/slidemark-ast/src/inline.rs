//! Inline elements for slide content
//!
//! This module defines inline-level elements that appear within blocks:
//! text runs, emphasis wrappers, code spans, links and images.

use serde::{Deserialize, Serialize};

/// An immutable run of plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text(pub String);

impl Text {
    /// Create a text run
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text content
    Text(Text),
    /// Strong emphasis
    Bold(Bold),
    /// Emphasis
    Italic(Italic),
    /// Code span
    Code(Code),
    /// A hyperlink
    Link(Link),
    /// An inline image
    Image(Image),
}

/// Strong emphasis wrapping nested inline content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bold {
    pub content: Vec<Inline>,
}

/// Emphasis wrapping nested inline content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Italic {
    pub content: Vec<Inline>,
}

/// Code span wrapping nested inline content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Code {
    pub content: Vec<Inline>,
}

/// A hyperlink element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The link target
    pub target: String,
    /// The text shown for the link
    pub alias: String,
}

/// An image element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image source: a path, URL or `img:` registry reference
    pub target: String,
    /// Alternative text
    pub alias: String,
}

impl Inline {
    /// Create a plain text inline
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(Text::new(text))
    }

    /// Create a bold wrapper
    pub fn bold(content: Vec<Inline>) -> Self {
        Inline::Bold(Bold { content })
    }

    /// Create an italic wrapper
    pub fn italic(content: Vec<Inline>) -> Self {
        Inline::Italic(Italic { content })
    }

    /// Create a code span holding a single text run
    pub fn code(text: impl Into<String>) -> Self {
        Inline::Code(Code {
            content: vec![Inline::text(text)],
        })
    }

    /// Create a link
    pub fn link(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Inline::Link(Link {
            target: target.into(),
            alias: alias.into(),
        })
    }

    /// Create an image
    pub fn image(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Inline::Image(Image {
            target: target.into(),
            alias: alias.into(),
        })
    }

    /// Concatenated plain text of this element and its descendants
    ///
    /// Links and images contribute their alias.
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(t) => t.0.clone(),
            Inline::Bold(b) => plain_text(&b.content),
            Inline::Italic(i) => plain_text(&i.content),
            Inline::Code(c) => plain_text(&c.content),
            Inline::Link(l) => l.alias.clone(),
            Inline::Image(i) => i.alias.clone(),
        }
    }
}

/// Concatenated plain text of a sequence of inlines
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}
