//! Slides and lanes
//!
//! A [`Slide`] is the unit produced by one parse; a [`Lane`] is a named,
//! ordered track of slide slots.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::{Block, Metadata};

/// A single slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide body
    pub content: Vec<Block>,
    /// Fixed at construction: parsed slides are active, placeholders are not
    pub active: bool,
    /// Outgoing cross-references to other slides, by name
    pub refs: Vec<String>,
    /// Slide-scoped configuration, e.g. `layout`
    pub front_matter: IndexMap<String, String>,
    pub metadata: Metadata,
}

impl Slide {
    /// Create an active slide with the given content
    pub fn new(content: Vec<Block>) -> Self {
        Self {
            content,
            active: true,
            refs: Vec::new(),
            front_matter: IndexMap::new(),
            metadata: Metadata::default(),
        }
    }

    /// Create an explicit inactive placeholder with no content
    pub fn placeholder() -> Self {
        Self {
            active: false,
            ..Self::new(Vec::new())
        }
    }

    /// Check if the slide has no content blocks
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get a front matter value
    pub fn front_matter_value(&self, key: &str) -> Option<&str> {
        self.front_matter.get(key).map(|s| s.as_str())
    }
}

/// A named track of slide slots
///
/// `None` marks a position where this lane defines no slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub name: String,
    pub slides: Vec<Option<Slide>>,
    pub output_as_presentation: bool,
}

impl Lane {
    /// Create an empty lane
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slides: Vec::new(),
            output_as_presentation: false,
        }
    }

    /// Append a slot
    pub fn push(&mut self, slide: Option<Slide>) {
        self.slides.push(slide);
    }

    /// Number of slots, including empty ones
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Check if the lane has no slots
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Iterate over the active slides
    pub fn active_slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter().flatten().filter(|s| s.active)
    }
}
