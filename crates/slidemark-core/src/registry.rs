//! Caller-supplied registries
//!
//! The HTML visitor resolves two kinds of names against data it does not
//! own: `img:NAME` image sources and global metadata tags.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix marking an image source as a registry name
pub const IMAGE_PREFIX: &str = "img:";

/// A base64 payload with its MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub mime: String,
    pub data: String,
}

impl ImageEntry {
    /// Render as a `data:` URI
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }
}

/// Name to base64 image data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRegistry {
    images: IndexMap<String, ImageEntry>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register already-encoded data
    pub fn insert(&mut self, name: impl Into<String>, mime: impl Into<String>, data: impl Into<String>) {
        self.images.insert(
            name.into(),
            ImageEntry {
                mime: mime.into(),
                data: data.into(),
            },
        );
    }

    /// Register raw bytes, base64 encoding them
    pub fn insert_bytes(&mut self, name: impl Into<String>, mime: impl Into<String>, bytes: &[u8]) {
        self.insert(name, mime, STANDARD.encode(bytes));
    }

    pub fn get(&self, name: &str) -> Option<&ImageEntry> {
        self.images.get(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Resolve an image source for output
    ///
    /// `img:NAME` becomes a `data:` URI when `NAME` is registered. Every
    /// other source, including unknown names, is returned unchanged.
    pub fn resolve(&self, source: &str) -> String {
        source
            .strip_prefix(IMAGE_PREFIX)
            .and_then(|name| self.images.get(name))
            .map(ImageEntry::data_uri)
            .unwrap_or_else(|| source.to_string())
    }
}

/// Name to attribute map for global metadata tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRegistry {
    entries: IndexMap<String, IndexMap<String, String>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, attributes: IndexMap<String, String>) {
        self.entries.insert(name.into(), attributes);
    }

    /// Attributes registered for a tag
    pub fn get(&self, name: &str) -> Option<&IndexMap<String, String>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Get the MIME content type for an image extension
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_registered_image() {
        let mut images = ImageRegistry::new();
        images.insert_bytes("logo", "image/png", b"png");
        assert_eq!(images.resolve("img:logo"), "data:image/png;base64,cG5n");
    }

    #[test]
    fn test_resolve_falls_back_to_source() {
        let images = ImageRegistry::new();
        assert_eq!(images.resolve("img:missing"), "img:missing");
        assert_eq!(images.resolve("logo.png"), "logo.png");
    }

    #[test]
    fn test_registries_deserialize_from_maps() {
        let images: ImageRegistry = serde_json::from_value(serde_json::json!({
            "logo": {"mime": "image/svg+xml", "data": "PHN2Zy8+"}
        }))
        .unwrap();
        assert_eq!(images.get("logo").unwrap().mime, "image/svg+xml");

        let meta: MetadataRegistry = serde_json::from_value(serde_json::json!({
            "hero": {"class": "hero", "theme": "dark"}
        }))
        .unwrap();
        let attrs = meta.get("hero").unwrap();
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["class", "theme"]);
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("PNG"), "image/png");
        assert_eq!(mime_for_extension("svg"), "image/svg+xml");
        assert_eq!(mime_for_extension("xyz"), "application/octet-stream");
    }
}
