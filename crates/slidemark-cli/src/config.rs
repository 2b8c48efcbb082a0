//! Configuration file (`slidemark.toml`)
//!
//! ```toml
//! [output]
//! lane = "main"
//! presentation = true
//!
//! [images]
//! logo = "assets/logo.png"
//!
//! [metadata.hero]
//! class = "hero"
//! transition = "fade"
//! ```
//!
//! Image paths are relative to the configuration file and are embedded as
//! base64 when the registries are built.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slidemark_core::registry::{mime_for_extension, ImageRegistry, MetadataRegistry};

/// File name looked up next to the input
pub const CONFIG_FILE_NAME: &str = "slidemark.toml";

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Image name to file path
    pub images: IndexMap<String, PathBuf>,
    /// Metadata registry entries, name to attribute map
    pub metadata: IndexMap<String, IndexMap<String, String>>,
    pub output: OutputSettings,
    /// Directory the settings were loaded from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Name of the lane built from several inputs
    pub lane: String,
    /// Mark built lanes for presentation output
    pub presentation: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            lane: "main".to_string(),
            presentation: false,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut settings = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        settings.base_dir = path.parent().map(Path::to_path_buf);
        Ok(settings)
    }

    /// Load the explicit config, or the one next to the first input
    ///
    /// Falls back to defaults when no file is found.
    pub fn discover(explicit: Option<&Path>, inputs: &[PathBuf]) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = inputs
            .first()
            .and_then(|input| input.parent())
            .map(|dir| dir.join(CONFIG_FILE_NAME));
        match candidate {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Using discovered config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Build the image registry, reading and encoding every image file
    pub fn image_registry(&self) -> Result<ImageRegistry> {
        let mut registry = ImageRegistry::new();
        for (name, path) in &self.images {
            let resolved = match &self.base_dir {
                Some(dir) => dir.join(path),
                None => path.clone(),
            };
            let bytes = fs::read(&resolved)
                .with_context(|| format!("Failed to read image '{}': {}", name, resolved.display()))?;
            let extension = resolved
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            registry.insert_bytes(name.clone(), mime_for_extension(extension), &bytes);
        }
        Ok(registry)
    }

    pub fn metadata_registry(&self) -> MetadataRegistry {
        let mut registry = MetadataRegistry::new();
        for (name, attributes) in &self.metadata {
            registry.insert(name.clone(), attributes.clone());
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.output.lane, "main");
        assert!(!settings.output.presentation);
        assert!(settings.images.is_empty());
    }

    #[test]
    fn test_parse_all_sections() {
        let settings = Settings::from_toml_str(
            r#"
[output]
lane = "talk"
presentation = true

[images]
logo = "logo.png"

[metadata.hero]
class = "hero"
transition = "fade"
"#,
        )
        .unwrap();
        assert_eq!(settings.output.lane, "talk");
        assert!(settings.output.presentation);
        assert_eq!(settings.images["logo"], PathBuf::from("logo.png"));
        let hero = settings.metadata_registry();
        assert_eq!(hero.get("hero").unwrap()["transition"], "fade");
    }

    #[test]
    fn test_image_registry_encodes_relative_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dot.png"), b"abc").unwrap();
        let config = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config, "[images]\ndot = \"dot.png\"\n").unwrap();

        let settings = Settings::load(&config).unwrap();
        let registry = settings.image_registry().unwrap();
        assert_eq!(registry.resolve("img:dot"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let settings = Settings::from_toml_str("[images]\nx = \"/nonexistent/x.png\"\n").unwrap();
        let err = settings.image_registry().unwrap_err();
        assert!(err.to_string().contains("Failed to read image 'x'"));
    }

    #[test]
    fn test_discover_next_to_input() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[output]\nlane = \"found\"\n").unwrap();
        let input = dir.path().join("slide.md");

        let settings = Settings::discover(None, &[input]).unwrap();
        assert_eq!(settings.output.lane, "found");
        assert_eq!(settings.base_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::discover(None, &[dir.path().join("slide.md")]).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
