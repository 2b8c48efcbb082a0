//! Error types for model construction.

use thiserror::Error;

/// Result type for model building
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors raised when a transit tree cannot be turned into a model
///
/// Validated input never produces these; they guard callers that skip the
/// validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Node is not a JSON object
    #[error("Expected a node object at {path}")]
    NotANode { path: String },

    /// Required field is absent
    #[error("Missing field '{field}' at {path}")]
    MissingField { path: String, field: String },

    /// `type` names no known node, or a node of the wrong category
    #[error("Unexpected element type '{found}' at {path}, expected {expected}")]
    UnexpectedType {
        path: String,
        found: String,
        expected: String,
    },

    /// Heading level outside 1..=6
    #[error("Invalid heading level at {path}: {level}")]
    InvalidLevel { path: String, level: String },

    /// List type other than `ordered`/`unordered`
    #[error("Invalid list type at {path}: {list_type}")]
    InvalidListType { path: String, list_type: String },

    /// Text node whose content is not a string
    #[error("Text content at {path} is not a string")]
    NonStringText { path: String },

    /// Attribute present but of the wrong shape
    #[error("Invalid attribute '{name}' at {path}")]
    InvalidAttribute { path: String, name: String },
}

impl BuildError {
    /// Create a missing field error
    pub fn missing_field(path: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            path: path.into(),
            field: field.into(),
        }
    }

    /// Create an unexpected type error
    pub fn unexpected_type(
        path: impl Into<String>,
        found: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::UnexpectedType {
            path: path.into(),
            found: found.into(),
            expected: expected.into(),
        }
    }

    /// Create an invalid attribute error
    pub fn invalid_attribute(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Location of the offending node
    pub fn path(&self) -> &str {
        match self {
            Self::NotANode { path }
            | Self::MissingField { path, .. }
            | Self::UnexpectedType { path, .. }
            | Self::InvalidLevel { path, .. }
            | Self::InvalidListType { path, .. }
            | Self::NonStringText { path }
            | Self::InvalidAttribute { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = BuildError::missing_field("/content/0", "type");
        assert_eq!(err.to_string(), "Missing field 'type' at /content/0");
        assert_eq!(err.path(), "/content/0");
    }
}
