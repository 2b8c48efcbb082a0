//! slidemark-validate - Transit tree validation
//!
//! This crate checks transit trees for required fields and value domains
//! before they reach the Model Builder.
//!
//! # Architecture
//!
//! Individual validators implement the `Validator` trait. The
//! `ValidationEngine` runs every registered validator and collects the
//! diagnostics; `check` renders them into the plain list of strings callers
//! show to users.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use slidemark_validate::check_one;
//!
//! let tree = json!({
//!     "type": "Slide",
//!     "content": [{"type": "Heading", "content": [], "attributes": {"level": 0}}],
//!     "attributes": {}
//! });
//! let result = check_one(&tree);
//! assert!(!result.success);
//! assert_eq!(result.errors.len(), 1);
//! ```

pub mod structure;

use serde::Serialize;
use serde_json::Value;
use slidemark_ast::{Lane, Slide};
use slidemark_core::diagnostics::{Diagnostic, Diagnostics};
use slidemark_core::BuildError;
use thiserror::Error;

pub use structure::{StructureValidator, Violation};

/// Trait for transit tree validators
///
/// Validators inspect one tree and return a diagnostic per problem found.
pub trait Validator: Send + Sync {
    /// Code prefix of the diagnostics this validator emits
    fn code(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str {
        "unnamed"
    }

    /// Validate the tree and return every diagnostic
    fn validate(&self, tree: &Value) -> Vec<Diagnostic>;
}

/// Runs a set of validators over transit trees
pub struct ValidationEngine {
    validators: Vec<Box<dyn Validator>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    /// Create an engine with no validators
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Create an engine with the structure validator registered
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_validator(Box::new(StructureValidator));
        engine
    }

    pub fn add_validator(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Validate one tree with every registered validator
    pub fn validate(&self, tree: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for validator in &self.validators {
            diagnostics.extend(validator.validate(tree));
        }
        diagnostics
    }

    pub fn has_errors(&self, tree: &Value) -> bool {
        self.validate(tree).has_errors()
    }
}

/// Outcome of checking one or more transit trees
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckResult {
    /// True when no violation was found
    pub success: bool,
    /// One rendered line per violation, in traversal order
    pub errors: Vec<String>,
    /// The underlying diagnostics
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl CheckResult {
    fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        let errors = diagnostics.iter().map(render).collect();
        Self {
            success: !diagnostics.has_errors(),
            errors,
            diagnostics,
        }
    }
}

/// `SLD002 /content/0: message`
fn render(diagnostic: &Diagnostic) -> String {
    match &diagnostic.code {
        Some(code) => format!("{} {}", code, diagnostic.summary()),
        None => diagnostic.summary(),
    }
}

/// Check a sequence of trees, each a Slide or a Lane
///
/// Every tree is walked in full; the paths in `errors` are prefixed with the
/// tree's index when more than one tree is given.
pub fn check(trees: &[Value]) -> CheckResult {
    let engine = ValidationEngine::with_defaults();
    let mut diagnostics = Diagnostics::new();
    for (index, tree) in trees.iter().enumerate() {
        let found = engine.validate(tree);
        if trees.len() == 1 {
            diagnostics.extend(found);
            continue;
        }
        diagnostics.extend(found.into_iter().map(|mut diagnostic| {
            diagnostic.path = diagnostic
                .path
                .map(|path| format!("[{}]{}", index, path));
            diagnostic
        }));
    }
    if !diagnostics.is_empty() {
        tracing::debug!(count = diagnostics.len(), "Transit validation failed");
    }
    CheckResult::from_diagnostics(diagnostics)
}

/// Check a single tree
pub fn check_one(tree: &Value) -> CheckResult {
    check(std::slice::from_ref(tree))
}

/// Errors from checked construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailed {
    /// The tree did not pass validation; nothing was built
    #[error("Transit tree failed validation with {} error(s):\n{}", .errors.len(), .errors.join("\n"))]
    Invalid { errors: Vec<String> },

    /// Validation passed but the builder rejected the tree
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl ValidationFailed {
    /// Rendered violations, empty for builder errors
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Invalid { errors } => errors,
            Self::Build(_) => &[],
        }
    }
}

fn ensure_valid(tree: &Value) -> Result<(), ValidationFailed> {
    let result = check_one(tree);
    if result.success {
        Ok(())
    } else {
        Err(ValidationFailed::Invalid {
            errors: result.errors,
        })
    }
}

/// Validate a Slide tree, then build it
pub fn build_slide_checked(tree: &Value) -> Result<Slide, ValidationFailed> {
    ensure_valid(tree)?;
    Ok(slidemark_core::build_slide(tree)?)
}

/// Validate a Lane tree, then build it
pub fn build_lane_checked(tree: &Value) -> Result<Lane, ValidationFailed> {
    ensure_valid(tree)?;
    Ok(slidemark_core::build_lane(tree)?)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slidemark_core::parse_markdown;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_engine_new() {
        let engine = ValidationEngine::new();
        assert_eq!(engine.validator_count(), 0);
        assert!(engine.validate(&json!(null)).is_empty());
    }

    #[test]
    fn test_engine_with_defaults() {
        let engine = ValidationEngine::with_defaults();
        assert_eq!(engine.validator_names(), vec!["structure"]);
    }

    #[test]
    fn test_check_parser_output() {
        let result = check_one(&parse_markdown("# Title\n\n- one\n- two"));
        assert!(result.success);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_check_does_not_mutate_input() {
        let tree = json!({"type": "Slide", "content": [{"type": "Heading"}], "attributes": {}});
        let before = tree.clone();
        let _ = check_one(&tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_rendered_error_has_code_and_path() {
        let tree = json!({
            "type": "Slide",
            "content": [{"type": "List", "content": [], "attributes": {"listType": "x"}}],
            "attributes": {}
        });
        let result = check_one(&tree);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("SLD003 /content/0: "));
    }

    #[test]
    fn test_multiple_trees_prefix_index() {
        let good = parse_markdown("ok");
        let bad = json!({"type": "Slide", "content": 3, "attributes": {}});
        let result = check(&[good, bad]);
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("SLD006 [1]/: "));
    }

    #[test]
    fn test_diagnostics_collection_matches_errors() {
        let tree = json!({
            "type": "Slide",
            "content": [
                {"type": "List", "content": [], "attributes": {"listType": "x"}},
                {"type": "Heading", "content": [], "attributes": {"level": 9}}
            ],
            "attributes": {}
        });
        let result = check_one(&tree);
        assert_eq!(result.diagnostics.len(), result.errors.len());
        assert_eq!(result.diagnostics.error_count(), 2);
        assert!(result.diagnostics.has_errors());
        assert!(ValidationEngine::with_defaults().has_errors(&tree));
    }

    #[test]
    fn test_checked_build_refuses_invalid() {
        let tree = json!({"type": "Slide", "content": [{"type": "Heading", "content": [], "attributes": {}}], "attributes": {}});
        let err = build_slide_checked(&tree).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn test_checked_build_accepts_valid() {
        let slide = build_slide_checked(&parse_markdown("[intro]\n\nhello")).unwrap();
        assert_eq!(slide.metadata.global_tags, vec!["intro".to_string()]);
    }

    #[test]
    fn test_checked_lane() {
        let tree = json!({
            "type": "Lane",
            "content": [parse_markdown("a"), null, {}],
            "attributes": {"name": "main", "outputAsPresentation": true}
        });
        let lane = build_lane_checked(&tree).unwrap();
        assert_eq!(lane.len(), 3);
        assert!(lane.slides[1].is_none());
        assert!(!lane.slides[2].as_ref().unwrap().active);
    }
}
