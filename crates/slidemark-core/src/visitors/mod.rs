//! Output visitors
//!
//! Each visitor is a total function over the Document Model:
//!
//! | Visitor              | Output                          |
//! |----------------------|---------------------------------|
//! | [`HtmlVisitor`]      | HTML fragment                   |
//! | [`MarkdownVisitor`]  | slide dialect source            |
//! | [`JsonVisitor`]      | transit tree                    |
//! | [`AnalysisVisitor`]  | [`Analysis`] counters           |
//! | [`ReductionVisitor`] | compliance of a subtree         |
//!
//! Visitors keep no result stacks; parents fold the values returned for
//! their children.

pub mod analysis;
pub mod html;
pub mod json;
pub mod markdown;
pub mod reduction;

pub use analysis::{Analysis, AnalysisVisitor};
pub use html::HtmlVisitor;
pub use json::{to_json_string, JsonVisitor};
pub use markdown::MarkdownVisitor;
pub use reduction::ReductionVisitor;
