//! slidemark CLI - Command-line interface library
//!
//! This library provides the CLI functionality for slidemark:
//! - Convert: render slides as HTML, markdown or transit JSON
//! - Check: validate markdown or transit JSON inputs
//! - Stats: content analysis
//! - Filter: keep the slides matching keywords or tags
//!
//! # Library Usage
//!
//! ```ignore
//! use slidemark_cli::{convert_command, RenderFormat, Settings};
//!
//! let settings = Settings::discover(None, &inputs)?;
//! let html = convert_command(&inputs, RenderFormat::Html, None, &settings)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Render one slide as HTML
//! slidemark convert intro.md --to html
//!
//! # Build a lane from several slides and store it as transit JSON
//! slidemark convert intro.md agenda.md --lane talk --to json -o talk.json
//!
//! # Check a transit file for structural problems
//! slidemark check talk.json --format json
//!
//! # Keep the slides tagged `intro`
//! slidemark filter talk.json --tag intro
//! ```

pub mod app;
pub mod config;

// Re-export main entry point and types
pub use app::{
    check_command, convert_command, filter_command, load_deck, load_tree, render, stats_command,
};
pub use app::{run_cli, Deck, FileReport, OutputFormat, RenderFormat};
pub use config::Settings;
