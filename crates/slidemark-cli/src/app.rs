//! CLI Application logic
//!
//! Contains the command-line interface implementation. Command functions
//! return their output as a string; `run_cli` decides where it goes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use slidemark_ast::{Lane, Node, Slide, Visitor};
use slidemark_core::diagnostics::Diagnostics;
use slidemark_core::{
    parse_document, transit, AnalysisVisitor, HtmlVisitor, JsonVisitor, MarkdownVisitor,
    ReductionVisitor,
};
use slidemark_validate::{build_lane_checked, build_slide_checked, check_one};

use crate::config::Settings;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

/// Target format for rendered slides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// HTML fragment
    Html,
    /// Slide markdown dialect
    #[default]
    Markdown,
    /// Transit tree JSON
    Json,
}

#[derive(Parser)]
#[command(name = "slidemark")]
#[command(author, version, about = "Markdown slides, one tree, many outputs", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: slidemark.toml next to the first input)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert slides to another format
    Convert {
        /// Input files: slide markdown, or transit JSON (`.json`)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target format
        #[arg(short, long, value_enum, default_value = "html")]
        to: RenderFormat,

        /// Collect the inputs into a lane with this name
        #[arg(long)]
        lane: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check inputs for structural problems
    Check {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print content statistics as JSON
    Stats {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Keep only the slides matching keywords or tags
    #[command(group(ArgGroup::new("criteria").required(true).multiple(true).args(["keyword", "tag"])))]
    Filter {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Keyword to search for in slide text (repeatable, case-insensitive)
        #[arg(short, long)]
        keyword: Vec<String>,

        /// Global metadata tag to match (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Target format
        #[arg(long, value_enum, default_value = "markdown")]
        to: RenderFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A single slide or a lane of slides
#[derive(Debug, Clone, PartialEq)]
pub enum Deck {
    Slide(Slide),
    Lane(Lane),
}

impl Deck {
    /// Run a visitor over the whole deck
    pub fn render<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Deck::Slide(slide) => slide.accept(visitor),
            Deck::Lane(lane) => lane.accept(visitor),
        }
    }

    /// View the deck as a lane, wrapping a lone slide
    pub fn into_lane(self, name: &str) -> Lane {
        match self {
            Deck::Lane(lane) => lane,
            Deck::Slide(slide) => {
                let mut lane = Lane::new(name);
                lane.push(Some(slide));
                lane
            }
        }
    }
}

/// Read an input file as a transit tree
///
/// `.json` files are transit trees already; anything else is slide markdown.
/// Markdown holding slide breaks becomes a lane named after the file stem.
pub fn load_tree(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse transit JSON: {}", path.display()))
    } else {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("main");
        Ok(parse_document(&content, name))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load, validate and build the inputs
///
/// One input without a lane name stays what it is. Otherwise every input
/// contributes its slides to a lane named `lane`, or the configured default.
pub fn load_deck(inputs: &[PathBuf], lane: Option<&str>, settings: &Settings) -> Result<Deck> {
    let mut decks = Vec::with_capacity(inputs.len());
    for input in inputs {
        let tree = load_tree(input)?;
        let deck = if transit::node_type(&tree) == Some(transit::LANE) {
            Deck::Lane(
                build_lane_checked(&tree)
                    .with_context(|| format!("Invalid input: {}", input.display()))?,
            )
        } else {
            Deck::Slide(
                build_slide_checked(&tree)
                    .with_context(|| format!("Invalid input: {}", input.display()))?,
            )
        };
        decks.push(deck);
    }

    if decks.len() == 1 && lane.is_none() {
        if let Some(deck) = decks.pop() {
            return Ok(deck);
        }
    }

    let mut combined = Lane::new(lane.unwrap_or(settings.output.lane.as_str()));
    combined.output_as_presentation = settings.output.presentation;
    for deck in decks {
        match deck {
            Deck::Slide(slide) => combined.push(Some(slide)),
            Deck::Lane(lane) => combined.slides.extend(lane.slides),
        }
    }
    Ok(Deck::Lane(combined))
}

/// Render a deck in the requested format
pub fn render(deck: &Deck, format: RenderFormat, settings: &Settings) -> Result<String> {
    let output = match format {
        RenderFormat::Html => {
            let images = settings.image_registry()?;
            let metadata = settings.metadata_registry();
            deck.render(&mut HtmlVisitor::new(&images, &metadata))
        }
        RenderFormat::Markdown => deck.render(&mut MarkdownVisitor::new()),
        RenderFormat::Json => serde_json::to_string_pretty(&deck.render(&mut JsonVisitor::new()))
            .context("Failed to serialize transit tree")?,
    };
    Ok(output)
}

/// Execute the convert command
pub fn convert_command(
    inputs: &[PathBuf],
    to: RenderFormat,
    lane: Option<&str>,
    settings: &Settings,
) -> Result<String> {
    let deck = load_deck(inputs, lane, settings)?;
    render(&deck, to, settings)
}

/// Diagnostics for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub success: bool,
    pub diagnostics: Diagnostics,
}

/// Execute the check command
///
/// Returns the report and whether any input has errors.
pub fn check_command(inputs: &[PathBuf], format: OutputFormat) -> Result<(String, bool)> {
    let mut reports = Vec::with_capacity(inputs.len());
    for input in inputs {
        let tree = load_tree(input)?;
        let result = check_one(&tree);
        reports.push(FileReport {
            file: input.display().to_string(),
            success: result.success,
            diagnostics: result.diagnostics,
        });
    }
    let has_errors = reports.iter().any(|r| !r.success);

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&reports)
            .context("Failed to serialize diagnostics to JSON")?,
        OutputFormat::Text => {
            let mut output = String::new();
            let mut error_count = 0;
            for report in &reports {
                if report.diagnostics.is_empty() {
                    output.push_str(&format!("✓ No issues found in {}\n", report.file));
                    continue;
                }
                output.push_str(&format!("{}:\n", report.file));
                for diag in &report.diagnostics {
                    output.push_str(&format!("{}\n\n", diag));
                }
                error_count += report.diagnostics.error_count();
            }
            if error_count > 0 {
                output.push_str(&format!("Found {} error(s)\n", error_count));
            }
            output
        }
    };
    Ok((output, has_errors))
}

/// Execute the stats command
pub fn stats_command(inputs: &[PathBuf], settings: &Settings) -> Result<String> {
    let deck = load_deck(inputs, None, settings)?;
    let analysis = deck.render(&mut AnalysisVisitor::new());
    serde_json::to_string_pretty(&analysis).context("Failed to serialize statistics")
}

/// Execute the filter command
pub fn filter_command(
    inputs: &[PathBuf],
    keywords: &[String],
    tags: &[String],
    to: RenderFormat,
    settings: &Settings,
) -> Result<String> {
    let lane = load_deck(inputs, None, settings)?.into_lane(&settings.output.lane);
    let mut reduction = ReductionVisitor::new(keywords, tags.iter().cloned());
    let reduced = reduction.reduce(&lane);
    tracing::debug!(
        kept = reduced.len(),
        total = lane.active_slides().count(),
        "Filtered slides"
    );
    render(&Deck::Lane(reduced), to, settings)
}

fn emit(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            println!("{}", output.trim_end_matches('\n'));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI application
///
/// Parses arguments and dispatches to the command. `check` exits with
/// status 1 when any input has errors.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            inputs,
            to,
            lane,
            output,
        } => {
            let settings = Settings::discover(cli.config.as_deref(), &inputs)?;
            let rendered = convert_command(&inputs, to, lane.as_deref(), &settings)?;
            emit(&rendered, output.as_deref())?;
        }
        Commands::Check { inputs, format } => {
            let (report, has_errors) = check_command(&inputs, format)?;
            emit(&report, None)?;
            if has_errors {
                std::process::exit(1);
            }
        }
        Commands::Stats { inputs } => {
            let settings = Settings::discover(cli.config.as_deref(), &inputs)?;
            emit(&stats_command(&inputs, &settings)?, None)?;
        }
        Commands::Filter {
            inputs,
            keyword,
            tag,
            to,
            output,
        } => {
            let settings = Settings::discover(cli.config.as_deref(), &inputs)?;
            let rendered = filter_command(&inputs, &keyword, &tag, to, &settings)?;
            emit(&rendered, output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_requires_criteria() {
        let result = Cli::try_parse_from(["slidemark", "filter", "a.md"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["slidemark", "filter", "a.md", "--tag", "intro"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["slidemark", "stats", "a.md", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(Path::new("deck.JSON")));
        assert!(!is_json(Path::new("deck.md")));
    }

    #[test]
    fn test_into_lane_wraps_slide() {
        let lane = Deck::Slide(Slide::new(Vec::new())).into_lane("solo");
        assert_eq!(lane.name, "solo");
        assert_eq!(lane.len(), 1);
    }
}
