//! Terminal output for the `git-semver` binary.
//!
//! - `formatter` - Pure formatting functions
//! - This module - Printing to stdout and stderr

use crate::output::SemanticVersionInfo;
use crate::warnings::CalculationWarning;
use anyhow::Result;
use console::style;

pub mod formatter;

pub use formatter::{format_json, format_text, format_warning};

/// How the calculated version is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Print the calculated version to stdout
pub fn display_version(info: &SemanticVersionInfo, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(info)?),
        OutputFormat::Text => println!("{}", format_text(info)),
    }
    Ok(())
}

/// Print recovered conditions to stderr in yellow
pub fn display_warnings(warnings: &[CalculationWarning]) {
    for warning in warnings {
        eprintln!("{}", format_warning(warning));
    }
}

/// Print an error message in red
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}
