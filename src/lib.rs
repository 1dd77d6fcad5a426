pub mod analyzer;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod output;
pub mod ui;
pub mod warnings;

pub use analyzer::{Calculation, VersionCalculator};
pub use error::{GitSemverError, Result};
pub use output::SemanticVersionInfo;
