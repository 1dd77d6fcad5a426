//! Analysis engine: derives a version for a commit from the repository graph

pub mod assembler;
pub mod calculator;
pub mod context;
pub mod height;
pub mod increment;
pub mod inheritance;
pub mod selector;
pub mod strategies;

pub use calculator::{Calculation, VersionCalculator};
pub use context::CalculationContext;
pub use height::CommitGraph;
