use crate::config::VersionStrategyKind;
use std::fmt;

/// Conditions the calculation recovered from.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationWarning {
    /// Tag exists but cannot be parsed as a semantic version
    UnparsableTag { tag: String },
    /// A strategy failed on missing history and was skipped
    StrategySkipped {
        strategy: VersionStrategyKind,
        reason: String,
    },
    /// Several candidates tied for the top rank
    AmbiguousVersion {
        version: String,
        strategies: Vec<VersionStrategyKind>,
    },
    /// An `Inherit` branch has no branch it could have been created from
    ParentBranchNotFound { branch: String },
}

impl fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': not a semantic version", tag)
            }
            CalculationWarning::StrategySkipped { strategy, reason } => {
                write!(f, "Skipped {:?} strategy: {}", strategy, reason)
            }
            CalculationWarning::AmbiguousVersion {
                version,
                strategies,
            } => {
                let names: Vec<String> = strategies.iter().map(|s| format!("{:?}", s)).collect();
                write!(
                    f,
                    "Version {} proposed by several candidates ({}); picked {}",
                    version,
                    names.join(", "),
                    names.first().map_or("none", String::as_str)
                )
            }
            CalculationWarning::ParentBranchNotFound { branch } => {
                write!(
                    f,
                    "No parent branch found for '{}'; using the default increment",
                    branch
                )
            }
        }
    }
}
