use thiserror::Error;

/// Unified error type for git-semver operations
#[derive(Error, Debug)]
pub enum GitSemverError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Branch inheritance cycle detected: {}", chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },

    #[error("Graph traversal failed: {0}")]
    GraphTraversal(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Step budget of {budget} commit visits exceeded")]
    StepBudgetExceeded { budget: u64 },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration file could not be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-semver
pub type Result<T> = std::result::Result<T, GitSemverError>;

impl GitSemverError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitSemverError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitSemverError::Version(msg.into())
    }

    /// Create a graph traversal error with context
    pub fn graph(msg: impl Into<String>) -> Self {
        GitSemverError::GraphTraversal(msg.into())
    }

    /// Create a cycle error from the chain of branches visited so far
    pub fn cycle(chain: impl IntoIterator<Item = impl Into<String>>) -> Self {
        GitSemverError::CycleDetected {
            chain: chain.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the calculation can continue by degrading to a fallback.
    ///
    /// Only missing history is recovered; every other kind aborts the calculation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GitSemverError::GraphTraversal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitSemverError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitSemverError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_cycle_error_reports_full_chain() {
        let err = GitSemverError::cycle(["feature/a", "feature/b", "feature/a"]);
        assert_eq!(
            err.to_string(),
            "Branch inheritance cycle detected: feature/a -> feature/b -> feature/a"
        );
    }

    #[test]
    fn test_only_graph_errors_are_recoverable() {
        assert!(GitSemverError::graph("shallow clone").is_recoverable());
        assert!(!GitSemverError::config("bad").is_recoverable());
        assert!(!GitSemverError::cycle(["a", "a"]).is_recoverable());
        assert!(!GitSemverError::StepBudgetExceeded { budget: 10 }.is_recoverable());
    }

    #[test]
    fn test_pattern_error_conversion() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: GitSemverError = regex_err.into();
        assert!(err.to_string().starts_with("Invalid pattern"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitSemverError::config("x"), "Configuration error"),
            (GitSemverError::version("x"), "Version parsing error"),
            (GitSemverError::graph("x"), "Graph traversal failed"),
            (
                GitSemverError::BranchNotFound("x".to_string()),
                "Branch not found",
            ),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
