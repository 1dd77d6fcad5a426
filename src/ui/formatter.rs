//! Pure formatting functions for CLI output.
//!
//! Everything here returns strings so it can be tested without a terminal;
//! printing lives in the parent module.

use crate::output::SemanticVersionInfo;
use crate::warnings::CalculationWarning;
use console::style;

/// Render the result as pretty-printed JSON
pub fn format_json(info: &SemanticVersionInfo) -> serde_json::Result<String> {
    serde_json::to_string_pretty(info)
}

fn row(key: &str, value: impl std::fmt::Display) -> String {
    format!("{:<28} {}", style(key).bold(), value)
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Render the result as aligned `key value` lines
pub fn format_text(info: &SemanticVersionInfo) -> String {
    let meta = &info.build_meta_data;
    let rows = [
        row("FullSemVer", style(&info.full_sem_ver).green()),
        row("SemVer", &info.sem_ver),
        row("Major", info.major),
        row("Minor", info.minor),
        row("Patch", info.patch),
        row("PreReleaseTag", &info.pre_release_tag),
        row("PreReleaseLabel", &info.pre_release_label),
        row("PreReleaseNumber", optional(&info.pre_release_number)),
        row("MajorMinorPatch", &info.major_minor_patch),
        row("InformationalVersion", &info.informational_version),
        row("CommitsSinceTag", meta.commits_since_tag),
        row("CommitsSinceVersionSource", meta.commits_since_version_source),
        row("BranchName", &info.branch_name),
        row("EscapedBranchName", &info.escaped_branch_name),
        row("Sha", &info.sha),
        row("ShortSha", &info.short_sha),
        row("VersionSourceSha", optional(&info.version_source_sha)),
        row(
            "CommitDate",
            info.commit_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
        row("UncommittedChanges", info.uncommitted_changes),
    ];
    rows.join("\n")
}

/// One warning line
pub fn format_warning(warning: &CalculationWarning) -> String {
    format!("{} {}", style("warning:").yellow().bold(), style(warning).yellow())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemanticVersion;

    fn info() -> SemanticVersionInfo {
        SemanticVersionInfo::new(&SemanticVersion::new(1, 2, 0), 0, None)
    }

    #[test]
    fn test_format_text_lists_versions() {
        console::set_colors_enabled(false);
        let text = format_text(&info());
        assert!(text.lines().any(|l| l.starts_with("FullSemVer") && l.ends_with("1.2.0")));
        assert!(text.contains("MajorMinorPatch"));
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&info()).unwrap();
        assert!(json.contains("\"fullSemVer\": \"1.2.0\""));
    }

    #[test]
    fn test_format_warning() {
        console::set_colors_enabled(false);
        let line = format_warning(&CalculationWarning::UnparsableTag {
            tag: "nightly".to_string(),
        });
        assert_eq!(line, "warning: Ignoring tag 'nightly': not a semantic version");
    }
}
