//! Serializable result of a version calculation

use crate::domain::branch::escape_branch_name;
use crate::domain::{BuildMetaData, SemanticVersion};
use chrono::{DateTime, Utc};
use serde::Serialize;

const SHORT_SHA_LEN: usize = 7;

/// Build metadata as exposed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetaDataInfo {
    pub commits_since_tag: u64,
    pub commits_since_version_source: u64,
    pub sha: String,
    pub version_source_sha: Option<String>,
    pub branch: String,
    pub commit_date: Option<DateTime<Utc>>,
    pub uncommitted_changes: usize,
}

/// Every rendering of a calculated version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticVersionInfo {
    pub full_sem_ver: String,
    pub sem_ver: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release_tag: String,
    pub pre_release_label: String,
    pub pre_release_number: Option<u64>,
    pub major_minor_patch: String,
    pub informational_version: String,
    pub build_meta_data: BuildMetaDataInfo,
    pub sha: String,
    pub short_sha: String,
    pub version_source_sha: Option<String>,
    pub branch_name: String,
    pub escaped_branch_name: String,
    pub commit_date: Option<DateTime<Utc>>,
    pub uncommitted_changes: usize,
    pub pull_request_number: Option<u64>,
}

impl SemanticVersionInfo {
    /// Flatten a version whose metadata the calculator filled in.
    ///
    /// `commits_since_tag` is the height even when the canonical string hides it.
    pub fn new(
        version: &SemanticVersion,
        commits_since_tag: u64,
        pull_request_number: Option<u64>,
    ) -> Self {
        let meta = version.build_metadata.clone().unwrap_or_default();
        let BuildMetaData {
            commits_since_version_source,
            sha,
            version_source_sha,
            branch,
            commit_date,
            uncommitted_changes,
            ..
        } = meta;
        let sha = sha.unwrap_or_default();
        let branch = branch.unwrap_or_default();

        let pre_release_tag = version
            .pre_release
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let full_sem_ver = version.full_sem_ver();
        let informational_version = if sha.is_empty() {
            full_sem_ver.clone()
        } else {
            format!(
                "{}.Branch.{}.Sha.{}",
                full_sem_ver,
                escape_branch_name(&branch),
                sha
            )
        };

        SemanticVersionInfo {
            sem_ver: version.to_string(),
            full_sem_ver,
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre_release_label: version.label().to_string(),
            pre_release_number: version.pre_release.as_ref().and_then(|p| p.number),
            pre_release_tag,
            major_minor_patch: version.major_minor_patch(),
            informational_version,
            build_meta_data: BuildMetaDataInfo {
                commits_since_tag,
                commits_since_version_source,
                sha: sha.clone(),
                version_source_sha: version_source_sha.clone(),
                branch: branch.clone(),
                commit_date,
                uncommitted_changes,
            },
            short_sha: sha.chars().take(SHORT_SHA_LEN).collect(),
            sha,
            version_source_sha,
            escaped_branch_name: escape_branch_name(&branch),
            branch_name: branch,
            commit_date,
            uncommitted_changes,
            pull_request_number,
        }
    }
}
