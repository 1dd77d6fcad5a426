//! Domain logic - pure business rules independent of git operations

pub mod branch;
pub mod commit;
pub mod merge;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::{Branch, BranchGroup};
pub use commit::{BumpMarkers, Commit, ConventionalCommit};
pub use merge::MergeMessage;
pub use prerelease::PreReleaseTag;
pub use tag::{Tag, TagPrefix};
pub use version::{BuildMetaData, SemanticVersion, SemanticVersionFormat, VersionField};
