use crate::domain::version::{SemanticVersion, SemanticVersionFormat};
use crate::error::Result;
use git2::Oid;
use regex::Regex;

/// Represents a git tag and the version it carries, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub target: Oid,
    /// None when the name does not parse under the active format
    pub version: Option<SemanticVersion>,
}

impl Tag {
    /// Create a tag, parsing its version after stripping the prefix
    pub fn new(
        name: impl Into<String>,
        target: Oid,
        prefix: &TagPrefix,
        format: SemanticVersionFormat,
    ) -> Self {
        let name = name.into();
        let version = prefix.parse_version(&name, format);
        Tag {
            name,
            target,
            version,
        }
    }

    /// The pre-release label of the parsed version, empty for releases
    pub fn label(&self) -> &str {
        self.version.as_ref().map_or("", |v| v.label())
    }
}

/// Tag prefix pattern (e.g. `[vV]?`, `release-`)
#[derive(Debug, Clone)]
pub struct TagPrefix {
    pattern: Regex,
}

impl TagPrefix {
    /// Compile a prefix pattern; it is anchored at the start of the tag name
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(TagPrefix { pattern })
    }

    /// Strip the prefix from a tag name
    pub fn strip<'a>(&self, tag: &'a str) -> &'a str {
        match self.pattern.find(tag) {
            Some(m) => &tag[m.end()..],
            None => tag,
        }
    }

    /// Parse the version part of a tag name
    pub fn parse_version(&self, tag: &str, format: SemanticVersionFormat) -> Option<SemanticVersion> {
        SemanticVersion::parse(self.strip(tag), format).ok()
    }
}

/// Pick the tag that represents a commit carrying several versions.
///
/// A tag whose label matches `label` wins; otherwise the highest version wins.
/// Unparsable tags are never picked.
pub fn preferred_tag<'a>(tags: &[&'a Tag], label: &str) -> Option<&'a Tag> {
    let versioned = || tags.iter().copied().filter(|t| t.version.is_some());

    versioned()
        .filter(|t| t.label().eq_ignore_ascii_case(label))
        .max_by(|a, b| a.version.cmp(&b.version))
        .or_else(|| versioned().max_by(|a, b| a.version.cmp(&b.version)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> Oid {
        Oid::from_bytes(&[byte; 20]).unwrap()
    }

    fn prefix() -> TagPrefix {
        TagPrefix::new("[vV]?").unwrap()
    }

    #[test]
    fn test_tag_new_parses_version() {
        let tag = Tag::new("v1.2.3", oid(1), &prefix(), SemanticVersionFormat::Strict);
        assert_eq!(tag.version, Some(SemanticVersion::new(1, 2, 3)));
    }

    #[test]
    fn test_tag_unparsable_has_no_version() {
        let tag = Tag::new("nightly", oid(1), &prefix(), SemanticVersionFormat::Strict);
        assert_eq!(tag.version, None);
        let short = Tag::new("v1.2", oid(1), &prefix(), SemanticVersionFormat::Strict);
        assert_eq!(short.version, None);
        let loose = Tag::new("v1.2", oid(1), &prefix(), SemanticVersionFormat::Loose);
        assert_eq!(loose.version, Some(SemanticVersion::new(1, 2, 0)));
    }

    #[test]
    fn test_custom_prefix() {
        let prefix = TagPrefix::new("release-").unwrap();
        assert_eq!(prefix.strip("release-1.2.3"), "1.2.3");
        assert_eq!(prefix.strip("1.2.3"), "1.2.3");
        assert!(TagPrefix::new("(broken").is_err());
    }

    #[test]
    fn test_preferred_tag_label_match_wins() {
        let p = prefix();
        let beta = Tag::new("4.0.0-beta.14", oid(1), &p, SemanticVersionFormat::Strict);
        let gamma = Tag::new("4.0.0-gamma.14", oid(1), &p, SemanticVersionFormat::Strict);
        let picked = preferred_tag(&[&beta, &gamma], "gamma").unwrap();
        assert_eq!(picked.name, "4.0.0-gamma.14");
        let picked = preferred_tag(&[&gamma, &beta], "beta").unwrap();
        assert_eq!(picked.name, "4.0.0-beta.14");
    }

    #[test]
    fn test_preferred_tag_highest_without_match() {
        let p = prefix();
        let low = Tag::new("1.0.0", oid(1), &p, SemanticVersionFormat::Strict);
        let high = Tag::new("1.1.0", oid(1), &p, SemanticVersionFormat::Strict);
        let junk = Tag::new("latest", oid(1), &p, SemanticVersionFormat::Strict);
        let picked = preferred_tag(&[&low, &junk, &high], "alpha").unwrap();
        assert_eq!(picked.name, "1.1.0");
        assert!(preferred_tag(&[&junk], "").is_none());
    }
}
