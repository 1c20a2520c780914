//! Skill corpus ingestion: one Markdown document per skill, YAML
//! frontmatter on top, loaded all-or-nothing into an immutable store.

pub mod frontmatter;
pub mod store;

use std::path::PathBuf;

use semver::Version;
use serde::Serialize;

pub use frontmatter::parse_document;
pub use store::SkillStore;

/// One parsed skill document. Immutable within a process generation;
/// replaced only by a full corpus reload.
#[derive(Debug, Clone, Serialize)]
pub struct SkillRecord {
    /// Stable unique identifier, derived from the frontmatter `name`.
    pub id: String,
    /// Display name, verbatim from frontmatter.
    pub name: String,
    /// Full description text, verbatim.
    pub description: String,
    /// Trigger phrases from the description's "Trigger words:" clause,
    /// folded and deduplicated, original order preserved.
    pub triggers: Vec<String>,
    /// Category/tag strings from `metadata.tags`, order preserved.
    pub tags: Vec<String>,
    /// Coarse classification from `metadata.category`.
    pub category: Option<String>,
    /// Informational compatibility constraint; never enforced here.
    pub compatibility: Option<String>,
    /// Parsed `metadata.version`; tie-breaker only, never correctness.
    /// Unparseable versions become `None` and sort lowest.
    pub version: Option<Version>,
    /// Source document path, for diagnostics.
    pub path: PathBuf,
}

impl SkillRecord {
    /// All tag-field terms: explicit tags plus the category, if any.
    pub fn tag_terms(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .chain(self.category.as_deref())
    }
}

/// Derive a stable skill id from a frontmatter name: folded, tokenized,
/// hyphen-joined ("Sharp Image" -> "sharp-image").
#[must_use]
pub fn slug(name: &str) -> String {
    crate::analysis::tokenize(&crate::analysis::fold(name)).join("-")
}
