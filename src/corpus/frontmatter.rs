//! Frontmatter parsing for skill documents.
//!
//! Documents are UTF-8 text: YAML frontmatter delimited by `---` lines,
//! Markdown body after. Only the minimal required-field contract is
//! enforced (`name`, `description`); everything else is schema-loose and
//! optional. A record either fully validates or is rejected outright; no
//! partial records reach the store.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::analysis;
use crate::corpus::{SkillRecord, slug};
use crate::error::{Result, SelectError};

/// Matches the description's trigger clause up to the end of the line or
/// sentence, e.g. "Trigger words: nginx, reverse proxy, load balancer."
static TRIGGER_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)trigger\s*(?:words?|phrases?)?\s*:\s*([^.\n]+)").unwrap()
});

#[derive(Debug, Default, Deserialize)]
struct RawFrontmatter {
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    compatibility: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Parse one skill document into a [`SkillRecord`].
///
/// The Markdown body is intentionally discarded: the engine treats skill
/// instructions as opaque and only the identifier crosses its boundary.
pub fn parse_document(content: &str, path: &Path) -> Result<SkillRecord> {
    let yaml = split_frontmatter(content).ok_or_else(|| SelectError::MalformedRecord {
        path: path.to_path_buf(),
        reason: "missing frontmatter delimiters".to_string(),
    })?;

    let raw: RawFrontmatter =
        serde_yaml::from_str(yaml).map_err(|err| SelectError::MalformedRecord {
            path: path.to_path_buf(),
            reason: format!("frontmatter: {err}"),
        })?;

    let name = required(raw.name, "name", path)?;
    let description = required(raw.description, "description", path)?;

    let version = raw
        .metadata
        .version
        .as_deref()
        .and_then(|v| semver::Version::parse(v.trim()).ok());

    Ok(SkillRecord {
        id: slug(&name),
        triggers: extract_triggers(&description),
        tags: raw.metadata.tags,
        category: raw.metadata.category,
        compatibility: raw.compatibility,
        version,
        path: path.to_path_buf(),
        name,
        description,
    })
}

fn required(value: Option<String>, field: &str, path: &Path) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SelectError::MalformedRecord {
            path: path.to_path_buf(),
            reason: format!("missing required field '{field}'"),
        }),
    }
}

/// Return the YAML between the opening and closing `---` lines, or `None`
/// if the document does not start with frontmatter.
fn split_frontmatter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Extract trigger phrases from a description's trigger clause: comma
/// split, folded, trimmed, deduplicated with order preserved. A missing
/// clause yields an empty set; the description and tags still index.
fn extract_triggers(description: &str) -> Vec<String> {
    let Some(captures) = TRIGGER_CLAUSE.captures(description) else {
        return Vec::new();
    };
    let mut seen = std::collections::HashSet::new();
    captures[1]
        .split(',')
        .map(|part| analysis::tokenize(&analysis::fold(part)).join(" "))
        .filter(|phrase| !phrase.is_empty())
        .filter(|phrase| seen.insert(phrase.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn doc(frontmatter: &str) -> String {
        format!("---\n{frontmatter}\n---\n\n# Instructions\n\nBody text.\n")
    }

    #[test]
    fn parses_minimal_document() {
        let content = doc(concat!(
            "name: nginx\n",
            "description: >-\n",
            "  Web server and reverse proxy configuration.\n",
            "  Trigger words: nginx, reverse proxy, load balancer.\n",
        ));
        let record = parse_document(&content, &PathBuf::from("nginx.md")).unwrap();
        assert_eq!(record.id, "nginx");
        assert_eq!(
            record.triggers,
            vec!["nginx", "reverse proxy", "load balancer"]
        );
        assert!(record.tags.is_empty());
        assert!(record.version.is_none());
    }

    #[test]
    fn parses_full_metadata() {
        let content = doc(concat!(
            "name: Sharp Image\n",
            "description: 'Image processing. Trigger words: sharp, resize image'\n",
            "compatibility: node >= 18\n",
            "license: MIT\n",
            "metadata:\n",
            "  category: development\n",
            "  tags: [images, image processing]\n",
            "  version: 1.2.0\n",
        ));
        let record = parse_document(&content, &PathBuf::from("sharp-image.md")).unwrap();
        assert_eq!(record.id, "sharp-image");
        assert_eq!(record.category.as_deref(), Some("development"));
        assert_eq!(record.tags, vec!["images", "image processing"]);
        assert_eq!(record.compatibility.as_deref(), Some("node >= 18"));
        assert_eq!(record.version, Some(semver::Version::new(1, 2, 0)));
    }

    #[test]
    fn trigger_phrases_dedupe_case_insensitively() {
        let content = doc(concat!(
            "name: kafka\n",
            "description: 'Queues. Trigger words: Kafka, kafka, message queue, KAFKA'\n",
        ));
        let record = parse_document(&content, &PathBuf::from("kafka.md")).unwrap();
        assert_eq!(record.triggers, vec!["kafka", "message queue"]);
    }

    #[test]
    fn missing_trigger_clause_is_not_malformed() {
        let content = doc("name: hono\ndescription: Lightweight web framework.\n");
        let record = parse_document(&content, &PathBuf::from("hono.md")).unwrap();
        assert!(record.triggers.is_empty());
    }

    #[test]
    fn missing_name_is_malformed() {
        let content = doc("description: something\n");
        let err = parse_document(&content, &PathBuf::from("bad.md")).unwrap_err();
        assert!(matches!(err, SelectError::MalformedRecord { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn missing_delimiters_is_malformed() {
        let err = parse_document("just markdown, no frontmatter", &PathBuf::from("bad.md"))
            .unwrap_err();
        assert!(matches!(err, SelectError::MalformedRecord { .. }));
    }

    #[test]
    fn unparseable_version_degrades_to_none() {
        let content = doc(concat!(
            "name: zustand\n",
            "description: 'State. Trigger words: zustand'\n",
            "metadata:\n",
            "  version: latest\n",
        ));
        let record = parse_document(&content, &PathBuf::from("zustand.md")).unwrap();
        assert!(record.version.is_none());
    }
}
