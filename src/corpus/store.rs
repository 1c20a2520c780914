//! Immutable skill record store.
//!
//! Loading is all-or-nothing: if any document fails to parse, the whole
//! load is rejected rather than producing a partially populated store. A
//! corpus must be internally consistent before it can serve traffic.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::corpus::{SkillRecord, parse_document};
use crate::error::{Result, SelectError};

#[derive(Debug, Clone)]
pub struct SkillStore {
    records: BTreeMap<String, SkillRecord>,
    root: PathBuf,
}

impl SkillStore {
    /// Load every `*.md` skill document under `corpus_path`.
    ///
    /// Fails with [`SelectError::MalformedRecord`] on the first document
    /// that violates the required-field contract and with
    /// [`SelectError::DuplicateId`] when two documents resolve to the same
    /// id. Duplicates are rejected, never silently overwritten.
    pub fn load(corpus_path: &Path) -> Result<Self> {
        let mut records: BTreeMap<String, SkillRecord> = BTreeMap::new();

        for entry in WalkDir::new(corpus_path).sort_by_file_name() {
            let entry = entry.map_err(|err| SelectError::Io {
                path: corpus_path.to_path_buf(),
                source: err.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_skill_document(path) {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|err| SelectError::Io {
                path: path.to_path_buf(),
                source: err,
            })?;
            let record = parse_document(&content, path)?;
            insert_unique(&mut records, record)?;
        }

        debug!(
            corpus = %corpus_path.display(),
            records = records.len(),
            "loaded skill corpus"
        );
        Ok(Self {
            records,
            root: corpus_path.to_path_buf(),
        })
    }

    /// Build a store from already-parsed records, with the same duplicate
    /// rejection as a filesystem load. Used by fixtures and embedders.
    pub fn from_records(records: Vec<SkillRecord>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for record in records {
            insert_unique(&mut map, record)?;
        }
        Ok(Self {
            records: map,
            root: PathBuf::from("<memory>"),
        })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SkillRecord> {
        self.records.get(id)
    }

    /// Iterate records in id order. Deterministic, which downstream index
    /// builds rely on for reproducible output.
    pub fn all(&self) -> impl Iterator<Item = &SkillRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn insert_unique(map: &mut BTreeMap<String, SkillRecord>, record: SkillRecord) -> Result<()> {
    if let Some(existing) = map.get(&record.id) {
        return Err(SelectError::DuplicateId {
            id: record.id.clone(),
            first: existing.path.clone(),
            second: record.path,
        });
    }
    map.insert(record.id.clone(), record);
    Ok(())
}

/// Skill documents are `*.md` files; README and hidden files are editorial,
/// not corpus content.
fn is_skill_document(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".md") && !name.starts_with('.') && !name.eq_ignore_ascii_case("readme.md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{sample_corpus, skill_doc, write_corpus};

    #[test]
    fn load_roundtrips_sample_corpus() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &sample_corpus()).unwrap();

        let store = SkillStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 6);
        let nginx = store.get("nginx").unwrap();
        assert!(nginx.triggers.contains(&"reverse proxy".to_string()));
        // Iteration order is id-sorted.
        let ids: Vec<_> = store.all().map(|r| r.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn duplicate_id_rejects_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let doc = skill_doc("sharp", "Image processing. Trigger words: sharp", &[]);
        write_corpus(dir.path(), &[("sharp.md", &doc), ("sharp-again.md", &doc)]).unwrap();

        let err = SkillStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, SelectError::DuplicateId { ref id, .. } if id == "sharp"));
    }

    #[test]
    fn one_malformed_document_rejects_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = skill_doc("nginx", "Proxy. Trigger words: nginx", &[]);
        write_corpus(
            dir.path(),
            &[
                ("nginx.md", good.as_str()),
                ("broken.md", "---\nname: only-a-name\n---\n"),
            ],
        )
        .unwrap();

        let err = SkillStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, SelectError::MalformedRecord { .. }));
    }

    #[test]
    fn readme_and_hidden_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let doc = skill_doc("jest", "Testing. Trigger words: jest", &[]);
        write_corpus(
            dir.path(),
            &[
                ("jest.md", doc.as_str()),
                ("README.md", "no frontmatter here"),
                (".draft.md", "also not parsed"),
            ],
        )
        .unwrap();

        let store = SkillStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
    }
}
