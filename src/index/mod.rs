//! Term and trigger indexer.
//!
//! Builds an inverted index (term -> postings) plus a per-skill term
//! weight vector for cosine-style scoring, and a phrase table for exact
//! multi-word trigger and tag matching. All containers are `BTreeMap`s or
//! sorted vectors so the same corpus always builds byte-identical index
//! content, which reproducible test fixtures depend on.
//!
//! An index is immutable once built. Re-indexing builds a whole new value
//! and the engine swaps it in atomically; readers never observe partial
//! postings.

use std::collections::{BTreeMap, BTreeSet};

use semver::Version;
use serde::Serialize;

use crate::analysis::Analyzer;
use crate::config::RankingConfig;
use crate::corpus::SkillStore;
use crate::error::{Result, SelectError};

/// Which record field a posting came from. Field weights at build time
/// follow trigger > tag > description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermField {
    Trigger,
    Tag,
    Description,
}

impl std::fmt::Display for TermField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Tag => write!(f, "tag"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// One inverted-index posting. Weight is fixed at build time and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub skill_id: String,
    pub field: TermField,
    pub weight: f32,
}

/// An exact multi-word phrase a skill can be matched on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhraseEntry {
    /// Folded phrase ("reverse proxy"), matched as a literal substring of
    /// the folded query.
    pub phrase: String,
    pub skill_id: String,
    pub field: TermField,
}

/// Accumulated per-term weight for one skill, with the fields that
/// contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct TermEntry {
    pub weight: f32,
    pub fields: BTreeSet<TermField>,
}

/// One skill's term weight vector plus ranking metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillVector {
    pub terms: BTreeMap<String, TermEntry>,
    /// Euclidean magnitude of the weight vector; divisor for cosine-style
    /// normalization so long descriptions are not favored by word count.
    pub magnitude: f32,
    /// Version tie-breaker carried from the record.
    pub version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    postings: BTreeMap<String, Vec<Posting>>,
    vectors: BTreeMap<String, SkillVector>,
    phrases: Vec<PhraseEntry>,
}

impl Index {
    /// Build an index over every record in the store.
    ///
    /// Fails only with [`SelectError::EmptyCorpus`] when the store holds
    /// zero records; an index over a single record is valid.
    pub fn build(store: &SkillStore, analyzer: &Analyzer, weights: &RankingConfig) -> Result<Self> {
        if store.is_empty() {
            return Err(SelectError::EmptyCorpus(store.root().to_path_buf()));
        }

        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        let mut vectors = BTreeMap::new();
        let mut phrases = BTreeSet::new();

        for record in store.all() {
            let mut terms: BTreeMap<String, TermEntry> = BTreeMap::new();

            for phrase in &record.triggers {
                for term in analyzer.terms(phrase) {
                    accumulate(&mut terms, term, TermField::Trigger, weights.trigger_weight);
                }
                if Analyzer::phrase_len(phrase) >= 2 {
                    phrases.insert(PhraseEntry {
                        phrase: phrase.clone(),
                        skill_id: record.id.clone(),
                        field: TermField::Trigger,
                    });
                }
            }

            for tag in record.tag_terms() {
                for term in analyzer.terms(tag) {
                    accumulate(&mut terms, term, TermField::Tag, weights.tag_weight);
                }
                let folded = analyzer.fold_phrase(tag);
                if Analyzer::phrase_len(&folded) >= 2 {
                    phrases.insert(PhraseEntry {
                        phrase: folded,
                        skill_id: record.id.clone(),
                        field: TermField::Tag,
                    });
                }
            }

            for term in analyzer.terms(&record.description) {
                accumulate(
                    &mut terms,
                    term,
                    TermField::Description,
                    weights.description_weight,
                );
            }

            for (term, entry) in &terms {
                let field = *entry.fields.iter().next().unwrap_or(&TermField::Description);
                postings.entry(term.clone()).or_default().push(Posting {
                    skill_id: record.id.clone(),
                    field,
                    weight: entry.weight,
                });
            }

            let magnitude = terms
                .values()
                .map(|entry| entry.weight * entry.weight)
                .sum::<f32>()
                .sqrt()
                .max(f32::MIN_POSITIVE);
            vectors.insert(
                record.id.clone(),
                SkillVector {
                    terms,
                    magnitude,
                    version: record.version.clone(),
                },
            );
        }

        Ok(Self {
            postings,
            vectors,
            phrases: phrases.into_iter().collect(),
        })
    }

    /// Posting list for one normalized term.
    #[must_use]
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// One skill's weight vector.
    #[must_use]
    pub fn vector(&self, skill_id: &str) -> Option<&SkillVector> {
        self.vectors.get(skill_id)
    }

    /// All skill vectors, in id order.
    pub fn vectors(&self) -> impl Iterator<Item = (&String, &SkillVector)> {
        self.vectors.iter()
    }

    /// All multi-word phrase entries, sorted.
    #[must_use]
    pub fn phrases(&self) -> &[PhraseEntry] {
        &self.phrases
    }

    #[must_use]
    pub fn doc_count(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn distinct_terms(&self) -> usize {
        self.postings.len()
    }
}

fn accumulate(
    terms: &mut BTreeMap<String, TermEntry>,
    term: String,
    field: TermField,
    weight: f32,
) {
    let entry = terms.entry(term).or_insert_with(|| TermEntry {
        weight: 0.0,
        fields: BTreeSet::new(),
    });
    entry.weight += weight;
    entry.fields.insert(field);
}
