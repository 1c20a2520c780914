//! Query normalization.
//!
//! Turns a raw user request into a normalized term set comparable against
//! the index. Normalization never fails: an empty or nonsense query simply
//! yields an empty term set, which downstream ranks to zero candidates.

use chrono::{DateTime, Utc};

use crate::analysis::Analyzer;
use crate::config::AnalysisConfig;

/// Ephemeral, per-request query. Never persisted.
#[derive(Debug, Clone)]
pub struct Query {
    /// The caller's text, untouched.
    pub raw: String,
    /// Normalized terms: ordered, deduplicated.
    pub terms: Vec<String>,
    /// Folded raw text for literal phrase containment checks.
    pub folded: String,
    pub timestamp: DateTime<Utc>,
}

impl Query {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Applies the same analyzer the indexer used; the two sides sharing one
/// code path is what keeps term matching symmetric.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    analyzer: Analyzer,
}

impl QueryNormalizer {
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            analyzer: Analyzer::new(config),
        }
    }

    #[must_use]
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    #[must_use]
    pub fn normalize(&self, raw: &str) -> Query {
        let mut seen = std::collections::HashSet::new();
        let terms = self
            .analyzer
            .terms(raw)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect();

        Query {
            raw: raw.to_string(),
            terms,
            folded: self.analyzer.fold_phrase(raw),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> QueryNormalizer {
        QueryNormalizer::new(&AnalysisConfig::default())
    }

    #[test]
    fn terms_are_ordered_and_deduplicated() {
        let query = normalizer().normalize("Deploy the deployed deployment... deploy!");
        assert_eq!(query.terms.first().map(String::as_str), Some("deploy"));
        let unique: std::collections::HashSet<_> = query.terms.iter().collect();
        assert_eq!(unique.len(), query.terms.len());
    }

    #[test]
    fn empty_and_stopword_only_queries_normalize_to_empty() {
        let n = normalizer();
        assert!(n.normalize("").is_empty());
        assert!(n.normalize("   ").is_empty());
        assert!(n.normalize("please help me with the").is_empty());
    }

    #[test]
    fn folded_text_preserves_phrase_order() {
        let query = normalizer().normalize("Set up a REVERSE proxy, please");
        assert!(query.folded.contains("reverse proxy"));
    }

    #[test]
    fn raw_text_is_kept_verbatim() {
        let query = normalizer().normalize("Fix My NGINX!");
        assert_eq!(query.raw, "Fix My NGINX!");
    }
}
