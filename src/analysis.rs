//! Shared text analysis for the indexer and the query normalizer.
//!
//! Both sides must tokenize, stem, and canonicalize identically or term
//! matching breaks silently, so there is exactly one code path for it.
//! Stemming is a conservative fixed suffix pass; it does not try to be a
//! full Porter stemmer, just enough to collapse the plural/participle
//! variants that show up in tool descriptions and task phrasing.

use std::collections::{BTreeMap, HashSet};

use unicode_normalization::UnicodeNormalization;

use crate::config::AnalysisConfig;

/// Stateless-per-call text analyzer, built once from config.
#[derive(Debug, Clone)]
pub struct Analyzer {
    stopwords: HashSet<String>,
    synonyms: BTreeMap<String, String>,
    min_token_len: usize,
}

impl Analyzer {
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            stopwords: config.stopwords.iter().map(|s| fold(s)).collect(),
            synonyms: config
                .synonyms
                .iter()
                .map(|(k, v)| (fold(k), fold(v)))
                .collect(),
            min_token_len: config.min_token_len,
        }
    }

    /// Full analysis: fold, tokenize, drop stopwords, canonicalize, stem.
    ///
    /// Duplicates are preserved so the indexer can weight by term frequency;
    /// the query side deduplicates afterwards.
    #[must_use]
    pub fn terms(&self, text: &str) -> Vec<String> {
        tokenize(&fold(text))
            .into_iter()
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| self.term(&token))
            .filter(|term| term.len() >= self.min_token_len)
            .collect()
    }

    /// Map one folded token to its index term.
    ///
    /// The synonym table is consulted before stemming (so aliases like
    /// "k8s" resolve before the stemmer sees them) and again after, and the
    /// canonical replacement is stemmed too. That keeps the alias path and
    /// the direct path landing on the same term, whichever side of the
    /// index produced it.
    fn term(&self, token: &str) -> String {
        let expanded = self
            .synonyms
            .get(token)
            .map_or_else(|| token.to_string(), Clone::clone);
        let stemmed = stem(&expanded);
        self.synonyms.get(&stemmed).cloned().unwrap_or(stemmed)
    }

    /// Fold a multi-word phrase for exact substring matching: lowercased,
    /// punctuation stripped, single-space separated. No stemming, so the
    /// "literal substring" contract of phrase boosts holds.
    #[must_use]
    pub fn fold_phrase(&self, text: &str) -> String {
        tokenize(&fold(text)).join(" ")
    }

    /// Number of whitespace-separated words a folded phrase spans.
    #[must_use]
    pub fn phrase_len(phrase: &str) -> usize {
        phrase.split(' ').filter(|w| !w.is_empty()).count()
    }
}

/// NFKC-normalize and lowercase.
#[must_use]
pub fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Split on anything that is not alphanumeric. Hyphenated names like
/// "docker-compose" split into their word parts; the whole-phrase path
/// covers the joined form.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Conservative suffix-stripping stemmer.
///
/// Runs as a cascade (plural strip, then participle strip, then a final
/// silent-e strip) so that "image"/"images" and "resize"/"resizing" land on
/// the same stem from either direction. Length guards keep short tool
/// names ("less", "redis", "vue") intact.
#[must_use]
pub fn stem(word: &str) -> String {
    let mut w = word.to_string();

    if let Some(base) = w.strip_suffix("sses") {
        w = format!("{base}ss");
    } else if let Some(base) = w.strip_suffix("ies") {
        if base.len() >= 2 {
            w = format!("{base}y");
        }
    } else if w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") && !w.ends_with("is") {
        if w.len() >= 4 {
            w.truncate(w.len() - 1);
        }
    }

    if let Some(base) = w.strip_suffix("ing") {
        if base.len() >= 4 {
            w.truncate(w.len() - 3);
        }
    } else if let Some(base) = w.strip_suffix("ed") {
        if base.len() >= 4 {
            w.truncate(w.len() - 2);
        }
    }

    if w.ends_with('e') && w.len() >= 5 {
        w.truncate(w.len() - 1);
    }

    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn analyzer() -> Analyzer {
        Analyzer::new(&AnalysisConfig::default())
    }

    #[test]
    fn stem_collapses_common_variants() {
        assert_eq!(stem("deployed"), "deploy");
        assert_eq!(stem("queries"), "query");
        assert_eq!(stem("containers"), "container");
        // Cascade: singular and plural of e-final words meet in the middle.
        assert_eq!(stem("image"), stem("images"));
        assert_eq!(stem("resize"), stem("resizing"));
        assert_eq!(stem("database"), stem("databases"));
    }

    #[test]
    fn stem_leaves_short_and_tool_names_alone() {
        assert_eq!(stem("redis"), "redis");
        assert_eq!(stem("less"), "less");
        assert_eq!(stem("nginx"), "nginx");
        assert_eq!(stem("css"), "css");
        assert_eq!(stem("vue"), "vue");
        assert_eq!(stem("node"), "node");
    }

    #[test]
    fn terms_drop_stopwords_and_canonicalize() {
        let terms = analyzer().terms("Set up a Postgres DATABASE for me");
        assert_eq!(terms, vec!["postgresql", "databas"]);
    }

    #[test]
    fn alias_and_direct_form_land_on_the_same_term() {
        let a = analyzer();
        assert_eq!(a.terms("postgres"), a.terms("postgresql"));
        assert_eq!(a.terms("k8s"), a.terms("kubernetes"));
        assert_eq!(a.terms("mongo"), a.terms("mongodb"));
        assert_eq!(a.terms("db"), a.terms("databases"));
    }

    #[test]
    fn fold_phrase_is_punctuation_insensitive() {
        let a = analyzer();
        assert_eq!(a.fold_phrase("Reverse-Proxy!"), "reverse proxy");
        assert_eq!(Analyzer::phrase_len("reverse proxy"), 2);
    }

    #[test]
    fn empty_and_nonsense_input_yield_empty_terms() {
        let a = analyzer();
        assert!(a.terms("").is_empty());
        assert!(a.terms("!!! ???").is_empty());
        assert!(a.terms("the a of and").is_empty());
    }
}
