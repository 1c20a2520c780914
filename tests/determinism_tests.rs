//! Determinism and safety laws over arbitrary input.

use proptest::prelude::*;

use skillsel::analysis::{self, Analyzer};
use skillsel::config::{AnalysisConfig, Config};
use skillsel::corpus::parse_document;
use skillsel::query::QueryNormalizer;
use skillsel::test_utils::fixtures::{sample_corpus, write_corpus};
use skillsel::{SelectError, SelectionEngine};

proptest! {
    #[test]
    fn normalize_never_panics(input in ".*") {
        let normalizer = QueryNormalizer::new(&AnalysisConfig::default());
        let _ = normalizer.normalize(&input);
    }

    #[test]
    fn normalize_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..1000)) {
        let input = String::from_utf8_lossy(&bytes);
        let normalizer = QueryNormalizer::new(&AnalysisConfig::default());
        let _ = normalizer.normalize(&input);
    }

    #[test]
    fn analyzer_terms_are_stable(input in ".*") {
        let analyzer = Analyzer::new(&AnalysisConfig::default());
        prop_assert_eq!(analyzer.terms(&input), analyzer.terms(&input));
    }

    #[test]
    fn fold_then_tokenize_never_emits_empty_tokens(input in ".*") {
        for token in analysis::tokenize(&analysis::fold(&input)) {
            prop_assert!(!token.is_empty());
        }
    }

    #[test]
    fn parse_document_never_panics(input in ".*") {
        let _ = parse_document(&input, std::path::Path::new("fuzz.md"));
    }
}

proptest! {
    // Engine construction is comparatively expensive; keep the case count
    // modest for the end-to-end law.
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn select_never_panics_and_only_fails_on_empty_input(input in ".*") {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &sample_corpus()).unwrap();
        let engine = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();

        match engine.select(&input) {
            Ok(response) => {
                // Scores are finite and descending.
                for pair in response.candidates.windows(2) {
                    prop_assert!(pair[0].score.is_finite());
                    prop_assert!(pair[0].score >= pair[1].score);
                }
            }
            Err(SelectError::InvalidInput(_)) => {
                prop_assert!(input.trim().is_empty());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
