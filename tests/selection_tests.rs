//! End-to-end selection scenarios against real corpora on disk.

mod common;

use skillsel::corpus::SkillStore;
use skillsel::test_utils::fixtures::{sample_corpus, skill_doc, write_corpus};
use skillsel::{Config, Decision, SelectError, SelectionEngine};

fn sample_engine() -> (SelectionEngine, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), &sample_corpus()).unwrap();
    let engine = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();
    (engine, dir)
}

#[test]
fn every_skill_retrieves_itself_by_its_own_trigger_phrase() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), &sample_corpus()).unwrap();
    let store = SkillStore::load(dir.path()).unwrap();
    let engine = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();

    for record in store.all() {
        // The most distinctive trigger is the one naming the skill itself.
        let Some(trigger) = record
            .triggers
            .iter()
            .find(|t| t.replace(' ', "-") == record.id)
        else {
            continue;
        };
        let response = engine.select(trigger).unwrap();
        assert_eq!(
            response.candidates.first().map(|c| c.skill_id.as_str()),
            Some(record.id.as_str()),
            "self-retrieval failed for {}",
            record.id
        );
    }
}

#[test]
fn reverse_proxy_query_auto_selects_nginx_via_trigger_phrase() {
    let (engine, _dir) = sample_engine();
    let response = engine.select("set up a reverse proxy for my API").unwrap();

    assert_eq!(response.decision, Decision::AutoSelect("nginx".to_string()));
    let top = &response.candidates[0];
    assert_eq!(top.skill_id, "nginx");
    assert!(
        top.matched_fields
            .iter()
            .any(|f| f.to_string() == "trigger")
    );
}

#[test]
fn generic_database_query_shortlists_all_four_databases() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), &common::database_corpus()).unwrap();
    let engine = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();

    let response = engine.select("I need a database").unwrap();
    match &response.decision {
        Decision::Shortlist(ids) => {
            for id in ["mongodb", "mysql", "postgresql", "sqlite"] {
                assert!(ids.contains(&id.to_string()), "missing {id} in {ids:?}");
            }
        }
        other => panic!("expected shortlist of all databases, got {other:?}"),
    }

    // Comparable scores: no candidate dominates another by more than the
    // shortlist margin.
    let top = response.candidates[0].score;
    for candidate in &response.candidates {
        assert!(candidate.score >= top * 0.75);
    }
}

#[test]
fn generic_image_query_shortlists_both_image_skills() {
    let (engine, _dir) = sample_engine();
    let response = engine.select("resize an image").unwrap();

    match &response.decision {
        Decision::Shortlist(ids) => {
            assert!(ids.contains(&"sharp".to_string()));
            assert!(ids.contains(&"sharp-image".to_string()));
        }
        other => panic!("expected shortlist, got {other:?}"),
    }
}

#[test]
fn specific_trigger_phrase_separates_the_image_skills() {
    let (engine, _dir) = sample_engine();
    let response = engine.select("use sharp image pipelines").unwrap();
    assert_eq!(
        response.candidates.first().map(|c| c.skill_id.as_str()),
        Some("sharp-image")
    );
}

#[test]
fn duplicate_skill_id_rejects_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let doc = skill_doc("sharp", "Image processing. Trigger words: sharp", &[]);
    write_corpus(
        dir.path(),
        &[("sharp.md", doc.as_str()), ("sharp-copy.md", doc.as_str())],
    )
    .unwrap();

    let err = SkillStore::load(dir.path()).unwrap_err();
    assert!(matches!(err, SelectError::DuplicateId { ref id, .. } if id == "sharp"));

    // The engine refuses the corpus the same way; nothing is published.
    let engine_err = SelectionEngine::with_corpus(Config::default(), dir.path())
        .err()
        .unwrap();
    assert!(matches!(engine_err, SelectError::DuplicateId { .. }));
}

#[test]
fn stopword_only_query_yields_no_match_with_zero_candidates() {
    let (engine, _dir) = sample_engine();
    let response = engine.select("please help me with this").unwrap();
    assert_eq!(response.decision, Decision::NoMatch);
    assert!(response.candidates.is_empty());
}

#[test]
fn rebuilding_from_an_unchanged_corpus_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), &sample_corpus()).unwrap();
    let queries = [
        "set up a reverse proxy",
        "I need a database",
        "resize an image",
        "web framework for an api",
    ];

    let first = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();
    let second = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();

    for query in queries {
        let a = first.select(query).unwrap();
        let b = second.select(query).unwrap();
        assert_eq!(a.decision, b.decision, "decision differs for {query:?}");
        let ids_a: Vec<_> = a.candidates.iter().map(|c| &c.skill_id).collect();
        let ids_b: Vec<_> = b.candidates.iter().map(|c| &c.skill_id).collect();
        assert_eq!(ids_a, ids_b);
        for (ca, cb) in a.candidates.iter().zip(&b.candidates) {
            assert!((ca.score - cb.score).abs() < f32::EPSILON);
        }
    }
}

#[test]
fn adding_an_unrelated_skill_does_not_move_existing_rankings() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), &sample_corpus()).unwrap();
    let engine = SelectionEngine::with_corpus(Config::default(), dir.path()).unwrap();

    let queries = ["set up a reverse proxy", "resize an image"];
    let before: Vec<_> = queries
        .iter()
        .map(|q| engine.select(q).unwrap())
        .collect();

    // No term overlap with either query.
    let terraform = skill_doc(
        "terraform",
        "Infrastructure provisioning. Trigger words: terraform, provisioning",
        &["category: devops"],
    );
    write_corpus(dir.path(), &[("terraform.md", terraform.as_str())]).unwrap();
    engine.rebuild(dir.path()).unwrap();

    for (query, old) in queries.iter().zip(&before) {
        let new = engine.select(query).unwrap();
        let old_ids: Vec<_> = old.candidates.iter().map(|c| &c.skill_id).collect();
        let new_ids: Vec<_> = new.candidates.iter().map(|c| &c.skill_id).collect();
        assert_eq!(old_ids, new_ids, "ranking moved for {query:?}");
        for (a, b) in old.candidates.iter().zip(&new.candidates) {
            assert!((a.score - b.score).abs() < f32::EPSILON);
        }
    }
}
