//! Candidate ranker.
//!
//! Scores every indexed skill against a normalized query:
//!
//! 1. accumulate weighted per-term hits (trigger > tag > description),
//! 2. normalize by the skill's own vector magnitude (cosine-style) so long
//!    descriptions are not favored by sheer word count,
//! 3. add exact multi-word phrase bonuses after normalization, scaled by
//!    phrase length, so a compound trigger like "reverse proxy" beats the
//!    same words matched separately,
//! 4. drop candidates below the relevance floor.
//!
//! Near-ties are retained for the resolver to disambiguate; the ranker
//! never drops a candidate for being close to another.

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::RankingConfig;
use crate::index::{Index, PhraseEntry, TermField};
use crate::query::Query;

/// One scored candidate. Scores are monotonic with relevance and have no
/// fixed upper bound.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub skill_id: String,
    pub score: f32,
    /// Which record fields contributed, sorted and deduplicated.
    pub matched_fields: Vec<TermField>,
    /// Human-readable breakdown, one line per contribution.
    pub rationale: Vec<String>,
}

/// Rank all indexed skills against a query, descending by score, stable on
/// ties: exactly equal scores order by version (newest first), then by
/// skill id lexicographically so test runs are deterministic.
#[must_use]
pub fn rank(query: &Query, index: &Index, config: &RankingConfig) -> Vec<RankedCandidate> {
    if query.is_empty() {
        return Vec::new();
    }

    let phrase_hits = matching_phrases(query, index);
    let candidate_ids = candidate_ids(query, index, &phrase_hits);

    let mut candidates: Vec<RankedCandidate> = candidate_ids
        .par_iter()
        .filter_map(|skill_id| score_candidate(skill_id, query, index, config, &phrase_hits))
        .collect();

    candidates.retain(|c| c.score >= config.relevance_floor);
    candidates.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| {
            let va = index.vector(&a.skill_id).and_then(|v| v.version.as_ref());
            let vb = index.vector(&b.skill_id).and_then(|v| v.version.as_ref());
            vb.cmp(&va).then_with(|| a.skill_id.cmp(&b.skill_id))
        })
    });
    candidates
}

/// Phrase entries whose folded phrase occurs verbatim (word-bounded) in
/// the folded query.
fn matching_phrases<'a>(query: &Query, index: &'a Index) -> Vec<&'a PhraseEntry> {
    let padded = format!(" {} ", query.folded);
    index
        .phrases()
        .iter()
        .filter(|entry| padded.contains(&format!(" {} ", entry.phrase)))
        .collect()
}

/// Skills worth scoring: anything sharing at least one term or phrase with
/// the query. Sorted and deduplicated so the parallel scoring pass is
/// deterministic.
fn candidate_ids(query: &Query, index: &Index, phrase_hits: &[&PhraseEntry]) -> Vec<String> {
    query
        .terms
        .iter()
        .filter_map(|term| index.postings(term))
        .flatten()
        .map(|posting| posting.skill_id.clone())
        .chain(phrase_hits.iter().map(|entry| entry.skill_id.clone()))
        .sorted()
        .dedup()
        .collect()
}

fn score_candidate(
    skill_id: &str,
    query: &Query,
    index: &Index,
    config: &RankingConfig,
    phrase_hits: &[&PhraseEntry],
) -> Option<RankedCandidate> {
    let vector = index.vector(skill_id)?;
    let mut matched_fields = std::collections::BTreeSet::new();
    let mut rationale = Vec::new();
    let mut dot = 0.0f32;

    for term in &query.terms {
        let Some(entry) = vector.terms.get(term) else {
            continue;
        };
        dot += entry.weight;
        matched_fields.extend(entry.fields.iter().copied());
        rationale.push(format!(
            "term '{term}' hit {} (weight {:.1})",
            entry.fields.iter().join("+"),
            entry.weight
        ));
    }

    let mut score = dot / vector.magnitude;

    for entry in phrase_hits.iter().filter(|e| e.skill_id == skill_id) {
        let words = crate::analysis::Analyzer::phrase_len(&entry.phrase) as f32;
        let base = match entry.field {
            TermField::Trigger => config.trigger_phrase_boost,
            TermField::Tag | TermField::Description => config.tag_phrase_boost,
        };
        let bonus = base * (words - 1.0);
        score += bonus;
        matched_fields.insert(entry.field);
        rationale.push(format!(
            "{} phrase '{}' matched exactly (+{bonus:.1})",
            entry.field, entry.phrase
        ));
    }

    if score <= 0.0 {
        return None;
    }

    Some(RankedCandidate {
        skill_id: skill_id.to_string(),
        score,
        matched_fields: matched_fields.into_iter().collect(),
        rationale,
    })
}
