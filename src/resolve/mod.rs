//! Disambiguation and conflict resolution.
//!
//! The corpus is full of overlapping-domain pairs (two image-processing
//! skills, several databases, multiple auth providers) with no editorial
//! precedence metadata. Silently picking a "best guess" among near-ties is
//! the classic failure mode of naive keyword matchers, so the resolver
//! surfaces ambiguity instead of hiding it: a clear winner auto-selects,
//! near-ties come back as a shortlist for the caller to choose from, and an
//! empty candidate list is a normal no-match outcome. All three states are
//! terminal; there are no retries at this layer.

use serde::{Serialize, Serializer};

use crate::config::ResolverConfig;
use crate::rank::RankedCandidate;

/// Terminal outcome of one selection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The top candidate beat the runner-up by more than the margin.
    AutoSelect(String),
    /// Multiple candidates within the margin; the caller must choose.
    Shortlist(Vec<String>),
    /// No candidate survived the relevance floor.
    NoMatch,
}

impl Decision {
    /// Wire name, per the selection API contract.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AutoSelect(_) => "auto",
            Self::Shortlist(_) => "shortlist",
            Self::NoMatch => "none",
        }
    }
}

// The wire shape carries the decision as its kind string only; the ids are
// already present in the ranked candidate list.
impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.kind())
    }
}

/// Map a ranked candidate list to a [`Decision`].
///
/// The margin is relative: a runner-up within `shortlist_margin` of the top
/// score (as a fraction of it) is a near-tie. Scores have no fixed upper
/// bound, so an absolute margin would behave differently at every corpus
/// size.
#[must_use]
pub fn resolve(candidates: &[RankedCandidate], config: &ResolverConfig) -> Decision {
    let Some(top) = candidates.first() else {
        return Decision::NoMatch;
    };

    let cutoff = top.score * (1.0 - config.shortlist_margin);
    let contenders: Vec<&RankedCandidate> = candidates
        .iter()
        .take(config.shortlist_limit)
        .take_while(|c| c.score >= cutoff)
        .collect();

    if contenders.len() == 1 {
        Decision::AutoSelect(top.skill_id.clone())
    } else {
        Decision::Shortlist(contenders.iter().map(|c| c.skill_id.clone()).collect())
    }
}
