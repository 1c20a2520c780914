//! Engine configuration.
//!
//! Ranking weights, the relevance floor, the shortlist margin, stopwords,
//! and the synonym table are all configuration, not hard-coded logic, so
//! domain-specific vocabulary (cloud-provider service names, new tool
//! aliases) can be extended without code changes. Values merge in layers:
//! built-in defaults, then the global config file, then an explicit path or
//! `SKILLSEL_CONFIG`, then environment overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration, merging defaults, the global file, and an
    /// explicit path (or `SKILLSEL_CONFIG`) in that order.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SKILLSEL_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("skillsel/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SelectError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SelectError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(analysis) = patch.analysis {
            self.analysis.merge(analysis);
        }
        if let Some(ranking) = patch.ranking {
            self.ranking.merge(ranking);
        }
        if let Some(resolver) = patch.resolver {
            self.resolver.merge(resolver);
        }
        if let Some(cache) = patch.cache {
            self.cache.merge(cache);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var("SKILLSEL_RELEVANCE_FLOOR") {
            self.ranking.relevance_floor = parse_env_f32("SKILLSEL_RELEVANCE_FLOOR", &raw)?;
        }
        if let Ok(raw) = std::env::var("SKILLSEL_SHORTLIST_MARGIN") {
            self.resolver.shortlist_margin = parse_env_f32("SKILLSEL_SHORTLIST_MARGIN", &raw)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.ranking.relevance_floor < 0.0 {
            return Err(SelectError::Config(
                "ranking.relevance_floor must be non-negative".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.resolver.shortlist_margin) {
            return Err(SelectError::Config(
                "resolver.shortlist_margin must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env_f32(var: &str, raw: &str) -> Result<f32> {
    raw.parse::<f32>()
        .map_err(|err| SelectError::Config(format!("{var}={raw}: {err}")))
}

/// Text analysis shared by the indexer and the query normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Terms removed from queries and description text before matching.
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
    /// Variant term -> canonical term. Applied on both the index and the
    /// query side so near-miss phrasing ("postgres" vs "postgresql") still
    /// lands on the same posting list.
    #[serde(default = "default_synonyms")]
    pub synonyms: BTreeMap<String, String>,
    /// Minimum token length kept after stemming.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stopwords: default_stopwords(),
            synonyms: default_synonyms(),
            min_token_len: default_min_token_len(),
        }
    }
}

impl AnalysisConfig {
    fn merge(&mut self, patch: AnalysisPatch) {
        if let Some(stopwords) = patch.stopwords {
            self.stopwords = stopwords;
        }
        if let Some(synonyms) = patch.extra_synonyms {
            self.synonyms.extend(synonyms);
        }
        if let Some(len) = patch.min_token_len {
            self.min_token_len = len;
        }
    }
}

/// Weights for the candidate ranker.
///
/// Per-term field weights follow trigger > tag > description; phrase
/// bonuses are added after cosine normalization so a long description
/// cannot dilute an exact trigger-phrase hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_trigger_weight")]
    pub trigger_weight: f32,
    #[serde(default = "default_tag_weight")]
    pub tag_weight: f32,
    #[serde(default = "default_description_weight")]
    pub description_weight: f32,
    /// Bonus per matched multi-word trigger phrase, scaled by phrase length.
    #[serde(default = "default_trigger_phrase_boost")]
    pub trigger_phrase_boost: f32,
    /// Bonus for an exact multi-word tag/category phrase in the query.
    #[serde(default = "default_tag_phrase_boost")]
    pub tag_phrase_boost: f32,
    /// Candidates scoring below this are discarded outright.
    #[serde(default = "default_relevance_floor")]
    pub relevance_floor: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            trigger_weight: default_trigger_weight(),
            tag_weight: default_tag_weight(),
            description_weight: default_description_weight(),
            trigger_phrase_boost: default_trigger_phrase_boost(),
            tag_phrase_boost: default_tag_phrase_boost(),
            relevance_floor: default_relevance_floor(),
        }
    }
}

impl RankingConfig {
    fn merge(&mut self, patch: RankingPatch) {
        if let Some(v) = patch.trigger_weight {
            self.trigger_weight = v;
        }
        if let Some(v) = patch.tag_weight {
            self.tag_weight = v;
        }
        if let Some(v) = patch.description_weight {
            self.description_weight = v;
        }
        if let Some(v) = patch.trigger_phrase_boost {
            self.trigger_phrase_boost = v;
        }
        if let Some(v) = patch.tag_phrase_boost {
            self.tag_phrase_boost = v;
        }
        if let Some(v) = patch.relevance_floor {
            self.relevance_floor = v;
        }
    }
}

/// Thresholds for the three-way disambiguation decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Relative margin: the runner-up is a near-tie when its score is
    /// within `shortlist_margin` of the top score (as a fraction of it).
    #[serde(default = "default_shortlist_margin")]
    pub shortlist_margin: f32,
    /// Maximum number of skill ids surfaced in a shortlist.
    #[serde(default = "default_shortlist_limit")]
    pub shortlist_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            shortlist_margin: default_shortlist_margin(),
            shortlist_limit: default_shortlist_limit(),
        }
    }
}

impl ResolverConfig {
    fn merge(&mut self, patch: ResolverPatch) {
        if let Some(v) = patch.shortlist_margin {
            self.shortlist_margin = v;
        }
        if let Some(v) = patch.shortlist_limit {
            self.shortlist_limit = v;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Number of distinct normalized queries cached per generation.
    #[serde(default = "default_query_cache_size")]
    pub query_cache_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_cache_size: default_query_cache_size(),
        }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(v) = patch.query_cache_size {
            self.query_cache_size = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    analysis: Option<AnalysisPatch>,
    ranking: Option<RankingPatch>,
    resolver: Option<ResolverPatch>,
    cache: Option<CachePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPatch {
    stopwords: Option<Vec<String>>,
    extra_synonyms: Option<BTreeMap<String, String>>,
    min_token_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RankingPatch {
    trigger_weight: Option<f32>,
    tag_weight: Option<f32>,
    description_weight: Option<f32>,
    trigger_phrase_boost: Option<f32>,
    tag_phrase_boost: Option<f32>,
    relevance_floor: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ResolverPatch {
    shortlist_margin: Option<f32>,
    shortlist_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct CachePatch {
    query_cache_size: Option<usize>,
}

const fn default_min_token_len() -> usize {
    2
}
const fn default_trigger_weight() -> f32 {
    3.0
}
const fn default_tag_weight() -> f32 {
    2.0
}
const fn default_description_weight() -> f32 {
    1.0
}
const fn default_trigger_phrase_boost() -> f32 {
    1.5
}
const fn default_tag_phrase_boost() -> f32 {
    2.0
}
const fn default_relevance_floor() -> f32 {
    0.05
}
const fn default_shortlist_margin() -> f32 {
    0.25
}
const fn default_shortlist_limit() -> usize {
    5
}
const fn default_query_cache_size() -> usize {
    128
}

fn default_stopwords() -> Vec<String> {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "for", "from", "help",
        "how", "i", "in", "is", "it", "me", "my", "need", "of", "on", "or", "please", "set",
        "setup", "some", "that", "the", "this", "to", "up", "us", "use", "using", "want",
        "what", "when", "with", "you",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_synonyms() -> BTreeMap<String, String> {
    [
        ("postgres", "postgresql"),
        ("pg", "postgresql"),
        ("mongo", "mongodb"),
        ("k8s", "kubernetes"),
        ("js", "javascript"),
        ("ts", "typescript"),
        ("db", "database"),
        ("repo", "repository"),
        ("auth", "authentication"),
        ("config", "configuration"),
        ("img", "image"),
        ("msg", "message"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
