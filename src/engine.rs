//! Selection engine: the external-facing API.
//!
//! Wraps normalization, ranking, and resolution into one `select` call
//! against an immutable index generation. Rebuilds are single-writer:
//! exactly one build may run at a time, concurrent attempts are rejected
//! rather than queued, and the finished generation is published with one
//! pointer swap so in-flight queries never observe a torn index. Query
//! reads take no locks beyond that swap point and an opportunistic
//! try-lock on the result cache.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::corpus::SkillStore;
use crate::error::{Result, SelectError};
use crate::index::Index;
use crate::query::QueryNormalizer;
use crate::rank::{self, RankedCandidate};
use crate::resolve::{self, Decision};

/// One immutable build of the index, replaced wholesale on reindex.
#[derive(Debug)]
pub struct IndexGeneration {
    pub number: u64,
    pub index: Index,
    pub store: SkillStore,
    pub built_at: DateTime<Utc>,
}

/// Result of one `select` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub decision: Decision,
    pub candidates: Vec<RankedCandidate>,
    pub took_ms: u64,
    pub generation: u64,
}

/// Result of one successful rebuild.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub generation: u64,
    pub records: usize,
    pub distinct_terms: usize,
    pub took_ms: u64,
}

/// Engine counters for the `stats` surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub generation: Option<u64>,
    pub records: usize,
    pub distinct_terms: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

pub struct SelectionEngine {
    config: Config,
    normalizer: QueryNormalizer,
    live: RwLock<Option<Arc<IndexGeneration>>>,
    building: AtomicBool,
    generations_built: AtomicU64,
    cache: QueryCache,
}

impl SelectionEngine {
    /// Create an engine with no live index. `select` fails with
    /// [`SelectError::IndexNotReady`] until the first successful rebuild.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let cache = QueryCache::new(config.cache.query_cache_size);
        let normalizer = QueryNormalizer::new(&config.analysis);
        Self {
            config,
            normalizer,
            live: RwLock::new(None),
            building: AtomicBool::new(false),
            generations_built: AtomicU64::new(0),
            cache,
        }
    }

    /// Create an engine and build its first generation from `corpus_path`.
    pub fn with_corpus(config: Config, corpus_path: &Path) -> Result<Self> {
        let engine = Self::new(config);
        engine.rebuild(corpus_path)?;
        Ok(engine)
    }

    /// Replace the live index generation from a (re)loaded corpus.
    ///
    /// All-or-nothing: any ingest error leaves the previous generation
    /// live and serving. Rejects concurrent builds with
    /// [`SelectError::BuildInProgress`].
    pub fn rebuild(&self, corpus_path: &Path) -> Result<BuildReport> {
        let _guard = BuildGuard::acquire(&self.building)?;
        let started = Instant::now();

        let store = SkillStore::load(corpus_path)?;
        let analyzer = Analyzer::new(&self.config.analysis);
        let index = Index::build(&store, &analyzer, &self.config.ranking)?;

        let number = self.generations_built.fetch_add(1, Ordering::SeqCst) + 1;
        let report = BuildReport {
            generation: number,
            records: store.len(),
            distinct_terms: index.distinct_terms(),
            took_ms: elapsed_ms(started),
        };
        let generation = Arc::new(IndexGeneration {
            number,
            index,
            store,
            built_at: Utc::now(),
        });

        // The swap point: one pointer write, then the stale cache goes.
        *self.live.write() = Some(generation);
        self.cache.clear();

        info!(
            generation = report.generation,
            records = report.records,
            distinct_terms = report.distinct_terms,
            took_ms = report.took_ms,
            "published index generation"
        );
        Ok(report)
    }

    /// Rank and resolve one raw query against the live generation.
    ///
    /// `Shortlist` and `NoMatch` are normal outcomes, not errors. Fails
    /// only for empty-after-trim input or when no generation is live.
    pub fn select(&self, raw_query: &str) -> Result<SelectionResponse> {
        let started = Instant::now();

        if raw_query.trim().is_empty() {
            return Err(SelectError::InvalidInput(
                "query is empty after trimming".to_string(),
            ));
        }
        let generation = self
            .live
            .read()
            .clone()
            .ok_or(SelectError::IndexNotReady)?;

        let query = self.normalizer.normalize(raw_query);
        let cache_key = query_cache_key(generation.number, &query.terms);

        let candidates = if let Some(hit) = self.cache.get(cache_key) {
            hit
        } else {
            let ranked = rank::rank(&query, &generation.index, &self.config.ranking);
            self.cache.put(cache_key, ranked.clone());
            ranked
        };

        let decision = resolve::resolve(&candidates, &self.config.resolver);
        debug!(
            query = raw_query,
            decision = decision.kind(),
            candidates = candidates.len(),
            "selection"
        );

        Ok(SelectionResponse {
            decision,
            candidates,
            took_ms: elapsed_ms(started),
            generation: generation.number,
        })
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let (cache_hits, cache_misses) = self.cache.counters();
        let live = self.live.read().clone();
        EngineStats {
            generation: live.as_ref().map(|g| g.number),
            records: live.as_ref().map_or(0, |g| g.store.len()),
            distinct_terms: live.as_ref().map_or(0, |g| g.index.distinct_terms()),
            cache_hits,
            cache_misses,
        }
    }

    /// Snapshot of the live generation, if any.
    #[must_use]
    pub fn generation(&self) -> Option<Arc<IndexGeneration>> {
        self.live.read().clone()
    }
}

/// Releases the single-writer build slot on drop, so a failed build never
/// wedges future rebuilds.
struct BuildGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BuildGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SelectError::BuildInProgress);
        }
        Ok(Self { flag })
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// LRU cache over ranked candidate lists, keyed by generation number and
/// normalized term set. Non-blocking: contention skips the cache rather
/// than stalling the query path.
struct QueryCache {
    entries: Mutex<LruCache<u64, Vec<RankedCandidate>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    fn new(size: usize) -> Self {
        let size = NonZeroUsize::new(size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn get(&self, key: u64) -> Option<Vec<RankedCandidate>> {
        let mut entries = self.entries.try_lock()?;
        match entries.get(&key) {
            Some(hit) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(hit.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: u64, candidates: Vec<RankedCandidate>) {
        if let Some(mut entries) = self.entries.try_lock() {
            entries.put(key, candidates);
        }
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }

    fn counters(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

fn query_cache_key(generation: u64, terms: &[String]) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    generation.hash(&mut hasher);
    terms.hash(&mut hasher);
    hasher.finish()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
