//! End-to-end query execution over a loaded index snapshot.

use crate::bm25::{Bm25Params, Bm25Ranker};
use crate::catalog::Catalog;
use crate::error::{Result, SearchError};
use crate::fusion::merge;
use crate::index::DocId;
use crate::persist::{self, IndexPaths, ANCHOR_INDEX, BODY_INDEX, TITLE_INDEX};
use crate::ranked::{normalize, sort_and_truncate, RankedList, ScoredDoc, DEFAULT_TOP_N};
use crate::stats::{DocumentStats, SignalTable};
use crate::store::{BlockFetcher, PostingStore};
use crate::tokenizer::distinct;
use crate::vector_space::VectorSpaceRanker;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Weights and BM25 parameters for one ranked search.
///
/// Deserializes from a request's query string; omitted fields keep their defaults and the
/// short names (`body_k`, `body_w`, `page_rank_w`, ...) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(alias = "body_k")]
    pub body_k1: f64,
    pub body_b: f64,
    #[serde(alias = "body_w")]
    pub body_weight: f64,
    #[serde(alias = "title_k")]
    pub title_k1: f64,
    pub title_b: f64,
    #[serde(alias = "title_w")]
    pub title_weight: f64,
    #[serde(alias = "page_rank_w")]
    pub pagerank_weight: f64,
    #[serde(alias = "page_views_w")]
    pub pageview_weight: f64,
    /// Result cap; `None` applies [`default_result_limit`].
    pub limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            body_k1: 5.0,
            body_b: 0.2,
            body_weight: 0.6,
            title_k1: 2.0,
            title_b: 0.05,
            title_weight: 0.3,
            pagerank_weight: 0.15,
            pageview_weight: 0.15,
            limit: None,
        }
    }
}

impl SearchConfig {
    pub fn body_params(&self) -> Bm25Params { Bm25Params { k1: self.body_k1, b: self.body_b } }

    pub fn title_params(&self) -> Bm25Params { Bm25Params { k1: self.title_k1, b: self.title_b } }

    pub fn weights(&self) -> [f64; 4] {
        [self.body_weight, self.title_weight, self.pagerank_weight, self.pageview_weight]
    }
}

/// `min(10 * distinct tokens, 30)`
pub fn default_result_limit(tokens: &[String]) -> usize {
    (10 * distinct(tokens).len()).min(30)
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub score: f64,
}

struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn new(budget: Option<Duration>) -> Self { Self { start: Instant::now(), budget } }

    fn check(&self) -> Result<()> {
        let elapsed = self.start.elapsed();
        match self.budget {
            Some(budget) if elapsed > budget => Err(SearchError::Timeout { elapsed }),
            _ => Ok(()),
        }
    }
}

/// Everything loaded once at startup. Shared read-only by all queries.
pub struct SearchContext {
    body: Catalog,
    title: Catalog,
    anchor: Option<Catalog>,
    stats: DocumentStats,
    page_rank: SignalTable,
    page_rank_norm: SignalTable,
    page_views: SignalTable,
    page_views_norm: SignalTable,
    query_timeout: Option<Duration>,
}

impl SearchContext {
    pub fn new(body: Catalog, title: Catalog, stats: DocumentStats) -> Self {
        Self {
            body,
            title,
            anchor: None,
            stats,
            page_rank: SignalTable::default(),
            page_rank_norm: SignalTable::default(),
            page_views: SignalTable::default(),
            page_views_norm: SignalTable::default(),
            query_timeout: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Catalog) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Raw page-rank values; the fused signal uses their min-max normalization.
    pub fn with_page_rank(mut self, raw: SignalTable) -> Self {
        self.page_rank_norm = raw.min_max_normalized();
        self.page_rank = raw;
        self
    }

    pub fn with_page_views(mut self, raw: SignalTable) -> Self {
        self.page_views_norm = raw.min_max_normalized();
        self.page_views = raw;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Load every artifact under `paths.root`. Blocks stay on disk and are opened lazily.
    pub fn load(paths: &IndexPaths, fetcher: Option<Arc<dyn BlockFetcher>>) -> Result<Self> {
        let start = Instant::now();
        if let Some(meta) = persist::load_meta(paths)? {
            tracing::info!(num_docs = meta.num_docs, version = meta.version, created_at = %meta.created_at, "index meta");
        }
        let open = |name: &str| -> Result<Catalog> {
            let index = persist::load_index(paths, name)?;
            let mut store = PostingStore::new(paths.index_dir(name));
            if let Some(f) = &fetcher {
                store = store.with_fetcher(name, Arc::clone(f));
            }
            tracing::info!(index = name, terms = index.num_terms(), "loaded catalog");
            Ok(Catalog::new(name, index, store))
        };
        let body = open(BODY_INDEX)?;
        let title = open(TITLE_INDEX)?;
        let anchor = if paths.has_index(ANCHOR_INDEX) { Some(open(ANCHOR_INDEX)?) } else { None };

        let stats = DocumentStats::new(
            persist::load_doc_len(paths)?,
            persist::load_doc_norms(paths)?,
            persist::load_doc_titles(paths)?,
        );
        let mut ctx = SearchContext::new(body, title, stats)
            .with_page_rank(SignalTable::new(persist::load_page_rank(paths)?))
            .with_page_views(SignalTable::new(persist::load_page_views(paths)?));
        if let Some(anchor) = anchor {
            ctx = ctx.with_anchor(anchor);
        }
        tracing::info!(num_docs = ctx.stats.num_docs(), took_ms = start.elapsed().as_millis() as u64, "search context ready");
        Ok(ctx)
    }

    pub fn stats(&self) -> &DocumentStats { &self.stats }

    pub fn body(&self) -> &Catalog { &self.body }

    pub fn title(&self) -> &Catalog { &self.title }

    pub fn anchor(&self) -> Option<&Catalog> { self.anchor.as_ref() }

    /// Ranked search with default weights, capped at `n` results.
    pub fn search(&self, tokens: &[String], n: usize) -> Result<RankedList> {
        self.search_with_config(tokens, &SearchConfig { limit: Some(n), ..SearchConfig::default() })
    }

    /// Body BM25 + title BM25 + page rank + page views, fused by `config` weights.
    pub fn search_with_config(&self, tokens: &[String], config: &SearchConfig) -> Result<RankedList> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let deadline = Deadline::new(self.query_timeout);

        let body = Bm25Ranker::new(&self.body, &self.stats, config.body_params()).search(tokens, DEFAULT_TOP_N)?;
        let body = normalize(&body);
        deadline.check()?;

        let title = Bm25Ranker::new(&self.title, &self.stats, config.title_params()).search(tokens, DEFAULT_TOP_N)?;
        let title = normalize(&title);
        deadline.check()?;

        let docs: BTreeSet<DocId> = body.iter().chain(&title).map(|d| d.doc_id).collect();
        let page_rank = signal_for(&self.page_rank_norm, &docs);
        let page_views = signal_for(&self.page_views_norm, &docs);

        let limit = config.limit.unwrap_or_else(|| default_result_limit(tokens));
        let fused = merge(&[body, title, page_rank, page_views], &config.weights(), limit)?;
        deadline.check()?;
        tracing::debug!(tokens = tokens.len(), results = fused.len(), took_ms = deadline.start.elapsed().as_millis() as u64, "ranked search");
        Ok(fused)
    }

    /// TF-IDF cosine similarity over the body catalog.
    pub fn search_body(&self, tokens: &[String]) -> Result<RankedList> {
        let deadline = Deadline::new(self.query_timeout);
        let res = VectorSpaceRanker::new(&self.body, &self.stats).search(tokens, DEFAULT_TOP_N)?;
        deadline.check()?;
        Ok(res)
    }

    /// Documents ranked by how many query tokens hit their title.
    pub fn search_title(&self, tokens: &[String]) -> Result<RankedList> {
        self.count_matches(&self.title, tokens)
    }

    /// Like [`search_title`](Self::search_title) over anchor text; empty without an anchor catalog.
    pub fn search_anchor(&self, tokens: &[String]) -> Result<RankedList> {
        match &self.anchor {
            Some(anchor) => self.count_matches(anchor, tokens),
            None => Ok(Vec::new()),
        }
    }

    pub fn page_rank(&self, docs: &[DocId], normalized: bool) -> Vec<f64> {
        let table = if normalized { &self.page_rank_norm } else { &self.page_rank };
        docs.iter().map(|&d| table.get(d).unwrap_or(0.0)).collect()
    }

    pub fn page_views(&self, docs: &[DocId], normalized: bool) -> Vec<f64> {
        let table = if normalized { &self.page_views_norm } else { &self.page_views };
        docs.iter().map(|&d| table.get(d).unwrap_or(0.0)).collect()
    }

    /// Attach titles; documents with no known title are dropped.
    pub fn with_titles(&self, results: &[ScoredDoc]) -> Vec<SearchHit> {
        results
            .iter()
            .filter_map(|d| {
                let title = self.stats.title(d.doc_id)?;
                Some(SearchHit { doc_id: d.doc_id, title: title.to_string(), score: d.score })
            })
            .collect()
    }

    fn count_matches(&self, catalog: &Catalog, tokens: &[String]) -> Result<RankedList> {
        let deadline = Deadline::new(self.query_timeout);
        let mut cache: HashMap<&str, Vec<DocId>> = HashMap::new();
        let mut counts: HashMap<DocId, f64> = HashMap::new();
        for term in tokens {
            if !cache.contains_key(term.as_str()) {
                let docs = catalog.postings_for(term)?.into_iter().map(|p| p.doc_id).collect();
                cache.insert(term.as_str(), docs);
                deadline.check()?;
            }
            for &doc in &cache[term.as_str()] {
                if self.stats.title(doc).is_some() {
                    *counts.entry(doc).or_insert(0.0) += 1.0;
                }
            }
        }
        let ranked = counts.into_iter().map(|(doc, c)| ScoredDoc::new(doc, c)).collect::<Vec<_>>();
        let n = ranked.len();
        Ok(sort_and_truncate(ranked, n))
    }
}

/// Signal values for `docs`, keyed by doc id; absent values score zero.
fn signal_for(table: &SignalTable, docs: &BTreeSet<DocId>) -> RankedList {
    docs.iter().map(|&doc| ScoredDoc::new(doc, table.get(doc).unwrap_or(0.0))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn result_limit_counts_distinct_tokens() {
        assert_eq!(default_result_limit(&toks(&["cat"])), 10);
        assert_eq!(default_result_limit(&toks(&["cat", "cat"])), 10);
        assert_eq!(default_result_limit(&toks(&["a", "b", "c", "d"])), 30);
        assert_eq!(default_result_limit(&[]), 0);
    }

    #[test]
    fn config_defaults() {
        let c = SearchConfig::default();
        assert_eq!(c.weights(), [0.6, 0.3, 0.15, 0.15]);
        assert_eq!(c.body_params(), Bm25Params { k1: 5.0, b: 0.2 });
        assert_eq!(c.title_params(), Bm25Params { k1: 2.0, b: 0.05 });
    }

    #[test]
    fn config_fills_missing_fields() {
        let c: SearchConfig = serde_json::from_str(r#"{"body_weight": 1.0, "limit": 5}"#).unwrap();
        assert_eq!(c.body_weight, 1.0);
        assert_eq!(c.title_weight, 0.3);
        assert_eq!(c.limit, Some(5));
    }

    #[test]
    fn config_accepts_short_names() {
        let c: SearchConfig = serde_json::from_str(r#"{"query": "cat", "body_k": 1.2, "page_views_w": 0.5}"#).unwrap();
        assert_eq!(c.body_k1, 1.2);
        assert_eq!(c.pageview_weight, 0.5);
        assert_eq!(c.body_weight, 0.6);
    }

    #[test]
    fn expired_deadline_times_out() {
        let d = Deadline::new(Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(d.check(), Err(SearchError::Timeout { .. })));
        assert!(Deadline::new(None).check().is_ok());
    }
}
