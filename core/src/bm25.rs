//! Okapi BM25 over one catalog.
//!
//! A [`Bm25Ranker`] holds the per-query candidate cache, so build one per query and
//! drop it afterwards; the catalog and stats it borrows are shared snapshots.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::index::DocId;
use crate::ranked::{sort_and_truncate, RankedList, ScoredDoc};
use crate::stats::DocumentStats;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

/// `ln(1 + (N - df + 0.5) / (df + 0.5))`
pub fn bm25_idf(n: usize, df: u32) -> f64 {
    let n = n as f64;
    let df = df as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Contribution of one query term to one document.
pub fn bm25_term_score(idf: f64, tf: f64, doc_len: f64, avg_len: f64, params: Bm25Params) -> f64 {
    let len_ratio = if avg_len > 0.0 { doc_len / avg_len } else { 0.0 };
    let numerator = idf * tf * (params.k1 + 1.0);
    let denominator = tf + params.k1 * (1.0 - params.b + params.b * len_ratio);
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

pub struct Bm25Ranker<'a> {
    catalog: &'a Catalog,
    stats: &'a DocumentStats,
    params: Bm25Params,
    idf: HashMap<String, f64>,
    freqs: HashMap<String, HashMap<DocId, u16>>,
}

impl<'a> Bm25Ranker<'a> {
    pub fn new(catalog: &'a Catalog, stats: &'a DocumentStats, params: Bm25Params) -> Self {
        Self { catalog, stats, params, idf: HashMap::new(), freqs: HashMap::new() }
    }

    pub fn params(&self) -> Bm25Params { self.params }

    /// idf of a catalogued term; `None` for terms the catalog does not know.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.catalog.df(term).map(|df| bm25_idf(self.stats.num_docs(), df))
    }

    /// Rank every document that contains at least one query term.
    pub fn search(&mut self, tokens: &[String], n: usize) -> Result<RankedList> {
        self.idf.clear();
        self.freqs.clear();
        if tokens.is_empty() || self.stats.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = self.load_candidates(tokens)?;
        tracing::debug!(index = %self.catalog.name(), terms = self.freqs.len(), candidates = candidates.len(), "bm25 candidates");
        let scored = candidates.into_iter().map(|doc| ScoredDoc::new(doc, self.score(tokens, doc))).collect();
        Ok(sort_and_truncate(scored, n))
    }

    /// Score of `doc` against the postings loaded by the last [`search`](Self::search).
    /// Repeated query terms count once per occurrence.
    pub fn score(&self, tokens: &[String], doc: DocId) -> f64 {
        let doc_len = self.stats.len(doc).unwrap_or(0) as f64;
        tokens
            .iter()
            .filter_map(|term| {
                let tf = *self.freqs.get(term)?.get(&doc)?;
                let idf = *self.idf.get(term)?;
                Some(bm25_term_score(idf, tf as f64, doc_len, self.stats.avg_len(), self.params))
            })
            .sum()
    }

    fn load_candidates(&mut self, tokens: &[String]) -> Result<HashSet<DocId>> {
        let mut candidates = HashSet::new();
        for term in tokens {
            if self.freqs.contains_key(term) {
                continue;
            }
            let Some(idf) = self.idf(term) else { continue };
            let postings = self.catalog.postings_for(term)?;
            let freqs: HashMap<DocId, u16> = postings.iter().map(|p| (p.doc_id, p.tf)).collect();
            candidates.extend(freqs.keys().copied());
            self.idf.insert(term.clone(), idf);
            self.freqs.insert(term.clone(), freqs);
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: Bm25Params = Bm25Params { k1: 1.5, b: 0.75 };

    #[test]
    fn idf_decreases_with_df() {
        let mut prev = f64::INFINITY;
        for df in 1..=50 {
            let idf = bm25_idf(50, df);
            assert!(idf < prev, "idf({df}) = {idf} not below {prev}");
            prev = idf;
        }
    }

    #[test]
    fn idf_matches_worked_example() {
        assert!((bm25_idf(3, 2) - 1.6f64.ln()).abs() < 1e-12);
        assert!((bm25_idf(3, 2) - 0.4700).abs() < 1e-4);
    }

    #[test]
    fn score_grows_with_tf() {
        let idf = bm25_idf(3, 2);
        let mut prev = 0.0;
        for tf in 1..20 {
            let s = bm25_term_score(idf, tf as f64, 8.0, 10.0, PARAMS);
            assert!(s > prev);
            prev = s;
        }
    }

    #[test]
    fn longer_documents_score_lower() {
        let idf = bm25_idf(3, 2);
        assert!(bm25_term_score(idf, 2.0, 8.0, 10.0, PARAMS) > bm25_term_score(idf, 2.0, 12.0, 10.0, PARAMS));
    }

    #[test]
    fn zero_average_length_is_guarded() {
        let s = bm25_term_score(1.0, 2.0, 5.0, 0.0, PARAMS);
        assert!(s.is_finite() && s > 0.0);
    }
}
