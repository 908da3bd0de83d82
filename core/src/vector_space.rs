//! TF-IDF cosine similarity restricted to the query's dimensions.
//!
//! Document vectors only carry the terms that appear in the query, but they are
//! divided by the full precomputed document norm, so scores are an approximation of
//! the true cosine.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::index::DocId;
use crate::ranked::{round_to, sort_and_truncate, RankedList, ScoredDoc};
use crate::stats::DocumentStats;
use std::collections::HashMap;

/// Smoothing added to df in the query-side idf.
pub const EPSILON: f64 = 1e-7;
pub const SCORE_DECIMALS: i32 = 5;

pub struct VectorSpaceRanker<'a> {
    catalog: &'a Catalog,
    stats: &'a DocumentStats,
}

impl<'a> VectorSpaceRanker<'a> {
    pub fn new(catalog: &'a Catalog, stats: &'a DocumentStats) -> Self {
        Self { catalog, stats }
    }

    /// `Q[t] = count(t) / |query| * log10(N / (df + EPSILON))` over catalogued terms.
    pub fn query_vector(&self, tokens: &[String]) -> HashMap<String, f64> {
        let mut q = HashMap::new();
        if tokens.is_empty() {
            return q;
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for t in tokens {
            *counts.entry(t.as_str()).or_insert(0) += 1;
        }
        let n = self.stats.num_docs() as f64;
        for (term, count) in counts {
            let Some(df) = self.catalog.df(term) else { continue };
            let tf = count as f64 / tokens.len() as f64;
            let idf = (n / (df as f64 + EPSILON)).log10();
            q.insert(term.to_string(), tf * idf);
        }
        q
    }

    /// Sparse document vectors over the query terms only.
    pub fn document_vectors(&self, query: &HashMap<String, f64>) -> Result<HashMap<DocId, HashMap<String, f64>>> {
        let n = self.stats.num_docs() as f64;
        let mut docs: HashMap<DocId, HashMap<String, f64>> = HashMap::new();
        for term in query.keys() {
            let Some(df) = self.catalog.df(term) else { continue };
            let idf = (n / df as f64).log10();
            for p in self.catalog.postings_for(term)? {
                // unknown or empty documents weigh nothing
                let weight = match self.stats.len(p.doc_id) {
                    Some(len) if len > 0 => (p.tf as f64 / len as f64) * idf,
                    _ => 0.0,
                };
                docs.entry(p.doc_id).or_default().insert(term.clone(), weight);
            }
        }
        Ok(docs)
    }

    pub fn search(&self, tokens: &[String], n: usize) -> Result<RankedList> {
        let q = self.query_vector(tokens);
        let q_norm = q.values().map(|w| w * w).sum::<f64>().sqrt();
        if q.is_empty() || q_norm == 0.0 {
            return Ok(Vec::new());
        }
        let docs = self.document_vectors(&q)?;
        tracing::debug!(index = %self.catalog.name(), terms = q.len(), candidates = docs.len(), "tf-idf candidates");
        let scored = docs
            .into_iter()
            .map(|(doc, vector)| {
                let dot: f64 = q.iter().filter_map(|(t, qw)| vector.get(t).map(|dw| qw * dw)).sum();
                let sim = match self.stats.norm(doc) {
                    Some(norm) if norm > 0.0 => dot / (norm * q_norm),
                    _ => 0.0,
                };
                ScoredDoc::new(doc, round_to(sim, SCORE_DECIMALS))
            })
            .collect();
        Ok(sort_and_truncate(scored, n))
    }
}
