use crate::index::DocId;
use serde::Serialize;
use std::cmp::Ordering;

/// Result size used by the rankers when the caller does not ask for one.
pub const DEFAULT_TOP_N: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl ScoredDoc {
    pub fn new(doc_id: DocId, score: f64) -> Self { Self { doc_id, score } }
}

pub type RankedList = Vec<ScoredDoc>;

/// Descending score, then ascending doc id so equal scores order deterministically.
pub fn rank_order(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
}

pub fn sort_and_truncate(mut list: RankedList, n: usize) -> RankedList {
    list.sort_unstable_by(rank_order);
    list.truncate(n);
    list
}

/// Max-abs scaling into [-1, 1]. Empty and all-zero lists come back unchanged.
pub fn normalize(list: &[ScoredDoc]) -> RankedList {
    let max_abs = list.iter().fold(0.0f64, |m, d| m.max(d.score.abs()));
    if max_abs == 0.0 || !max_abs.is_finite() {
        return list.to_vec();
    }
    list.iter().map(|d| ScoredDoc::new(d.doc_id, d.score / max_abs)).collect()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
