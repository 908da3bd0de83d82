use crate::error::{Result, SearchError};
use crate::index::DocId;
use crate::ranked::{sort_and_truncate, RankedList, ScoredDoc};
use std::collections::HashMap;

/// Weighted additive fusion over the union of all documents in `lists`.
///
/// A document missing from a list gets no contribution from it.
pub fn merge(lists: &[RankedList], weights: &[f64], n: usize) -> Result<RankedList> {
    if lists.len() != weights.len() {
        return Err(SearchError::WeightMismatch { lists: lists.len(), weights: weights.len() });
    }
    let mut acc: HashMap<DocId, f64> = HashMap::new();
    for (list, &weight) in lists.iter().zip(weights) {
        for d in list {
            *acc.entry(d.doc_id).or_insert(0.0) += d.score * weight;
        }
    }
    let merged = acc.into_iter().map(|(doc, score)| ScoredDoc::new(doc, score)).collect();
    Ok(sort_and_truncate(merged, n))
}
