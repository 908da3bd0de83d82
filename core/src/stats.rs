use crate::index::DocId;
use std::collections::HashMap;

/// Per-document tables shared by every ranker.
#[derive(Debug, Default, Clone)]
pub struct DocumentStats {
    lengths: HashMap<DocId, u32>,
    norms: HashMap<DocId, f64>,
    titles: HashMap<DocId, String>,
    avg_len: f64,
}

impl DocumentStats {
    pub fn new(lengths: HashMap<DocId, u32>, norms: HashMap<DocId, f64>, titles: HashMap<DocId, String>) -> Self {
        let avg_len = if lengths.is_empty() {
            0.0
        } else {
            lengths.values().map(|&l| l as f64).sum::<f64>() / lengths.len() as f64
        };
        Self { lengths, norms, titles, avg_len }
    }

    /// Corpus size N, taken from the document length table.
    pub fn num_docs(&self) -> usize { self.lengths.len() }

    pub fn avg_len(&self) -> f64 { self.avg_len }

    pub fn len(&self, doc: DocId) -> Option<u32> { self.lengths.get(&doc).copied() }

    pub fn norm(&self, doc: DocId) -> Option<f64> { self.norms.get(&doc).copied() }

    pub fn title(&self, doc: DocId) -> Option<&str> { self.titles.get(&doc).map(String::as_str) }

    pub fn is_empty(&self) -> bool { self.lengths.is_empty() }
}

/// A per-document numeric signal such as page rank or page views.
#[derive(Debug, Default, Clone)]
pub struct SignalTable {
    values: HashMap<DocId, f64>,
}

impl SignalTable {
    pub fn new(values: HashMap<DocId, f64>) -> Self { Self { values } }

    pub fn get(&self, doc: DocId) -> Option<f64> { self.values.get(&doc).copied() }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Rescale into [0, 1]. A constant table maps to all zeros.
    pub fn min_max_normalized(&self) -> SignalTable {
        let (min, max) = self
            .values
            .values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max - min;
        let values = self
            .values
            .iter()
            .map(|(&doc, &v)| {
                let scaled = if range > 0.0 { (v - min) / range } else { 0.0 };
                (doc, scaled)
            })
            .collect();
        SignalTable { values }
    }
}

impl FromIterator<(DocId, f64)> for SignalTable {
    fn from_iter<I: IntoIterator<Item = (DocId, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
