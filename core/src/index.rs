use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// One (block, offset) entry of a term's posting location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLocation {
    pub block: String,
    pub offset: u64,
}

impl BlockLocation {
    pub fn new(block: impl Into<String>, offset: u64) -> Self {
        Self { block: block.into(), offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u16,
}

/// Term catalog of one sub-index (body, title or anchor text).
///
/// Both maps are produced offline and never mutated at query time.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub df: HashMap<String, u32>,
    pub posting_locs: HashMap<String, Vec<BlockLocation>>, // ordered, may span blocks
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Document frequency of `term`; a stored zero counts as absent.
    pub fn df(&self, term: &str) -> Option<u32> {
        self.df.get(term).copied().filter(|&df| df > 0)
    }

    pub fn locations(&self, term: &str) -> Option<&[BlockLocation]> {
        self.posting_locs.get(term).map(Vec::as_slice)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.df(term).is_some() && self.posting_locs.contains_key(term)
    }

    pub fn num_terms(&self) -> usize { self.df.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_df_is_absent() {
        let mut idx = InvertedIndex::new();
        idx.df.insert("ghost".into(), 0);
        idx.posting_locs.insert("ghost".into(), vec![BlockLocation::new("0.bin", 0)]);
        assert_eq!(idx.df("ghost"), None);
        assert!(!idx.contains("ghost"));
    }

    #[test]
    fn present_term_has_locations() {
        let mut idx = InvertedIndex::new();
        idx.df.insert("cat".into(), 2);
        idx.posting_locs.insert("cat".into(), vec![BlockLocation::new("0.bin", 12)]);
        assert!(idx.contains("cat"));
        assert_eq!(idx.locations("cat").unwrap()[0].offset, 12);
    }
}
