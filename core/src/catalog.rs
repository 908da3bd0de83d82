use crate::codec::{decode_postings, TUPLE_SIZE};
use crate::error::{Result, SearchError};
use crate::index::{InvertedIndex, Posting};
use crate::store::PostingStore;

/// A loaded sub-index: the term catalog plus the store its posting blocks live in.
#[derive(Debug)]
pub struct Catalog {
    name: String,
    index: InvertedIndex,
    store: PostingStore,
}

impl Catalog {
    pub fn new(name: impl Into<String>, index: InvertedIndex, store: PostingStore) -> Self {
        Self { name: name.into(), index, store }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn store(&self) -> &PostingStore { &self.store }

    pub fn df(&self, term: &str) -> Option<u32> { self.index.df(term) }

    pub fn contains(&self, term: &str) -> bool { self.index.contains(term) }

    /// Decoded posting list of `term`, empty when the term is not catalogued.
    ///
    /// A missing block is fetched and the read retried once; short buffers are corruption.
    pub fn postings_for(&self, term: &str) -> Result<Vec<Posting>> {
        let (Some(df), Some(locs)) = (self.index.df(term), self.index.locations(term)) else {
            return Ok(Vec::new());
        };
        let expected = df as usize * TUPLE_SIZE;
        let bytes = match self.store.read(locs, expected) {
            Err(e) if e.is_missing_block() && self.store.has_fetcher() => {
                tracing::warn!(index = %self.name, term, error = %e, "posting block not resident, fetching");
                self.store.fetch_missing(locs)?;
                self.store.read(locs, expected)?
            }
            other => other?,
        };
        decode_postings(&bytes, df as usize).ok_or_else(|| SearchError::CorruptPostings {
            term: term.to_string(),
            expected,
            actual: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_postings;
    use crate::index::BlockLocation;
    use crate::store::MirrorFetcher;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn cat_index(df: u32) -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        idx.df.insert("cat".into(), df);
        idx.posting_locs.insert("cat".into(), vec![BlockLocation::new("0.bin", 0)]);
        idx
    }

    fn cat_bytes() -> Vec<u8> {
        encode_postings(&[Posting { doc_id: 1, tf: 3 }, Posting { doc_id: 2, tf: 1 }])
    }

    #[test]
    fn unknown_term_is_empty() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new("body", InvertedIndex::new(), PostingStore::new(dir.path()));
        assert!(catalog.postings_for("dog").unwrap().is_empty());
    }

    #[test]
    fn decodes_postings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("0.bin"), cat_bytes()).unwrap();
        let catalog = Catalog::new("body", cat_index(2), PostingStore::new(dir.path()));
        let pl = catalog.postings_for("cat").unwrap();
        assert_eq!(pl, vec![Posting { doc_id: 1, tf: 3 }, Posting { doc_id: 2, tf: 1 }]);
    }

    #[test]
    fn short_block_is_corruption() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("0.bin"), cat_bytes()).unwrap();
        let catalog = Catalog::new("body", cat_index(3), PostingStore::new(dir.path()));
        let err = catalog.postings_for("cat").unwrap_err();
        assert!(matches!(err, SearchError::CorruptPostings { expected: 18, actual: 12, .. }));
    }

    #[test]
    fn missing_block_without_fetcher_fails() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new("body", cat_index(2), PostingStore::new(dir.path()));
        assert!(catalog.postings_for("cat").unwrap_err().is_missing_block());
    }

    #[test]
    fn missing_block_fetched_and_retried() {
        let mirror = tempdir().unwrap();
        let local = tempdir().unwrap();
        fs::create_dir_all(mirror.path().join("body")).unwrap();
        fs::write(mirror.path().join("body").join("0.bin"), cat_bytes()).unwrap();
        let store = PostingStore::new(local.path()).with_fetcher("body", Arc::new(MirrorFetcher::new(mirror.path())));
        let catalog = Catalog::new("body", cat_index(2), store);
        assert_eq!(catalog.postings_for("cat").unwrap().len(), 2);
        assert!(local.path().join("0.bin").is_file());
    }

    #[test]
    fn fetch_failure_is_fatal() {
        let mirror = tempdir().unwrap();
        let local = tempdir().unwrap();
        let store = PostingStore::new(local.path()).with_fetcher("body", Arc::new(MirrorFetcher::new(mirror.path())));
        let catalog = Catalog::new("body", cat_index(2), store);
        assert!(matches!(catalog.postings_for("cat"), Err(SearchError::Fetch { .. })));
    }
}
