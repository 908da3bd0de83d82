//! Query-time retrieval over a precomputed, block-partitioned inverted index.
//!
//! Catalogs map terms to document frequencies and posting locations; the
//! [`PostingStore`] stitches posting bytes back together across blocks; BM25 and
//! TF-IDF rankers score candidates; [`fusion::merge`] combines weighted signals; and
//! [`SearchContext`] runs a whole query.

pub mod bm25;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod fusion;
pub mod index;
pub mod persist;
pub mod pipeline;
pub mod ranked;
pub mod stats;
pub mod store;
pub mod tokenizer;
pub mod vector_space;

pub use catalog::Catalog;
pub use error::{Result, SearchError};
pub use index::{BlockLocation, DocId, InvertedIndex, Posting};
pub use pipeline::{default_result_limit, SearchConfig, SearchContext, SearchHit};
pub use ranked::{RankedList, ScoredDoc};
pub use stats::{DocumentStats, SignalTable};
pub use store::{BlockFetcher, MirrorFetcher, PostingStore};
