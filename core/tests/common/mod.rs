#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use wikisearch_core::codec::encode_postings;
use wikisearch_core::persist::{self, IndexPaths, MetaFile, BODY_INDEX, TITLE_INDEX};
use wikisearch_core::{BlockLocation, DocId, InvertedIndex, Posting};

/// Appends posting lists to numbered block files, rolling over at `block_size`.
pub struct BlockWriter {
    dir: PathBuf,
    block_size: u64,
    current: u32,
    used: u64,
}

impl BlockWriter {
    pub fn new<P: AsRef<Path>>(dir: P, block_size: u64) -> Self {
        std::fs::create_dir_all(dir.as_ref()).unwrap();
        Self { dir: dir.as_ref().to_path_buf(), block_size, current: 0, used: 0 }
    }

    pub fn write_term(&mut self, postings: &[Posting]) -> Vec<BlockLocation> {
        let bytes = encode_postings(postings);
        let mut rest = &bytes[..];
        let mut locs = Vec::new();
        while !rest.is_empty() {
            if self.used == self.block_size {
                self.current += 1;
                self.used = 0;
            }
            let take = ((self.block_size - self.used) as usize).min(rest.len());
            let name = format!("0_{:03}.bin", self.current);
            let mut f = OpenOptions::new().create(true).append(true).open(self.dir.join(&name)).unwrap();
            f.write_all(&rest[..take]).unwrap();
            locs.push(BlockLocation::new(name, self.used));
            self.used += take as u64;
            rest = &rest[take..];
        }
        locs
    }
}

pub fn p(doc_id: DocId, tf: u16) -> Posting {
    Posting { doc_id, tf }
}

pub fn write_index(dir: &Path, block_size: u64, terms: &[(&str, Vec<Posting>)]) -> InvertedIndex {
    let mut writer = BlockWriter::new(dir, block_size);
    let mut index = InvertedIndex::new();
    for (term, postings) in terms {
        let locs = writer.write_term(postings);
        index.df.insert(term.to_string(), postings.len() as u32);
        index.posting_locs.insert(term.to_string(), locs);
    }
    index
}

pub fn toks(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

/// Three documents: "cat" in the body of docs 1 and 2 and the title of doc 2,
/// "dog" in doc 3. Page rank favours doc 2, then doc 3.
pub fn build_fixture(root: &Path) -> IndexPaths {
    let paths = IndexPaths::new(root);
    let body = write_index(
        &paths.index_dir(BODY_INDEX),
        wikisearch_core::store::BLOCK_SIZE,
        &[("cat", vec![p(1, 3), p(2, 1)]), ("dog", vec![p(3, 2)])],
    );
    persist::save_index(&paths, BODY_INDEX, &body).unwrap();
    let title = write_index(
        &paths.index_dir(TITLE_INDEX),
        wikisearch_core::store::BLOCK_SIZE,
        &[("cat", vec![p(2, 1)]), ("dog", vec![p(3, 1)])],
    );
    persist::save_index(&paths, TITLE_INDEX, &title).unwrap();

    persist::save_doc_len(&paths, &HashMap::from([(1, 8), (2, 12), (3, 10)])).unwrap();
    persist::save_doc_norms(&paths, &HashMap::from([(1, 0.5), (2, 0.5), (3, 0.5)])).unwrap();
    persist::save_doc_titles(
        &paths,
        &HashMap::from([(1, "Cat".to_string()), (2, "Cats".to_string()), (3, "Dog".to_string())]),
    )
    .unwrap();
    persist::save_page_rank(&paths, &HashMap::from([(1, 0.0), (2, 100.0), (3, 50.0)])).unwrap();
    persist::save_page_views(&paths, &HashMap::from([(1, 10.0), (2, 10.0), (3, 10.0)])).unwrap();
    persist::save_meta(&paths, &MetaFile { num_docs: 3, created_at: "2024-01-01T00:00:00Z".into(), version: 1 }).unwrap();
    paths
}
