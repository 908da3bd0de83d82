use crate::error::Result;
use crate::{DocId, InvertedIndex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const BODY_INDEX: &str = "body";
pub const TITLE_INDEX: &str = "title";
pub const ANCHOR_INDEX: &str = "anchor";

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    /// Directory holding a sub-index catalog and its posting blocks.
    pub fn index_dir(&self, name: &str) -> PathBuf { self.root.join(name) }
    fn catalog(&self, name: &str) -> PathBuf { self.index_dir(name).join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn doc_len(&self) -> PathBuf { self.root.join("doc_len.bin") }
    fn doc_norms(&self) -> PathBuf { self.root.join("doc_norms.bin") }
    fn doc_titles(&self) -> PathBuf { self.root.join("doc_titles.bin") }
    fn page_rank(&self) -> PathBuf { self.root.join("page_rank.bin") }
    fn page_views(&self) -> PathBuf { self.root.join("page_views.bin") }

    pub fn has_index(&self, name: &str) -> bool { self.catalog(name).is_file() }
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_index(paths: &IndexPaths, name: &str, index: &InvertedIndex) -> Result<()> {
    write_bincode(&paths.catalog(name), index)
}

pub fn load_index(paths: &IndexPaths, name: &str) -> Result<InvertedIndex> {
    read_bincode(&paths.catalog(name))
}

pub fn save_doc_len(paths: &IndexPaths, lengths: &HashMap<DocId, u32>) -> Result<()> {
    write_bincode(&paths.doc_len(), lengths)
}

pub fn load_doc_len(paths: &IndexPaths) -> Result<HashMap<DocId, u32>> {
    read_bincode(&paths.doc_len())
}

pub fn save_doc_norms(paths: &IndexPaths, norms: &HashMap<DocId, f64>) -> Result<()> {
    write_bincode(&paths.doc_norms(), norms)
}

pub fn load_doc_norms(paths: &IndexPaths) -> Result<HashMap<DocId, f64>> {
    read_bincode(&paths.doc_norms())
}

pub fn save_doc_titles(paths: &IndexPaths, titles: &HashMap<DocId, String>) -> Result<()> {
    write_bincode(&paths.doc_titles(), titles)
}

pub fn load_doc_titles(paths: &IndexPaths) -> Result<HashMap<DocId, String>> {
    read_bincode(&paths.doc_titles())
}

pub fn save_page_rank(paths: &IndexPaths, values: &HashMap<DocId, f64>) -> Result<()> {
    write_bincode(&paths.page_rank(), values)
}

pub fn load_page_rank(paths: &IndexPaths) -> Result<HashMap<DocId, f64>> {
    read_bincode(&paths.page_rank())
}

pub fn save_page_views(paths: &IndexPaths, values: &HashMap<DocId, f64>) -> Result<()> {
    write_bincode(&paths.page_views(), values)
}

pub fn load_page_views(paths: &IndexPaths) -> Result<HashMap<DocId, f64>> {
    read_bincode(&paths.page_views())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// `None` when the index root has no meta.json.
pub fn load_meta(paths: &IndexPaths) -> Result<Option<MetaFile>> {
    let path = paths.meta();
    if !path.is_file() {
        return Ok(None);
    }
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(Some(meta))
}
