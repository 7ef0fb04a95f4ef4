use crate::index::{DocCounts, DocList, IdfMap, InvertedIndex, Postings, TfIdfMap};
use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_index(index: &InvertedIndex) -> Self {
        Self {
            num_docs: index.num_docs() as u32,
            num_terms: index.num_terms() as u32,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: FORMAT_VERSION,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn postings(&self) -> PathBuf { self.root.join("postings.bin") }
    fn doc_list(&self) -> PathBuf { self.root.join("doc_list.bin") }
    fn doc_counts(&self) -> PathBuf { self.root.join("doc_counts.bin") }
    fn idf(&self) -> PathBuf { self.root.join("idf.bin") }
    fn tfidf(&self) -> PathBuf { self.root.join("tfidf.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn save_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn load_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let value = bincode::deserialize(&buf).with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

pub fn save_postings(paths: &IndexPaths, postings: &Postings) -> Result<()> { save_bin(&paths.postings(), postings) }
pub fn load_postings(paths: &IndexPaths) -> Result<Postings> { load_bin(&paths.postings()) }

pub fn save_doc_list(paths: &IndexPaths, docs: &DocList) -> Result<()> { save_bin(&paths.doc_list(), docs) }
pub fn load_doc_list(paths: &IndexPaths) -> Result<DocList> { load_bin(&paths.doc_list()) }

pub fn save_doc_counts(paths: &IndexPaths, counts: &DocCounts) -> Result<()> { save_bin(&paths.doc_counts(), counts) }
pub fn load_doc_counts(paths: &IndexPaths) -> Result<DocCounts> { load_bin(&paths.doc_counts()) }

pub fn save_idf(paths: &IndexPaths, idf: &IdfMap) -> Result<()> { save_bin(&paths.idf(), idf) }
pub fn load_idf(paths: &IndexPaths) -> Result<IdfMap> { load_bin(&paths.idf()) }

pub fn save_tfidf(paths: &IndexPaths, tfidf: &TfIdfMap) -> Result<()> { save_bin(&paths.tfidf(), tfidf) }
pub fn load_tfidf(paths: &IndexPaths) -> Result<TfIdfMap> { load_bin(&paths.tfidf()) }

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

fn or_default<T: Default>(component: &str, loaded: Result<T>) -> T {
    match loaded {
        Ok(v) => {
            tracing::info!(component, "loaded");
            v
        }
        Err(e) => {
            tracing::warn!(component, error = %format!("{e:#}"), "could not load, starting empty");
            T::default()
        }
    }
}

/// Load every component; a missing or corrupt one comes back empty.
pub fn load_index(paths: &IndexPaths) -> InvertedIndex {
    InvertedIndex {
        postings: or_default("postings", load_postings(paths)),
        docs: or_default("doc_list", load_doc_list(paths)),
        doc_counts: or_default("doc_counts", load_doc_counts(paths)),
        idf: or_default("idf", load_idf(paths)),
        tfidf: or_default("tfidf", load_tfidf(paths)),
    }
}

/// Load only what querying needs: document list, idf and tf-idf.
pub fn load_query_snapshot(paths: &IndexPaths) -> InvertedIndex {
    InvertedIndex {
        docs: or_default("doc_list", load_doc_list(paths)),
        idf: or_default("idf", load_idf(paths)),
        tfidf: or_default("tfidf", load_tfidf(paths)),
        ..InvertedIndex::default()
    }
}

/// Refuse to recompute from a snapshot whose postings or document list are
/// empty; the statistics would come out empty and clobber the stored ones.
pub fn ensure_recomputable(index: &InvertedIndex) -> Result<()> {
    ensure!(!index.postings.is_empty(), "index has no postings to recompute from");
    ensure!(!index.docs.is_empty(), "index has an empty document list");
    Ok(())
}

/// Load the components a standalone recompute needs. Unlike `load_index`,
/// a missing or corrupt component is an error.
pub fn load_for_recompute(paths: &IndexPaths) -> Result<InvertedIndex> {
    let index = InvertedIndex {
        postings: load_postings(paths)?,
        docs: load_doc_list(paths)?,
        doc_counts: load_doc_counts(paths)?,
        ..InvertedIndex::default()
    };
    ensure_recomputable(&index)?;
    Ok(index)
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    save_postings(paths, &index.postings)?;
    save_doc_list(paths, &index.docs)?;
    save_doc_counts(paths, &index.doc_counts)?;
    save_statistics(paths, index)
}

pub fn save_statistics(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    save_idf(paths, &index.idf)?;
    save_tfidf(paths, &index.tfidf)?;
    save_meta(paths, &MetaFile::for_index(index))?;
    tracing::info!(root = %paths.root.display(), "saved index");
    Ok(())
}
