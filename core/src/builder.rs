use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::error::ConfigError;
use crate::index::{DocList, InvertedIndex, PostingTable};
use crate::scanner::{scan_into, RegionSelectors};
use crate::tokenizer::Stopwords;
use rayon::prelude::*;

/// Drives scan -> accumulate -> statistics over a corpus.
pub struct IndexBuilder<'a> {
    selectors: RegionSelectors,
    stopwords: &'a Stopwords,
    parallel: bool,
    limit: Option<usize>,
}

/// Per-worker accumulator: postings for the documents it scanned plus the
/// documents that made it in.
#[derive(Default)]
struct Shard {
    table: PostingTable,
    docs: DocList,
    skipped: usize,
}

impl Shard {
    fn merge(self, other: Shard) -> Shard {
        let mut docs = self.docs;
        docs.extend(other.docs);
        Shard { table: self.table.merge(other.table), docs, skipped: self.skipped + other.skipped }
    }
}

impl<'a> IndexBuilder<'a> {
    pub fn new(stopwords: &'a Stopwords) -> Self {
        Self { selectors: RegionSelectors::default(), stopwords, parallel: false, limit: None }
    }

    pub fn from_config(cfg: &IndexConfig, stopwords: &'a Stopwords) -> Result<Self, ConfigError> {
        Ok(Self {
            selectors: RegionSelectors::from_config(&cfg.scan)?,
            stopwords,
            parallel: cfg.parallel,
            limit: cfg.limit,
        })
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn scan_one(&self, mut shard: Shard, corpus: &Corpus, key: &str, url: &str) -> Shard {
        match corpus.read(key) {
            Ok(content) => {
                let terms = scan_into(&mut shard.table, key, &content, &self.selectors, self.stopwords);
                shard.docs.insert(key.to_string(), url.to_string());
                tracing::debug!(doc = key, terms, "scanned document");
            }
            Err(e) => {
                tracing::warn!(doc = key, error = %format!("{e:#}"), "skipping document");
                shard.skipped += 1;
            }
        }
        shard
    }

    /// Scan the corpus and return an index with statistics computed.
    pub fn build(&self, corpus: &Corpus) -> InvertedIndex {
        let entries = corpus.entries(self.limit);
        tracing::info!(documents = entries.len(), parallel = self.parallel, "indexing corpus");

        let shard = if self.parallel {
            entries
                .par_iter()
                .fold(Shard::default, |shard, (key, url)| self.scan_one(shard, corpus, key, url))
                .reduce(Shard::default, Shard::merge)
        } else {
            entries.iter().fold(Shard::default(), |shard, (key, url)| self.scan_one(shard, corpus, key, url))
        };

        tracing::info!(
            num_docs = shard.docs.len(),
            skipped = shard.skipped,
            num_terms = shard.table.postings.len(),
            "ingested documents"
        );
        InvertedIndex::from_table(shard.table, shard.docs)
    }
}
