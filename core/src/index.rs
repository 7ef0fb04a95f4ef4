use crate::stats::{compute_statistics, Statistics};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Stable path-like document identifier, e.g. `0/12`.
pub type DocKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Title,
    Header,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub frequency: u32,
    pub emphasized: bool,
    pub section: Option<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub tfidf: f64,
    pub weight: u32,
}

/// term -> document -> posting
pub type Postings = HashMap<String, HashMap<DocKey, Posting>>;
/// document -> display URL, ordered by identifier
pub type DocList = BTreeMap<DocKey, String>;
pub type DocCounts = HashMap<DocKey, u32>;
pub type IdfMap = HashMap<String, f64>;
pub type TfIdfMap = HashMap<String, HashMap<DocKey, ScoredEntry>>;

/// Where a reported term came from: a region tag, or the emphasis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Region(Section),
    Emphasis,
}

impl Signal {
    fn section(self) -> Option<Section> {
        match self {
            Signal::Region(s) => Some(s),
            Signal::Emphasis => None,
        }
    }
}

/// Posting accumulator for one indexing pass (or one worker's share of it).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostingTable {
    pub postings: Postings,
    pub doc_counts: DocCounts,
}

impl PostingTable {
    pub fn new() -> Self { Self::default() }

    /// Record one term occurrence for `doc`.
    pub fn record(&mut self, term: &str, doc: &str, signal: Signal) {
        let docs = self.postings.entry(term.to_string()).or_default();
        match docs.get_mut(doc) {
            Some(p) => {
                p.frequency += 1;
                if signal == Signal::Emphasis {
                    p.emphasized = true;
                }
                if let Some(section) = signal.section() {
                    p.section = Some(section);
                }
            }
            None => {
                docs.insert(
                    doc.to_string(),
                    Posting { frequency: 1, emphasized: signal == Signal::Emphasis, section: signal.section() },
                );
            }
        }
    }

    pub fn record_all<S: AsRef<str>>(&mut self, terms: &[S], doc: &str, signal: Signal) {
        for term in terms {
            self.record(term.as_ref(), doc, signal);
        }
    }

    pub fn set_term_count(&mut self, doc: &str, count: u32) {
        self.doc_counts.insert(doc.to_string(), count);
    }

    /// Fold `other` into `self`. Worker tables cover disjoint documents, so
    /// in practice this is a union; overlapping postings combine with the same
    /// rules as `record`.
    pub fn merge(mut self, other: PostingTable) -> PostingTable {
        for (term, docs) in other.postings {
            let mine = self.postings.entry(term).or_default();
            for (doc, p) in docs {
                match mine.get_mut(&doc) {
                    Some(existing) => {
                        existing.frequency += p.frequency;
                        existing.emphasized |= p.emphasized;
                        if p.section.is_some() {
                            existing.section = p.section;
                        }
                    }
                    None => {
                        mine.insert(doc, p);
                    }
                }
            }
        }
        self.doc_counts.extend(other.doc_counts);
        self
    }
}

/// In-memory snapshot of the five index store components.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    pub postings: Postings,
    pub docs: DocList,
    pub doc_counts: DocCounts,
    pub idf: IdfMap,
    pub tfidf: TfIdfMap,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn from_table(table: PostingTable, docs: DocList) -> Self {
        let mut index = Self { postings: table.postings, docs, doc_counts: table.doc_counts, ..Self::default() };
        index.recompute_statistics();
        index
    }

    /// Total document count used for idf; fixed by the document list.
    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn display_url(&self, doc: &str) -> Option<&str> { self.docs.get(doc).map(String::as_str) }

    /// Rebuild idf and tf-idf from the current postings, document list and
    /// term counts.
    pub fn recompute_statistics(&mut self) {
        let Statistics { idf, tfidf } = compute_statistics(&self.postings, self.num_docs(), &self.doc_counts);
        tracing::info!(num_docs = self.num_docs(), num_terms = idf.len(), "computed statistics");
        self.idf = idf;
        self.tfidf = tfidf;
    }
}
