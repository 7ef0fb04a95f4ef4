use crate::error::QueryError;
use crate::index::{DocKey, InvertedIndex};
use crate::tokenizer::{tokenize, Stopwords};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedDoc {
    pub doc_id: DocKey,
    pub score: f64,
    pub weight: u32,
}

/// Read-only retrieval over a borrowed index snapshot.
pub struct QueryEngine<'a> {
    index: &'a InvertedIndex,
    stopwords: &'a Stopwords,
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "query and document vectors must align");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Score descending, then weight descending, then identifier ascending.
pub fn rank_order(a: &RankedDoc, b: &RankedDoc) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.weight.cmp(&a.weight))
        .then_with(|| a.doc_id.cmp(&b.doc_id))
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a InvertedIndex, stopwords: &'a Stopwords) -> Self {
        Self { index, stopwords }
    }

    /// One value per query term occurrence: `(1 + log10(1/n)) * idf[term]`.
    pub fn query_vector<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<f64>, QueryError> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let tf = 1.0 + (1.0 / terms.len() as f64).log10();
        terms
            .iter()
            .map(|t| {
                let t = t.as_ref();
                self.index.idf.get(t).map(|idf| tf * idf).ok_or_else(|| QueryError::UnknownTerm(t.to_string()))
            })
            .collect()
    }

    /// Documents holding a scored entry for at least one term.
    fn candidates<S: AsRef<str>>(&self, terms: &[S]) -> BTreeSet<&'a str> {
        let index: &'a InvertedIndex = self.index;
        terms
            .iter()
            .filter_map(|t| index.tfidf.get(t.as_ref()))
            .flat_map(|docs| docs.keys().map(String::as_str))
            .collect()
    }

    pub fn rank_terms<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<RankedDoc>, QueryError> {
        let query_vec = self.query_vector(terms)?;
        if query_vec.is_empty() {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<RankedDoc> = self
            .candidates(terms)
            .into_iter()
            .map(|doc| {
                let mut weight = 0;
                let doc_vec: Vec<f64> = terms
                    .iter()
                    .map(|t| match self.index.tfidf.get(t.as_ref()).and_then(|docs| docs.get(doc)) {
                        Some(entry) => {
                            weight += entry.weight;
                            entry.tfidf
                        }
                        None => 0.0,
                    })
                    .collect();
                RankedDoc { doc_id: doc.to_string(), score: dot(&query_vec, &doc_vec), weight }
            })
            .collect();
        ranked.sort_by(rank_order);
        Ok(ranked)
    }

    /// Tokenize `text` and rank every candidate document.
    pub fn rank(&self, text: &str) -> Result<Vec<RankedDoc>, QueryError> {
        let terms = tokenize(text, self.stopwords);
        let ranked = self.rank_terms(&terms)?;
        tracing::debug!(query = text, terms = terms.len(), hits = ranked.len(), "ranked query");
        Ok(ranked)
    }

    /// Ranked document identifiers, best first.
    pub fn query(&self, text: &str) -> Result<Vec<DocKey>, QueryError> {
        Ok(self.rank(text)?.into_iter().map(|r| r.doc_id).collect())
    }
}
