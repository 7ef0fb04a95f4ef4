//! Document frequency, idf, tf-idf and structural weights.
//!
//! idf  = log10(N / df)
//! tf   = 1 + log10(frequency / terms_in_doc)
//! weight = emphasized(1) + title(3) | header(2)

use crate::index::{DocCounts, IdfMap, Posting, Postings, ScoredEntry, Section, TfIdfMap};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Statistics {
    pub idf: IdfMap,
    pub tfidf: TfIdfMap,
}

pub fn idf(num_docs: usize, doc_freq: usize) -> f64 {
    (num_docs as f64 / doc_freq as f64).log10()
}

/// `None` when either side is zero, where the logarithm or the ratio is undefined.
pub fn tf(frequency: u32, terms_in_doc: u32) -> Option<f64> {
    if frequency == 0 || terms_in_doc == 0 {
        return None;
    }
    Some(1.0 + (frequency as f64 / terms_in_doc as f64).log10())
}

pub fn term_weight(emphasized: bool, section: Option<Section>) -> u32 {
    let mut w = 0;
    if emphasized {
        w += 1;
    }
    match section {
        Some(Section::Title) => w += 3,
        Some(Section::Header) => w += 2,
        _ => {}
    }
    w
}

pub fn compute_statistics(postings: &Postings, num_docs: usize, doc_counts: &DocCounts) -> Statistics {
    let mut stats = Statistics::default();
    if num_docs == 0 {
        if !postings.is_empty() {
            tracing::warn!(num_terms = postings.len(), "document list is empty; skipping statistics");
        }
        return stats;
    }

    for (term, docs) in postings {
        // every posting key has at least one document by construction
        if docs.is_empty() {
            continue;
        }
        let term_idf = idf(num_docs, docs.len());
        stats.idf.insert(term.clone(), term_idf);

        let mut scored = HashMap::with_capacity(docs.len());
        for (doc, Posting { frequency, emphasized, section }) in docs {
            let terms_in_doc = doc_counts.get(doc).copied().unwrap_or(0);
            let Some(term_tf) = tf(*frequency, terms_in_doc) else {
                tracing::debug!(term = %term, doc = %doc, frequency, terms_in_doc, "skipping degenerate posting");
                continue;
            };
            scored.insert(doc.clone(), ScoredEntry { tfidf: term_tf * term_idf, weight: term_weight(*emphasized, *section) });
        }
        stats.tfidf.insert(term.clone(), scored);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{PostingTable, Signal};

    fn table() -> PostingTable {
        let mut t = PostingTable::new();
        t.record_all(&["common", "rare", "rare"], "a", Signal::Region(Section::Body));
        t.set_term_count("a", 3);
        t.record_all(&["common", "shared"], "b", Signal::Region(Section::Body));
        t.set_term_count("b", 2);
        t.record_all(&["common", "shared"], "c", Signal::Region(Section::Body));
        t.set_term_count("c", 2);
        t
    }

    #[test]
    fn term_in_every_document_has_zero_idf_and_tfidf() {
        let t = table();
        let s = compute_statistics(&t.postings, 3, &t.doc_counts);
        assert_eq!(s.idf["common"], 0.0);
        assert!(s.tfidf["common"].values().all(|e| e.tfidf == 0.0));
    }

    #[test]
    fn term_in_one_document_has_max_idf() {
        let t = table();
        let s = compute_statistics(&t.postings, 3, &t.doc_counts);
        let max = s.idf.values().cloned().fold(f64::MIN, f64::max);
        assert!((s.idf["rare"] - 3f64.log10()).abs() < 1e-12);
        assert_eq!(s.idf["rare"], max);
        assert!((s.idf["shared"] - 1.5f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn tfidf_uses_document_term_count() {
        let t = table();
        let s = compute_statistics(&t.postings, 3, &t.doc_counts);
        let expected = (1.0 + (2.0f64 / 3.0).log10()) * 3f64.log10();
        assert!((s.tfidf["rare"]["a"].tfidf - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_term_count_is_skipped() {
        let mut t = PostingTable::new();
        t.record("ghost", "empty", Signal::Emphasis);
        t.set_term_count("empty", 0);
        t.record("ghost", "full", Signal::Region(Section::Body));
        t.set_term_count("full", 1);
        let s = compute_statistics(&t.postings, 2, &t.doc_counts);
        assert!(!s.tfidf["ghost"].contains_key("empty"));
        assert!(s.tfidf["ghost"]["full"].tfidf.is_finite());
    }

    #[test]
    fn empty_document_list_yields_nothing() {
        let t = table();
        let s = compute_statistics(&t.postings, 0, &t.doc_counts);
        assert!(s.idf.is_empty());
        assert!(s.tfidf.is_empty());
    }

    #[test]
    fn weights() {
        assert_eq!(term_weight(false, None), 0);
        assert_eq!(term_weight(true, None), 1);
        assert_eq!(term_weight(false, Some(Section::Title)), 3);
        assert_eq!(term_weight(true, Some(Section::Header)), 3);
        assert_eq!(term_weight(true, Some(Section::Body)), 1);
        assert_eq!(tf(0, 5), None);
        assert_eq!(tf(3, 0), None);
        assert_eq!(tf(2, 2), Some(1.0));
    }
}
