use quarry_core::corpus::{Corpus, MANIFEST_FILE};
use quarry_core::{IndexBuilder, QueryEngine, QueryError, Section, Stopwords};
use std::fs;
use std::path::Path;

fn write_corpus(dir: &Path, pages: &[(&str, &str)]) -> Corpus {
    let mut manifest = serde_json::Map::new();
    for (key, html) in pages {
        let path = dir.join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, html).unwrap();
        manifest.insert(key.to_string(), format!("www.example.com/{key}").into());
    }
    fs::write(dir.join(MANIFEST_FILE), serde_json::to_string(&manifest).unwrap()).unwrap();
    Corpus::open(dir).unwrap()
}

fn fruit_corpus(dir: &Path) -> Corpus {
    write_corpus(
        dir,
        &[
            ("0/a", "<html><head><title>apple pie</title></head><body>apple apple pie</body></html>"),
            ("0/b", "<html><body>apple</body></html>"),
            ("0/c", "<html><body>pie pie pie</body></html>"),
        ],
    )
}

#[test]
fn three_document_example() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let index = IndexBuilder::new(&stop).build(&fruit_corpus(dir.path()));

    assert_eq!(index.num_docs(), 3);
    let expected = 1.5f64.log10();
    assert!((index.idf["apple"] - expected).abs() < 1e-12);
    assert!((index.idf["pie"] - expected).abs() < 1e-12);
    assert_eq!(index.postings["apple"].len(), 2);

    let apple_a = &index.postings["apple"]["0/a"];
    assert_eq!(apple_a.frequency, 3);
    assert_eq!(apple_a.section, Some(Section::Body));

    // "apple" ties on score and weight for 0/a and 0/b: the body pass
    // overwrites the title section, and both have tf = 1. The identifier
    // decides the order.
    let engine = QueryEngine::new(&index, &stop);
    let ranked = engine.rank("apple").unwrap();
    assert_eq!(ranked[0].score, ranked[1].score);
    assert_eq!(ranked[0].weight, ranked[1].weight);
    assert_eq!(engine.query("apple").unwrap(), vec!["0/a", "0/b"]);
    assert_eq!(engine.query("Pie").unwrap(), vec!["0/c", "0/a"]);
}

#[test]
fn example_tie_follows_identifier_not_title() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let corpus = write_corpus(
        dir.path(),
        &[
            ("0/b", "<html><head><title>apple pie</title></head><body>apple apple pie</body></html>"),
            ("0/a", "<html><body>apple</body></html>"),
            ("0/c", "<html><body>pie pie pie</body></html>"),
        ],
    );
    let index = IndexBuilder::new(&stop).build(&corpus);
    let engine = QueryEngine::new(&index, &stop);
    assert_eq!(engine.query("apple").unwrap(), vec!["0/a", "0/b"]);
}

#[test]
fn title_only_page_is_searchable() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let corpus = write_corpus(
        dir.path(),
        &[("a", "<html><head><title>orchard</title></head><body></body></html>"), ("b", "<html><body>apple</body></html>")],
    );
    let index = IndexBuilder::new(&stop).build(&corpus);
    assert_eq!(index.doc_counts["a"], 1);
    assert!((index.tfidf["orchard"]["a"].tfidf - 2f64.log10()).abs() < 1e-12);
    assert_eq!(index.tfidf["orchard"]["a"].weight, 3);

    let engine = QueryEngine::new(&index, &stop);
    assert_eq!(engine.query("orchard").unwrap(), vec!["a"]);
}

#[test]
fn blank_page_posts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let corpus = write_corpus(dir.path(), &[("a", "<html><head><title>the</title></head></html>"), ("b", "<body>apple</body>")]);
    let index = IndexBuilder::new(&stop).build(&corpus);
    assert_eq!(index.num_docs(), 2);
    assert_eq!(index.doc_counts["a"], 0);
    assert!(index.postings.values().all(|docs| !docs.contains_key("a")));
    assert!((index.idf["apple"] - 2f64.log10()).abs() < 1e-12);
}

#[test]
fn unknown_term_is_not_an_empty_success() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let index = IndexBuilder::new(&stop).build(&fruit_corpus(dir.path()));
    let engine = QueryEngine::new(&index, &stop);
    assert_eq!(engine.query("apple durian"), Err(QueryError::UnknownTerm("durian".into())));
    assert_eq!(engine.query("").unwrap(), Vec::<String>::new());
}

#[test]
fn ubiquitous_terms_carry_no_weight() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let corpus = write_corpus(
        dir.path(),
        &[("x", "<body>page rust</body>"), ("y", "<body>page go</body>"), ("z", "<body>page zig zig</body>")],
    );
    let index = IndexBuilder::new(&stop).build(&corpus);
    assert_eq!(index.idf["page"], 0.0);
    assert!(index.tfidf["page"].values().all(|e| e.tfidf == 0.0));
    assert!((index.idf["rust"] - 3f64.log10()).abs() < 1e-12);

    let ranked = QueryEngine::new(&index, &stop).rank("page").unwrap();
    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().all(|r| r.score == 0.0));
    let ids: Vec<_> = ranked.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y", "z"]);
}

#[test]
fn title_outranks_and_emphasis_breaks_score_ties() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let corpus = write_corpus(
        dir.path(),
        &[
            ("1", "<body>kernel kernel boot</body>"),
            ("2", "<body><b>kernel</b> boot boot</body>"),
            ("3", "<head><title>kernel</title></head><body><header>linux</header></body>"),
            ("4", "<body>scheduler</body>"),
        ],
    );
    let index = IndexBuilder::new(&stop).build(&corpus);
    assert_eq!(index.tfidf["kernel"]["3"].weight, 3);
    assert_eq!(index.tfidf["kernel"]["2"].weight, 1);
    assert_eq!(index.tfidf["kernel"]["1"].weight, 0);
    assert_eq!(index.tfidf["linux"]["3"].weight, 0);

    let ranked = QueryEngine::new(&index, &stop).rank("kernel").unwrap();
    let ids: Vec<_> = ranked.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
    assert_eq!(ranked[1].score, ranked[2].score);
    assert_eq!(ranked[1].weight, 1);
}

#[test]
fn recompute_reproduces_build_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Stopwords::english();
    let built = IndexBuilder::new(&stop).build(&fruit_corpus(dir.path()));
    let mut reloaded = built.clone();
    reloaded.idf.clear();
    reloaded.tfidf.clear();
    reloaded.recompute_statistics();
    assert_eq!(reloaded, built);
}
