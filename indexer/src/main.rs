use anyhow::Result;
use clap::{Parser, Subcommand};
use quarry_core::persist::{load_for_recompute, load_query_snapshot, save_index, save_statistics, IndexPaths};
use quarry_core::{Corpus, IndexBuilder, IndexConfig, QueryEngine, QueryError, Stopwords};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quarry-indexer")]
#[command(about = "Build, recompute and query a TF-IDF index over an HTML corpus", long_about = None)]
struct Cli {
    /// JSON config file (selectors, stopwords, parallelism)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a corpus directory (with bookkeeping.json) and write a fresh index
    Build {
        /// Corpus directory
        #[arg(long)]
        corpus: PathBuf,
        /// Output index directory
        #[arg(long, default_value = "./index")]
        output: PathBuf,
        /// Scan documents in parallel
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Index at most this many documents
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Recompute idf and tf-idf from stored postings without rescanning
    Recompute {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
    },
    /// Run a query and print ranked documents
    Search {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Maximum results to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => IndexConfig::load(path)?,
        None => IndexConfig::default(),
    };
    let stopwords = Stopwords::from_config(&cfg.tokenizer);

    match cli.command {
        Commands::Build { corpus, output, parallel, limit } => {
            cfg.parallel |= parallel;
            if limit.is_some() {
                cfg.limit = limit;
            }
            build_index(&cfg, &stopwords, &corpus, &output)
        }
        Commands::Recompute { index } => recompute(&index),
        Commands::Search { index, limit, query } => search(&stopwords, &index, &query, limit),
    }
}

fn build_index(cfg: &IndexConfig, stopwords: &Stopwords, corpus: &Path, output: &Path) -> Result<()> {
    let corpus = Corpus::open(corpus)?;
    let builder = IndexBuilder::from_config(cfg, stopwords)?;
    let index = builder.build(&corpus);
    save_index(&IndexPaths::new(output), &index)?;
    tracing::info!(output = %output.display(), num_docs = index.num_docs(), num_terms = index.num_terms(), "index build complete");
    Ok(())
}

fn recompute(dir: &Path) -> Result<()> {
    let paths = IndexPaths::new(dir);
    let mut index = load_for_recompute(&paths)?;
    index.recompute_statistics();
    save_statistics(&paths, &index)?;
    tracing::info!(index = %dir.display(), "statistics recomputed");
    Ok(())
}

fn search(stopwords: &Stopwords, dir: &Path, query: &str, limit: usize) -> Result<()> {
    let index = load_query_snapshot(&IndexPaths::new(dir));
    let engine = QueryEngine::new(&index, stopwords);
    match engine.rank(query) {
        Ok(ranked) => {
            println!("{} results for \"{}\"", ranked.len(), query);
            for (i, hit) in ranked.iter().take(limit).enumerate() {
                let url = index.display_url(&hit.doc_id).unwrap_or("");
                println!("{:>3}. {:<12} {:.4} w={} {}", i + 1, hit.doc_id, hit.score, hit.weight, url);
            }
        }
        Err(QueryError::UnknownTerm(term)) => {
            println!("no results for \"{}\": {} is not in the index", query, term);
        }
    }
    Ok(())
}
