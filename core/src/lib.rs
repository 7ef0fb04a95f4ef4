pub mod builder;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod scanner;
pub mod stats;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use config::IndexConfig;
pub use corpus::Corpus;
pub use error::{ConfigError, QueryError};
pub use index::{DocKey, InvertedIndex, Posting, PostingTable, ScoredEntry, Section};
pub use query::{QueryEngine, RankedDoc};
pub use tokenizer::Stopwords;
