use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A query term has no idf entry; the whole query is rejected.
    #[error("term not indexed: {0}")]
    UnknownTerm(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {region} selector {selector:?}: {reason}")]
    InvalidSelector { region: &'static str, selector: String, reason: String },
}
