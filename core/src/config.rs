use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a build run; every field falls back to its default when
/// absent from the JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub scan: ScanConfig,
    pub tokenizer: TokenizerConfig,
    /// Scan documents on the rayon pool instead of one at a time.
    pub parallel: bool,
    /// Index at most this many manifest entries.
    pub limit: Option<usize>,
}

impl IndexConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let cfg = serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }
}

/// CSS selectors for the structural passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub title: String,
    pub header: String,
    pub body: String,
    pub emphasis: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            header: "header".to_string(),
            body: "body".to_string(),
            emphasis: "b, strong".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub default_stopwords: bool,
    pub extra_stopwords: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { default_stopwords: true, extra_stopwords: Vec::new() }
    }
}
