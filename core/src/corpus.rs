use crate::index::{DocKey, DocList};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "bookkeeping.json";

/// A directory of raw documents plus the manifest mapping each identifier to
/// its display URL.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    manifest: DocList,
}

impl Corpus {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let path = root.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).with_context(|| format!("reading manifest {}", path.display()))?;
        let manifest: DocList =
            serde_json::from_str(&text).with_context(|| format!("parsing manifest {}", path.display()))?;
        tracing::info!(root = %root.display(), entries = manifest.len(), "loaded corpus manifest");
        Ok(Self { root, manifest })
    }

    pub fn from_manifest<P: AsRef<Path>>(root: P, manifest: DocList) -> Self {
        Self { root: root.as_ref().to_path_buf(), manifest }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn manifest(&self) -> &DocList { &self.manifest }

    pub fn len(&self) -> usize { self.manifest.len() }

    pub fn is_empty(&self) -> bool { self.manifest.is_empty() }

    /// Manifest entries in identifier order, at most `limit` of them.
    pub fn entries(&self, limit: Option<usize>) -> Vec<(&DocKey, &String)> {
        self.manifest.iter().take(limit.unwrap_or(usize::MAX)).collect()
    }

    pub fn path_of(&self, key: &str) -> PathBuf { self.root.join(key) }

    pub fn read(&self, key: &str) -> Result<String> {
        let path = self.path_of(key);
        let bytes = fs::read(&path).with_context(|| format!("reading document {}", path.display()))?;
        String::from_utf8(bytes).with_context(|| format!("document {} is not valid UTF-8", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_manifest_and_reads_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("0")).unwrap();
        fs::write(dir.path().join("0/1"), "<p>hello</p>").unwrap();
        fs::write(dir.path().join("0/0"), b"\xff\xfe").unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"0/1": "example.com/b", "0/0": "example.com/a", "0/2": "example.com/c"}"#,
        )
        .unwrap();

        let corpus = Corpus::open(dir.path()).unwrap();
        let keys: Vec<_> = corpus.entries(None).into_iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["0/0", "0/1", "0/2"]);
        assert_eq!(corpus.entries(Some(1)).len(), 1);
        assert_eq!(corpus.read("0/1").unwrap(), "<p>hello</p>");
        assert!(corpus.read("0/0").is_err());
        assert!(corpus.read("0/2").is_err());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Corpus::open(dir.path()).is_err());
    }
}
