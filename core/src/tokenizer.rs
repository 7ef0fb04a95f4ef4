use crate::config::TokenizerConfig;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[a-z0-9]+").expect("valid regex");
    static ref ENGLISH: Vec<&'static str> = vec![
        "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","as","at",
        "be","because","been","before","being","below","between","both","but","by",
        "can","couldn",
        "d","did","didn","do","does","doesn","doing","don","down","during",
        "each","few","for","from","further",
        "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
        "i","if","in","into","is","isn","it","its","itself","just",
        "ll","m","ma","me","mightn","more","most","mustn","my","myself",
        "needn","no","nor","not","now","o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
        "re","s","same","shan","she","should","shouldn","so","some","such",
        "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
        "under","until","up","ve","very",
        "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","wouldn",
        "y","you","your","yours","yourself","yourselves"
    ];
}

/// Immutable stopword set, built once at startup and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// The fixed English stopword set.
    pub fn english() -> Self {
        Self { words: ENGLISH.iter().map(|w| w.to_string()).collect() }
    }

    pub fn from_config(cfg: &TokenizerConfig) -> Self {
        let mut stopwords = if cfg.default_stopwords { Self::english() } else { Self::default() };
        stopwords.words.extend(cfg.extra_stopwords.iter().map(|w| w.to_lowercase()));
        stopwords
    }

    pub fn contains(&self, token: &str) -> bool { self.words.contains(token) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}

/// Lowercase `text` and keep every maximal `[a-z0-9]+` run that is longer than
/// one character, not purely numeric and not a stopword. Order and duplicates
/// are preserved.
pub fn tokenize(text: &str, stopwords: &Stopwords) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() > 1 && !t.bytes().all(|b| b.is_ascii_digit()) && !stopwords.contains(t))
        .map(str::to_string)
        .collect()
}
