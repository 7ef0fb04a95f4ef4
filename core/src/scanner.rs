use crate::config::ScanConfig;
use crate::error::ConfigError;
use crate::index::{PostingTable, Section, Signal};
use crate::tokenizer::{tokenize, Stopwords};
use scraper::{Html, Selector};

/// Compiled selectors for the four structural passes.
#[derive(Debug, Clone)]
pub struct RegionSelectors {
    title: Selector,
    header: Selector,
    body: Selector,
    emphasis: Selector,
}

impl RegionSelectors {
    pub fn from_config(cfg: &ScanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: parse_selector("title", &cfg.title)?,
            header: parse_selector("header", &cfg.header)?,
            body: parse_selector("body", &cfg.body)?,
            emphasis: parse_selector("emphasis", &cfg.emphasis)?,
        })
    }
}

impl Default for RegionSelectors {
    fn default() -> Self {
        Self {
            title: Selector::parse("title").expect("valid selector"),
            header: Selector::parse("header").expect("valid selector"),
            body: Selector::parse("body").expect("valid selector"),
            emphasis: Selector::parse("b, strong").expect("valid selector"),
        }
    }
}

fn parse_selector(region: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        region,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Terms reported by each pass, in pass order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentScan {
    pub title: Vec<String>,
    pub header: Vec<String>,
    pub body: Vec<String>,
    pub emphasis: Vec<String>,
    /// Filtered terms in the whole page, title and head included.
    pub page_terms: u32,
}

impl DocumentScan {
    /// Passes in the order they are posted: title, header, body, emphasis.
    pub fn passes(&self) -> [(Signal, &[String]); 4] {
        [
            (Signal::Region(Section::Title), self.title.as_slice()),
            (Signal::Region(Section::Header), self.header.as_slice()),
            (Signal::Region(Section::Body), self.body.as_slice()),
            (Signal::Emphasis, self.emphasis.as_slice()),
        ]
    }

    /// Filtered term count of the document, the tf denominator. Pages with
    /// no body text fall back to the whole-page count.
    pub fn term_count(&self) -> u32 {
        if self.body.is_empty() { self.page_terms } else { self.body.len() as u32 }
    }
}

fn region_terms(html: &Html, selector: &Selector, stopwords: &Stopwords) -> Vec<String> {
    let mut terms = Vec::new();
    for element in html.select(selector) {
        let text = element.text().collect::<Vec<_>>().join(" ");
        terms.extend(tokenize(&text, stopwords));
    }
    terms
}

pub fn scan(content: &str, selectors: &RegionSelectors, stopwords: &Stopwords) -> DocumentScan {
    let html = Html::parse_document(content);
    DocumentScan {
        title: region_terms(&html, &selectors.title, stopwords),
        header: region_terms(&html, &selectors.header, stopwords),
        body: region_terms(&html, &selectors.body, stopwords),
        emphasis: region_terms(&html, &selectors.emphasis, stopwords),
        page_terms: tokenize(&html.root_element().text().collect::<Vec<_>>().join(" "), stopwords).len() as u32,
    }
}

/// Scan one document and post every pass into `table`. A document with no
/// filtered terms posts nothing and records a count of 0.
pub fn scan_into(table: &mut PostingTable, doc: &str, content: &str, selectors: &RegionSelectors, stopwords: &Stopwords) -> u32 {
    let scanned = scan(content, selectors, stopwords);
    let count = scanned.term_count();
    if count > 0 {
        for (signal, terms) in scanned.passes() {
            table.record_all(terms, doc, signal);
        }
    }
    table.set_term_count(doc, count);
    count
}
