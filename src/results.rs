use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One organic result returned by the search API, in rank order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// 1-based rank as returned by the search API
    pub position: usize,

    pub title: String,

    /// Result URL
    pub link: String,

    pub snippet: String,

    /// Host shown by the search engine (e.g. `www.example.com`)
    pub display_domain: String,
}

/// An `<img>` tag's source and alt text (missing attributes are empty)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// Anchor counts for a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounts {
    /// Fragment links and links resolving to the page's own host
    pub internal: usize,

    /// Links resolving to any other host
    pub external: usize,

    /// Every `<a>` tag, classified or not
    pub total: usize,
}

/// Normalized on-page signals extracted from one HTML document.
///
/// A page that was never fetched is represented by `PageSignals::default()`,
/// which has every text field empty and every count at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    /// URL the HTML was fetched from (empty when unknown)
    pub source_url: String,

    pub title: String,

    pub meta_description: String,

    /// First `<h1>` only, inner tags stripped
    pub h1: String,

    pub h2_list: Vec<String>,

    pub images: Vec<Image>,

    /// Whether a JSON-LD script block is present
    pub has_structured_data: bool,

    /// Whitespace-collapsed body text with scripts and styles removed
    pub body_text: String,

    pub first_100_words: String,

    /// Number of whitespace-delimited tokens in `body_text`
    pub word_count: usize,

    pub link_counts: LinkCounts,
}

impl PageSignals {
    /// Returns true when the signals carry no page content at all
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.meta_description.is_empty()
            && self.h1.is_empty()
            && self.body_text.is_empty()
    }
}

/// Occurrences and density of a phrase within a text
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordStats {
    pub occurrence_count: usize,

    /// `occurrence_count * 100 / max(total_words, 1)`
    pub density_percent: f64,

    pub total_words: usize,
}

/// Outcome of every on-page check for one page plus its rubric score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChecks {
    pub title_length_ok: bool,
    pub title_includes_keyword: bool,
    pub meta_length_ok: bool,
    pub meta_includes_keyword: bool,
    pub h1_present: bool,
    pub h1_includes_keyword: bool,
    pub url_includes_keyword: bool,
    pub density_ok: bool,
    pub image_alts_ok: bool,
    pub has_structured_data: bool,
    pub density_percent: f64,
    pub density_count: usize,
    pub word_count: usize,

    /// Weighted rubric score, always within 0..=100
    pub score: u8,
}

/// Everything the report carries about a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub url: Option<String>,
    pub parsed: PageSignals,
    pub checks: PageChecks,
    pub score: u8,
}

impl PageReport {
    pub fn new(url: Option<String>, parsed: PageSignals, checks: PageChecks) -> Self {
        Self {
            url,
            score: checks.score,
            parsed,
            checks,
        }
    }
}

/// Diagnostics about how the two fetches went
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNotes {
    pub competitor_fetched: bool,
    pub target_fetched: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,

    /// Number of search results the competitor was chosen from
    pub results_considered: usize,

    pub tip: String,
}

/// Top-level output of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub keyword: String,
    pub serp: Vec<SearchResult>,
    pub chosen_competitor: String,
    pub competitor: PageReport,
    pub target: PageReport,
    pub gap_terms: Vec<String>,
    pub suggestions: Vec<String>,
    pub notes: FetchNotes,
    pub timestamp: DateTime<Utc>,
}
