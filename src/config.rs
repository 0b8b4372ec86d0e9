use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Top-level configuration for the analyzer, its collaborators and the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Search API settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Page fetching settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Host substrings never chosen as the competitor
    #[serde(default = "default_skip_domains")]
    pub skip_domains: Vec<String>,

    /// Scoring thresholds and weights
    #[serde(default)]
    pub scoring: ScoringRules,

    /// Term-gap analysis limits
    #[serde(default)]
    pub terms: TermConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upper bound on a whole analysis, search and fetches included
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Search API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Custom Search JSON API endpoint
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Number of results requested (the API caps this at 10)
    #[serde(default = "default_search_results")]
    pub results: usize,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

/// How pages are retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Plain HTTP GET
    #[default]
    Http,
    /// A WebDriver-controlled browser, for pages rendered by JavaScript
    WebDriver,
}

/// Page fetching settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub backend: FetchBackend,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// HTML beyond this many bytes is discarded before extraction
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

/// Thresholds and weights of the on-page rubric.
///
/// The defaults are the canonical rubric; changing them changes what a score
/// means, so overrides should be deliberate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default = "default_title_min_len")]
    pub title_min_len: usize,

    #[serde(default = "default_title_max_len")]
    pub title_max_len: usize,

    #[serde(default = "default_meta_min_len")]
    pub meta_min_len: usize,

    #[serde(default = "default_meta_max_len")]
    pub meta_max_len: usize,

    /// Lowest acceptable keyword density, inclusive
    #[serde(default = "default_density_min")]
    pub density_min: f64,

    /// Highest acceptable keyword density, inclusive
    #[serde(default = "default_density_max")]
    pub density_max: f64,

    /// Word count at which the length component earns full credit
    #[serde(default = "default_words_target")]
    pub words_target: usize,

    /// Share of the title/meta weight earned on length alone
    #[serde(default = "default_partial_credit")]
    pub partial_credit: f64,

    #[serde(default)]
    pub weights: RubricWeights,
}

/// Points per rubric component.
///
/// The default weights add up to 90, so a page passing every check scores 90.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricWeights {
    pub title: u32,
    pub meta: u32,
    pub url: u32,
    pub h1: u32,
    pub density: u32,
    pub words: u32,
    pub schema: u32,
    pub image_alts: u32,
}

/// Term-gap analysis limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermConfig {
    /// How many of the competitor's most frequent terms are considered
    #[serde(default = "default_competitor_terms")]
    pub competitor_terms: usize,

    /// How many of the target's most frequent terms count as "covered"
    #[serde(default = "default_target_terms")]
    pub target_terms: usize,

    /// Maximum number of gap terms reported
    #[serde(default = "default_gap_limit")]
    pub gap_limit: usize,

    /// Shortest token (in characters) treated as a term
    #[serde(default = "default_min_term_len")]
    pub min_term_len: usize,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Secrets for the Custom Search JSON API
#[derive(Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

impl SearchCredentials {
    /// Reads `GOOGLE_API_KEY` (or `API_KEY`) and `CSE_ID` (or `GOOGLE_CSE_ID`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SearchCredentials::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let api_key = first_set(&["GOOGLE_API_KEY", "API_KEY"])
            .ok_or(ConfigError::MissingSecret("GOOGLE_API_KEY"))?;
        let engine_id = first_set(&["CSE_ID", "GOOGLE_CSE_ID"])
            .ok_or(ConfigError::MissingSecret("CSE_ID"))?;

        Ok(Self { api_key, engine_id })
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            })?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SKIP_DOMAINS`, `WEBDRIVER_URL`, `HOST` and `PORT` overrides
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`AnalyzerConfig::apply_env`] with a custom variable source
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup("SKIP_DOMAINS") {
            let domains = parse_skip_domains(&list);
            if !domains.is_empty() {
                self.skip_domains = domains;
            }
        }

        // Override the WebDriver URL with an environment variable if provided
        if let Some(webdriver_url) = lookup("WEBDRIVER_URL") {
            if !webdriver_url.trim().is_empty() {
                self.fetch.webdriver_url = webdriver_url.trim().to_string();
            }
        }

        if let Some(host) = lookup("HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {}", port)))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Rejects settings no analysis could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.results == 0 {
            return Err(ConfigError::Invalid("search.results must be at least 1".into()));
        }
        if self.fetch.max_html_bytes == 0 {
            return Err(ConfigError::Invalid("fetch.max_html_bytes must be positive".into()));
        }
        if self.scoring.density_min > self.scoring.density_max {
            return Err(ConfigError::Invalid(
                "scoring.density_min exceeds scoring.density_max".into(),
            ));
        }
        if self.scoring.words_target == 0 {
            return Err(ConfigError::Invalid("scoring.words_target must be positive".into()));
        }
        Ok(())
    }
}

/// Splits a comma-separated domain list into lower-cased, non-empty entries
pub fn parse_skip_domains(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            skip_domains: default_skip_domains(),
            scoring: ScoringRules::default(),
            terms: TermConfig::default(),
            server: ServerConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            results: default_search_results(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            backend: FetchBackend::default(),
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout_secs(),
            max_html_bytes: default_max_html_bytes(),
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            title_min_len: default_title_min_len(),
            title_max_len: default_title_max_len(),
            meta_min_len: default_meta_min_len(),
            meta_max_len: default_meta_max_len(),
            density_min: default_density_min(),
            density_max: default_density_max(),
            words_target: default_words_target(),
            partial_credit: default_partial_credit(),
            weights: RubricWeights::default(),
        }
    }
}

impl Default for RubricWeights {
    fn default() -> Self {
        Self {
            title: 15,
            meta: 12,
            url: 8,
            h1: 10,
            density: 15,
            words: 20,
            schema: 5,
            image_alts: 5,
        }
    }
}

impl RubricWeights {
    pub fn total(&self) -> u32 {
        self.title
            + self.meta
            + self.url
            + self.h1
            + self.density
            + self.words
            + self.schema
            + self.image_alts
    }
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            competitor_terms: default_competitor_terms(),
            target_terms: default_target_terms(),
            gap_limit: default_gap_limit(),
            min_term_len: default_min_term_len(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Marketplaces and video platforms are not organic competitors
fn default_skip_domains() -> Vec<String> {
    ["amazon.", "amzn.", "flipkart.com", "youtube.com"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_search_results() -> usize {
    10
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; SERPAnalyzer/1.0)".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

/// 2 MiB
fn default_max_html_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_title_min_len() -> usize {
    40
}

fn default_title_max_len() -> usize {
    70
}

fn default_meta_min_len() -> usize {
    110
}

fn default_meta_max_len() -> usize {
    160
}

fn default_density_min() -> f64 {
    0.6
}

fn default_density_max() -> f64 {
    2.5
}

fn default_words_target() -> usize {
    600
}

fn default_partial_credit() -> f64 {
    0.6
}

fn default_competitor_terms() -> usize {
    50
}

fn default_target_terms() -> usize {
    200
}

fn default_gap_limit() -> usize {
    30
}

fn default_min_term_len() -> usize {
    3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}
