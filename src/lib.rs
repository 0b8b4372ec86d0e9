pub mod checks;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod keywords;
pub mod parsers;
pub mod results;
pub mod search;
pub mod server;
pub mod suggestions;
pub mod terms;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AnalyzerConfig, SearchCredentials};
pub use error::{AnalyzeError, ConfigError};
pub use results::AnalysisReport;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use config::FetchBackend;
use fetchers::{FetchOutcome, PageFetcher};
use filter::CompetitorFilter;
use results::{FetchNotes, PageReport, PageSignals, SearchResult};
use search::{GoogleSearcher, WebSearcher};
use suggestions::TargetPage;

const HTTP_TIP: &str = "Only the top 10 results are considered. Pages are fetched without \
running JavaScript; switch fetch.backend to \"webdriver\" for client-rendered sites.";
const WEBDRIVER_TIP: &str = "Only the top 10 results are considered.";

/// Runs a full keyword analysis: search, competitor selection, fetching,
/// extraction, scoring and term-gap comparison.
pub struct Analyzer {
    config: AnalyzerConfig,
    filter: CompetitorFilter,
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Analyzer {
    /// Create an analyzer from explicit search and fetch backends
    pub fn new(
        config: AnalyzerConfig,
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            filter: CompetitorFilter::new(&config.skip_domains),
            config,
            searcher,
            fetcher,
        }
    }

    /// Create an analyzer backed by Google Custom Search and the configured fetcher
    pub fn from_config(
        config: AnalyzerConfig,
        credentials: SearchCredentials,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let searcher = Arc::new(GoogleSearcher::new(&config.search, credentials)?);
        let fetcher = fetchers::build_fetcher(&config.fetch)?;
        Ok(Self::new(config, searcher, fetcher))
    }

    /// Replace the search backend
    pub fn with_searcher(mut self, searcher: Arc<dyn WebSearcher>) -> Self {
        self.searcher = searcher;
        self
    }

    /// Replace the page fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the competitor skip list
    pub fn with_skip_domains<S: AsRef<str>>(mut self, skip_domains: &[S]) -> Self {
        self.filter = CompetitorFilter::new(skip_domains);
        self.config.skip_domains = self.filter.skip_domains().to_vec();
        self
    }

    /// Set the overall time limit for [`Analyzer::analyze_with_timeout`]
    pub fn with_request_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.request_timeout_secs = timeout_seconds;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// [`Analyzer::analyze`] bounded by `request_timeout_secs`
    pub async fn analyze_with_timeout(
        &self,
        keyword: &str,
        target: Option<&str>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let secs = self.config.request_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(secs), self.analyze(keyword, target)).await
        {
            Ok(result) => result,
            Err(_) => {
                ::log::error!("Analysis of {:?} timed out after {}s", keyword, secs);
                Err(AnalyzeError::Timeout(secs))
            }
        }
    }

    /// Analyze `target` against the best competitor ranking for `keyword`.
    ///
    /// Only a missing keyword, an invalid target URL or a failing search
    /// produce an error. Pages that cannot be fetched are scored as empty
    /// and explained in the report notes.
    pub async fn analyze(
        &self,
        keyword: &str,
        target: Option<&str>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AnalyzeError::Input("Missing keyword".to_string()));
        }

        let target = target.map(str::trim).filter(|t| !t.is_empty());
        if let Some(url) = target {
            if !utils::is_web_url(url) {
                return Err(AnalyzeError::Input(format!(
                    "Invalid target URL (must be absolute http or https): {}",
                    url
                )));
            }
        }

        ::log::info!("Analyzing {:?} for target {:?}", keyword, target);

        let serp = self.searcher.search(keyword).await?;
        let chosen = self.filter.select(&serp, target);

        let competitor_fetch = async {
            if chosen.is_empty() {
                None
            } else {
                Some(self.fetcher.fetch(&chosen).await)
            }
        };
        let target_fetch = async {
            match target {
                Some(url) => Some(self.fetcher.fetch(url).await),
                None => None,
            }
        };
        let (competitor_outcome, target_outcome) = tokio::join!(competitor_fetch, target_fetch);

        let rules = &self.config.scoring;
        let competitor = page_report(
            (!chosen.is_empty()).then(|| chosen.clone()),
            competitor_outcome.as_ref(),
            keyword,
            rules,
        );
        let target_report = page_report(
            target.map(str::to_string),
            target_outcome.as_ref(),
            keyword,
            rules,
        );

        let competitor_text = competitor_text(&competitor, &serp, &chosen);
        let gap_terms = terms::gap_terms(
            &competitor_text,
            &target_report.parsed.body_text,
            &self.config.terms,
        );

        let target_page = match &target_outcome {
            None => TargetPage::NotProvided,
            Some(FetchOutcome::Failed(_)) => TargetPage::Unreachable,
            Some(FetchOutcome::Fetched(_)) => TargetPage::Fetched(&target_report),
        };
        let suggestions = suggestions::build(target_page, &competitor, &gap_terms, rules);

        let notes = FetchNotes {
            competitor_fetched: competitor_outcome
                .as_ref()
                .is_some_and(FetchOutcome::is_fetched),
            target_fetched: target_outcome.as_ref().is_some_and(FetchOutcome::is_fetched),
            competitor_error: match &competitor_outcome {
                None => Some("no search results to compare against".to_string()),
                Some(outcome) => outcome.error().map(str::to_string),
            },
            target_error: target_outcome
                .as_ref()
                .and_then(FetchOutcome::error)
                .map(str::to_string),
            results_considered: serp.len(),
            tip: match self.config.fetch.backend {
                FetchBackend::Http => HTTP_TIP.to_string(),
                FetchBackend::WebDriver => WEBDRIVER_TIP.to_string(),
            },
        };

        ::log::info!(
            "Scored {:?}: competitor {} / target {} ({} gap terms)",
            keyword,
            competitor.score,
            target_report.score,
            gap_terms.len()
        );

        Ok(AnalysisReport {
            keyword: keyword.to_string(),
            serp,
            chosen_competitor: chosen,
            competitor,
            target: target_report,
            gap_terms,
            suggestions,
            notes,
            timestamp: Utc::now(),
        })
    }
}

/// Extracts and scores one page; anything but fetched HTML scores as an empty page
fn page_report(
    url: Option<String>,
    outcome: Option<&FetchOutcome>,
    keyword: &str,
    rules: &config::ScoringRules,
) -> PageReport {
    match (url.as_deref(), outcome.and_then(FetchOutcome::html)) {
        (Some(page_url), Some(html)) => {
            let parsed = parsers::extract(html, page_url);
            if parsed.is_empty() {
                ::log::warn!("No content extracted from {}", page_url);
            }
            let checks = checks::evaluate(&parsed, keyword, page_url, rules);
            PageReport::new(url, parsed, checks)
        }
        _ => {
            let parsed = PageSignals::default();
            let checks = checks::evaluate(&parsed, keyword, "", rules);
            PageReport::new(url, parsed, checks)
        }
    }
}

/// Competitor body text, or its search title and snippet when the page was not fetched
fn competitor_text(competitor: &PageReport, serp: &[SearchResult], chosen: &str) -> String {
    if !competitor.parsed.body_text.is_empty() {
        return competitor.parsed.body_text.clone();
    }
    serp.iter()
        .find(|r| r.link == chosen)
        .map(|r| format!("{} {}", r.title, r.snippet))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const KEYWORD: &str = "best running shoes";

    const COMPETITOR_HTML: &str = r#"<html><head>
        <title>Best Running Shoes 2024: Tested and Reviewed by Experts</title>
        <meta name="description" content="We tested the best running shoes for cushioning, stability and speed.">
        <script type="application/ld+json">{"@type":"Article"}</script>
        </head><body>
        <h1>Best Running Shoes</h1>
        <p>Cushioning matters. Cushioning and stability decide comfort for marathon training.</p>
        <a href="/reviews">Reviews</a><a href="https://brand.com">Brand</a>
        </body></html>"#;

    struct FakeSearcher {
        results: Vec<SearchResult>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSearcher {
        fn new(links: &[&str]) -> Self {
            let results = links
                .iter()
                .enumerate()
                .map(|(i, link)| SearchResult {
                    position: i + 1,
                    title: format!("Result {}", i + 1),
                    link: link.to_string(),
                    snippet: format!("snippet about cushioning {}", i + 1),
                    display_domain: utils::host_of(link).unwrap_or_default(),
                })
                .collect();
            Self {
                results,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WebSearcher for FakeSearcher {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AnalyzeError> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(self.results.clone())
        }
    }

    struct FailingSearcher;

    #[async_trait]
    impl WebSearcher for FailingSearcher {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AnalyzeError> {
            Err(AnalyzeError::Upstream {
                status: 429,
                body: "Quota exceeded".into(),
            })
        }
    }

    struct SlowSearcher;

    #[async_trait]
    impl WebSearcher for SlowSearcher {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AnalyzeError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }
    }

    /// Serves canned pages; anything else fails like an unreachable host
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    impl FakeFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> FetchOutcome {
            match self.pages.get(url) {
                Some(html) => FetchOutcome::Fetched(html.clone()),
                None => FetchOutcome::Failed("connection refused".into()),
            }
        }
    }

    fn analyzer(searcher: impl WebSearcher + 'static, fetcher: FakeFetcher) -> Analyzer {
        Analyzer::new(
            AnalyzerConfig::default(),
            Arc::new(searcher),
            Arc::new(fetcher),
        )
    }

    fn floor_score() -> u8 {
        checks::evaluate(
            &PageSignals::default(),
            KEYWORD,
            "",
            &AnalyzerConfig::default().scoring,
        )
        .score
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        let searcher = FakeSearcher::new(&[
            "https://www.amazon.com/s?k=running+shoes",
            "https://www.runnersworld.com/best-running-shoes",
        ]);
        let fetcher = FakeFetcher::default()
            .with_page("https://www.runnersworld.com/best-running-shoes", COMPETITOR_HTML);

        let report = analyzer(searcher, fetcher)
            .analyze(KEYWORD, Some("https://unreachable.example/shoes"))
            .await
            .unwrap();

        assert_eq!(
            report.chosen_competitor,
            "https://www.runnersworld.com/best-running-shoes"
        );
        assert_eq!(report.target.score, floor_score());
        assert_eq!(report.target.score, 5);
        assert_eq!(
            report.target.url.as_deref(),
            Some("https://unreachable.example/shoes")
        );
        assert_eq!(report.target.parsed, PageSignals::default());
        assert_eq!(report.suggestions[0], suggestions::TARGET_NOT_FETCHED);

        assert!(report.notes.competitor_fetched);
        assert!(!report.notes.target_fetched);
        assert_eq!(report.notes.target_error.as_deref(), Some("connection refused"));
        assert_eq!(report.notes.results_considered, 2);

        assert!(report.competitor.score > report.target.score);
        assert!(report.competitor.checks.title_includes_keyword);
        assert!(report.gap_terms.contains(&"cushioning".to_string()));
    }

    #[tokio::test]
    async fn test_fetched_target_gets_page_suggestions() {
        let searcher = FakeSearcher::new(&["https://www.runnersworld.com/best-running-shoes"]);
        let fetcher = FakeFetcher::default()
            .with_page("https://www.runnersworld.com/best-running-shoes", COMPETITOR_HTML)
            .with_page(
                "https://shop.example.com/shoes",
                "<html><head><title>Shoes</title></head><body><p>Buy shoes for marathon runs.</p></body></html>",
            );

        let report = analyzer(searcher, fetcher)
            .analyze(KEYWORD, Some("https://shop.example.com/shoes"))
            .await
            .unwrap();

        assert!(report.notes.target_fetched);
        assert_eq!(report.target.parsed.title, "Shoes");
        assert!(!report.target.checks.title_includes_keyword);
        assert!(
            report
                .suggestions
                .iter()
                .any(|s| s.contains("title tag"))
        );
        assert!(!report.gap_terms.contains(&"marathon".to_string()));
        assert!(report.gap_terms.contains(&"stability".to_string()));
    }

    #[tokio::test]
    async fn test_without_target() {
        let searcher = FakeSearcher::new(&["https://www.runnersworld.com/best-running-shoes"]);
        let fetcher = FakeFetcher::default()
            .with_page("https://www.runnersworld.com/best-running-shoes", COMPETITOR_HTML);

        let report = analyzer(searcher, fetcher)
            .analyze(KEYWORD, None)
            .await
            .unwrap();

        assert_eq!(report.target.url, None);
        assert!(!report.notes.target_fetched);
        assert_eq!(report.notes.target_error, None);
        assert_eq!(report.suggestions[0], suggestions::NO_TARGET_NOTICE);
    }

    #[tokio::test]
    async fn test_competitor_text_falls_back_to_snippet() {
        let searcher = FakeSearcher::new(&["https://down.example/review"]);

        let report = analyzer(searcher, FakeFetcher::default())
            .analyze(KEYWORD, None)
            .await
            .unwrap();

        assert!(!report.notes.competitor_fetched);
        assert_eq!(report.notes.competitor_error.as_deref(), Some("connection refused"));
        assert_eq!(report.competitor.score, floor_score());
        assert_eq!(report.gap_terms, vec!["result", "snippet", "about", "cushioning"]);
    }

    #[tokio::test]
    async fn test_no_search_results() {
        let report = analyzer(FakeSearcher::new(&[]), FakeFetcher::default())
            .analyze(KEYWORD, None)
            .await
            .unwrap();

        assert_eq!(report.chosen_competitor, "");
        assert_eq!(report.competitor.url, None);
        assert!(report.serp.is_empty());
        assert!(report.gap_terms.is_empty());
        assert!(report.notes.competitor_error.is_some());
    }

    #[tokio::test]
    async fn test_input_validation() {
        let searcher = Arc::new(FakeSearcher::new(&["https://a.com/"]));
        let analyzer = Analyzer::new(
            AnalyzerConfig::default(),
            searcher.clone(),
            Arc::new(FakeFetcher::default()),
        );

        let err = analyzer.analyze("   ", None).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Input(_)));
        assert_eq!(err.status_code(), 400);

        let err = analyzer
            .analyze(KEYWORD, Some("ftp://example.com/file"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Input(_)));

        let err = analyzer.analyze(KEYWORD, Some("example.com")).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Input(_)));

        // Rejected before any search is made
        assert!(searcher.calls.lock().unwrap().is_empty());

        // Blank target is the same as no target
        let report = analyzer.analyze(" shoes ", Some("  ")).await.unwrap();
        assert_eq!(report.keyword, "shoes");
        assert_eq!(report.target.url, None);
        assert_eq!(searcher.calls.lock().unwrap().as_slice(), ["shoes"]);
    }

    #[tokio::test]
    async fn test_search_error_propagates() {
        let err = analyzer(FailingSearcher, FakeFetcher::default())
            .analyze(KEYWORD, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Upstream { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let analyzer = analyzer(SlowSearcher, FakeFetcher::default()).with_request_timeout(1);
        let err = analyzer.analyze_with_timeout(KEYWORD, None).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_backends_can_be_swapped() {
        let competitor = "https://www.runnersworld.com/best-running-shoes";
        let analyzer = analyzer(FakeSearcher::new(&[]), FakeFetcher::default());

        let report = analyzer.analyze(KEYWORD, None).await.unwrap();
        assert_eq!(report.chosen_competitor, "");

        let analyzer = analyzer
            .with_searcher(Arc::new(FakeSearcher::new(&[competitor])))
            .with_fetcher(Arc::new(
                FakeFetcher::default().with_page(competitor, COMPETITOR_HTML),
            ));

        let report = analyzer.analyze(KEYWORD, None).await.unwrap();
        assert_eq!(report.chosen_competitor, competitor);
        assert!(report.notes.competitor_fetched);
        assert!(report.competitor.checks.title_includes_keyword);
    }

    #[tokio::test]
    async fn test_custom_skip_domains() {
        let searcher = FakeSearcher::new(&[
            "https://www.amazon.com/shoes",
            "https://www.runnersworld.com/best-running-shoes",
        ]);
        let analyzer = analyzer(searcher, FakeFetcher::default())
            .with_skip_domains(&["runnersworld.com"]);

        let report = analyzer.analyze(KEYWORD, None).await.unwrap();
        assert_eq!(report.chosen_competitor, "https://www.amazon.com/shoes");
        assert_eq!(analyzer.config().skip_domains, vec!["runnersworld.com"]);
    }
}
