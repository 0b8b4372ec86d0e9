pub mod http;
pub mod web;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{FetchBackend, FetchConfig};
use crate::error::ConfigError;

pub use http::HttpFetcher;
pub use web::WebDriverFetcher;

/// Result of fetching one page. A failure carries a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(String),
    Failed(String),
}

impl FetchOutcome {
    pub fn html(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(html) => Some(html),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Failed(reason) => Some(reason),
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }
}

// Base trait for anything that can retrieve a page's HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`; never errors, failures are reported as [`FetchOutcome::Failed`]
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Creates the fetcher selected by `config.backend`
pub fn build_fetcher(config: &FetchConfig) -> Result<Arc<dyn PageFetcher>, ConfigError> {
    match config.backend {
        FetchBackend::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        FetchBackend::WebDriver => {
            ::log::info!("Using WebDriver fetcher at {}", config.webdriver_url);
            Ok(Arc::new(WebDriverFetcher::new(config)))
        }
    }
}
