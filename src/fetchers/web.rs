use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use tokio::time::{Duration, timeout};

use super::{FetchOutcome, PageFetcher};
use crate::config::FetchConfig;
use crate::utils::truncate_at_boundary;

/// Servers tried when the configured WebDriver URL refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Fetches pages through a WebDriver browser session so client-side
/// rendered content ends up in the HTML.
///
/// Each fetch opens its own session and closes it afterwards, so the two
/// pages of an analysis can load in parallel.
pub struct WebDriverFetcher {
    webdriver_url: String,
    fallback_urls: Vec<String>,
    timeout_secs: u64,
    max_html_bytes: usize,
}

impl WebDriverFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            fallback_urls: FALLBACK_WEBDRIVER_URLS
                .iter()
                .map(|url| url.to_string())
                .collect(),
            timeout_secs: config.timeout_secs,
            max_html_bytes: config.max_html_bytes,
        }
    }

    /// Replace the list of WebDriver URLs tried after the configured one
    pub fn with_fallback_urls(mut self, urls: Vec<String>) -> Self {
        self.fallback_urls = urls;
        self
    }

    /// Connects to the configured WebDriver, then to each fallback in turn
    async fn connect(&self) -> Option<Client> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Some(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in &self.fallback_urls {
            if *url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            // Fallback failures are not logged individually
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Some(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        None
    }

    async fn load(&self, client: &Client, url: &str) -> FetchOutcome {
        if let Err(e) = client.goto(url).await {
            return handle_navigation_error(e, "load", url);
        }

        match client.source().await {
            Ok(mut html) => {
                truncate_at_boundary(&mut html, self.max_html_bytes);
                ::log::info!("Rendered {} ({} bytes)", url, html.len());
                FetchOutcome::Fetched(html)
            }
            Err(e) => handle_navigation_error(e, "read source of", url),
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let Some(client) = self.connect().await else {
            return FetchOutcome::Failed("no WebDriver server reachable".to_string());
        };

        let outcome = match timeout(Duration::from_secs(self.timeout_secs), self.load(&client, url))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                ::log::warn!("Timeout rendering: {}", url);
                FetchOutcome::Failed(format!("timed out after {} seconds", self.timeout_secs))
            }
        };

        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        outcome
    }
}

/// Turns a WebDriver command error into a failed outcome
fn handle_navigation_error(
    error: fantoccini::error::CmdError,
    action: &str,
    url: &str,
) -> FetchOutcome {
    let message = error.to_string();
    if message.contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session trying to {} {}", action, url);
    } else {
        ::log::warn!("Failed to {} {}: {}", action, url, message);
    }
    FetchOutcome::Failed(format!("failed to {} page: {}", action, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_config() {
        let config = FetchConfig {
            webdriver_url: "http://chrome:4444".into(),
            timeout_secs: 7,
            ..FetchConfig::default()
        };
        let fetcher = WebDriverFetcher::new(&config);
        assert_eq!(fetcher.webdriver_url, "http://chrome:4444");
        assert_eq!(fetcher.timeout_secs, 7);
        assert_eq!(fetcher.fallback_urls.len(), FALLBACK_WEBDRIVER_URLS.len());
    }

    #[tokio::test]
    async fn test_unreachable_webdriver_is_failure() {
        let config = FetchConfig {
            webdriver_url: "http://127.0.0.1:1".into(),
            ..FetchConfig::default()
        };
        let fetcher = WebDriverFetcher::new(&config).with_fallback_urls(Vec::new());

        let outcome = fetcher.fetch("https://example.com/").await;
        assert_eq!(
            outcome,
            FetchOutcome::Failed("no WebDriver server reachable".into())
        );
    }
}
