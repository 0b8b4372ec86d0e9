use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use serde::Deserialize;

use crate::config::{SearchConfig, SearchCredentials};
use crate::error::{AnalyzeError, ConfigError};
use crate::parsers::text;
use crate::results::SearchResult;
use crate::utils::host_of;

/// The Custom Search JSON API never returns more than ten items per call
pub const MAX_RESULTS: usize = 10;

/// A source of ranked search results for a keyword
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AnalyzeError>;
}

/// Google Programmable Search (Custom Search JSON API) client
pub struct GoogleSearcher {
    client: reqwest::Client,
    endpoint: String,
    credentials: SearchCredentials,
    results: usize,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    html_snippet: String,
    #[serde(default)]
    display_link: String,
}

impl GoogleSearcher {
    pub fn new(config: &SearchConfig, credentials: SearchCredentials) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            credentials,
            results: config.results.clamp(1, MAX_RESULTS),
        })
    }
}

#[async_trait]
impl WebSearcher for GoogleSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AnalyzeError> {
        ::log::info!("Searching for {:?} (top {})", query, self.results);

        let num = self.results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            ::log::error!("Search API returned {}: {}", status, body);
            return Err(AnalyzeError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let data: CseResponse = resp
            .json()
            .await
            .map_err(|e| AnalyzeError::Transport(format!("invalid search response: {}", e)))?;

        let results = to_results(data.items, self.results);
        ::log::info!("Search for {:?} returned {} results", query, results.len());
        Ok(results)
    }
}

fn to_results(items: Vec<CseItem>, limit: usize) -> Vec<SearchResult> {
    items
        .into_iter()
        .filter(|item| !item.link.trim().is_empty())
        .take(limit)
        .enumerate()
        .map(|(i, item)| {
            let snippet = if item.snippet.trim().is_empty() {
                strip_markup(&item.html_snippet)
            } else {
                text::normalize_whitespace(&item.snippet)
            };
            let display_domain = if item.display_link.is_empty() {
                host_of(&item.link).unwrap_or_default()
            } else {
                item.display_link
            };

            SearchResult {
                position: i + 1,
                title: text::normalize_whitespace(&item.title),
                link: item.link.trim().to_string(),
                snippet,
                display_domain,
            }
        })
        .collect()
}

/// Text content of an HTML snippet such as `htmlSnippet`
fn strip_markup(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    text::join_fragments(doc.root_element().text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> SearchCredentials {
        SearchCredentials {
            api_key: "test-key".into(),
            engine_id: "test-cx".into(),
        }
    }

    fn searcher(server: &mockito::ServerGuard) -> GoogleSearcher {
        let config = SearchConfig {
            endpoint: format!("{}/customsearch/v1", server.url()),
            ..SearchConfig::default()
        };
        GoogleSearcher::new(&config, credentials()).unwrap()
    }

    #[tokio::test]
    async fn test_search_maps_items() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "test-key".into()),
                Matcher::UrlEncoded("cx".into(), "test-cx".into()),
                Matcher::UrlEncoded("q".into(), "best running shoes".into()),
                Matcher::UrlEncoded("num".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"title": "Best Running Shoes 2024", "link": "https://www.runnersworld.com/gear",
                     "snippet": "Our  top picks", "displayLink": "www.runnersworld.com"},
                    {"title": "Shoes", "link": "https://shop.example.com/shoes",
                     "htmlSnippet": "The <b>best</b> running shoes"},
                    {"title": "No link"}
                ]}"#,
            )
            .create_async()
            .await;

        let results = searcher(&server).search("best running shoes").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].position, 1);
        assert_eq!(results[0].link, "https://www.runnersworld.com/gear");
        assert_eq!(results[0].snippet, "Our top picks");
        assert_eq!(results[0].display_domain, "www.runnersworld.com");
        assert_eq!(results[1].position, 2);
        assert_eq!(results[1].snippet, "The best running shoes");
        assert_eq!(results[1].display_domain, "shop.example.com");
    }

    #[tokio::test]
    async fn test_search_without_items() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"searchInformation": {"totalResults": "0"}}"#)
            .create_async()
            .await;

        let results = searcher(&server).search("zzzz").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("Daily Limit Exceeded")
            .create_async()
            .await;

        let err = searcher(&server).search("shoes").await.unwrap_err();
        match &err {
            AnalyzeError::Upstream { status, body } => {
                assert_eq!(*status, 403);
                assert_eq!(body, "Daily Limit Exceeded");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_search_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = searcher(&server).search("shoes").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Transport(_)));
    }

    #[test]
    fn test_results_capped() {
        let items = (0..15)
            .map(|i| CseItem {
                title: format!("Result {}", i),
                link: format!("https://site{}.com/", i),
                snippet: String::new(),
                html_snippet: String::new(),
                display_link: String::new(),
            })
            .collect();
        let results = to_results(items, MAX_RESULTS);
        assert_eq!(results.len(), 10);
        assert_eq!(results[9].position, 10);
        assert_eq!(results[9].display_domain, "site9.com");
    }

    #[test]
    fn test_result_count_is_clamped() {
        let config = SearchConfig {
            results: 50,
            ..SearchConfig::default()
        };
        let searcher = GoogleSearcher::new(&config, credentials()).unwrap();
        assert_eq!(searcher.results, MAX_RESULTS);
    }
}
