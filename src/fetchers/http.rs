use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use super::{FetchOutcome, PageFetcher};
use crate::config::FetchConfig;
use crate::error::ConfigError;
use crate::parsers::ContentKind;
use crate::utils::truncate_at_boundary;

const MAX_REDIRECTS: usize = 10;

/// Plain HTTP GET fetcher. Does not execute JavaScript.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    max_html_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
            max_html_bytes: config.max_html_bytes,
        })
    }

    fn describe(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("timed out after {} seconds", self.timeout_secs)
        } else {
            error.to_string()
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        ::log::debug!("GET {}", url);

        let mut resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let reason = self.describe(&e);
                ::log::warn!("Failed to fetch {}: {}", url, reason);
                return FetchOutcome::Failed(reason);
            }
        };

        let status = resp.status();
        if !status.is_success() {
            ::log::warn!("Fetching {} returned {}", url, status);
            return FetchOutcome::Failed(format!("HTTP {}", status.as_u16()));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if !ContentKind::from_content_type(content_type.as_deref()).is_extractable() {
            let reason = format!(
                "unsupported content type: {}",
                content_type.unwrap_or_default()
            );
            ::log::warn!("Skipping {}: {}", url, reason);
            return FetchOutcome::Failed(reason);
        }

        let mut body: Vec<u8> = Vec::new();
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    body.extend_from_slice(&chunk);
                    if body.len() >= self.max_html_bytes {
                        ::log::debug!("Capped {} at {} bytes", url, self.max_html_bytes);
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let reason = self.describe(&e);
                    ::log::warn!("Failed reading body of {}: {}", url, reason);
                    return FetchOutcome::Failed(reason);
                }
            }
        }

        let mut html = String::from_utf8_lossy(&body).into_owned();
        truncate_at_boundary(&mut html, self.max_html_bytes);

        ::log::info!("Fetched {} ({} bytes)", url, html.len());
        FetchOutcome::Fetched(html)
    }
}
