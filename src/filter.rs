use crate::results::SearchResult;
use crate::utils::host_of;

/// Decides which search result is compared against the target page.
///
/// Host matching is by substring on the lower-cased hostname, so
/// `m.youtube.com` is caught by `youtube.com` and `blog.shop.example.com` is
/// grouped with a target on `shop.example.com`.
#[derive(Debug, Clone, Default)]
pub struct CompetitorFilter {
    skip_domains: Vec<String>,
}

impl CompetitorFilter {
    /// Create a filter from a skip-domain list; entries are lower-cased and blanks dropped
    pub fn new<S: AsRef<str>>(skip_domains: &[S]) -> Self {
        Self {
            skip_domains: skip_domains
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn skip_domains(&self) -> &[String] {
        &self.skip_domains
    }

    /// Whether a host is on the skip list
    pub fn is_skipped(&self, host: &str) -> bool {
        self.skip_domains.iter().any(|skip| host.contains(skip.as_str()))
    }

    /// Whether a result link is an acceptable competitor for a target host
    pub fn should_consider(&self, link: &str, target_host: Option<&str>) -> bool {
        let host = host_of(link).unwrap_or_default();

        if self.is_skipped(&host) {
            ::log::debug!("Skipping listed domain: {}", link);
            return false;
        }

        if let Some(target_host) = target_host {
            if host.contains(target_host) {
                ::log::debug!("Skipping target's own site: {}", link);
                return false;
            }
        }

        true
    }

    /// Picks the competitor link from ranked results.
    ///
    /// Returns the first result passing both the skip list and the
    /// same-site rule. When every result is filtered out, the top raw result
    /// is used so there is always a competitor; the result is empty only when
    /// `results` is.
    pub fn select(&self, results: &[SearchResult], target_url: Option<&str>) -> String {
        let target_host = target_url.and_then(host_of).filter(|h| !h.is_empty());

        if let Some(result) = results
            .iter()
            .find(|r| self.should_consider(&r.link, target_host.as_deref()))
        {
            ::log::info!("Chose competitor #{}: {}", result.position, result.link);
            return result.link.clone();
        }

        match results.first() {
            Some(first) => {
                ::log::info!(
                    "Every result was filtered out, falling back to #{}: {}",
                    first.position,
                    first.link
                );
                first.link.clone()
            }
            None => String::new(),
        }
    }
}
