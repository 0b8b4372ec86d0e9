use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::TermConfig;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid token regex"));

/// Lower-cased alphanumeric runs of at least `min_len` chars, purely numeric runs excluded
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|token| token.chars().count() >= min_len)
        .filter(|token| !token.chars().all(|c| c.is_numeric()))
        .collect()
}

/// The `limit` most frequent terms of `text` with their counts.
///
/// Sorted by descending count; terms with equal counts keep the order in
/// which they first appear in the text.
pub fn top_terms(text: &str, limit: usize, min_len: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for token in tokenize(text, min_len) {
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|term| {
            let count = counts.get(&term).copied().unwrap_or_default();
            (term, count)
        })
        .collect();

    // Stable, so ties stay in first-occurrence order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Frequent competitor terms that are not among the target's frequent terms
pub fn gap_terms(competitor_text: &str, target_text: &str, config: &TermConfig) -> Vec<String> {
    let target_top: HashSet<String> =
        top_terms(target_text, config.target_terms, config.min_term_len)
            .into_iter()
            .map(|(term, _)| term)
            .collect();

    let gaps: Vec<String> = top_terms(competitor_text, config.competitor_terms, config.min_term_len)
        .into_iter()
        .map(|(term, _)| term)
        .filter(|term| !target_top.contains(term))
        .take(config.gap_limit)
        .collect();

    ::log::debug!(
        "Found {} gap terms against {} target terms",
        gaps.len(),
        target_top.len()
    );

    gaps
}
