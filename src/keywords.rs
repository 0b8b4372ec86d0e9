use crate::parsers::text;
use crate::results::KeywordStats;

/// Counts case-insensitive, non-overlapping occurrences of `phrase` in `text`
/// and relates them to the text's word count.
///
/// Matching is by substring rather than by token, so multi-word phrases match
/// literally and a phrase may match inside a longer word.
pub fn compute_density(text: &str, phrase: &str) -> KeywordStats {
    if text.is_empty() || phrase.is_empty() {
        return KeywordStats::default();
    }

    let haystack = text.to_lowercase();
    let needle = phrase.to_lowercase();

    let occurrence_count = haystack.matches(needle.as_str()).count();
    let total_words = text::word_count(text);

    KeywordStats {
        occurrence_count,
        density_percent: density(occurrence_count, total_words),
        total_words,
    }
}

/// Multiplies before dividing so that e.g. 3 in 500 is exactly `0.6`
fn density(count: usize, total_words: usize) -> f64 {
    (count as f64 * 100.0) / total_words.max(1) as f64
}
