//! Plain-text helpers shared by the extractor and the statistics modules.
//!
//! Every function here treats "word" as a whitespace-delimited token, so the
//! word count of a normalized text always equals the number of tokens
//! produced by splitting it on whitespace.

/// Number of words kept in the page excerpt
pub const EXCERPT_WORDS: usize = 100;

/// Collapses every run of whitespace into a single space and trims both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Joins text fragments with spaces, then normalizes the result.
///
/// Fragments are joined with a separator so that text from adjacent elements
/// (`<p>one</p><p>two</p>`) never runs together.
pub fn join_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut joined = String::new();
    for fragment in fragments {
        joined.push_str(fragment);
        joined.push(' ');
    }
    normalize_whitespace(&joined)
}

/// Counts whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns the first `n` tokens rejoined with single spaces
pub fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// First whitespace token of a phrase, or `""` for a blank phrase
pub fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}
