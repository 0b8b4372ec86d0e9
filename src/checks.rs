use crate::config::ScoringRules;
use crate::keywords;
use crate::parsers::text;
use crate::results::{PageChecks, PageSignals};

/// Runs every on-page check for one page and scores the result.
///
/// `page_url` is the URL checked for the keyword; when empty, the signals'
/// own source URL is used. An empty keyword never counts as included.
pub fn evaluate(
    signals: &PageSignals,
    keyword: &str,
    page_url: &str,
    rules: &ScoringRules,
) -> PageChecks {
    let page_url = if page_url.is_empty() {
        signals.source_url.as_str()
    } else {
        page_url
    };

    let title_len = signals.title.chars().count();
    let meta_len = signals.meta_description.chars().count();
    let stats = keywords::compute_density(&signals.body_text, keyword);

    let mut checks = PageChecks {
        title_length_ok: (rules.title_min_len..=rules.title_max_len).contains(&title_len),
        title_includes_keyword: contains_ignore_case(&signals.title, keyword),
        meta_length_ok: (rules.meta_min_len..=rules.meta_max_len).contains(&meta_len),
        meta_includes_keyword: contains_ignore_case(&signals.meta_description, keyword),
        h1_present: !signals.h1.is_empty(),
        h1_includes_keyword: contains_ignore_case(&signals.h1, keyword),
        url_includes_keyword: contains_ignore_case(page_url, text::first_token(keyword)),
        density_ok: stats.density_percent >= rules.density_min
            && stats.density_percent <= rules.density_max,
        image_alts_ok: signals
            .images
            .iter()
            .all(|img| !img.alt.trim().is_empty()),
        has_structured_data: signals.has_structured_data,
        density_percent: stats.density_percent,
        density_count: stats.occurrence_count,
        word_count: signals.word_count,
        score: 0,
    };
    checks.score = score(&checks, rules);
    checks
}

/// Combines check outcomes into a rubric score clamped to `0..=100`
pub fn score(checks: &PageChecks, rules: &ScoringRules) -> u8 {
    let w = &rules.weights;
    let partial = |weight: u32| (f64::from(weight) * rules.partial_credit).round();
    let full = f64::from;

    let mut total = 0.0;

    if checks.title_includes_keyword {
        total += full(w.title);
    } else if checks.title_length_ok {
        total += partial(w.title);
    }

    if checks.meta_includes_keyword {
        total += full(w.meta);
    } else if checks.meta_length_ok {
        total += partial(w.meta);
    }

    if checks.url_includes_keyword {
        total += full(w.url);
    }
    if checks.h1_includes_keyword {
        total += full(w.h1);
    }
    if checks.density_ok {
        total += full(w.density);
    }

    if checks.word_count >= rules.words_target {
        total += full(w.words);
    } else {
        let earned = checks.word_count as f64 * full(w.words) / rules.words_target.max(1) as f64;
        total += earned.round();
    }

    if checks.has_structured_data {
        total += full(w.schema);
    }
    if checks.image_alts_ok {
        total += full(w.image_alts);
    }

    total.clamp(0.0, 100.0).round() as u8
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}
