use crate::config::ScoringRules;
use crate::results::PageReport;

pub const NO_TARGET_NOTICE: &str =
    "No target URL supplied; only the competitor page was analyzed.";
pub const TARGET_NOT_FETCHED: &str =
    "Target page not fetched. Ensure the URL is public and accessible.";

/// How many gap terms are named in the topics suggestion
const TOPIC_SAMPLE: usize = 10;

/// Minimum anchors before a page stops being told to add links
const MIN_LINKS: usize = 3;

/// What is known about the target page when suggestions are built
#[derive(Debug, Clone, Copy)]
pub enum TargetPage<'a> {
    NotProvided,
    Unreachable,
    Fetched(&'a PageReport),
}

/// Builds ordered, human-readable advice for the target page
pub fn build(
    target: TargetPage<'_>,
    competitor: &PageReport,
    gap_terms: &[String],
    rules: &ScoringRules,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    match target {
        TargetPage::NotProvided => suggestions.push(NO_TARGET_NOTICE.to_string()),
        TargetPage::Unreachable => suggestions.push(TARGET_NOT_FETCHED.to_string()),
        TargetPage::Fetched(report) => {
            page_suggestions(report, rules, &mut suggestions);

            let theirs = competitor.parsed.word_count;
            let ours = report.parsed.word_count;
            if theirs > ours {
                suggestions.push(format!(
                    "The competitor page has {} words against your {}; consider expanding coverage.",
                    theirs, ours
                ));
            }
        }
    }

    if !gap_terms.is_empty() {
        let sample: Vec<&str> = gap_terms
            .iter()
            .take(TOPIC_SAMPLE)
            .map(String::as_str)
            .collect();
        suggestions.push(format!(
            "Consider covering these topics from the competitor: {}.",
            sample.join(", ")
        ));
    }

    suggestions
}

fn page_suggestions(report: &PageReport, rules: &ScoringRules, out: &mut Vec<String>) {
    let checks = &report.checks;
    let page = &report.parsed;

    if !checks.title_includes_keyword {
        out.push("Include the target keyword in the title tag.".to_string());
    }
    if !checks.title_length_ok {
        out.push(format!(
            "Adjust the title to {}-{} characters (currently {}).",
            rules.title_min_len,
            rules.title_max_len,
            page.title.chars().count()
        ));
    }

    if page.meta_description.is_empty() {
        out.push("Add a meta description that includes the target keyword.".to_string());
    } else {
        if !checks.meta_includes_keyword {
            out.push("Include the target keyword in the meta description.".to_string());
        }
        if !checks.meta_length_ok {
            out.push(format!(
                "Adjust the meta description to {}-{} characters (currently {}).",
                rules.meta_min_len,
                rules.meta_max_len,
                page.meta_description.chars().count()
            ));
        }
    }

    if !checks.h1_present {
        out.push("Add an H1 that includes the target keyword.".to_string());
    } else if !checks.h1_includes_keyword {
        out.push("Include the target keyword in the H1.".to_string());
    }

    if !checks.url_includes_keyword {
        out.push("Use the keyword in the URL slug where possible.".to_string());
    }

    if !checks.density_ok {
        if checks.density_percent < rules.density_min {
            out.push(format!(
                "Increase keyword usage naturally (aim for {}% - {}%, currently {:.2}%).",
                rules.density_min, rules.density_max, checks.density_percent
            ));
        } else {
            out.push(format!(
                "Reduce keyword repetition to stay under {}% (currently {:.2}%).",
                rules.density_max, checks.density_percent
            ));
        }
    }

    if checks.word_count < rules.words_target {
        out.push(format!(
            "Increase content length to at least {} words (currently {}).",
            rules.words_target, checks.word_count
        ));
    }

    if !checks.has_structured_data {
        out.push("Add JSON-LD structured data such as Article or Product schema.".to_string());
    }
    if !checks.image_alts_ok {
        out.push("Add descriptive alt text to every image.".to_string());
    }

    if page.link_counts.total < MIN_LINKS {
        out.push("Add a few internal/external links (3-8 recommended).".to_string());
    }
}
