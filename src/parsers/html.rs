use crate::parsers::text::{self, EXCERPT_WORDS};
use crate::results::{Image, LinkCounts, PageSignals};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

const META_DESCRIPTION_NAMES: [&str; 2] = ["description", "og:description"];
const JSON_LD_TYPE: &str = "application/ld+json";

/// Extracts on-page signals from an HTML document.
///
/// Never fails: a rule whose element is missing, or whose markup cannot be
/// understood, leaves its field empty.
pub fn extract(html: &str, source_url: &str) -> PageSignals {
    let doc = Html::parse_document(html);

    let body_text = body_text(&doc);
    let word_count = text::word_count(&body_text);
    let first_100_words = text::first_words(&body_text, EXCERPT_WORDS);

    let signals = PageSignals {
        source_url: source_url.to_string(),
        title: title(&doc),
        meta_description: meta_description(&doc),
        h1: first_text(&doc, "h1"),
        h2_list: all_text(&doc, "h2"),
        images: images(&doc),
        has_structured_data: has_structured_data(&doc),
        body_text,
        first_100_words,
        word_count,
        link_counts: link_counts(&doc, source_url),
    };

    ::log::debug!(
        "Extracted {} words, {} images, {} links from {}",
        signals.word_count,
        signals.images.len(),
        signals.link_counts.total,
        if source_url.is_empty() { "<inline html>" } else { source_url }
    );

    signals
}

/// Selects every element matching `css`; an invalid selector selects nothing
fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => doc.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn title(doc: &Html) -> String {
    first_text(doc, "title")
}

fn first_text(doc: &Html, css: &str) -> String {
    select_all(doc, css)
        .into_iter()
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn all_text(doc: &Html, css: &str) -> Vec<String> {
    select_all(doc, css).into_iter().map(element_text).collect()
}

fn meta_description(doc: &Html) -> String {
    let is_description = |value: Option<&str>| {
        value.is_some_and(|v| {
            META_DESCRIPTION_NAMES
                .iter()
                .any(|name| v.trim().eq_ignore_ascii_case(name))
        })
    };

    select_all(doc, "meta")
        .into_iter()
        .find(|meta| {
            let el = meta.value();
            is_description(el.attr("name")) || is_description(el.attr("property"))
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

fn images(doc: &Html) -> Vec<Image> {
    select_all(doc, "img")
        .into_iter()
        .map(|img| {
            let el = img.value();
            Image {
                src: el.attr("src").unwrap_or_default().to_string(),
                alt: el.attr("alt").unwrap_or_default().to_string(),
            }
        })
        .collect()
}

fn has_structured_data(doc: &Html) -> bool {
    select_all(doc, "script").into_iter().any(|script| {
        script
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
    })
}

/// Elements whose content html5ever keeps as raw text rather than markup
const RAW_TEXT_ELEMENTS: [&str; 7] = [
    "script", "style", "noscript", "noembed", "noframes", "iframe", "xmp",
];

/// Text of `<body>` (or the whole document) without script, style or other raw-text content
fn body_text(doc: &Html) -> String {
    let root = select_all(doc, "body")
        .into_iter()
        .next()
        .unwrap_or_else(|| doc.root_element());

    // Raw-text elements have no child elements, so their text is always a direct child
    let fragments = root.descendants().filter_map(|node| match node.value() {
        Node::Text(t) => {
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name()))
                .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
            if hidden { None } else { Some(&**t) }
        }
        _ => None,
    });

    text::join_fragments(fragments)
}

fn link_counts(doc: &Html, source_url: &str) -> LinkCounts {
    let base = Url::parse(source_url).ok();
    let own_host = base
        .as_ref()
        .and_then(|u| u.host_str())
        .map(|h| h.to_lowercase())
        .unwrap_or_default();

    let anchors = select_all(doc, "a");
    let mut counts = LinkCounts {
        total: anchors.len(),
        ..LinkCounts::default()
    };

    for anchor in anchors {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        if href.starts_with('#') {
            counts.internal += 1;
            continue;
        }

        let resolved = match &base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        let Some(host) = resolved.ok().and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        else {
            ::log::trace!("Ignoring unresolvable href: {}", href);
            continue;
        };

        if !own_host.is_empty() && host.contains(&own_host) {
            counts.internal += 1;
        } else {
            counts.external += 1;
        }
    }

    counts
}
