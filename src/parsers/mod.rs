pub mod html;
pub mod text;


pub use html::extract;

/// Broad kind of a fetched document, decided from its `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML or XHTML markup
    Html,
    /// Plain text
    Text,
    /// Anything else (images, PDFs, JSON, ...)
    Other,
}

impl ContentKind {
    /// Classifies a `Content-Type` header value; a missing header is assumed to be HTML
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            return ContentKind::Html;
        };
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime.is_empty() || mime.contains("html") {
            ::log::trace!("Classifying as HTML: {}", value);
            ContentKind::Html
        } else if mime.starts_with("text/") {
            ::log::trace!("Classifying as Text: {}", value);
            ContentKind::Text
        } else {
            ::log::trace!("Classifying as Other: {}", value);
            ContentKind::Other
        }
    }

    /// Whether the extractor can get meaningful signals out of this kind
    pub fn is_extractable(&self) -> bool {
        matches!(self, ContentKind::Html)
    }
}
