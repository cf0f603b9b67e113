//! Readable-text extraction with a layered fallback chain.
//!
//! Order: inline feed content, then inline summary/description, then a
//! full-page fetch with a readability-style pass. A candidate only wins if
//! it clears [`MIN_TEXT_LEN`]; anything shorter is useless for
//! summarization and scoring.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::feed::FeedEntry;
use crate::fetch::ContentFetcher;

/// Minimum viable extracted-text length, in characters.
pub const MIN_TEXT_LEN: usize = 100;

/// Paragraph fragments shorter than this are treated as boilerplate
/// (captions, button labels) during the full-page pass.
const MIN_PARAGRAPH_LEN: usize = 40;

/// Elements whose paragraph descendants are navigation or boilerplate,
/// never article body.
const BOILERPLATE_ANCESTORS: &[&str] = &[
    "nav", "header", "footer", "aside", "form", "table", "figure", "button",
];

/// Extract readable plain text for a feed entry.
///
/// Tries, in order: inline content, inline summary, full-page fetch of the
/// entry link. Returns `None` when no strategy yields text above
/// [`MIN_TEXT_LEN`]; such entries are discarded and never persisted empty.
pub async fn extract_entry_text(fetcher: &ContentFetcher, entry: &FeedEntry) -> Option<String> {
    if let Some(content) = &entry.content {
        let text = strip_html(content);
        if text.len() >= MIN_TEXT_LEN {
            return Some(text);
        }
    }

    if let Some(summary) = &entry.summary {
        let text = strip_html(summary);
        if text.len() >= MIN_TEXT_LEN {
            return Some(text);
        }
    }

    let page = fetcher.fetch(&entry.link).await?;
    let text = extract_readable(&page);
    if text.len() >= MIN_TEXT_LEN {
        return Some(text);
    }

    // Readability found nothing usable; fall back to stripping the whole page.
    let text = strip_html(&page);
    if text.len() >= MIN_TEXT_LEN {
        return Some(text);
    }

    tracing::debug!(url = %entry.link, "no extraction strategy produced usable text");
    None
}

/// HTML-to-text cleanup: drop `<script>`/`<style>` blocks wholesale and HTML
/// comments, strip remaining tags, decode entities, collapse whitespace.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let blocks = Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>")
        .expect("valid block regex");
    let comments = Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex");
    let tags = Regex::new(r"(?s)<[^>]*>").expect("valid tags regex");

    let text = blocks.replace_all(html, " ");
    let text = comments.replace_all(&text, " ");
    let text = tags.replace_all(&text, " ");
    let text = html_escape::decode_html_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Readability-style pass over a full HTML page.
///
/// Collects paragraph text, skipping paragraphs nested in navigation,
/// tables, and other boilerplate containers, and ignoring fragments too
/// short to be article prose. Comments and script/style never surface here
/// because only element text nodes are read.
#[must_use]
pub fn extract_readable(html: &str) -> String {
    let document = Html::parse_document(html);
    let paragraphs = Selector::parse("p").expect("valid paragraph selector");

    let mut out = String::new();
    for element in document.select(&paragraphs) {
        if has_boilerplate_ancestor(element) {
            continue;
        }

        let raw = element.text().collect::<Vec<_>>().join(" ");
        let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.len() < MIN_PARAGRAPH_LEN {
            continue;
        }

        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&text);
    }
    out
}

fn has_boilerplate_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BOILERPLATE_ANCESTORS.contains(&a.value().name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedEntry;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(content: Option<&str>, summary: Option<&str>, link: &str) -> FeedEntry {
        FeedEntry {
            title: "Test".to_string(),
            link: link.to_string(),
            published: None,
            content: content.map(str::to_string),
            summary: summary.map(str::to_string),
        }
    }

    fn long_html(prefix: &str) -> String {
        format!("<p>{prefix} {}</p>", "word ".repeat(40))
    }

    #[test]
    fn strip_html_removes_script_and_style_blocks() {
        let html = "<html><head><style>body { color: red }</style></head>\
                    <body><script>var x = '<p>not text</p>';</script>\
                    <p>Real   text&amp;more</p><!-- hidden --></body></html>";
        assert_eq!(strip_html(html), "Real text&more");
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<div>a\n\n  b\t c</div>"), "a b c");
    }

    #[test]
    fn extract_readable_skips_nav_and_tables() {
        let html = format!(
            "<html><body>\
             <nav><p>{nav}</p></nav>\
             <table><tr><td><p>{table}</p></td></tr></table>\
             <article><p>{body}</p></article>\
             </body></html>",
            nav = "Home About Contact and lots of other navigation links here",
            table = "Row one with enough characters to pass the paragraph filter",
            body = "The actual story text, long enough to count as article prose."
        );
        let text = extract_readable(&html);
        assert!(text.contains("actual story text"));
        assert!(!text.contains("navigation links"));
        assert!(!text.contains("Row one"));
    }

    #[tokio::test]
    async fn inline_content_wins_over_summary() {
        let fetcher = ContentFetcher::new(2).unwrap();
        let e = entry(
            Some(&long_html("From content.")),
            Some(&long_html("From summary.")),
            "http://127.0.0.1:1/unused",
        );
        let text = extract_entry_text(&fetcher, &e).await.unwrap();
        assert!(text.starts_with("From content."));
    }

    #[tokio::test]
    async fn summary_only_entry_with_unreachable_link_uses_summary() {
        let fetcher = ContentFetcher::new(2).unwrap();
        let e = entry(None, Some(&long_html("From summary.")), "http://127.0.0.1:1/dead");
        let text = extract_entry_text(&fetcher, &e).await.unwrap();
        assert!(text.starts_with("From summary."));
    }

    #[tokio::test]
    async fn short_inline_text_falls_through_to_page_fetch() {
        let server = MockServer::start().await;
        let page = format!(
            "<html><body><article><p>Page body. {}</p></article></body></html>",
            "filler sentence here ".repeat(20)
        );
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new(5).unwrap();
        let e = entry(Some("<p>too short</p>"), None, &format!("{}/story", server.uri()));
        let text = extract_entry_text(&fetcher, &e).await.unwrap();
        assert!(text.starts_with("Page body."));
    }

    #[tokio::test]
    async fn everything_failing_yields_none() {
        let fetcher = ContentFetcher::new(2).unwrap();
        let e = entry(Some("<p>tiny</p>"), Some("<p>also tiny</p>"), "http://127.0.0.1:1/x");
        assert!(extract_entry_text(&fetcher, &e).await.is_none());
    }
}
