//! Feed document parsing on top of feed-rs.

use chrono::{DateTime, Utc};

use crate::error::IngestError;

/// One candidate item from a parsed feed, prior to extraction and persistence.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    /// Entry title; `"Untitled"` when the feed omits one.
    pub title: String,
    /// Canonical article link. Entries without a link are dropped.
    pub link: String,
    /// Published time, falling back to updated time, else absent.
    pub published: Option<DateTime<Utc>>,
    /// Inline structured content body, when the feed carries one.
    pub content: Option<String>,
    /// Inline summary/description blob, when the feed carries one.
    pub summary: Option<String>,
}

/// A parsed feed: its title plus the capped entry list, in feed order.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Parse a fetched feed document into candidate entries.
///
/// Entries without a resolvable link are dropped with a debug log. At most
/// `max_items` entries are returned, preserving feed order.
///
/// # Errors
///
/// Returns [`IngestError::MalformedFeed`] if the document cannot be parsed
/// as RSS or Atom at all.
pub fn parse_feed(
    feed_url: &str,
    body: &[u8],
    max_items: usize,
) -> Result<ParsedFeed, IngestError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| IngestError::MalformedFeed {
        url: feed_url.to_string(),
        reason: e.to_string(),
    })?;

    let title = feed.title.map(|t| t.content);

    let mut entries = Vec::new();
    for entry in feed.entries {
        if entries.len() >= max_items {
            break;
        }

        let Some(link) = entry
            .links
            .iter()
            .map(|l| l.href.trim())
            .find(|href| !href.is_empty())
            .map(str::to_string)
        else {
            tracing::debug!(
                feed = feed_url,
                title = entry.title.as_ref().map_or("", |t| t.content.as_str()),
                "dropping entry with no link"
            );
            continue;
        };

        entries.push(FeedEntry {
            title: entry
                .title
                .map_or_else(|| "Untitled".to_string(), |t| t.content),
            link,
            published: entry.published.or(entry.updated),
            content: entry.content.and_then(|c| c.body),
            summary: entry.summary.map(|s| s.content),
        });
    }

    Ok(ParsedFeed { title, entries })
}
