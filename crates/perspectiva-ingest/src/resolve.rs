//! Source resolution: map a feed entry to a persisted source row.

use sqlx::PgPool;
use url::Url;

use perspectiva_db::{
    find_source_by_base_url_host, find_source_by_feed_url, insert_source, update_source_feed_url,
    DbError, SourceRow,
};

use crate::error::IngestError;

/// Resolve an entry to its source, creating one when absent.
///
/// Resolution order:
/// 1. exact match on the stored feed URL;
/// 2. the article URL's hostname as a substring of a stored base URL; the
///    outlet is known but its feed URL changed, so the stored feed URL is
///    repointed;
/// 3. insert a new source named from the feed title (or the hostname when
///    the feed has no title).
///
/// A lost insert race (unique violation on base/feed URL) re-reads and
/// returns the winning row.
///
/// # Errors
///
/// Returns [`IngestError::InvalidUrl`] if the article URL has no usable
/// hostname, or [`IngestError::Db`] on storage failures.
pub async fn resolve_source(
    pool: &PgPool,
    feed_title: Option<&str>,
    feed_url: &str,
    article_url: &str,
) -> Result<SourceRow, IngestError> {
    if let Some(source) = find_source_by_feed_url(pool, feed_url).await? {
        return Ok(source);
    }

    let parsed = Url::parse(article_url).map_err(|e| IngestError::InvalidUrl {
        url: article_url.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| IngestError::InvalidUrl {
            url: article_url.to_string(),
            reason: "no hostname".to_string(),
        })?;

    if let Some(source) = find_source_by_base_url_host(pool, host).await? {
        match update_source_feed_url(pool, source.id, feed_url).await {
            Ok(()) => {}
            // Another source already claims this feed URL; keep the match as-is.
            Err(DbError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(source);
    }

    let base_url = format!("{}://{host}", parsed.scheme());
    let name = feed_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| name_from_host(host), str::to_string);

    match insert_source(pool, &name, &base_url, Some(feed_url)).await {
        Ok(source) => Ok(source),
        Err(DbError::Duplicate(_)) => {
            // Lost a concurrent creation race; the winner's row serves.
            if let Some(source) = find_source_by_feed_url(pool, feed_url).await? {
                return Ok(source);
            }
            find_source_by_base_url_host(pool, host)
                .await?
                .ok_or(IngestError::Db(DbError::NotFound))
        }
        Err(e) => Err(e.into()),
    }
}

/// Derive a display name from a hostname: strip a leading `www.`, take the
/// first DNS label, title-case it.
fn name_from_host(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or(host);

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_from_host_strips_www_and_title_cases() {
        assert_eq!(name_from_host("www.example.com"), "Example");
    }

    #[test]
    fn name_from_host_takes_first_label() {
        assert_eq!(name_from_host("news.bbc.co.uk"), "News");
    }

    #[test]
    fn name_from_host_handles_bare_host() {
        assert_eq!(name_from_host("localhost"), "Localhost");
    }
}
