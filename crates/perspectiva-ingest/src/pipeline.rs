//! Cycle orchestration: drive one fetch pass across all configured feeds.

use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use perspectiva_core::AppConfig;
use perspectiva_db::{find_article_by_url_hash, insert_article, DbError, NewArticle};

use crate::error::IngestError;
use crate::extract::extract_entry_text;
use crate::feed::{parse_feed, FeedEntry};
use crate::fetch::ContentFetcher;
use crate::resolve::resolve_source;
use crate::sentiment::classify;
use crate::summarize::summarize;

/// Maximum stored title length, in characters.
const MAX_TITLE_CHARS: usize = 1000;

/// Why an entry produced no new article. Expected steady-state outcomes,
/// not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An article with this URL hash already exists.
    AlreadyIngested,
    /// No extraction strategy produced text above the minimum length.
    NoUsableText,
}

/// Outcome of processing one feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A new article row was committed; carries its id.
    Ingested(i64),
    Skipped(SkipReason),
}

/// Counters for one complete cycle over all configured feeds.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct CycleStats {
    pub feeds_attempted: usize,
    pub feeds_failed: usize,
    pub entries_ingested: usize,
    pub entries_skipped: usize,
    pub entries_failed: usize,
}

/// Deterministic sha256 hex digest of a URL; the system-wide dedup key.
#[must_use]
pub fn hash_url(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{digest:x}")
}

/// Run one full ingestion cycle.
///
/// Every configured feed is attempted exactly once. Feed-level failures
/// (unreachable feed, malformed document) and entry-level failures are
/// logged and absorbed; they never prevent ingestion of other feeds or
/// entries.
pub async fn run_cycle(pool: &PgPool, config: &AppConfig, fetcher: &ContentFetcher) -> CycleStats {
    let mut stats = CycleStats::default();

    tracing::info!(feeds = config.feeds.len(), "starting ingestion cycle");

    for feed_url in &config.feeds {
        stats.feeds_attempted += 1;
        if let Err(e) = ingest_feed(pool, config, fetcher, feed_url, &mut stats).await {
            stats.feeds_failed += 1;
            tracing::warn!(feed = %feed_url, error = %e, "feed skipped");
        }
    }

    tracing::info!(
        feeds_attempted = stats.feeds_attempted,
        feeds_failed = stats.feeds_failed,
        ingested = stats.entries_ingested,
        skipped = stats.entries_skipped,
        failed = stats.entries_failed,
        "ingestion cycle complete"
    );
    stats
}

/// Fetch and process one feed. Entry failures are tallied, not propagated.
async fn ingest_feed(
    pool: &PgPool,
    config: &AppConfig,
    fetcher: &ContentFetcher,
    feed_url: &str,
    stats: &mut CycleStats,
) -> Result<(), IngestError> {
    tracing::debug!(feed = feed_url, "fetching feed");
    let Some(body) = fetcher.fetch(feed_url).await else {
        return Err(IngestError::MalformedFeed {
            url: feed_url.to_string(),
            reason: "feed unavailable".to_string(),
        });
    };

    let parsed = parse_feed(feed_url, body.as_bytes(), config.max_items_per_feed)?;

    for entry in &parsed.entries {
        match process_entry(pool, config, fetcher, parsed.title.as_deref(), feed_url, entry).await {
            Ok(EntryOutcome::Ingested(id)) => {
                stats.entries_ingested += 1;
                tracing::info!(article_id = id, url = %entry.link, "article ingested");
            }
            Ok(EntryOutcome::Skipped(reason)) => {
                stats.entries_skipped += 1;
                tracing::debug!(url = %entry.link, ?reason, "entry skipped");
            }
            Err(e) => {
                stats.entries_failed += 1;
                tracing::error!(feed = feed_url, url = %entry.link, error = %e, "entry failed");
            }
        }
    }

    Ok(())
}

/// Process a single entry: dedup check, source resolution, extraction,
/// summarization, classification, and the article insert.
///
/// Re-encountering a known URL is a no-op at the probe, and under racing
/// cycles also at the insert, where the store's uniqueness constraint is
/// the real mutual exclusion.
async fn process_entry(
    pool: &PgPool,
    config: &AppConfig,
    fetcher: &ContentFetcher,
    feed_title: Option<&str>,
    feed_url: &str,
    entry: &FeedEntry,
) -> Result<EntryOutcome, IngestError> {
    let url_hash = hash_url(&entry.link);
    if find_article_by_url_hash(pool, &url_hash).await?.is_some() {
        return Ok(EntryOutcome::Skipped(SkipReason::AlreadyIngested));
    }

    let source = resolve_source(pool, feed_title, feed_url, &entry.link).await?;

    let Some(full_text) = extract_entry_text(fetcher, entry).await else {
        return Ok(EntryOutcome::Skipped(SkipReason::NoUsableText));
    };

    let summary = summarize(&full_text, config.summary_sentences);
    let sentiment = classify(if summary.is_empty() { &full_text } else { &summary });

    let article = NewArticle {
        source_id: source.id,
        title: truncate_title(&entry.title),
        url: entry.link.clone(),
        url_hash,
        published_at: entry.published,
        full_text: Some(full_text),
        summary: Some(summary),
        sentiment: Some(sentiment.as_str().to_string()),
        metadata: serde_json::json!({
            "feed_url": feed_url,
            "original_title": entry.title,
        }),
    };

    match insert_article(pool, &article).await {
        Ok(row) => Ok(EntryOutcome::Ingested(row.id)),
        // A racing cycle committed this URL between the probe and the insert.
        Err(DbError::Duplicate(_)) => Ok(EntryOutcome::Skipped(SkipReason::AlreadyIngested)),
        Err(e) => Err(e.into()),
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    title.chars().take(MAX_TITLE_CHARS).collect()
}
