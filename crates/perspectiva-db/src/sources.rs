//! Database operations for the `sources` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{map_insert_error, DbError};

/// A row from the `sources` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub base_url: String,
    pub feed_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SOURCE_COLUMNS: &str = "id, public_id, name, base_url, feed_url, created_at";

/// Returns the source whose stored feed URL matches exactly, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_source_by_feed_url(
    pool: &PgPool,
    feed_url: &str,
) -> Result<Option<SourceRow>, DbError> {
    let row = sqlx::query_as::<_, SourceRow>(&format!(
        "SELECT {SOURCE_COLUMNS} FROM sources WHERE feed_url = $1"
    ))
    .bind(feed_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the first source whose base URL contains the given hostname.
///
/// Ordered by id so the match is stable when multiple base URLs share a host.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_source_by_base_url_host(
    pool: &PgPool,
    host: &str,
) -> Result<Option<SourceRow>, DbError> {
    let row = sqlx::query_as::<_, SourceRow>(&format!(
        "SELECT {SOURCE_COLUMNS} FROM sources \
         WHERE base_url LIKE '%' || $1 || '%' \
         ORDER BY id \
         LIMIT 1"
    ))
    .bind(host)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new source and returns the created row.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if a source with the same base URL or feed
/// URL already exists, or [`DbError::Sqlx`] on other failures.
pub async fn insert_source(
    pool: &PgPool,
    name: &str,
    base_url: &str,
    feed_url: Option<&str>,
) -> Result<SourceRow, DbError> {
    let row = sqlx::query_as::<_, SourceRow>(&format!(
        "INSERT INTO sources (name, base_url, feed_url) \
         VALUES ($1, $2, $3) \
         RETURNING {SOURCE_COLUMNS}"
    ))
    .bind(name)
    .bind(base_url)
    .bind(feed_url)
    .fetch_one(pool)
    .await
    .map_err(|e| map_insert_error("sources", e))?;

    Ok(row)
}

/// Updates the stored feed URL for a source.
///
/// Used when a known outlet (matched by base URL) starts serving a different
/// feed URL.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if the feed URL is already claimed by
/// another source, or [`DbError::Sqlx`] on other failures.
pub async fn update_source_feed_url(
    pool: &PgPool,
    source_id: i64,
    feed_url: &str,
) -> Result<(), DbError> {
    sqlx::query("UPDATE sources SET feed_url = $1 WHERE id = $2")
        .bind(feed_url)
        .bind(source_id)
        .execute(pool)
        .await
        .map_err(|e| map_insert_error("sources", e))?;
    Ok(())
}

/// Returns sources ordered by id, with offset/limit paging.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sources(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<SourceRow>, DbError> {
    let rows = sqlx::query_as::<_, SourceRow>(&format!(
        "SELECT {SOURCE_COLUMNS} FROM sources ORDER BY id OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
