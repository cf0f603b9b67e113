//! Database operations for the `articles` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{map_insert_error, DbError};

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub public_id: Uuid,
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub url_hash: String,
    pub published_at: Option<DateTime<Utc>>,
    pub full_text: Option<String>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// An article joined with its source name, for display listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleWithSourceRow {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub sentiment: Option<String>,
}

/// Fields for a new article insert. The pipeline fills every field once and
/// the row is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub url_hash: String,
    pub published_at: Option<DateTime<Utc>>,
    pub full_text: Option<String>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub metadata: Value,
}

const ARTICLE_COLUMNS: &str = "id, public_id, source_id, title, url, url_hash, \
                               published_at, full_text, summary, sentiment, metadata, created_at";

/// Returns the article with the given URL hash, or `None`.
///
/// This is the dedup probe: one article per distinct URL, ever.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_article_by_url_hash(
    pool: &PgPool,
    url_hash: &str,
) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url_hash = $1"
    ))
    .bind(url_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new article and returns the created row.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if an article with the same URL hash
/// already exists, or [`DbError::Sqlx`] on other failures.
pub async fn insert_article(pool: &PgPool, article: &NewArticle) -> Result<ArticleRow, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "INSERT INTO articles \
           (source_id, title, url, url_hash, published_at, full_text, summary, sentiment, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(article.source_id)
    .bind(&article.title)
    .bind(&article.url)
    .bind(&article.url_hash)
    .bind(article.published_at)
    .bind(&article.full_text)
    .bind(&article.summary)
    .bind(&article.sentiment)
    .bind(&article.metadata)
    .fetch_one(pool)
    .await
    .map_err(|e| map_insert_error("articles", e))?;

    Ok(row)
}

/// Returns articles newest-first (published date, nulls last, then insertion
/// time), with offset/limit paging.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles \
         ORDER BY published_at DESC NULLS LAST, created_at DESC \
         OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single article by id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_article(pool: &PgPool, article_id: i64) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
    ))
    .bind(article_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the most recently inserted articles joined with their source name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_articles_with_source(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ArticleWithSourceRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleWithSourceRow>(
        "SELECT a.id, a.title, a.url, s.name AS source_name, a.published_at, a.sentiment \
         FROM articles a \
         JOIN sources s ON s.id = a.source_id \
         ORDER BY a.created_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the total article count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_articles(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
