//! Live integration tests for the ingestion pipeline using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness; feed servers are wiremock instances. The `migrations`
//! path is relative to the crate root (`crates/perspectiva-ingest/`), so
//! `"../../migrations"` resolves to the workspace migration directory.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use perspectiva_core::AppConfig;
use perspectiva_db::{count_articles, insert_article, insert_source, DbError, NewArticle};
use perspectiva_ingest::{hash_url, run_cycle, ContentFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config(feeds: Vec<String>) -> AppConfig {
    AppConfig {
        database_url: "unused".to_string(),
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        log_level: "debug".to_string(),
        feeds,
        fetch_interval_secs: 300,
        max_items_per_feed: 15,
        summary_sentences: 3,
        fetch_timeout_secs: 5,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
    }
}

fn long_description(tag: &str) -> String {
    format!(
        "{tag}: a deliberately long description so the inline summary clears \
         the minimum extraction length without a page fetch. {}",
        "More detail follows here. ".repeat(4)
    )
}

fn rss_feed(channel_title: &str, items: &[(&str, Option<String>, String)]) -> String {
    let mut body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>{channel_title}</title>\
         <link>https://example.test</link><description>test</description>"
    );
    for (title, link, description) in items {
        body.push_str("<item>");
        body.push_str(&format!("<title>{title}</title>"));
        if let Some(link) = link {
            body.push_str(&format!("<link>{link}</link>"));
        }
        body.push_str(&format!("<description>{description}</description>"));
        body.push_str("</item>");
    }
    body.push_str("</channel></rss>");
    body
}

async fn mount_feed(server: &MockServer, feed_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(feed_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ingesting_the_same_feed_twice_is_idempotent(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let body = rss_feed(
        "Idempotence Weekly",
        &[
            (
                "First",
                Some(format!("{}/stories/1", server.uri())),
                long_description("first"),
            ),
            (
                "Second",
                Some(format!("{}/stories/2", server.uri())),
                long_description("second"),
            ),
        ],
    );
    mount_feed(&server, "/rss.xml", body).await;

    let config = test_config(vec![format!("{}/rss.xml", server.uri())]);
    let fetcher = ContentFetcher::new(config.fetch_timeout_secs).unwrap();

    let first = run_cycle(&pool, &config, &fetcher).await;
    assert_eq!(first.entries_ingested, 2);
    assert_eq!(count_articles(&pool).await.unwrap(), 2);

    let second = run_cycle(&pool, &config, &fetcher).await;
    assert_eq!(second.entries_ingested, 0, "second pass must create no rows");
    assert_eq!(second.entries_skipped, 2);
    assert_eq!(count_articles(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn entries_from_one_feed_share_a_source(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let body = rss_feed(
        "Shared Source Daily",
        &[
            (
                "A",
                Some(format!("{}/stories/a", server.uri())),
                long_description("a"),
            ),
            (
                "B",
                Some(format!("{}/stories/b", server.uri())),
                long_description("b"),
            ),
        ],
    );
    mount_feed(&server, "/rss.xml", body).await;

    let config = test_config(vec![format!("{}/rss.xml", server.uri())]);
    let fetcher = ContentFetcher::new(config.fetch_timeout_secs).unwrap();
    run_cycle(&pool, &config, &fetcher).await;

    let source_ids: Vec<i64> = sqlx::query_scalar("SELECT DISTINCT source_id FROM articles")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(source_ids.len(), 1, "both entries must resolve to one source");

    let source_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(source_count, 1);

    let name: String = sqlx::query_scalar("SELECT name FROM sources")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Shared Source Daily", "feed title names the source");
}

#[sqlx::test(migrations = "../../migrations")]
async fn malformed_feed_does_not_block_other_feeds(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_feed(&server, "/broken.xml", "definitely not a feed".to_string()).await;
    let good = rss_feed(
        "Still Working",
        &[(
            "Only story",
            Some(format!("{}/stories/solo", server.uri())),
            long_description("solo"),
        )],
    );
    mount_feed(&server, "/good.xml", good).await;

    let config = test_config(vec![
        format!("{}/broken.xml", server.uri()),
        format!("{}/good.xml", server.uri()),
    ]);
    let fetcher = ContentFetcher::new(config.fetch_timeout_secs).unwrap();

    let stats = run_cycle(&pool, &config, &fetcher).await;
    assert_eq!(stats.feeds_attempted, 2);
    assert_eq!(stats.feeds_failed, 1);
    assert_eq!(stats.entries_ingested, 1);
    assert_eq!(count_articles(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn entries_without_links_are_filtered(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let body = rss_feed(
        "Linkless Gazette",
        &[
            (
                "Has a link",
                Some(format!("{}/stories/1", server.uri())),
                long_description("one"),
            ),
            ("No link at all", None, long_description("two")),
            (
                "Also has a link",
                Some(format!("{}/stories/3", server.uri())),
                long_description("three"),
            ),
        ],
    );
    mount_feed(&server, "/rss.xml", body).await;

    let config = test_config(vec![format!("{}/rss.xml", server.uri())]);
    let fetcher = ContentFetcher::new(config.fetch_timeout_secs).unwrap();

    let stats = run_cycle(&pool, &config, &fetcher).await;
    assert_eq!(stats.entries_ingested, 2, "only linked entries become articles");
}

#[sqlx::test(migrations = "../../migrations")]
async fn url_hash_uniqueness_is_enforced_by_the_store(pool: sqlx::PgPool) {
    let source = insert_source(&pool, "Example", "https://example.test", None)
        .await
        .unwrap();

    let article = NewArticle {
        source_id: source.id,
        title: "Example".to_string(),
        url: "https://example.test/story".to_string(),
        url_hash: hash_url("https://example.test/story"),
        published_at: None,
        full_text: Some("text".to_string()),
        summary: Some("summary".to_string()),
        sentiment: Some("neutral".to_string()),
        metadata: serde_json::Value::Null,
    };

    insert_article(&pool, &article).await.unwrap();
    let second = insert_article(&pool, &article).await;
    assert!(
        matches!(second, Err(DbError::Duplicate(_))),
        "expected Duplicate, got: {second:?}"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn ingested_articles_carry_summary_sentiment_and_metadata(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    // Long enough to clear the extraction minimum, short enough that the
    // summarizer returns it unmodified.
    let description = "Markets saw great growth and success across the board today. \
                       Analysts described the results in considerable detail afterwards."
        .to_string();
    let body = rss_feed(
        "Metadata Monitor",
        &[(
            "Growth story",
            Some(format!("{}/stories/growth", server.uri())),
            description.clone(),
        )],
    );
    mount_feed(&server, "/rss.xml", body).await;

    let feed_url = format!("{}/rss.xml", server.uri());
    let config = test_config(vec![feed_url.clone()]);
    let fetcher = ContentFetcher::new(config.fetch_timeout_secs).unwrap();
    run_cycle(&pool, &config, &fetcher).await;

    let row = perspectiva_db::list_articles(&pool, 0, 10)
        .await
        .unwrap()
        .pop()
        .expect("one article ingested");

    assert_eq!(row.sentiment.as_deref(), Some("positive"));
    assert!(row.summary.as_deref().is_some_and(|s| !s.is_empty()));
    assert!(row.full_text.as_deref().is_some_and(|t| t.len() >= 100));
    assert_eq!(row.metadata["feed_url"], feed_url.as_str());
    assert_eq!(row.metadata["original_title"], "Growth story");
}
