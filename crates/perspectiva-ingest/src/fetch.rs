//! HTTP content fetcher for feed documents and article pages.

use std::time::Duration;

use reqwest::Client;

const USER_AGENT: &str = "perspectiva/0.1 (feed-ingest)";

/// HTTP fetcher with a bounded timeout.
///
/// Every failure mode (non-2xx status, connection error, timeout) yields
/// `None` so callers continue the pipeline with degraded information.
/// Retries, if any, happen at the next scheduled cycle, never here.
pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    /// Creates a fetcher whose requests are bounded by `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the underlying client cannot be
    /// constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the response body, or `None` when the
    /// content is unavailable for any reason.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url, error = %e, "fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = %status, "fetch returned non-success status");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!(url, error = %e, "failed to read response body");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new(5).unwrap();
        let body = fetcher.fetch(&format!("{}/page", server.uri())).await;
        assert_eq!(body.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn returns_none_on_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new(5).unwrap();
        assert!(fetcher.fetch(&format!("{}/missing", server.uri())).await.is_none());
    }

    #[tokio::test]
    async fn returns_none_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new(5).unwrap();
        assert!(fetcher.fetch(&format!("{}/err", server.uri())).await.is_none());
    }

    #[tokio::test]
    async fn returns_none_on_connection_error() {
        // Port 1 is never listening.
        let fetcher = ContentFetcher::new(2).unwrap();
        assert!(fetcher.fetch("http://127.0.0.1:1/unreachable").await.is_none());
    }

    #[tokio::test]
    async fn returns_none_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("slow")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new(1).unwrap();
        assert!(fetcher.fetch(&format!("{}/slow", server.uri())).await.is_none());
    }
}
