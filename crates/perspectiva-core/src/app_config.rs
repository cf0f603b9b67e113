use std::net::SocketAddr;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// RSS/Atom feed URLs polled each cycle.
    pub feeds: Vec<String>,
    /// Seconds between ingestion cycles. The loop clamps this to >= 60.
    pub fetch_interval_secs: u64,
    pub max_items_per_feed: usize,
    pub summary_sentences: usize,
    pub fetch_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("feeds", &self.feeds)
            .field("fetch_interval_secs", &self.fetch_interval_secs)
            .field("max_items_per_feed", &self.max_items_per_feed)
            .field("summary_sentences", &self.summary_sentences)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
