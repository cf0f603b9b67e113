use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The feed document could not be parsed at all. Logged as a warning;
    /// the cycle moves on to the next feed.
    #[error("malformed feed {url}: {reason}")]
    MalformedFeed { url: String, reason: String },

    /// An entry link that cannot be parsed as a URL; the entry is skipped.
    #[error("invalid article url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Db(#[from] perspectiva_db::DbError),
}
