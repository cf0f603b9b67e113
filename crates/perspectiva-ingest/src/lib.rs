//! Feed ingestion pipeline for Perspectiva.
//!
//! Polls configured RSS/Atom feeds, deduplicates entries by URL hash,
//! extracts readable article text through a layered fallback chain,
//! summarizes it, classifies sentiment with a lexical scorer, resolves each
//! entry to a persisted source, and commits the resulting article rows.

pub mod error;
pub mod extract;
pub mod feed;
pub mod fetch;
pub mod pipeline;
pub mod resolve;
pub mod sentiment;
pub mod summarize;

pub use error::IngestError;
pub use extract::{extract_entry_text, strip_html};
pub use feed::{parse_feed, FeedEntry, ParsedFeed};
pub use fetch::ContentFetcher;
pub use pipeline::{hash_url, run_cycle, CycleStats, EntryOutcome, SkipReason};
pub use resolve::resolve_source;
pub use sentiment::classify;
pub use summarize::summarize;
