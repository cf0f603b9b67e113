//! Background ingestion loop.
//!
//! One dedicated task runs a full cycle, then sleeps the configured
//! interval. The sleep races a watch channel so a stop request interrupts
//! it immediately; shutdown latency is bounded by the current cycle, never
//! by the interval.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use perspectiva_core::AppConfig;
use perspectiva_ingest::{run_cycle, ContentFetcher};

/// Floor for the configured cycle interval.
const MIN_INTERVAL_SECS: u64 = 60;

/// Handle to the running ingestion loop, owned by the process lifecycle.
pub struct IngestLoopHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl IngestLoopHandle {
    /// Spawn the loop. The first cycle starts immediately.
    pub fn spawn(pool: PgPool, config: Arc<AppConfig>, fetcher: Arc<ContentFetcher>) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(pool, config, fetcher, stop_rx));
        Self { stop, task }
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "ingest loop task panicked");
        }
    }
}

/// Clamp the configured interval to the minimum.
fn effective_interval(fetch_interval_secs: u64) -> Duration {
    Duration::from_secs(fetch_interval_secs.max(MIN_INTERVAL_SECS))
}

async fn run_loop(
    pool: PgPool,
    config: Arc<AppConfig>,
    fetcher: Arc<ContentFetcher>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let interval = effective_interval(config.fetch_interval_secs);
    tracing::info!(interval_secs = interval.as_secs(), "ingest loop started");

    loop {
        let stats = run_cycle(&pool, &config, &fetcher).await;
        tracing::debug!(?stats, "cycle finished, sleeping");

        tokio::select! {
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    break;
                }
            }
            () = tokio::time::sleep(interval) => {}
        }

        if *stop_rx.borrow() {
            break;
        }
    }

    tracing::info!("ingest loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_clamped_to_the_minimum() {
        assert_eq!(effective_interval(1), Duration::from_secs(60));
        assert_eq!(effective_interval(60), Duration::from_secs(60));
        assert_eq!(effective_interval(300), Duration::from_secs(300));
    }
}
