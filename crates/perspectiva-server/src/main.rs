mod api;
mod ingest_loop;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(perspectiva_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = perspectiva_db::PoolConfig::from_app_config(&config);
    let pool = perspectiva_db::connect_pool(&config.database_url, pool_config).await?;
    perspectiva_db::run_migrations(&pool).await?;

    let fetcher = Arc::new(perspectiva_ingest::ContentFetcher::new(
        config.fetch_timeout_secs,
    )?);

    let loop_handle =
        ingest_loop::IngestLoopHandle::spawn(pool.clone(), Arc::clone(&config), Arc::clone(&fetcher));

    let app = build_app(AppState {
        pool,
        config: Arc::clone(&config),
        fetcher,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    loop_handle.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
