use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "perspectiva")]
#[command(about = "Perspectiva feed-ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a single ingestion cycle over the configured feeds and exit.
    Ingest,
    /// Apply pending database migrations.
    Migrate,
    /// Print the most recently ingested articles.
    Articles {
        /// Maximum number of rows to print.
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = perspectiva_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = perspectiva_db::PoolConfig::from_app_config(&config);
    let pool = perspectiva_db::connect_pool(&config.database_url, pool_config).await?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest => {
            perspectiva_db::run_migrations(&pool).await?;
            let fetcher = perspectiva_ingest::ContentFetcher::new(config.fetch_timeout_secs)?;
            let stats = perspectiva_ingest::run_cycle(&pool, &config, &fetcher).await;
            println!(
                "cycle complete: {} feeds attempted ({} failed), {} ingested, {} skipped, {} failed",
                stats.feeds_attempted,
                stats.feeds_failed,
                stats.entries_ingested,
                stats.entries_skipped,
                stats.entries_failed
            );
        }
        Commands::Migrate => {
            perspectiva_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
        Commands::Articles { limit } => {
            let rows =
                perspectiva_db::list_recent_articles_with_source(&pool, limit.clamp(1, 200))
                    .await?;
            if rows.is_empty() {
                println!("no articles ingested yet");
            }
            for row in rows {
                let published = row
                    .published_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "[{}] {} | {} | {} | {}",
                    row.id,
                    row.title,
                    row.source_name,
                    published,
                    row.sentiment.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
