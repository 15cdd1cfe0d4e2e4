//! Subcommand handlers. Each one wires the collaborators it needs from the
//! loaded configuration and prints to stdout.

use std::sync::Arc;

use anyhow::Context;
use pricematch_core::platforms::DEFAULT_CATEGORY;
use pricematch_core::{load_platforms, AppConfig, PlatformsFile, Repository};
use pricematch_db::{PgRepository, PoolConfig};
use pricematch_scraper::{
    spawn_persist_worker, Browser, ChromiumBrowser, ExtractionSettings, PlatformRegistry,
    SearchService,
};
use tokio::task::JoinHandle;

use crate::output;

fn read_platforms(config: &AppConfig) -> anyhow::Result<PlatformsFile> {
    load_platforms(&config.platforms_path).with_context(|| {
        format!(
            "failed to load platforms from {}",
            config.platforms_path.display()
        )
    })
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = pricematch_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .context("failed to connect to the database")?;
    pricematch_db::health_check(&pool).await?;
    Ok(pool)
}

/// Builds the search service and the persistence worker behind it.
async fn build_service(config: &AppConfig) -> anyhow::Result<(SearchService, JoinHandle<()>)> {
    let platforms = read_platforms(config)?;
    let pool = connect(config).await?;
    let repository: Arc<dyn Repository> = Arc::new(PgRepository::new(pool));

    let settings = ExtractionSettings::from_app_config(config);
    let browser: Arc<dyn Browser> = Arc::new(ChromiumBrowser::new(settings.chrome_path.clone()));
    let registry = PlatformRegistry::from_config(&platforms, &browser, &settings);

    let (queue, worker) = spawn_persist_worker(Arc::clone(&repository));
    let service = SearchService::new(registry, repository, Arc::new(queue), settings);
    Ok((service, worker))
}

pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (service, worker) = build_service(config).await?;
    let results = service.search(query, category).await;

    // Dropping the service closes the queue so the worker can flush and exit.
    drop(service);
    if let Err(e) = worker.await {
        tracing::warn!(error = %e, "persistence worker did not finish cleanly");
    }

    let results = results?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", output::format_results(&results));
    }
    Ok(())
}

pub(crate) async fn run_suggest(config: &AppConfig, prefix: &str, json: bool) -> anyhow::Result<()> {
    let (service, worker) = build_service(config).await?;
    let names = service.suggest(prefix).await;
    drop(service);
    if let Err(e) = worker.await {
        tracing::warn!(error = %e, "persistence worker did not finish cleanly");
    }

    let names = names?;
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

pub(crate) fn run_platforms(config: &AppConfig, category: Option<&str>) -> anyhow::Result<()> {
    let platforms = read_platforms(config)?;
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);
    print!("{}", output::format_route(&platforms, category));
    Ok(())
}

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = pricematch_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}
