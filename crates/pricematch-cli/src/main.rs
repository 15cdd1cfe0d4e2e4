mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricematch")]
#[command(about = "Compare retailer prices for a product search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search stored listings, scraping the routed retailers on a miss
    Search {
        query: String,
        /// Category used to pick retailers; unknown categories use the default route
        #[arg(long, short)]
        category: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest stored product names starting with a prefix
    Suggest {
        prefix: String,
        #[arg(long)]
        json: bool,
    },
    /// Show the retailers routed for a category
    Platforms {
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pricematch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Search {
            query,
            category,
            json,
        } => commands::run_search(&config, &query, category.as_deref(), json).await,
        Commands::Suggest { prefix, json } => commands::run_suggest(&config, &prefix, json).await,
        Commands::Platforms { category } => commands::run_platforms(&config, category.as_deref()),
        Commands::Migrate => commands::run_migrate(&config).await,
    }
}
