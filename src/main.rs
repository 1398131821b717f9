//! Application entry point: recipe finder.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse command-line arguments.
//! 3. Load [`AppConfig`] (from `--config` or the platform default; returns
//!    defaults on first run) and apply flag overrides.
//! 4. Build the HTTP recipe service from config.
//! 5. Dispatch to the selected command.  `interactive` also builds the
//!    speech capability and runs until stdin closes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use recipe_finder::{
    api::{HttpRecipeService, RecipeService},
    cli,
    config::AppConfig,
};

/// Find recipes by typed or spoken query.
#[derive(Parser)]
#[command(name = "recipe-finder", version, about, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Recipe service base URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the catalog as category rows
    Browse,
    /// Search the catalog and generate a recipe for a query
    Search {
        /// Free-text query, e.g. "quick vegetarian dinner"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show one recipe in full
    Show {
        /// Catalog recipe id
        id: u64,
    },
    /// Interactive search with optional voice input
    Interactive,
}

fn load_config(cli: &Cli) -> AppConfig {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    if let Some(server) = &cli.server {
        config.service.base_url = server.clone();
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Arguments
    let args = Cli::parse();

    // 3. Configuration
    let config = load_config(&args);
    log::info!("recipe service at {}", config.service.base_url);

    // 4. Recipe service
    let service: Arc<dyn RecipeService> = Arc::new(HttpRecipeService::from_config(&config.service));

    // 5. Command
    match args.command {
        Command::Browse => cli::browse(service, &config.display).await,
        Command::Search { query } => cli::search(service, &query.join(" "), &config.display).await,
        Command::Show { id } => cli::show(service, id).await,
        Command::Interactive => {
            let recognizer = cli::recognizer_from_config(&config);
            cli::interactive(service, recognizer, &config.display).await
        }
    }
}
