//! wordcrawl CLI
//!
//! Crawls the seed pages named in a config file and reports the most
//! popular words.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wordcrawl::{error::Result, models::Config, pipeline, storage::LocalStorage};

/// wordcrawl - parallel word-frequency crawler
#[derive(Parser, Debug)]
#[command(
    name = "wordcrawl",
    version,
    about = "Deadline-bounded parallel word-frequency crawler"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the configured seed pages
    Crawl {
        /// Path to a TOML or JSON crawl configuration
        config: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Path to a TOML or JSON crawl configuration
        config: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Crawl { config } => {
            let config = Config::load(&config)?;
            log::info!("Loaded configuration with {} seed(s)", config.start_pages.len());

            let storage = LocalStorage::from_config(&config);
            let result = pipeline::run_crawler(&config, &storage).await?;

            log::info!(
                "Crawl complete: {} URL(s) visited, {} popular word(s)",
                result.urls_visited(),
                result.word_counts().len()
            );
        }

        Command::Validate { config: path } => {
            log::info!("Validating {}...", path.display());

            let config = Config::load(&path)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!(
                "Config OK: {} seed(s), {:?} crawler, max depth {}, timeout {}s",
                config.start_pages.len(),
                config.implementation()?,
                config.max_depth,
                config.timeout_secs
            );
        }
    }

    Ok(())
}
