//! Extract one article and print the pipeline result as JSON.
//!
//! ```text
//! extract_article <URL> [--feed feed.json] [--config options.json]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::error;
use tracing_subscriber::EnvFilter;

use rs_newsextract::{FeedItem, Options, Pipeline};

#[derive(Debug, Parser)]
#[command(name = "extract_article", version, about = "Adaptive article extraction with fallbacks")]
struct Cli {
    /// Article URL.
    url: String,

    /// Feed item metadata as JSON.
    #[arg(long, value_name = "FILE")]
    feed: Option<PathBuf>,

    /// Pipeline options as JSON (camelCase keys, missing keys use defaults).
    #[arg(long, value_name = "FILE", env = "NEWSEXTRACT_CONFIG")]
    config: Option<PathBuf>,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(io::stderr)
        .init();

    let options: Options = match cli.config.as_deref().map(read_json).transpose() {
        Ok(options) => options.unwrap_or_default(),
        Err(e) => {
            error!("Invalid config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let feed: Option<FeedItem> = match cli.feed.as_deref().map(read_json).transpose() {
        Ok(feed) => feed,
        Err(e) => {
            error!("Invalid feed item: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::new(options) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = pipeline.extract(&cli.url, feed.as_ref()).await;

    let json = if cli.compact {
        serde_json::to_string(&result)
    } else {
        serde_json::to_string_pretty(&result)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize result: {e}");
            ExitCode::FAILURE
        }
    }
}
