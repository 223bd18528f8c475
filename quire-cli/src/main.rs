//! # quire CLI
//!
//! Command-line interface for the quire static site content pipeline.

mod commands;

use clap::{Parser, Subcommand};
use quire_core::config::DEFAULT_SEARCH_CONTENT_MAX_LENGTH;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the content index, search index, sitemap, feed and hosting files
    Generate {
        /// Site project folder
        #[arg(long)]
        site: PathBuf,

        /// Published output folder (defaults to <site>/wwwroot)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Absolute site URL used in the sitemap and feed
        #[arg(long, env = "QUIRE_SITE_URL")]
        url: Option<String>,

        /// Do not write sitemap.xml and robots.txt
        #[arg(long)]
        skip_sitemap: bool,

        /// Do not write search-index.json
        #[arg(long)]
        skip_search: bool,

        /// Do not write feed.xml
        #[arg(long)]
        skip_rss: bool,

        /// Maximum plain-text characters per search entry
        #[arg(long, default_value_t = DEFAULT_SEARCH_CONTENT_MAX_LENGTH)]
        search_content_max_length: usize,

        /// Hosting provider (cloudflare, netlify, vercel, github, none)
        #[arg(long, default_value = "cloudflare")]
        hosting: String,
    },

    /// Search the generated site content
    Search {
        /// Search query
        query: String,

        /// Site project folder
        #[arg(long)]
        site: PathBuf,

        /// Published output folder (defaults to <site>/wwwroot)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Maximum results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate {
            site,
            output,
            url,
            skip_sitemap,
            skip_search,
            skip_rss,
            search_content_max_length,
            hosting,
        } => {
            let opts = commands::GenerateOptions {
                output,
                url,
                skip_sitemap,
                skip_search,
                skip_rss,
                search_content_max_length,
                hosting,
            };
            commands::generate_site(&site, opts).await
        }
        Commands::Search {
            query,
            site,
            output,
            limit,
            json,
        } => {
            let opts = commands::SearchOptions { output, limit, json };
            commands::search_site(&site, &query, opts)
        }
    }
}
