//! Search command implementation
use super::output_dir;
use anyhow::{bail, Context, Result};
use quire_core::{GeneratorConfig, LocalIndexSource, SearchResult, SearchService};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub output: Option<PathBuf>,
    pub limit: usize,
    pub json: bool,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    limit: usize,
    total: usize,
    results: &'a [SearchResult],
}

/// Search the site, using `search-index.json` when it exists
pub fn search_site(site: &Path, query: &str, opts: SearchOptions) -> Result<()> {
    if !site.is_dir() {
        bail!("Site path not found: {:?}", site);
    }

    let config = GeneratorConfig::new(site, output_dir(site, opts.output.as_deref()));
    let service = SearchService::new(LocalIndexSource::new(config));
    let results = service.search(query);
    let shown = &results[..results.len().min(opts.limit)];

    if opts.json {
        let output = SearchOutput {
            query,
            limit: opts.limit,
            total: results.len(),
            results: shown,
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize results")?;
        println!("{json}");
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found for '{}'", query);
        return Ok(());
    }

    println!("Found {} results for '{}':\n", results.len(), query);
    for result in shown {
        println!("[{}] {}", result.entry_type, result.title);
        println!("  {}", result.url);
        if !result.excerpt.is_empty() {
            println!("  {}", result.excerpt);
        }
        println!();
    }
    if results.len() > shown.len() {
        println!("  ... and {} more results", results.len() - shown.len());
    }

    Ok(())
}
