//! Generate command implementation
use super::output_dir;
use anyhow::{bail, Context, Result};
use quire_core::{generate_all, CancellationToken, GeneratorConfig, HostingProvider};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: Option<PathBuf>,
    pub url: Option<String>,
    pub skip_sitemap: bool,
    pub skip_search: bool,
    pub skip_rss: bool,
    pub search_content_max_length: usize,
    pub hosting: String,
}

/// Run every generator over the site's published output
pub async fn generate_site(site: &Path, opts: GenerateOptions) -> Result<()> {
    if !site.is_dir() {
        bail!("Site path not found: {:?}", site);
    }
    let hosting_provider: HostingProvider = opts.hosting.parse()?;

    let output = output_dir(site, opts.output.as_deref());
    fs::create_dir_all(&output).context("Failed to create output directory")?;

    let mut config = GeneratorConfig::new(site, &output);
    if let Some(url) = opts.url.as_deref() {
        config = config.with_site_url(url);
    }
    config.generate_sitemap = !opts.skip_sitemap;
    config.generate_search_index = !opts.skip_search;
    config.generate_rss_feed = !opts.skip_rss;
    config.search_content_max_length = opts.search_content_max_length;
    config.hosting_provider = hosting_provider;

    tracing::info!("Generating artifacts for {:?}", output);

    let cancel = CancellationToken::new();
    let mut worker = {
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || generate_all(&config, &cancel))
    };

    let result = tokio::select! {
        result = &mut worker => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; cancelling generation");
            cancel.cancel();
            worker.await
        }
    };
    let summary = result
        .context("Generator task failed")?
        .context("Generation failed")?;

    println!("Generated site artifacts in {}", output.display());
    println!("  content files: {}", summary.content_files);
    if let Some(count) = summary.search_entries {
        println!("  search entries: {}", count);
    }
    if let Some(count) = summary.sitemap_urls {
        println!("  sitemap URLs: {}", count);
    }
    if let Some(count) = summary.feed_items {
        println!("  feed items: {}", count);
    }
    for path in &summary.hosting_files {
        println!("  hosting: {}", path.display());
    }
    if !summary.failures.is_empty() {
        tracing::warn!("Failed generators: {}", summary.failures.join(", "));
    }

    Ok(())
}
