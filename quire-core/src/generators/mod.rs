//! Build artifact generation.
//!
//! Each generator reads the published content under `<output>/content`
//! and writes one family of files into the output directory.
//! [`generate_all`] runs them in order for a full build.

pub mod content_index;
pub mod helpers;
pub mod hosting;
pub mod rss;
pub mod search_index;
pub mod sitemap;

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::{normalize_site_url, GeneratorConfig, SiteConfig};
use crate::scanner::{ContentScanner, ScanError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use content_index::ContentIndexWriter;
pub use hosting::HostingConfigGenerator;
pub use rss::{RssFeedGenerator, MAX_FEED_ITEMS};
pub use search_index::SearchIndexGenerator;
pub use sitemap::SitemapGenerator;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ScanError> for GenerateError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::Cancelled(c) => GenerateError::Cancelled(c),
        }
    }
}

/// Write an artifact, creating parent folders as needed
pub(crate) fn write_artifact(
    path: &Path,
    contents: &str,
    cancel: &CancellationToken,
) -> Result<(), GenerateError> {
    cancel.check()?;
    let io_err = |source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    tracing::debug!("Wrote {:?} ({} bytes)", path, contents.len());
    Ok(())
}

/// What a full generator pass produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub content_files: usize,
    pub search_entries: Option<usize>,
    pub sitemap_urls: Option<usize>,
    pub feed_items: Option<usize>,
    pub hosting_files: Vec<PathBuf>,
    /// Generators that failed; the pass continues past them
    pub failures: Vec<String>,
}

/// Run every enabled generator in order
///
/// scan → content index → search index → sitemap/robots → RSS → hosting.
/// A failing generator is logged and recorded in the summary; only
/// cancellation stops the pass. Sitemap and RSS need a site URL, taken from
/// the generator config or else the site config's `baseUrl`.
pub fn generate_all(
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<GenerationSummary, GenerateError> {
    let site = SiteConfig::load_or_default(config.site_config_path());
    let site_url = config
        .site_url
        .clone()
        .or_else(|| normalize_site_url(&site.base_url));

    let index = ContentScanner::new(config.content_path())
        .with_site_config(config.site_config_path())
        .scan(cancel)?;

    let mut summary = GenerationSummary {
        content_files: index.total_files(),
        ..Default::default()
    };

    record(
        &mut summary,
        "content index",
        ContentIndexWriter::new(config).generate(&index, cancel),
    )?;

    if config.generate_search_index {
        summary.search_entries = record(
            &mut summary,
            "search index",
            SearchIndexGenerator::new(config).generate(&index, cancel),
        )?;
    }

    match site_url.as_deref() {
        Some(url) => {
            if config.generate_sitemap {
                summary.sitemap_urls = record(
                    &mut summary,
                    "sitemap",
                    SitemapGenerator::new(config, url).generate(&index, cancel),
                )?;
            }
            if config.generate_rss_feed {
                let generator =
                    RssFeedGenerator::new(config, url, &site.site_name, site.description.as_deref());
                summary.feed_items = record(&mut summary, "RSS feed", generator.generate(&index, cancel))?;
            }
        }
        None if config.generate_sitemap || config.generate_rss_feed => {
            tracing::warn!("No site URL configured; skipping sitemap and RSS feed");
        }
        None => {}
    }

    if let Some(files) = record(
        &mut summary,
        "hosting config",
        HostingConfigGenerator::new(config).generate(cancel),
    )? {
        summary.hosting_files = files;
    }

    Ok(summary)
}

/// Log a generator failure and keep going; cancellation still propagates
fn record<T>(
    summary: &mut GenerationSummary,
    name: &str,
    result: Result<T, GenerateError>,
) -> Result<Option<T>, GenerateError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GenerateError::Cancelled(c)) => Err(GenerateError::Cancelled(c)),
        Err(e) => {
            tracing::error!("Failed to generate {}: {}", name, e);
            summary.failures.push(name.to_string());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostingProvider;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_generate_all_writes_artifacts() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("wwwroot");
        write(
            &output.join("content/blog/2024-05-01-hello.md"),
            "---\ntitle: Hello\nsummary: First post\n---\n\nHello **world**.",
        );
        write(
            &output.join("content/projects/01-tool/index.md"),
            "---\ntitle: Tool\ntags: [rust]\n---\n\nA tool.",
        );
        write(
            &output.join("site.config.json"),
            r#"{"siteName":"Demo","baseUrl":"https://demo.dev/"}"#,
        );

        let config = GeneratorConfig::new(dir.path(), &output);
        let summary = generate_all(&config, &CancellationToken::new()).unwrap();

        assert_eq!(summary.content_files, 2);
        assert_eq!(summary.search_entries, Some(2));
        assert_eq!(summary.sitemap_urls, Some(6));
        assert_eq!(summary.feed_items, Some(1));
        assert!(summary.failures.is_empty());
        assert!(output.join("content/index.json").is_file());
        assert!(output.join("search-index.json").is_file());
        assert!(output.join("sitemap.xml").is_file());
        assert!(output.join("robots.txt").is_file());
        assert!(output.join("feed.xml").is_file());
        assert!(output.join("_headers").is_file());

        let sitemap = fs::read_to_string(output.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://demo.dev/project/tool</loc>"));
    }

    #[test]
    fn test_generate_all_respects_toggles() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");
        write(&output.join("content/docs/a.md"), "---\ntitle: A\n---\nBody");

        let mut config = GeneratorConfig::new(dir.path(), &output).with_site_url("https://x.dev");
        config.generate_search_index = false;
        config.generate_sitemap = false;
        config.generate_rss_feed = false;
        config.hosting_provider = HostingProvider::None;

        let summary = generate_all(&config, &CancellationToken::new()).unwrap();
        assert_eq!(summary.search_entries, None);
        assert_eq!(summary.sitemap_urls, None);
        assert!(summary.hosting_files.is_empty());
        assert!(output.join("content/index.json").is_file());
        assert!(!output.join("search-index.json").exists());
        assert!(!output.join("sitemap.xml").exists());
    }

    #[test]
    fn test_generate_all_without_site_url() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");
        write(&output.join("content/blog/p.md"), "---\ntitle: P\n---\nBody");

        let summary =
            generate_all(&GeneratorConfig::new(dir.path(), &output), &CancellationToken::new())
                .unwrap();
        assert_eq!(summary.search_entries, Some(1));
        assert_eq!(summary.sitemap_urls, None);
        assert_eq!(summary.feed_items, None);
        assert!(!output.join("feed.xml").exists());
    }

    #[test]
    fn test_generate_all_cancelled() {
        let dir = tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result = generate_all(&GeneratorConfig::new(dir.path(), dir.path()), &token);
        assert!(matches!(result, Err(GenerateError::Cancelled(_))));
    }

    #[test]
    fn test_write_artifact_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        write_artifact(&path, "x", &CancellationToken::new()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }
}
