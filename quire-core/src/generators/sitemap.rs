//! `sitemap.xml` and `robots.txt`.

use super::helpers::{escape_xml, file_modified};
use super::{write_artifact, GenerateError};
use crate::cancel::CancellationToken;
use crate::config::GeneratorConfig;
use crate::models::ContentIndex;
use crate::slug::slug_from_filename;
use chrono::Utc;

#[derive(Debug, Clone, PartialEq)]
struct SitemapEntry {
    loc: String,
    lastmod: String,
    priority: f32,
}

pub struct SitemapGenerator<'a> {
    config: &'a GeneratorConfig,
    site_url: String,
}

impl<'a> SitemapGenerator<'a> {
    /// `site_url` is the absolute site root; trailing slashes are dropped
    pub fn new(config: &'a GeneratorConfig, site_url: &str) -> Self {
        Self {
            config,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Write `sitemap.xml` and `robots.txt`; returns the URL count
    pub fn generate(
        &self,
        index: &ContentIndex,
        cancel: &CancellationToken,
    ) -> Result<usize, GenerateError> {
        cancel.check()?;
        let entries = self.collect_entries(index);

        let sitemap_path = self.config.output_path.join("sitemap.xml");
        write_artifact(&sitemap_path, &render_sitemap(&entries), cancel)?;
        tracing::info!("Created {:?} ({} URLs)", sitemap_path, entries.len());

        let robots_path = self.config.output_path.join("robots.txt");
        write_artifact(&robots_path, &self.render_robots(), cancel)?;
        tracing::info!("Created {:?}", robots_path);

        Ok(entries.len())
    }

    fn collect_entries(&self, index: &ContentIndex) -> Vec<SitemapEntry> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let content_path = self.config.content_path();

        let static_routes = [("", 1.0), ("/blog", 0.8), ("/contact", 0.5), ("/search", 0.3)];
        let mut entries: Vec<SitemapEntry> = static_routes
            .into_iter()
            .map(|(path, priority)| SitemapEntry {
                loc: format!("{}{}", self.site_url, path),
                lastmod: today.clone(),
                priority,
            })
            .collect();

        for (section, files) in index.routed_sections() {
            let section_path = content_path.join(&section.folder);
            for file in files {
                let lastmod = file_modified(&section_path.join(file))
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| today.clone());
                entries.push(SitemapEntry {
                    loc: format!(
                        "{}{}",
                        self.site_url,
                        section.entry_url(&slug_from_filename(file))
                    ),
                    lastmod,
                    priority: section.sitemap_priority,
                });
            }
        }

        entries
    }

    fn render_robots(&self) -> String {
        format!(
            "# robots.txt for {url}\nUser-agent: *\nAllow: /\n\n# Sitemap\nSitemap: {url}/sitemap.xml\n",
            url = self.site_url
        )
    }
}

fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sitemap_entries() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        let content = config.content_path();
        fs::create_dir_all(content.join("blog")).unwrap();
        fs::write(content.join("blog/2024-01-01-post.md"), "---\ntitle: P\n---\n").unwrap();

        let mut index = ContentIndex::default();
        index.blog.push("2024-01-01-post.md".to_string());
        index.projects.push("02-app/index.md".to_string());
        index.features.push("hero.md".to_string());
        index
            .sections
            .insert("guides".to_string(), vec!["01-setup.md".to_string()]);

        let count = SitemapGenerator::new(&config, "https://example.com/")
            .generate(&index, &CancellationToken::new())
            .unwrap();
        assert_eq!(count, 7);

        let xml = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://example.com</loc>\n    <lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<loc>https://example.com/blog</loc>"));
        assert!(xml.contains("<loc>https://example.com/contact</loc>"));
        assert!(xml.contains("<loc>https://example.com/search</loc>"));
        assert!(xml.contains("<loc>https://example.com/blog/post</loc>"));
        assert!(xml.contains("<loc>https://example.com/project/app</loc>"));
        assert!(xml.contains("<loc>https://example.com/guides/setup</loc>"));
        assert!(xml.contains("<priority>0.7</priority>"));
        assert!(!xml.contains("hero"));

        for loc in xml.lines().filter_map(|l| l.trim().strip_prefix("<loc>")) {
            let path = loc.trim_start_matches("https://");
            assert!(!path.contains("//"), "double slash in {}", loc);
        }
    }

    #[test]
    fn test_lastmod_uses_file_time_or_today() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        let content = config.content_path();
        fs::create_dir_all(content.join("docs")).unwrap();
        fs::write(content.join("docs/a.md"), "x").unwrap();

        let mut index = ContentIndex::default();
        index.docs.push("a.md".to_string());
        index.docs.push("missing.md".to_string());

        let entries = SitemapGenerator::new(&config, "https://example.com").collect_entries(&index);
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[5].lastmod, today);
        assert_eq!(entries[4].lastmod.len(), 10);
        assert_eq!(entries[4].priority, 0.6);
    }

    #[test]
    fn test_robots() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        SitemapGenerator::new(&config, "https://example.com///")
            .generate(&ContentIndex::default(), &CancellationToken::new())
            .unwrap();

        let robots = fs::read_to_string(dir.path().join("robots.txt")).unwrap();
        assert!(robots.contains("User-agent: *"));
        assert!(robots.contains("Allow: /"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
