//! RSS 2.0 feed of the latest blog posts.

use super::helpers::{escape_xml, file_modified, read_content_file};
use super::{write_artifact, GenerateError};
use crate::cancel::{CancellationToken, Cancelled};
use crate::config::GeneratorConfig;
use crate::frontmatter::extract_frontmatter;
use crate::models::ContentIndex;
use crate::slug::slug_from_filename;
use chrono::{DateTime, Utc};

/// Only the newest posts go into the feed
pub const MAX_FEED_ITEMS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
struct RssItem {
    title: String,
    link: String,
    description: String,
    pub_date: String,
    author: Option<String>,
}

pub struct RssFeedGenerator<'a> {
    config: &'a GeneratorConfig,
    site_url: String,
    site_name: String,
    site_description: String,
}

impl<'a> RssFeedGenerator<'a> {
    /// Without a description the channel uses `Latest posts from {name}`
    pub fn new(
        config: &'a GeneratorConfig,
        site_url: &str,
        site_name: &str,
        site_description: Option<&str>,
    ) -> Self {
        let site_description = site_description
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Latest posts from {}", site_name));

        Self {
            config,
            site_url: site_url.trim_end_matches('/').to_string(),
            site_name: site_name.to_string(),
            site_description,
        }
    }

    /// Write `feed.xml`; returns the item count
    pub fn generate(
        &self,
        index: &ContentIndex,
        cancel: &CancellationToken,
    ) -> Result<usize, GenerateError> {
        let items = self.collect_items(index, cancel)?;
        let path = self.config.output_path.join("feed.xml");
        write_artifact(&path, &self.render(&items, Utc::now()), cancel)?;

        tracing::info!("Created {:?} ({} items)", path, items.len());
        Ok(items.len())
    }

    fn collect_items(
        &self,
        index: &ContentIndex,
        cancel: &CancellationToken,
    ) -> Result<Vec<RssItem>, Cancelled> {
        let blog_path = self.config.content_path().join("blog");
        let mut items = Vec::new();

        for file in index.blog.iter().take(MAX_FEED_ITEMS) {
            let path = blog_path.join(file);
            let Some(markdown) = read_content_file(&path, cancel)? else {
                continue;
            };
            let (Some(frontmatter), _) = extract_frontmatter(&markdown) else {
                tracing::warn!("Skipping {:?} in feed: no frontmatter", path);
                continue;
            };

            let slug = slug_from_filename(file);
            let published = frontmatter
                .published_at()
                .or_else(|| file_modified(&path))
                .unwrap_or_else(Utc::now);

            items.push(RssItem {
                title: frontmatter.title.clone().unwrap_or_else(|| slug.clone()),
                link: format!("{}/blog/{}", self.site_url, slug),
                description: frontmatter.summary_or_description().to_string(),
                pub_date: rfc1123(&published),
                author: frontmatter.author.clone(),
            });
        }

        Ok(items)
    }

    fn render(&self, items: &[RssItem], built_at: DateTime<Utc>) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
        xml.push_str("  <channel>\n");
        xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&self.site_name)));
        xml.push_str(&format!("    <link>{}</link>\n", escape_xml(&self.site_url)));
        xml.push_str(&format!(
            "    <description>{}</description>\n",
            escape_xml(&self.site_description)
        ));
        xml.push_str("    <language>en-us</language>\n");
        xml.push_str(&format!(
            "    <lastBuildDate>{}</lastBuildDate>\n",
            rfc1123(&built_at)
        ));
        xml.push_str(&format!(
            "    <atom:link href=\"{}/feed.xml\" rel=\"self\" type=\"application/rss+xml\"/>\n",
            escape_xml(&self.site_url)
        ));

        for item in items {
            let link = escape_xml(&item.link);
            xml.push_str("    <item>\n");
            xml.push_str(&format!("      <title>{}</title>\n", escape_xml(&item.title)));
            xml.push_str(&format!("      <link>{}</link>\n", link));
            xml.push_str(&format!(
                "      <description>{}</description>\n",
                escape_xml(&item.description)
            ));
            xml.push_str(&format!("      <pubDate>{}</pubDate>\n", item.pub_date));
            xml.push_str(&format!("      <guid isPermaLink=\"true\">{}</guid>\n", link));
            if let Some(author) = item.author.as_deref().filter(|a| !a.is_empty()) {
                xml.push_str(&format!("      <author>{}</author>\n", escape_xml(author)));
            }
            xml.push_str("    </item>\n");
        }

        xml.push_str("  </channel>\n");
        xml.push_str("</rss>\n");
        xml
    }
}

/// RFC 1123 date as used by RSS, e.g. `Mon, 15 Jan 2024 00:00:00 GMT`
fn rfc1123(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
