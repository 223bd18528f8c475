//! Configuration parsing and management.
//!
//! Two layers: [`SiteConfig`] is the site's own `site.config.json`, shared
//! with the front end; [`GeneratorConfig`] holds the options of one
//! generator run.

use crate::frontmatter::normalize_key;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Unknown hosting provider '{0}' (expected cloudflare, netlify, vercel, github or none)")]
    UnknownHostingProvider(String),
}

/// `site.config.json`
///
/// Keys are matched case-insensitively. Only the fields the pipeline reads
/// are modelled; anything else in the file is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(rename = "sitename")]
    pub site_name: String,
    #[serde(rename = "baseurl")]
    pub base_url: String,
    pub description: Option<String>,
    #[serde(rename = "defaulttheme")]
    pub default_theme: String,
    pub search: SearchConfig,
    pub seo: SeoConfig,
    #[serde(rename = "contentsections")]
    pub content_sections: Vec<ContentSectionConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            base_url: String::new(),
            description: None,
            default_theme: "dark".to_string(),
            search: SearchConfig::default(),
            seo: SeoConfig::default(),
            content_sections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub placeholder: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            placeholder: "Search...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    #[serde(rename = "defaultimage")]
    pub default_image: String,
    #[serde(rename = "twitterhandle")]
    pub twitter_handle: Option<String>,
    #[serde(rename = "facebookappid")]
    pub facebook_app_id: Option<String>,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            default_image: "/images/social-card.png".to_string(),
            twitter_handle: None,
            facebook_app_id: None,
        }
    }
}

/// A user-defined content section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentSectionConfig {
    pub folder: String,
    pub route: String,
    #[serde(rename = "menutitle")]
    pub menu_title: String,
    /// Page layout used by the front end
    #[serde(rename = "type")]
    pub section_type: String,
}

impl Default for ContentSectionConfig {
    fn default() -> Self {
        Self {
            folder: String::new(),
            route: String::new(),
            menu_title: String::new(),
            section_type: "article".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parse JSON text with case-insensitive keys
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(serde_json::from_value(normalize_keys(value))?)
    }

    /// Load from `path`, falling back to defaults with a warning
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default site config ({:?}): {}", path, e);
                Self::default()
            }
        }
    }
}

fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Hosting provider whose config files are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostingProvider {
    #[default]
    Cloudflare,
    Netlify,
    Vercel,
    Github,
    None,
}

impl FromStr for HostingProvider {
    type Err = ConfigError;

    /// Parse a provider name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloudflare" => Ok(Self::Cloudflare),
            "netlify" => Ok(Self::Netlify),
            "vercel" => Ok(Self::Vercel),
            "github" => Ok(Self::Github),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::UnknownHostingProvider(s.to_string())),
        }
    }
}

impl HostingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloudflare => "cloudflare",
            Self::Netlify => "netlify",
            Self::Vercel => "vercel",
            Self::Github => "github",
            Self::None => "none",
        }
    }
}

pub const DEFAULT_SEARCH_CONTENT_MAX_LENGTH: usize = 10_000;

/// Options for one generator run
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub site_path: PathBuf,
    pub output_path: PathBuf,
    /// Absolute site URL, without trailing slash
    pub site_url: Option<String>,
    pub generate_sitemap: bool,
    pub generate_search_index: bool,
    pub generate_rss_feed: bool,
    pub hosting_provider: HostingProvider,
    pub search_content_max_length: usize,
}

impl GeneratorConfig {
    pub fn new(site_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            site_path: site_path.into(),
            output_path: output_path.into(),
            site_url: None,
            generate_sitemap: true,
            generate_search_index: true,
            generate_rss_feed: true,
            hosting_provider: HostingProvider::default(),
            search_content_max_length: DEFAULT_SEARCH_CONTENT_MAX_LENGTH,
        }
    }

    pub fn with_site_url(mut self, url: &str) -> Self {
        self.site_url = normalize_site_url(url);
        self
    }

    /// Published content folder: `<output>/content`
    pub fn content_path(&self) -> PathBuf {
        self.output_path.join("content")
    }

    /// `<output>/site.config.json`
    pub fn site_config_path(&self) -> PathBuf {
        self.output_path.join("site.config.json")
    }
}

/// Trim whitespace and trailing slashes; empty input means no URL
pub fn normalize_site_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_case_insensitive_json() {
        let config = SiteConfig::from_json(
            r#"{
  "SiteName": "My Site",
  "baseurl": "https://example.com/",
  "search": { "Enabled": false },
  "contentSections": [
    { "Folder": "tutorials", "Route": "tutorials", "MenuTitle": "Tutorials", "type": "docs" }
  ],
  "navigation": [{ "title": "Home", "href": "/" }]
}"#,
        )
        .unwrap();

        assert_eq!(config.site_name, "My Site");
        assert_eq!(config.base_url, "https://example.com/");
        assert!(!config.search.enabled);
        assert_eq!(config.search.placeholder, "Search...");
        assert_eq!(config.content_sections.len(), 1);
        assert_eq!(config.content_sections[0].folder, "tutorials");
        assert_eq!(config.content_sections[0].menu_title, "Tutorials");
        assert_eq!(config.content_sections[0].section_type, "docs");
    }

    #[test]
    fn test_defaults() {
        let config = SiteConfig::from_json("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.default_theme, "dark");
        assert_eq!(config.seo.default_image, "/images/social-card.png");
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempdir().unwrap();
        let config = SiteConfig::load_or_default(dir.path().join("site.config.json"));
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("site.config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SiteConfig::from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_hosting_provider_from_str() {
        assert_eq!(
            "Cloudflare".parse::<HostingProvider>().unwrap(),
            HostingProvider::Cloudflare
        );
        assert_eq!(" none ".parse::<HostingProvider>().unwrap(), HostingProvider::None);
        assert!(matches!(
            "heroku".parse::<HostingProvider>(),
            Err(ConfigError::UnknownHostingProvider(name)) if name == "heroku"
        ));
        assert_eq!(HostingProvider::Github.as_str(), "github");
    }

    #[test]
    fn test_generator_paths() {
        let config = GeneratorConfig::new("site", "site/wwwroot");
        assert_eq!(config.content_path(), PathBuf::from("site/wwwroot/content"));
        assert_eq!(
            config.site_config_path(),
            PathBuf::from("site/wwwroot/site.config.json")
        );
        assert_eq!(config.search_content_max_length, 10_000);
        assert_eq!(config.hosting_provider, HostingProvider::Cloudflare);
    }

    #[test]
    fn test_normalize_site_url() {
        assert_eq!(
            normalize_site_url("https://example.com//"),
            Some("https://example.com".to_string())
        );
        assert_eq!(normalize_site_url("  "), None);
        let config = GeneratorConfig::new("s", "o").with_site_url("https://x.dev/");
        assert_eq!(config.site_url.as_deref(), Some("https://x.dev"));
    }
}
