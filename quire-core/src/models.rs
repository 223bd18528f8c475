//! Core data models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

/// Frontmatter metadata parsed from a content file
///
/// Field names are the normalised keys (lower-case, no `_`/`-`) produced by
/// the frontmatter parser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontmatterData {
    #[serde(deserialize_with = "scalar_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub summary: Option<String>,
    #[serde(rename = "publishdate", deserialize_with = "scalar_text")]
    pub publish_date: Option<String>,
    #[serde(deserialize_with = "scalar_list")]
    pub tags: Vec<String>,
    #[serde(rename = "featuredimage", deserialize_with = "scalar_text")]
    pub featured_image: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub author: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub url: Option<String>,
    #[serde(rename = "menutitle", deserialize_with = "scalar_text")]
    pub menu_title: Option<String>,
    #[serde(rename = "showinmenu")]
    pub show_in_menu: bool,
    #[serde(rename = "showinheader")]
    pub show_in_header: bool,
    #[serde(rename = "isfirstproject")]
    pub is_first_project: bool,
    #[serde(deserialize_with = "scalar_text")]
    pub parent: Option<String>,
    /// Emoji or path to an SVG
    #[serde(deserialize_with = "scalar_text")]
    pub icon: Option<String>,
}

impl Default for FrontmatterData {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            summary: None,
            publish_date: None,
            tags: Vec::new(),
            featured_image: None,
            author: None,
            url: None,
            menu_title: None,
            show_in_menu: true,
            show_in_header: false,
            is_first_project: false,
            parent: None,
            icon: None,
        }
    }
}

impl FrontmatterData {
    /// Parse `publishDate` as a UTC timestamp
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
    /// bare `YYYY-MM-DD` (midnight UTC).
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.publish_date.as_deref()?.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Summary if present, then description, then empty
    pub fn summary_or_description(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

/// Text of a YAML scalar; numbers and booleans keep their written form
fn scalar_to_text<E: serde::de::Error>(value: YamlValue) -> Result<Option<String>, E> {
    match value {
        YamlValue::Null => Ok(None),
        YamlValue::String(s) => Ok(Some(s)),
        YamlValue::Number(n) => Ok(Some(n.to_string())),
        YamlValue::Bool(b) => Ok(Some(b.to_string())),
        YamlValue::Tagged(tagged) => scalar_to_text(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err(E::custom("expected a scalar value"))
        }
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_text(YamlValue::deserialize(deserializer)?)
}

/// A list of scalars; null gives an empty list and null items are dropped
fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<YamlValue>>::deserialize(deserializer)?.unwrap_or_default();
    let mut list = Vec::with_capacity(items.len());
    for item in items {
        if let Some(text) = scalar_to_text(item)? {
            list.push(text);
        }
    }
    Ok(list)
}

/// Files found under each content section, relative to the section folder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentIndex {
    pub blog: Vec<String>,
    pub projects: Vec<String>,
    pub docs: Vec<String>,
    pub articles: Vec<String>,
    pub features: Vec<String>,
    /// Site-config sections keyed by folder name
    pub sections: BTreeMap<String, Vec<String>>,
}

impl ContentIndex {
    /// Files recorded for a section
    pub fn files(&self, section: &SectionDescriptor) -> &[String] {
        match section.folder.as_str() {
            "blog" => &self.blog,
            "projects" => &self.projects,
            "docs" => &self.docs,
            "articles" => &self.articles,
            "features" => &self.features,
            other => self.sections.get(other).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Store the files found for a section
    pub fn set_files(&mut self, section: &SectionDescriptor, files: Vec<String>) {
        match section.folder.as_str() {
            "blog" => self.blog = files,
            "projects" => self.projects = files,
            "docs" => self.docs = files,
            "articles" => self.articles = files,
            "features" => self.features = files,
            other => {
                self.sections.insert(other.to_string(), files);
            }
        }
    }

    /// Sections that become pages, in artifact order, with their files
    ///
    /// Builtins come first (blog, projects, articles, docs), then dynamic
    /// sections by folder name.
    pub fn routed_sections(&self) -> Vec<(SectionDescriptor, &[String])> {
        let mut routed: Vec<(SectionDescriptor, &[String])> = Vec::new();
        for folder in ["blog", "projects", "articles", "docs"] {
            if let Some(section) = SectionDescriptor::builtin(folder) {
                let files = self.files(&section);
                routed.push((section, files));
            }
        }
        for (folder, files) in &self.sections {
            routed.push((SectionDescriptor::dynamic(folder), files.as_slice()));
        }
        routed
    }

    pub fn total_files(&self) -> usize {
        self.blog.len()
            + self.projects.len()
            + self.docs.len()
            + self.articles.len()
            + self.features.len()
            + self.sections.values().map(Vec::len).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLayout {
    /// `.md`/`.mdx` files directly in the folder
    Flat,
    /// Sub-folders holding an `index.md`, plus top-level `.md` files
    FolderIndex,
}

/// How a content folder is scanned and routed
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDescriptor {
    pub folder: String,
    /// URL segment and search `type` for entries of this section
    pub route: String,
    pub order: SortOrder,
    pub layout: SectionLayout,
    /// Whether entries become pages (search index, sitemap)
    pub routed: bool,
    pub sitemap_priority: f32,
}

/// Folder names reserved for the builtin sections
pub const BUILTIN_SECTIONS: [&str; 5] = ["blog", "projects", "features", "articles", "docs"];

impl SectionDescriptor {
    /// All builtin sections, in scan order
    pub fn builtins() -> Vec<SectionDescriptor> {
        BUILTIN_SECTIONS
            .iter()
            .filter_map(|folder| Self::builtin(folder))
            .collect()
    }

    pub fn builtin(folder: &str) -> Option<SectionDescriptor> {
        let (route, order, layout, routed, priority) = match folder {
            "blog" => ("blog", SortOrder::Descending, SectionLayout::Flat, true, 0.6),
            "projects" => (
                "project",
                SortOrder::Ascending,
                SectionLayout::FolderIndex,
                true,
                0.7,
            ),
            "features" => ("features", SortOrder::Ascending, SectionLayout::Flat, false, 0.0),
            "articles" => ("article", SortOrder::Ascending, SectionLayout::Flat, true, 0.6),
            "docs" => ("docs", SortOrder::Ascending, SectionLayout::Flat, true, 0.6),
            _ => return None,
        };

        Some(SectionDescriptor {
            folder: folder.to_string(),
            route: route.to_string(),
            order,
            layout,
            routed,
            sitemap_priority: priority,
        })
    }

    /// A site-config section; routed under its own folder name
    pub fn dynamic(folder: &str) -> SectionDescriptor {
        SectionDescriptor {
            folder: folder.to_string(),
            route: folder.to_string(),
            order: SortOrder::Ascending,
            layout: SectionLayout::Flat,
            routed: true,
            sitemap_priority: 0.6,
        }
    }

    /// Case-insensitive check against the builtin folder names
    pub fn is_builtin_folder(folder: &str) -> bool {
        BUILTIN_SECTIONS
            .iter()
            .any(|name| name.eq_ignore_ascii_case(folder))
    }

    /// Public URL path of an entry, e.g. `/project/my-tool`
    pub fn entry_url(&self, slug: &str) -> String {
        format!("/{}/{}", self.route, slug)
    }
}

/// A heading in a document outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocItem {
    pub level: u8,
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub children: Vec<TocItem>,
}

/// One record of `search-index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexEntry {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub url: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
