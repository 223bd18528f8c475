//! `search-index.json` for client-side search.

use super::helpers::{read_content_file, truncate_text};
use super::{write_artifact, GenerateError};
use crate::cancel::{CancellationToken, Cancelled};
use crate::config::GeneratorConfig;
use crate::frontmatter::extract_frontmatter;
use crate::markdown::extract_plain_text;
use crate::models::{ContentIndex, SearchIndexEntry, SectionDescriptor};
use crate::slug::slug_from_filename;

pub struct SearchIndexGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> SearchIndexGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Entries for every routed section, without writing anything
    ///
    /// Files without usable frontmatter are not pages and are skipped.
    pub fn build_entries(
        &self,
        index: &ContentIndex,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchIndexEntry>, Cancelled> {
        let content_path = self.config.content_path();
        let mut entries = Vec::new();

        for (section, files) in index.routed_sections() {
            let section_path = content_path.join(&section.folder);
            for file in files {
                let Some(markdown) = read_content_file(&section_path.join(file), cancel)? else {
                    continue;
                };
                match self.entry_for(&section, file, &markdown) {
                    Some(entry) => entries.push(entry),
                    None => tracing::debug!("Skipping {}/{}: no frontmatter", section.folder, file),
                }
            }
        }

        Ok(entries)
    }

    /// Write compact camelCase JSON; returns the entry count
    pub fn generate(
        &self,
        index: &ContentIndex,
        cancel: &CancellationToken,
    ) -> Result<usize, GenerateError> {
        let entries = self.build_entries(index, cancel)?;
        let json = serde_json::to_string(&entries)?;
        let path = self.config.output_path.join("search-index.json");
        write_artifact(&path, &json, cancel)?;

        tracing::info!(
            "Created {:?} ({} entries, {:.1} KB)",
            path,
            entries.len(),
            json.len() as f64 / 1024.0
        );
        Ok(entries.len())
    }

    fn entry_for(
        &self,
        section: &SectionDescriptor,
        file: &str,
        markdown: &str,
    ) -> Option<SearchIndexEntry> {
        let (frontmatter, body) = extract_frontmatter(markdown);
        let frontmatter = frontmatter?;
        let slug = slug_from_filename(file);
        let plain_text = extract_plain_text(&body);

        Some(SearchIndexEntry {
            title: frontmatter.title.clone().unwrap_or_else(|| slug.clone()),
            description: frontmatter.summary_or_description().to_string(),
            content: truncate_text(&plain_text, self.config.search_content_max_length),
            url: section.entry_url(&slug),
            entry_type: section.route.clone(),
            tags: frontmatter.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_build_entries_per_section() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        let content = config.content_path();
        write(
            &content.join("blog/2024-02-03-launch.md"),
            "---\ntitle: Launch Day\nsummary: We shipped\ndescription: ignored\ntags: [news, release]\n---\n\n# Big **news**\n",
        );
        write(
            &content.join("projects/01-tool/index.md"),
            "---\ndescription: A tool\n---\nTool body",
        );
        write(&content.join("docs/raw.md"), "# No frontmatter here");
        write(&content.join("features/hero.md"), "---\ntitle: Hero\n---\n");
        write(&content.join("guides/setup.md"), "---\ntitle: Setup\n---\nSteps");

        let mut index = ContentIndex::default();
        index.blog.push("2024-02-03-launch.md".to_string());
        index.projects.push("01-tool/index.md".to_string());
        index.docs.push("raw.md".to_string());
        index.features.push("hero.md".to_string());
        index
            .sections
            .insert("guides".to_string(), vec!["setup.md".to_string()]);

        let entries = SearchIndexGenerator::new(&config)
            .build_entries(&index, &CancellationToken::new())
            .unwrap();

        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title, "Launch Day");
        assert_eq!(entries[0].description, "We shipped");
        assert_eq!(entries[0].url, "/blog/launch");
        assert_eq!(entries[0].entry_type, "blog");
        assert_eq!(entries[0].tags, vec!["news", "release"]);
        assert_eq!(entries[0].content, "Big news");

        assert_eq!(entries[1].title, "tool");
        assert_eq!(entries[1].description, "A tool");
        assert_eq!(entries[1].url, "/project/tool");
        assert_eq!(entries[1].entry_type, "project");

        assert_eq!(entries[2].url, "/guides/setup");
        assert_eq!(entries[2].entry_type, "guides");
    }

    #[test]
    fn test_content_is_truncated() {
        let dir = tempdir().unwrap();
        let mut config = GeneratorConfig::new(dir.path(), dir.path());
        config.search_content_max_length = 10;
        write(
            &config.content_path().join("docs/long.md"),
            "---\ntitle: Long\n---\nabcdefghijklmnopqrstuvwxyz",
        );

        let mut index = ContentIndex::default();
        index.docs.push("long.md".to_string());

        let entries = SearchIndexGenerator::new(&config)
            .build_entries(&index, &CancellationToken::new())
            .unwrap();
        assert_eq!(entries[0].content, "abcdefghij...");
    }

    #[test]
    fn test_generate_writes_compact_json() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        write(
            &config.content_path().join("articles/01-intro.md"),
            "---\ntitle: Intro\n---\nHello",
        );
        let mut index = ContentIndex::default();
        index.articles.push("01-intro.md".to_string());

        let count = SearchIndexGenerator::new(&config)
            .generate(&index, &CancellationToken::new())
            .unwrap();
        assert_eq!(count, 1);

        let json = fs::read_to_string(dir.path().join("search-index.json")).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#""url":"/article/intro""#));
        assert!(json.contains(r#""type":"article""#));
    }

    #[test]
    fn test_bom_and_numeric_frontmatter_are_indexed() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        let docs = config.content_path().join("docs");
        write(&docs.join("bom.md"), "\u{feff}---\ntitle: Bom\n---\nBody");
        write(&docs.join("novel.md"), "---\ntitle: 1984\ntags: [dotnet, 8]\n---\nBody");

        let mut index = ContentIndex::default();
        index.docs = vec!["bom.md".to_string(), "novel.md".to_string()];

        let entries = SearchIndexGenerator::new(&config)
            .build_entries(&index, &CancellationToken::new())
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Bom");
        assert_eq!(entries[1].title, "1984");
        assert_eq!(entries[1].tags, vec!["dotnet", "8"]);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new(dir.path(), dir.path());
        let mut index = ContentIndex::default();
        index.blog.push("gone.md".to_string());

        let entries = SearchIndexGenerator::new(&config)
            .build_entries(&index, &CancellationToken::new())
            .unwrap();
        assert!(entries.is_empty());
    }
}
