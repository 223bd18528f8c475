//! Discovery of content files under the content root.

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::SiteConfig;
use crate::models::{ContentIndex, SectionDescriptor, SectionLayout, SortOrder};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Walks the builtin and site-config sections of a content folder
#[derive(Debug, Clone)]
pub struct ContentScanner {
    content_root: PathBuf,
    site_config_path: PathBuf,
}

impl ContentScanner {
    /// Scanner for `content_root`, reading `site.config.json` from its parent
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        let content_root = content_root.into();
        let site_config_path = content_root
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("site.config.json");

        Self {
            content_root,
            site_config_path,
        }
    }

    pub fn with_site_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.site_config_path = path.into();
        self
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Build the content index
    ///
    /// Missing section folders are skipped. Unreadable entries are logged
    /// and left out. A missing or invalid site config only means there are
    /// no dynamic sections.
    pub fn scan(&self, cancel: &CancellationToken) -> Result<ContentIndex, ScanError> {
        let mut index = ContentIndex::default();

        for section in SectionDescriptor::builtins() {
            cancel.check()?;
            let path = self.content_root.join(&section.folder);
            if path.is_dir() {
                index.set_files(&section, scan_section(&path, &section));
            }
        }

        for section in self.dynamic_sections() {
            cancel.check()?;
            let path = self.content_root.join(&section.folder);
            if path.is_dir() {
                index.set_files(&section, scan_section(&path, &section));
            } else {
                tracing::debug!("Section folder {:?} not found, skipping", path);
            }
        }

        tracing::info!(
            "Scanned {} content files in {:?}",
            index.total_files(),
            self.content_root
        );
        Ok(index)
    }

    fn dynamic_sections(&self) -> Vec<SectionDescriptor> {
        if !self.site_config_path.is_file() {
            tracing::debug!("No site config at {:?}", self.site_config_path);
            return Vec::new();
        }

        let config = match SiteConfig::from_file(&self.site_config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Ignoring content sections from {:?}: {}",
                    self.site_config_path,
                    e
                );
                return Vec::new();
            }
        };

        config
            .content_sections
            .iter()
            .map(|s| s.folder.trim())
            .filter(|folder| !folder.is_empty() && !SectionDescriptor::is_builtin_folder(folder))
            .map(SectionDescriptor::dynamic)
            .collect()
    }
}

fn scan_section(path: &Path, section: &SectionDescriptor) -> Vec<String> {
    let mut files = match section.layout {
        SectionLayout::Flat => list_markdown_files(path),
        SectionLayout::FolderIndex => list_folder_entries(path),
    };

    if section.order == SortOrder::Descending {
        files.reverse();
    }

    tracing::debug!("Section {}: {} entries", section.folder, files.len());
    files
}

/// Direct children of `path`, sorted by file name
fn read_entries(path: &Path) -> Vec<walkdir::DirEntry> {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", path, e);
                None
            }
        })
        .collect()
}

/// `.md`/`.mdx` files; compressed siblings such as `post.md.gz` are excluded
fn list_markdown_files(path: &Path) -> Vec<String> {
    read_entries(path)
        .into_iter()
        .filter(|entry| entry.file_type().is_file() && is_markdown(entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}

/// Folders containing `index.md` (as `name/index.md`) plus top-level `.md` files
fn list_folder_entries(path: &Path) -> Vec<String> {
    let mut results = Vec::new();

    for entry in read_entries(path) {
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if entry.file_type().is_dir() {
            if entry.path().join("index.md").is_file() {
                results.push(format!("{}/index.md", name));
            }
        } else if has_extension(entry.path(), &["md"]) {
            results.push(name.to_string());
        }
    }

    results
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    has_extension(path, &["md", "mdx"])
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
