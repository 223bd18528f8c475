//! Querying the search index.
//!
//! [`SearchService`] loads entries once from an [`IndexSource`], preferring a
//! prebuilt `search-index.json` and building from content when that is
//! missing or empty, then ranks entries with a simple weighted term match.

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::GeneratorConfig;
use crate::generators::helpers::truncate_text;
use crate::generators::SearchIndexGenerator;
use crate::models::SearchIndexEntry;
use crate::scanner::{ContentScanner, ScanError};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Results returned by [`SearchService::search`]
pub const MAX_RESULTS: usize = 20;

const EXCERPT_LENGTH: usize = 200;
const EXCERPT_LEAD: usize = 50;

const TITLE_WEIGHT: u32 = 10;
const TAG_WEIGHT: u32 = 5;
const DESCRIPTION_WEIGHT: u32 = 3;
const CONTENT_WEIGHT: u32 = 1;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to read search index {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse search index: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to scan content: {0}")]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Where search entries come from
pub trait IndexSource {
    /// A prebuilt index, e.g. `search-index.json`
    fn load_prebuilt(&self) -> Result<Vec<SearchIndexEntry>, SearchError>;

    /// Construct the index from content on the fly
    fn build(&self) -> Result<Vec<SearchIndexEntry>, SearchError>;
}

/// A ranked match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Description or the content around the first hit
    pub excerpt: String,
    pub score: u32,
    pub matched_terms: Vec<String>,
}

pub struct SearchService<S> {
    source: S,
    index: OnceLock<Vec<SearchIndexEntry>>,
}

impl<S: IndexSource> SearchService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            index: OnceLock::new(),
        }
    }

    /// The loaded entries; the first call loads them, concurrent callers wait
    pub fn index(&self) -> &[SearchIndexEntry] {
        self.index.get_or_init(|| self.load())
    }

    fn load(&self) -> Vec<SearchIndexEntry> {
        match self.source.load_prebuilt() {
            Ok(entries) if !entries.is_empty() => {
                tracing::debug!("Loaded prebuilt search index with {} entries", entries.len());
                return entries;
            }
            Ok(_) => tracing::info!("Prebuilt search index is empty, building from content"),
            Err(e) => tracing::info!("Prebuilt search index unavailable ({}), building from content", e),
        }

        match self.source.build() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to build search index: {}", e);
                Vec::new()
            }
        }
    }

    /// Rank entries against whitespace-separated, case-insensitive terms
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = self
            .index()
            .iter()
            .filter_map(|entry| {
                let score = score(entry, &terms);
                (score > 0).then(|| SearchResult {
                    title: entry.title.clone(),
                    url: entry.url.clone(),
                    entry_type: entry.entry_type.clone(),
                    excerpt: excerpt(&entry.description, &entry.content, &terms),
                    score,
                    matched_terms: terms.iter().map(|t| t.to_string()).collect(),
                })
            })
            .collect();

        // Stable sort keeps index order among equal scores
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(MAX_RESULTS);
        results
    }

    /// The index as compact camelCase JSON
    pub fn export_json(&self) -> Result<String, SearchError> {
        Ok(serde_json::to_string(self.index())?)
    }
}

fn score(entry: &SearchIndexEntry, terms: &[&str]) -> u32 {
    let title = entry.title.to_lowercase();
    let tags = entry.tags.join(" ").to_lowercase();
    let description = entry.description.to_lowercase();
    let content = entry.content.to_lowercase();

    terms
        .iter()
        .map(|term| {
            let mut score = 0;
            if title.contains(term) {
                score += TITLE_WEIGHT;
            }
            if tags.contains(term) {
                score += TAG_WEIGHT;
            }
            if description.contains(term) {
                score += DESCRIPTION_WEIGHT;
            }
            if content.contains(term) {
                score += CONTENT_WEIGHT;
            }
            score
        })
        .sum()
}

fn excerpt(description: &str, content: &str, terms: &[&str]) -> String {
    let description_lower = description.to_lowercase();
    if terms.iter().any(|t| description_lower.contains(t)) {
        return truncate_text(description, EXCERPT_LENGTH);
    }

    let content_lower = content.to_lowercase();
    for term in terms {
        let Some(byte_idx) = content_lower.find(term) else {
            continue;
        };
        let chars: Vec<char> = content.chars().collect();
        let hit = content_lower[..byte_idx].chars().count().min(chars.len());
        let start = hit.saturating_sub(EXCERPT_LEAD);
        let end = (start + EXCERPT_LENGTH).min(chars.len());

        let mut excerpt: String = chars[start..end].iter().collect();
        if start > 0 {
            excerpt.insert_str(0, "...");
        }
        if end < chars.len() {
            excerpt.push_str("...");
        }
        return excerpt;
    }

    if description.is_empty() {
        truncate_text(content, EXCERPT_LENGTH)
    } else {
        truncate_text(description, EXCERPT_LENGTH)
    }
}

/// Reads `search-index.json` from the output folder, or scans its content
pub struct LocalIndexSource {
    config: GeneratorConfig,
    cancel: CancellationToken,
}

impl LocalIndexSource {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn index_path(&self) -> PathBuf {
        self.config.output_path.join("search-index.json")
    }
}

impl IndexSource for LocalIndexSource {
    fn load_prebuilt(&self) -> Result<Vec<SearchIndexEntry>, SearchError> {
        let path = self.index_path();
        let json = fs::read_to_string(&path).map_err(|source| SearchError::Read { path, source })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn build(&self) -> Result<Vec<SearchIndexEntry>, SearchError> {
        let index = ContentScanner::new(self.config.content_path())
            .with_site_config(self.config.site_config_path())
            .scan(&self.cancel)?;
        Ok(SearchIndexGenerator::new(&self.config).build_entries(&index, &self.cancel)?)
    }
}
