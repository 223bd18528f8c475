//! # quire-core
//!
//! Core library for the quire static site content pipeline.
//!
//! This crate parses markdown content with embedded components, derives URL
//! slugs, scans the published content folder, and generates the build
//! artifacts (content index, search index, sitemap, RSS feed, hosting files).

pub mod cancel;
pub mod component;
pub mod config;
pub mod frontmatter;
pub mod generators;
pub mod markdown;
pub mod models;
pub mod scanner;
pub mod search;
pub mod slug;

pub use cancel::{CancellationToken, Cancelled};
pub use component::{ContentParser, EmbeddedComponent, Parameters};
pub use config::{GeneratorConfig, HostingProvider, SiteConfig};
pub use generators::{generate_all, GenerateError, GenerationSummary};
pub use markdown::MarkdownService;
pub use models::{ContentIndex, FrontmatterData, SearchIndexEntry, SectionDescriptor, TocItem};
pub use scanner::ContentScanner;
pub use search::{IndexSource, LocalIndexSource, SearchResult, SearchService};
pub use slug::generate_slug;
