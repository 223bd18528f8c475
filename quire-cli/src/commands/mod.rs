//! CLI command implementations.

pub mod generate;
pub mod search;

pub use generate::{generate_site, GenerateOptions};
pub use search::{search_site, SearchOptions};

use std::path::{Path, PathBuf};

/// The published output folder, `<site>/wwwroot` unless given
pub(crate) fn output_dir(site: &Path, output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| site.join("wwwroot"))
}
