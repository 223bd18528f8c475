//! `content/index.json`: the scanned file lists for the front end.

use super::{write_artifact, GenerateError};
use crate::cancel::CancellationToken;
use crate::config::GeneratorConfig;
use crate::models::ContentIndex;

pub struct ContentIndexWriter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ContentIndexWriter<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Write the index as pretty camelCase JSON; returns the file count
    pub fn generate(
        &self,
        index: &ContentIndex,
        cancel: &CancellationToken,
    ) -> Result<usize, GenerateError> {
        let path = self.config.content_path().join("index.json");
        let json = serde_json::to_string_pretty(index)?;
        write_artifact(&path, &json, cancel)?;

        tracing::info!("Created {:?} ({} files)", path, index.total_files());
        Ok(index.total_files())
    }
}
