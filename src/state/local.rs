//! Local file-based state provider.
//!
//! Reads a recorded snapshot of the current state from disk. `.json` files
//! are parsed as JSON, anything else as YAML.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::error::{Result, StateError, SyncError};

use super::provider::StateProvider;

/// Local file-based state provider.
#[derive(Debug, Clone)]
pub struct FileStateProvider {
    /// Path to the state file.
    state_path: PathBuf,
}

impl FileStateProvider {
    /// Creates a provider reading the given state file.
    #[must_use]
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    /// Returns the state file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.state_path
    }

    fn is_json(&self) -> bool {
        self.state_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// Parses state file content according to the file extension.
    fn parse(&self, content: &str) -> Result<SyncConfig> {
        let parsed = if self.is_json() {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        };

        parsed.map_err(|e| {
            SyncError::State(StateError::corrupted(format!(
                "Failed to parse state file {}: {e}",
                self.state_path.display()
            )))
        })
    }

    /// Saves a snapshot to the state file as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub async fn save(&self, state: &SyncConfig) -> Result<()> {
        if let Some(parent) = self.state_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            debug!("Creating state directory: {}", parent.display());
            fs::create_dir_all(parent).await?;
        }

        info!("Saving state to: {}", self.state_path.display());

        let content = serde_json::to_string_pretty(state).map_err(|e| {
            SyncError::State(StateError::serialization(format!(
                "Failed to serialize state: {e}"
            )))
        })?;

        // Write to a temporary file first, then rename for atomicity
        let temp_path = self.state_path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.state_path).await?;

        debug!("State saved successfully");
        Ok(())
    }
}

#[async_trait]
impl StateProvider for FileStateProvider {
    async fn fetch(&self) -> Result<SyncConfig> {
        if !self.state_path.exists() {
            return Err(SyncError::State(StateError::NotFound {
                path: self.state_path.clone(),
            }));
        }

        info!("Loading state from: {}", self.state_path.display());

        let content = fs::read_to_string(&self.state_path).await.map_err(|e| {
            SyncError::State(StateError::corrupted(format!(
                "Failed to read state file: {e}"
            )))
        })?;

        let state = self.parse(&content)?;
        debug!("Loaded {} resources from state file", state.resources.len());
        Ok(state)
    }

    fn provider_type(&self) -> &'static str {
        "file"
    }
}
