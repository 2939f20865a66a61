//! Selection of the current-state source.

use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, SyncError};

use super::http::HttpStateProvider;
use super::local::FileStateProvider;
use super::mock::MockStateProvider;
use super::provider::StateProvider;

/// Where the current state comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSource {
    /// Built-in static snapshot.
    Mock,
    /// Remote endpoint serving JSON.
    Http(String),
    /// Recorded state file.
    File(PathBuf),
}

impl StateSource {
    /// Builds the provider for this source.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be constructed.
    pub fn create_provider(&self, token: Option<&str>) -> Result<Box<dyn StateProvider>> {
        let provider: Box<dyn StateProvider> = match self {
            Self::Mock => Box::new(MockStateProvider::new()),
            Self::Http(url) => {
                let provider = HttpStateProvider::new(url.clone())?;
                Box::new(match token {
                    Some(token) => provider.with_token(token),
                    None => provider,
                })
            }
            Self::File(path) => Box::new(FileStateProvider::new(path.clone())),
        };

        debug!("Using {} state provider", provider.provider_type());
        Ok(provider)
    }
}

impl FromStr for StateSource {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SyncError::internal("State source cannot be empty"));
        }
        if s.eq_ignore_ascii_case("mock") {
            return Ok(Self::Mock);
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self::Http(s.to_string()));
        }
        Ok(Self::File(PathBuf::from(s)))
    }
}

impl std::fmt::Display for StateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
