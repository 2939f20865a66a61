//! State provider trait definition.
//!
//! This module defines the common interface for current-state sources.

use async_trait::async_trait;

use crate::config::SyncConfig;
use crate::error::Result;

/// Trait for current-state sources.
///
/// Implementations return an already materialized snapshot; the comparison
/// engine must never see a collection that is still being mutated.
#[async_trait]
pub trait StateProvider: Send + Sync {
    /// Fetches the current state.
    async fn fetch(&self) -> Result<SyncConfig>;

    /// Gets the provider type name.
    fn provider_type(&self) -> &'static str;
}

#[async_trait]
impl StateProvider for Box<dyn StateProvider> {
    async fn fetch(&self) -> Result<SyncConfig> {
        (**self).fetch().await
    }

    fn provider_type(&self) -> &'static str {
        (**self).provider_type()
    }
}
