//! Static in-memory state provider.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{Resource, SyncConfig};
use crate::error::Result;

use super::provider::StateProvider;

/// Provider returning a fixed snapshot.
#[derive(Debug, Clone)]
pub struct MockStateProvider {
    state: SyncConfig,
}

impl MockStateProvider {
    /// Creates a provider with the built-in demonstration infrastructure.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resources(vec![
            resource(
                "server",
                "web-server-1",
                json!({
                    "instance_type": "t2.micro",
                    "region": "us-east-1",
                    "status": "running",
                }),
            ),
            resource(
                "database",
                "main-db",
                json!({
                    "engine": "postgres",
                    "version": "14.0",
                    "size": "small",
                }),
            ),
        ])
    }

    /// Creates a provider returning the given resources.
    #[must_use]
    pub fn with_resources(resources: Vec<Resource>) -> Self {
        Self {
            state: SyncConfig::new("1.0", resources),
        }
    }
}

impl Default for MockStateProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn resource(resource_type: &str, name: &str, properties: Value) -> Resource {
    let properties = match properties {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    Resource::new(resource_type, name, properties)
}

#[async_trait]
impl StateProvider for MockStateProvider {
    async fn fetch(&self) -> Result<SyncConfig> {
        debug!("Returning {} mock resources", self.state.resources.len());
        Ok(self.state.clone())
    }

    fn provider_type(&self) -> &'static str {
        "mock"
    }
}
