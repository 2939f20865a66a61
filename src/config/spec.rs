//! Configuration specification types.
//!
//! These types map to the desired-state YAML file and are also the shape
//! every state provider yields for the current state.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Separator between type and name in a resource identity key.
pub const KEY_SEPARATOR: char = '.';

/// Property map of a resource, in declaration order.
pub type Properties = Map<String, Value>;

/// The root configuration structure: a versioned list of resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Configuration format version.
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
    /// Declared resources.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// A single named infrastructure resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Resource type (e.g. `server`).
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Resource name, unique within its type.
    #[serde(default)]
    pub name: String,
    /// Arbitrary, possibly nested properties.
    #[serde(default)]
    pub properties: Properties,
}

impl Resource {
    /// Creates a resource from its parts.
    #[must_use]
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            properties,
        }
    }

    /// Returns the identity key `type.name`.
    ///
    /// Keys are compared byte-for-byte. A type or name that itself contains
    /// the separator can collide with a differently split resource.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.resource_type, self.name)
    }
}

/// Accepts `1.0` as well as `"1.0"`: YAML users rarely quote versions.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar version, found {other}"
        ))),
    }
}

impl SyncConfig {
    /// Creates a configuration from a version and resources.
    #[must_use]
    pub fn new(version: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            version: version.into(),
            resources,
        }
    }

    /// Returns the number of declared resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Looks up a resource by identity key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.key() == key)
    }
}
